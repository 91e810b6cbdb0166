//! Output file placement and naming

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub mod naming;
pub mod reservations;

pub use naming::OutputNamer;
pub use reservations::OutputReservations;

/// Where converted files are written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for all outputs; next to each input when unset
    pub output_dir: Option<PathBuf>,
}

impl OutputConfig {
    pub fn namer(&self) -> OutputNamer {
        OutputNamer::new(self.output_dir.clone())
    }
}
