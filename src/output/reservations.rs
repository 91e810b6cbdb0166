//! Output paths claimed by conversions of the current run

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Set of output paths already handed out.
///
/// Sibling inputs that differ only by extension (`a.mp4`, `a.mov`) name the
/// same output; the later claim gets a numbered variant (`a (2).mp4`) so two
/// transcoder processes never write one file.
#[derive(Debug, Default)]
pub struct OutputReservations {
    claimed: Mutex<HashSet<PathBuf>>,
}

impl OutputReservations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `wanted`, or the first free numbered variant of it
    pub fn claim(&self, wanted: &Path) -> PathBuf {
        let mut claimed = self.claimed.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut candidate = wanted.to_path_buf();
        let mut n = 2;
        while claimed.contains(&candidate) {
            candidate = numbered(wanted, n);
            n += 1;
        }

        claimed.insert(candidate.clone());
        candidate
    }

    /// Give a path back after its conversion failed
    pub fn release(&self, path: &Path) {
        let mut claimed = self.claimed.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        claimed.remove(path);
    }
}

/// `dir/stem.ext` -> `dir/stem (n).ext`
fn numbered(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
        None => format!("{} ({})", stem, n),
    };
    path.with_file_name(name)
}
