//! Output file name generation

use std::path::{Path, PathBuf};

use crate::domain::model::{ContainerFormat, ConversionDirective, Dimensions};
use crate::domain::rules::ScaleDecision;

/// Suffix added when the generated name would overwrite the input
const COLLISION_SUFFIX: &str = " (converted)";

/// Derives output paths from the input path and the planned directive
#[derive(Debug, Clone, Default)]
pub struct OutputNamer {
    output_dir: Option<PathBuf>,
}

impl OutputNamer {
    pub fn new(output_dir: Option<PathBuf>) -> Self {
        Self { output_dir }
    }

    /// Output path for converting `input` (probed at `current`) per `directive`.
    ///
    /// Video outputs are named `<stem> - <H>p (UPSCALED).<ext>`,
    /// `<stem> - <H>p (NO SCALING).<ext>` or `<stem> - <H>p.<ext>`; MP3 outputs
    /// `<stem>_<N>kbps.mp3`; other audio `<stem>.<ext>`.
    pub fn output_path(&self, input: &Path, current: Dimensions, directive: &ConversionDirective) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let extension = directive.output_format.extension();

        let base = match directive.target {
            Some(target) => {
                let mut name = format!("{} - {}p", stem, target.height);
                if let Some(tag) = ScaleDecision::classify(current, directive).file_tag() {
                    name.push_str(&format!(" ({})", tag));
                }
                name
            }
            None => match (directive.output_format, directive.audio_bitrate) {
                (ContainerFormat::Mp3, Some(bitrate)) => format!("{}_{}kbps", stem, bitrate.kbps()),
                _ => stem.clone(),
            },
        };

        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };

        let candidate = dir.join(format!("{}.{}", base, extension));
        if candidate == input {
            return dir.join(format!("{}{}.{}", base, COLLISION_SUFFIX, extension));
        }
        candidate
    }
}
