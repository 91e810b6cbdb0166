//! Stream copy arguments

use crate::domain::model::ContainerFormat;

/// Builds the codec section of a remux
pub struct StreamCopyArgs;

impl StreamCopyArgs {
    /// Arguments that move every stream into the new container untouched
    pub fn for_output(output: ContainerFormat) -> Vec<String> {
        if output.is_audio() {
            // Drop cover art and other picture streams
            return vec!["-vn".into(), "-c:a".into(), "copy".into()];
        }

        let mut args: Vec<String> = vec!["-map".into(), "0".into(), "-c".into(), "copy".into()];
        if matches!(output, ContainerFormat::Mp4 | ContainerFormat::Mov) {
            args.extend(["-movflags".into(), "+faststart".into()]);
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_remux_copies_all_streams() {
        assert_eq!(
            StreamCopyArgs::for_output(ContainerFormat::Mkv),
            vec!["-map", "0", "-c", "copy"]
        );
    }

    #[test]
    fn test_iso_remux_moves_index_to_front() {
        let args = StreamCopyArgs::for_output(ContainerFormat::Mov);
        assert!(args.ends_with(&["-movflags".to_string(), "+faststart".to_string()]));
    }

    #[test]
    fn test_audio_copy_drops_pictures() {
        assert_eq!(
            StreamCopyArgs::for_output(ContainerFormat::Flac),
            vec!["-vn", "-c:a", "copy"]
        );
    }
}
