//! Directive-to-command materialization

use std::path::Path;

use tracing::debug;

use crate::domain::errors::MaterializationError;
use crate::domain::model::{ConversionDirective, OperationMode, ScalingFilter};
use crate::domain::rules::CopyCompatibility;
use crate::engine::copy::StreamCopyArgs;
use crate::engine::reencode::{ReencodeArgs, VideoCodecProfile};
use crate::engine::EngineConfig;

/// Builds transcoder argument lists from planner directives.
///
/// The output is a pure function of the directive, the paths and the
/// engine configuration, so materializing twice gives identical lists.
#[derive(Debug, Clone, Default)]
pub struct CommandBuilder {
    config: EngineConfig,
}

impl CommandBuilder {
    /// Create a new command builder
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Full argument list (without the program name) for one conversion
    pub fn materialize(
        &self,
        directive: &ConversionDirective,
        input: &Path,
        output: &Path,
    ) -> Result<Vec<String>, MaterializationError> {
        let codec_args = match directive.mode {
            OperationMode::StreamCopy => self.copy_args(directive)?,
            OperationMode::ReEncode => self.reencode_args(directive)?,
        };

        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-y".into(),
            "-i".into(),
            input.to_string_lossy().into_owned(),
        ];
        args.extend(codec_args);
        args.extend([
            "-progress".into(),
            "pipe:1".into(),
            "-nostats".into(),
            output.to_string_lossy().into_owned(),
        ]);

        debug!("Materialized {} into {} arguments", directive, args.len());
        Ok(args)
    }

    fn copy_args(&self, directive: &ConversionDirective) -> Result<Vec<String>, MaterializationError> {
        if directive.scaling_filter.is_some() {
            return Err(Self::unsupported(directive, "stream copy cannot apply a scaling filter"));
        }

        if !CopyCompatibility::is_copy_compatible(directive.source_format, directive.output_format) {
            return Err(Self::unsupported(directive, "streams cannot be remuxed across codec families"));
        }

        if directive.output_format.is_audio() {
            if directive.target.is_some() {
                return Err(Self::unsupported(directive, "audio output cannot carry dimensions"));
            }
        } else if !directive.target.is_some_and(|target| target.is_valid()) {
            return Err(Self::unsupported(directive, "video output needs valid target dimensions"));
        }

        Ok(StreamCopyArgs::for_output(directive.output_format))
    }

    fn reencode_args(&self, directive: &ConversionDirective) -> Result<Vec<String>, MaterializationError> {
        let filter = directive
            .scaling_filter
            .ok_or_else(|| Self::unsupported(directive, "re-encode without a scaling decision"))?;

        let output = directive.output_format;
        if output.is_audio() {
            if directive.target.is_some() || filter != ScalingFilter::None {
                return Err(Self::unsupported(directive, "audio output cannot be scaled"));
            }
            return ReencodeArgs::audio(output, directive.audio_bitrate.unwrap_or_default())
                .ok_or_else(|| Self::unsupported(directive, "no audio encoder for this format"));
        }

        if directive.source_format.is_audio() {
            return Err(Self::unsupported(directive, "audio source has no video to encode"));
        }

        let target = directive
            .target
            .filter(|target| target.is_valid())
            .ok_or_else(|| Self::unsupported(directive, "video output needs valid target dimensions"))?;

        let profile = VideoCodecProfile::for_container(output)
            .ok_or_else(|| Self::unsupported(directive, "no video encoder for this format"))?;

        Ok(ReencodeArgs::video(profile, target, filter, &self.config))
    }

    fn unsupported(directive: &ConversionDirective, reason: &str) -> MaterializationError {
        MaterializationError::UnsupportedCombination {
            mode: directive.mode,
            from: directive.source_format,
            to: directive.output_format,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AudioBitrate, ContainerFormat, Dimensions};

    fn materialize(directive: &ConversionDirective) -> Result<Vec<String>, MaterializationError> {
        CommandBuilder::default().materialize(directive, Path::new("in.mp4"), Path::new("out.mkv"))
    }

    #[test]
    fn test_upscale_command_carries_lanczos_scale() {
        let directive = ConversionDirective::re_encode(
            ContainerFormat::Mp4,
            ContainerFormat::Mp4,
            Some(Dimensions::new(1920, 1080)),
            ScalingFilter::Lanczos,
        );
        let args = materialize(&directive).unwrap();
        assert_eq!(&args[..4], &["-hide_banner", "-y", "-i", "in.mp4"]);
        assert!(args.windows(2).any(|w| w[0] == "-vf" && w[1] == "scale=1920:1080:flags=lanczos"));
        assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "libx264"));
        assert_eq!(args.last().map(String::as_str), Some("out.mkv"));
    }

    #[test]
    fn test_stream_copy_command() {
        let directive = ConversionDirective::stream_copy(
            ContainerFormat::Mp4,
            ContainerFormat::Mkv,
            Some(Dimensions::new(1920, 1080)),
        );
        let args = materialize(&directive).unwrap();
        assert!(args.windows(2).any(|w| w[0] == "-c" && w[1] == "copy"));
        assert!(!args.iter().any(|arg| arg == "-vf"));
    }

    #[test]
    fn test_pure_transcode_has_no_scale_filter() {
        let directive = ConversionDirective::re_encode(
            ContainerFormat::Mp4,
            ContainerFormat::Webm,
            Some(Dimensions::new(1920, 1080)),
            ScalingFilter::None,
        );
        let args = materialize(&directive).unwrap();
        assert!(!args.iter().any(|arg| arg == "-vf"));
        assert!(args.iter().any(|arg| arg == "libvpx-vp9"));
    }

    #[test]
    fn test_materialization_is_idempotent() {
        let directive = ConversionDirective::re_encode(
            ContainerFormat::Mov,
            ContainerFormat::Mp3,
            None,
            ScalingFilter::None,
        )
        .with_audio_bitrate(AudioBitrate::Kbps256);
        assert_eq!(materialize(&directive).unwrap(), materialize(&directive).unwrap());
    }

    #[test]
    fn test_rejects_copy_across_codec_families() {
        let directive = ConversionDirective::stream_copy(
            ContainerFormat::Mp4,
            ContainerFormat::Webm,
            Some(Dimensions::new(1920, 1080)),
        );
        assert!(matches!(
            materialize(&directive),
            Err(MaterializationError::UnsupportedCombination { .. })
        ));
    }

    #[test]
    fn test_rejects_copy_between_video_and_audio() {
        let directive = ConversionDirective::stream_copy(ContainerFormat::Mkv, ContainerFormat::Wav, None);
        assert!(materialize(&directive).is_err());
    }

    #[test]
    fn test_rejects_copy_with_filter() {
        let mut directive = ConversionDirective::stream_copy(
            ContainerFormat::Mp4,
            ContainerFormat::Mp4,
            Some(Dimensions::new(1920, 1080)),
        );
        directive.scaling_filter = Some(ScalingFilter::Lanczos);
        assert!(materialize(&directive).is_err());
    }

    #[test]
    fn test_rejects_video_copy_without_target() {
        let directive = ConversionDirective::stream_copy(ContainerFormat::Mp4, ContainerFormat::Mov, None);
        assert!(matches!(
            materialize(&directive),
            Err(MaterializationError::UnsupportedCombination { .. })
        ));

        let zero = ConversionDirective::stream_copy(
            ContainerFormat::Mkv,
            ContainerFormat::Mkv,
            Some(Dimensions::new(0, 1080)),
        );
        assert!(materialize(&zero).is_err());
    }

    #[test]
    fn test_rejects_audio_copy_with_dimensions() {
        let directive = ConversionDirective::stream_copy(
            ContainerFormat::Wav,
            ContainerFormat::Wav,
            Some(Dimensions::new(1920, 1080)),
        );
        assert!(matches!(
            materialize(&directive),
            Err(MaterializationError::UnsupportedCombination { .. })
        ));

        let plain = ConversionDirective::stream_copy(ContainerFormat::Wav, ContainerFormat::Wav, None);
        assert!(materialize(&plain).is_ok());
    }

    #[test]
    fn test_rejects_video_reencode_without_target() {
        let directive = ConversionDirective::re_encode(
            ContainerFormat::Mp4,
            ContainerFormat::Mov,
            None,
            ScalingFilter::Bicubic,
        );
        assert!(materialize(&directive).is_err());
    }

    #[test]
    fn test_rejects_scaled_audio_output() {
        let directive = ConversionDirective::re_encode(
            ContainerFormat::Mp4,
            ContainerFormat::Flac,
            Some(Dimensions::new(1920, 1080)),
            ScalingFilter::Lanczos,
        );
        assert!(materialize(&directive).is_err());
    }

    #[test]
    fn test_keep_aspect_ratio_scales_by_height() {
        let builder = CommandBuilder::new(EngineConfig {
            keep_aspect_ratio: true,
            ..EngineConfig::default()
        });
        let directive = ConversionDirective::re_encode(
            ContainerFormat::Mkv,
            ContainerFormat::Mkv,
            Some(Dimensions::new(3840, 2160)),
            ScalingFilter::Lanczos,
        );
        let args = builder
            .materialize(&directive, Path::new("a.mkv"), Path::new("b.mkv"))
            .unwrap();
        assert!(args.iter().any(|arg| arg == "scale=-2:2160:flags=lanczos"));
    }
}
