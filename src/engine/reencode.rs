//! Re-encoding arguments for video and audio outputs

use crate::domain::model::{AudioBitrate, ContainerFormat, Dimensions, ScalingFilter};
use crate::engine::EngineConfig;

/// Constant quality for VP9, whose CRF scale differs from x264's
const VP9_CRF: u8 = 31;

/// Quantizer for MPEG-4 Part 2 in AVI
const MPEG4_QSCALE: u8 = 3;

/// Video/audio encoder pair used for a video container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodecProfile {
    /// libx264 + AAC (MP4, MOV, MKV)
    H264Aac,
    /// libvpx-vp9 + Opus (WEBM)
    Vp9Opus,
    /// MPEG-4 Part 2 + MP3 (AVI)
    Mpeg4Mp3,
}

impl VideoCodecProfile {
    /// Encoder pair for a video output container
    pub fn for_container(format: ContainerFormat) -> Option<Self> {
        match format {
            ContainerFormat::Mp4 | ContainerFormat::Mov | ContainerFormat::Mkv => {
                Some(VideoCodecProfile::H264Aac)
            }
            ContainerFormat::Webm => Some(VideoCodecProfile::Vp9Opus),
            ContainerFormat::Avi => Some(VideoCodecProfile::Mpeg4Mp3),
            _ => None,
        }
    }

    fn video_args(self, config: &EngineConfig) -> Vec<String> {
        match self {
            VideoCodecProfile::H264Aac => {
                let preset = if config.performance_mode {
                    "veryfast".to_string()
                } else {
                    config.preset.clone()
                };
                vec![
                    "-c:v".into(),
                    "libx264".into(),
                    "-preset".into(),
                    preset,
                    "-crf".into(),
                    config.crf.min(51).to_string(),
                    "-pix_fmt".into(),
                    "yuv420p".into(),
                ]
            }
            VideoCodecProfile::Vp9Opus => {
                let mut args: Vec<String> = vec![
                    "-c:v".into(),
                    "libvpx-vp9".into(),
                    "-crf".into(),
                    VP9_CRF.to_string(),
                    "-b:v".into(),
                    "0".into(),
                ];
                if config.performance_mode {
                    args.extend([
                        "-deadline".into(),
                        "realtime".into(),
                        "-cpu-used".into(),
                        "8".into(),
                    ]);
                }
                args
            }
            VideoCodecProfile::Mpeg4Mp3 => vec![
                "-c:v".into(),
                "mpeg4".into(),
                "-q:v".into(),
                MPEG4_QSCALE.to_string(),
            ],
        }
    }

    fn audio_args(self) -> Vec<String> {
        let (codec, bitrate) = match self {
            VideoCodecProfile::H264Aac => ("aac", "192k"),
            VideoCodecProfile::Vp9Opus => ("libopus", "160k"),
            VideoCodecProfile::Mpeg4Mp3 => ("libmp3lame", "192k"),
        };
        vec!["-c:a".into(), codec.into(), "-b:a".into(), bitrate.into()]
    }
}

/// Builds the codec section of a re-encode
pub struct ReencodeArgs;

impl ReencodeArgs {
    /// Video re-encode, optionally scaling to `target` with `filter`
    pub fn video(
        profile: VideoCodecProfile,
        target: Dimensions,
        filter: ScalingFilter,
        config: &EngineConfig,
    ) -> Vec<String> {
        let mut args = profile.video_args(config);

        if let Some(scale) = Self::scale_filter(target, filter, config.keep_aspect_ratio) {
            args.extend(["-vf".into(), scale]);
        }

        args.extend(profile.audio_args());

        if config.performance_mode {
            args.extend(["-threads".into(), "0".into()]);
        }
        args
    }

    /// Scale filter expression, `None` when the frame size stays as is
    pub fn scale_filter(target: Dimensions, filter: ScalingFilter, keep_aspect_ratio: bool) -> Option<String> {
        let flag = filter.ffmpeg_flag()?;
        let width = if keep_aspect_ratio {
            // -2 keeps the width even, which x264 requires
            "-2".to_string()
        } else {
            target.width.to_string()
        };
        Some(format!("scale={}:{}:flags={}", width, target.height, flag))
    }

    /// Audio-only conversion, dropping any video
    pub fn audio(output: ContainerFormat, bitrate: AudioBitrate) -> Option<Vec<String>> {
        let mut args: Vec<String> = vec!["-vn".into()];
        match output {
            ContainerFormat::Mp3 => args.extend([
                "-c:a".into(),
                "libmp3lame".into(),
                "-b:a".into(),
                format!("{}k", bitrate.kbps()),
            ]),
            ContainerFormat::Wav => args.extend(["-c:a".into(), "pcm_s16le".into()]),
            ContainerFormat::Aiff => args.extend(["-c:a".into(), "pcm_s16be".into()]),
            ContainerFormat::Flac => args.extend(["-c:a".into(), "flac".into()]),
            _ => return None,
        }
        Some(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_profiles_per_container() {
        assert_eq!(VideoCodecProfile::for_container(ContainerFormat::Mov), Some(VideoCodecProfile::H264Aac));
        assert_eq!(VideoCodecProfile::for_container(ContainerFormat::Webm), Some(VideoCodecProfile::Vp9Opus));
        assert_eq!(VideoCodecProfile::for_container(ContainerFormat::Avi), Some(VideoCodecProfile::Mpeg4Mp3));
        assert_eq!(VideoCodecProfile::for_container(ContainerFormat::Wav), None);
    }

    #[test]
    fn test_scale_filter_expressions() {
        let target = Dimensions::new(1920, 1080);
        assert_eq!(
            ReencodeArgs::scale_filter(target, ScalingFilter::Lanczos, false).as_deref(),
            Some("scale=1920:1080:flags=lanczos")
        );
        assert_eq!(
            ReencodeArgs::scale_filter(target, ScalingFilter::Bicubic, true).as_deref(),
            Some("scale=-2:1080:flags=bicubic")
        );
        assert_eq!(ReencodeArgs::scale_filter(target, ScalingFilter::None, false), None);
    }

    #[test]
    fn test_performance_mode_uses_fast_preset() {
        let config = EngineConfig {
            performance_mode: true,
            ..EngineConfig::default()
        };
        let args = ReencodeArgs::video(
            VideoCodecProfile::H264Aac,
            Dimensions::new(2560, 1440),
            ScalingFilter::Lanczos,
            &config,
        );
        assert!(args.windows(2).any(|w| w[0] == "-preset" && w[1] == "veryfast"));
        assert!(args.ends_with(&["-threads".to_string(), "0".to_string()]));
    }

    #[test]
    fn test_audio_codecs() {
        let mp3 = ReencodeArgs::audio(ContainerFormat::Mp3, AudioBitrate::Kbps128).unwrap();
        assert_eq!(mp3, vec!["-vn", "-c:a", "libmp3lame", "-b:a", "128k"]);
        let aiff = ReencodeArgs::audio(ContainerFormat::Aiff, AudioBitrate::default()).unwrap();
        assert_eq!(aiff, vec!["-vn", "-c:a", "pcm_s16be"]);
        assert!(ReencodeArgs::audio(ContainerFormat::Mp4, AudioBitrate::default()).is_none());
    }
}
