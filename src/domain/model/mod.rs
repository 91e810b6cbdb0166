// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Container formats the engine can read and produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Mp4,
    Avi,
    Mkv,
    Webm,
    Mov,
    Mp3,
    Wav,
    Aiff,
    Flac,
}

impl ContainerFormat {
    /// Every supported format, video containers first
    pub const ALL: [ContainerFormat; 9] = [
        ContainerFormat::Mp4,
        ContainerFormat::Avi,
        ContainerFormat::Mkv,
        ContainerFormat::Webm,
        ContainerFormat::Mov,
        ContainerFormat::Mp3,
        ContainerFormat::Wav,
        ContainerFormat::Aiff,
        ContainerFormat::Flac,
    ];

    /// Whether this container holds video
    pub fn is_video(self) -> bool {
        matches!(
            self,
            ContainerFormat::Mp4
                | ContainerFormat::Avi
                | ContainerFormat::Mkv
                | ContainerFormat::Webm
                | ContainerFormat::Mov
        )
    }

    /// Whether this is an audio-only container
    pub fn is_audio(self) -> bool {
        !self.is_video()
    }

    /// Canonical file extension (without the dot)
    pub fn extension(self) -> &'static str {
        match self {
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Avi => "avi",
            ContainerFormat::Mkv => "mkv",
            ContainerFormat::Webm => "webm",
            ContainerFormat::Mov => "mov",
            ContainerFormat::Mp3 => "mp3",
            ContainerFormat::Wav => "wav",
            ContainerFormat::Aiff => "aiff",
            ContainerFormat::Flac => "flac",
        }
    }

    /// Guess the format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension().to_uppercase())
    }
}

impl FromStr for ContainerFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "mp4" | "m4v" => Ok(ContainerFormat::Mp4),
            "avi" => Ok(ContainerFormat::Avi),
            "mkv" => Ok(ContainerFormat::Mkv),
            "webm" => Ok(ContainerFormat::Webm),
            "mov" => Ok(ContainerFormat::Mov),
            "mp3" => Ok(ContainerFormat::Mp3),
            "wav" => Ok(ContainerFormat::Wav),
            "aiff" | "aif" => Ok(ContainerFormat::Aiff),
            "flac" => Ok(ContainerFormat::Flac),
            other => Err(DomainError::BadArgs(format!(
                "Unsupported format: {}. Supported formats: mp4, avi, mkv, webm, mov, mp3, wav, aiff, flac",
                other
            ))),
        }
    }
}

/// Pixel dimensions. Signed so malformed probe output stays representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: i64,
    pub height: i64,
}

impl Dimensions {
    pub const fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }

    /// Pixel area, wide enough that no pair of `i64` sides overflows
    pub fn area(&self) -> i128 {
        i128::from(self.width) * i128::from(self.height)
    }

    /// Both sides strictly positive
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Fixed set of output resolutions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionTarget {
    #[serde(rename = "1080p")]
    FullHd,
    #[serde(rename = "2k")]
    QuadHd,
    #[serde(rename = "4k")]
    UltraHd,
}

impl ResolutionTarget {
    pub const ALL: [ResolutionTarget; 3] = [
        ResolutionTarget::FullHd,
        ResolutionTarget::QuadHd,
        ResolutionTarget::UltraHd,
    ];

    /// Canonical dimensions of the target
    pub const fn dimensions(self) -> Dimensions {
        match self {
            ResolutionTarget::FullHd => Dimensions::new(1920, 1080),
            ResolutionTarget::QuadHd => Dimensions::new(2560, 1440),
            ResolutionTarget::UltraHd => Dimensions::new(3840, 2160),
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            ResolutionTarget::FullHd => "1080p",
            ResolutionTarget::QuadHd => "2K",
            ResolutionTarget::UltraHd => "4K",
        }
    }
}

impl fmt::Display for ResolutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ResolutionTarget {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1080p" | "1080" | "fhd" => Ok(ResolutionTarget::FullHd),
            "2k" | "1440p" | "1440" | "qhd" => Ok(ResolutionTarget::QuadHd),
            "4k" | "2160p" | "2160" | "uhd" => Ok(ResolutionTarget::UltraHd),
            other => Err(DomainError::BadArgs(format!(
                "Invalid resolution: {}. Valid resolutions: 1080p, 2k, 4k",
                other
            ))),
        }
    }
}

/// MP3 output bitrate choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum AudioBitrate {
    #[default]
    Kbps320,
    Kbps256,
    Kbps128,
}

impl AudioBitrate {
    pub fn kbps(self) -> u32 {
        match self {
            AudioBitrate::Kbps320 => 320,
            AudioBitrate::Kbps256 => 256,
            AudioBitrate::Kbps128 => 128,
        }
    }
}

impl TryFrom<u32> for AudioBitrate {
    type Error = DomainError;

    fn try_from(kbps: u32) -> Result<Self, Self::Error> {
        match kbps {
            320 => Ok(AudioBitrate::Kbps320),
            256 => Ok(AudioBitrate::Kbps256),
            128 => Ok(AudioBitrate::Kbps128),
            other => Err(DomainError::BadArgs(format!(
                "Invalid MP3 bitrate: {}. Valid bitrates: 320, 256, 128",
                other
            ))),
        }
    }
}

impl From<AudioBitrate> for u32 {
    fn from(bitrate: AudioBitrate) -> Self {
        bitrate.kbps()
    }
}

impl fmt::Display for AudioBitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}kbps", self.kbps())
    }
}

/// What the prober learned about an input file.
///
/// Built fresh for every conversion and never cached: the file may change
/// between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub path: PathBuf,
    pub width: i64,
    pub height: i64,
    pub container: ContainerFormat,
    /// Whether the file carries a video stream; false for audio containers
    /// and for audio-only files in video containers
    #[serde(default)]
    pub has_video: bool,
    /// Duration in seconds, when the probe reported one
    pub duration: Option<f64>,
}

impl MediaDescriptor {
    pub fn new(path: impl Into<PathBuf>, width: i64, height: i64, container: ContainerFormat) -> Self {
        Self {
            path: path.into(),
            width,
            height,
            container,
            has_video: container.is_video(),
            duration: None,
        }
    }

    /// A file without pictures, such as an audio-only `.webm` download
    pub fn audio_only(path: impl Into<PathBuf>, container: ContainerFormat) -> Self {
        Self {
            has_video: false,
            ..Self::new(path, 0, 0, container)
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Copy the streams or decode and re-compress them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    StreamCopy,
    ReEncode,
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationMode::StreamCopy => f.write_str("stream copy"),
            OperationMode::ReEncode => f.write_str("re-encode"),
        }
    }
}

/// Resampling filter applied during a re-encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalingFilter {
    /// High quality resampling, used whenever the pixel area grows
    Lanczos,
    /// Default resampling for downscales
    Bicubic,
    /// Re-encode without touching the frame size
    None,
}

impl ScalingFilter {
    /// Name of the flag understood by the transcoder's scale filter
    pub fn ffmpeg_flag(self) -> Option<&'static str> {
        match self {
            ScalingFilter::Lanczos => Some("lanczos"),
            ScalingFilter::Bicubic => Some("bicubic"),
            ScalingFilter::None => None,
        }
    }
}

/// What the caller wants out of a conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub output_format: ContainerFormat,
    /// Required for video outputs, ignored for audio outputs
    pub resolution: Option<ResolutionTarget>,
    /// Only used for MP3 outputs
    pub audio_bitrate: AudioBitrate,
}

impl ConversionRequest {
    /// Build a request, checking that video outputs name a resolution
    pub fn new(
        output_format: ContainerFormat,
        resolution: Option<ResolutionTarget>,
        audio_bitrate: AudioBitrate,
    ) -> Result<Self, DomainError> {
        if output_format.is_video() && resolution.is_none() {
            return Err(DomainError::BadArgs(format!(
                "Resolution not specified for {} conversion",
                output_format
            )));
        }

        Ok(Self {
            output_format,
            resolution: if output_format.is_video() { resolution } else { None },
            audio_bitrate,
        })
    }

    pub fn video(output_format: ContainerFormat, resolution: ResolutionTarget) -> Result<Self, DomainError> {
        Self::new(output_format, Some(resolution), AudioBitrate::default())
    }

    pub fn audio(output_format: ContainerFormat, audio_bitrate: AudioBitrate) -> Result<Self, DomainError> {
        if output_format.is_video() {
            return Err(DomainError::BadArgs(format!(
                "{} is not an audio format",
                output_format
            )));
        }
        Self::new(output_format, None, audio_bitrate)
    }
}

/// Abstract description of one conversion, produced by the planner and
/// consumed once by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionDirective {
    pub mode: OperationMode,
    /// Only ever set for re-encodes
    pub scaling_filter: Option<ScalingFilter>,
    /// Output frame size; absent for audio outputs
    pub target: Option<Dimensions>,
    pub source_format: ContainerFormat,
    pub output_format: ContainerFormat,
    /// Only set for MP3 outputs
    pub audio_bitrate: Option<AudioBitrate>,
}

impl ConversionDirective {
    /// Remux without re-encoding
    pub fn stream_copy(
        source_format: ContainerFormat,
        output_format: ContainerFormat,
        target: Option<Dimensions>,
    ) -> Self {
        Self {
            mode: OperationMode::StreamCopy,
            scaling_filter: None,
            target,
            source_format,
            output_format,
            audio_bitrate: None,
        }
    }

    /// Decode and re-compress
    pub fn re_encode(
        source_format: ContainerFormat,
        output_format: ContainerFormat,
        target: Option<Dimensions>,
        scaling_filter: ScalingFilter,
    ) -> Self {
        Self {
            mode: OperationMode::ReEncode,
            scaling_filter: Some(scaling_filter),
            target,
            source_format,
            output_format,
            audio_bitrate: None,
        }
    }

    pub fn with_audio_bitrate(mut self, bitrate: AudioBitrate) -> Self {
        self.audio_bitrate = Some(bitrate);
        self
    }

    pub fn is_stream_copy(&self) -> bool {
        self.mode == OperationMode::StreamCopy
    }
}

impl fmt::Display for ConversionDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.mode, self.source_format, self.output_format)?;
        if let Some(target) = self.target {
            write!(f, " at {}", target)?;
        }
        if let Some(filter) = self.scaling_filter.and_then(ScalingFilter::ffmpeg_flag) {
            write!(f, " ({})", filter)?;
        }
        if let Some(bitrate) = self.audio_bitrate {
            write!(f, " @ {}", bitrate)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
