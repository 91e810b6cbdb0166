// Business rules - Container compatibility and scale classification

use serde::{Deserialize, Serialize};

use crate::domain::model::*;

/// Container families whose streams can be moved between each other without
/// touching the codec data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecFamily {
    /// ISO base media (MP4, MOV): H.264/AAC
    IsoMedia,
    /// Matroska: carries anything
    Matroska,
    /// WebM: VP8/VP9/AV1 with Opus/Vorbis
    WebMedia,
    /// Legacy AVI: MPEG-4 Part 2 with MP3
    Avi,
    /// Audio-only formats each form their own family
    Audio(ContainerFormat),
}

impl CodecFamily {
    pub fn of(format: ContainerFormat) -> Self {
        match format {
            ContainerFormat::Mp4 | ContainerFormat::Mov => CodecFamily::IsoMedia,
            ContainerFormat::Mkv => CodecFamily::Matroska,
            ContainerFormat::Webm => CodecFamily::WebMedia,
            ContainerFormat::Avi => CodecFamily::Avi,
            audio => CodecFamily::Audio(audio),
        }
    }
}

/// Container compatibility checks used by the planner and the materializer
pub struct CopyCompatibility;

impl CopyCompatibility {
    /// Whether `source` streams can be remuxed into `target` unchanged
    pub fn is_copy_compatible(source: ContainerFormat, target: ContainerFormat) -> bool {
        if source == target {
            return true;
        }

        if source.is_video() != target.is_video() {
            return false;
        }

        match (CodecFamily::of(source), CodecFamily::of(target)) {
            (a, b) if a == b => true,
            // Matroska accepts whatever a video container held
            (_, CodecFamily::Matroska) => source.is_video(),
            _ => false,
        }
    }

    /// Whether any conversion path exists between the two formats
    pub fn is_convertible(source: ContainerFormat, target: ContainerFormat) -> bool {
        // Audio-only input has no frames to put in a video container
        !(source.is_audio() && target.is_video())
    }
}

/// How a conversion changes the frame size, for read-only previews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleDecision {
    Upscale,
    Downscale,
    NoScaling,
    /// Audio outputs carry no frames
    NotApplicable,
}

impl ScaleDecision {
    /// Classify a directive against the source dimensions it was planned from
    pub fn classify(current: Dimensions, directive: &ConversionDirective) -> Self {
        match directive.target {
            None => ScaleDecision::NotApplicable,
            Some(target) if target == current => ScaleDecision::NoScaling,
            Some(target) if target.area() > current.area() => ScaleDecision::Upscale,
            Some(_) => ScaleDecision::Downscale,
        }
    }

    /// Short human description
    pub fn description(self) -> &'static str {
        match self {
            ScaleDecision::Upscale => "will upscale",
            ScaleDecision::Downscale => "will downscale",
            ScaleDecision::NoScaling => "no scaling",
            ScaleDecision::NotApplicable => "audio only",
        }
    }

    /// Label for a convert action offered to the user
    pub fn action_label(self) -> &'static str {
        match self {
            ScaleDecision::Upscale => "Convert (Upscale)",
            ScaleDecision::NoScaling => "Convert (No Scaling)",
            ScaleDecision::Downscale | ScaleDecision::NotApplicable => "Convert",
        }
    }

    /// Tag inserted into generated output names
    pub fn file_tag(self) -> Option<&'static str> {
        match self {
            ScaleDecision::Upscale => Some("UPSCALED"),
            ScaleDecision::NoScaling => Some("NO SCALING"),
            ScaleDecision::Downscale | ScaleDecision::NotApplicable => None,
        }
    }
}

#[cfg(test)]
mod tests;
