//! Conversion strategy implementation

use tracing::debug;

use crate::domain::errors::PlanError;
use crate::domain::model::{
    ContainerFormat, ConversionDirective, ConversionRequest, Dimensions, MediaDescriptor,
    ResolutionTarget, ScalingFilter,
};
use crate::domain::rules::CopyCompatibility;

/// Plan a conversion of `current` to `target` resolution in `output_format`.
///
/// `target` is ignored for audio outputs.
pub fn plan(
    current: &MediaDescriptor,
    target: ResolutionTarget,
    output_format: ContainerFormat,
) -> Result<ConversionDirective, PlanError> {
    ConversionPlanner::new().plan_directive(current, Some(target), output_format)
}

/// Strategy planner for choosing between stream copy and re-encoding
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionPlanner;

impl ConversionPlanner {
    /// Create a new conversion planner
    pub fn new() -> Self {
        Self
    }

    /// Plan a full conversion request, attaching the MP3 bitrate when needed
    pub fn plan_request(
        &self,
        current: &MediaDescriptor,
        request: &ConversionRequest,
    ) -> Result<ConversionDirective, PlanError> {
        let directive = self.plan_directive(current, request.resolution, request.output_format)?;

        if request.output_format == ContainerFormat::Mp3 && !directive.is_stream_copy() {
            return Ok(directive.with_audio_bitrate(request.audio_bitrate));
        }

        Ok(directive)
    }

    /// Core decision: copy or re-encode, and with which filter
    pub fn plan_directive(
        &self,
        current: &MediaDescriptor,
        target: Option<ResolutionTarget>,
        output_format: ContainerFormat,
    ) -> Result<ConversionDirective, PlanError> {
        let source_format = current.container;

        if !CopyCompatibility::is_convertible(source_format, output_format) {
            return Err(PlanError::UnsupportedFormatPair {
                from: source_format,
                to: output_format,
            });
        }

        let dimensions = current.dimensions();
        let invalid = PlanError::InvalidDimensions {
            width: current.width,
            height: current.height,
        };
        if current.has_video && !dimensions.is_valid() {
            return Err(invalid);
        }

        if output_format.is_audio() {
            return Ok(self.plan_audio(source_format, output_format));
        }

        // Audio-only file in a video container: nothing to scale
        if !current.has_video {
            return Err(invalid);
        }

        // Video output without a resolution has nothing to compare against
        let target = target.ok_or(PlanError::UnsupportedFormatPair {
            from: source_format,
            to: output_format,
        })?;

        Ok(self.plan_video(dimensions, target.dimensions(), source_format, output_format))
    }

    /// Audio outputs skip the resolution table entirely
    fn plan_audio(&self, source: ContainerFormat, output: ContainerFormat) -> ConversionDirective {
        if source == output {
            debug!("Same audio format {}, copying streams", output);
            ConversionDirective::stream_copy(source, output, None)
        } else {
            debug!("Audio conversion {} -> {}", source, output);
            ConversionDirective::re_encode(source, output, None, ScalingFilter::None)
        }
    }

    fn plan_video(
        &self,
        current: Dimensions,
        target: Dimensions,
        source: ContainerFormat,
        output: ContainerFormat,
    ) -> ConversionDirective {
        let compatible = CopyCompatibility::is_copy_compatible(source, output);

        if current == target && compatible {
            debug!("{} already at target size and {} -> {} remuxes cleanly", current, source, output);
            return ConversionDirective::stream_copy(source, output, Some(current));
        }

        let filter = Self::select_filter(current, target);
        debug!(
            "Re-encoding {} -> {} ({} -> {}, filter {:?})",
            source, output, current, target, filter
        );
        ConversionDirective::re_encode(source, output, Some(target), filter)
    }

    /// Lanczos whenever the pixel area grows, bicubic when the frame shrinks
    /// or changes shape, nothing for a same-size transcode
    pub fn select_filter(current: Dimensions, target: Dimensions) -> ScalingFilter {
        if target.area() > current.area() {
            ScalingFilter::Lanczos
        } else if target != current {
            ScalingFilter::Bicubic
        } else {
            ScalingFilter::None
        }
    }
}
