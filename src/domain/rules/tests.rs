// Unit tests for business rules

#[cfg(test)]
mod tests {
    use crate::domain::model::*;
    use crate::domain::rules::*;

    #[test]
    fn test_identical_formats_are_copy_compatible() {
        for format in ContainerFormat::ALL {
            assert!(CopyCompatibility::is_copy_compatible(format, format), "{}", format);
        }
    }

    #[test]
    fn test_mp4_and_mov_share_a_family() {
        assert!(CopyCompatibility::is_copy_compatible(ContainerFormat::Mp4, ContainerFormat::Mov));
        assert!(CopyCompatibility::is_copy_compatible(ContainerFormat::Mov, ContainerFormat::Mp4));
    }

    #[test]
    fn test_any_video_container_remuxes_into_matroska() {
        for source in [
            ContainerFormat::Mp4,
            ContainerFormat::Mov,
            ContainerFormat::Webm,
            ContainerFormat::Avi,
        ] {
            assert!(CopyCompatibility::is_copy_compatible(source, ContainerFormat::Mkv));
        }
    }

    #[test]
    fn test_incompatible_video_pairs() {
        assert!(!CopyCompatibility::is_copy_compatible(ContainerFormat::Mp4, ContainerFormat::Webm));
        assert!(!CopyCompatibility::is_copy_compatible(ContainerFormat::Mkv, ContainerFormat::Mp4));
        assert!(!CopyCompatibility::is_copy_compatible(ContainerFormat::Avi, ContainerFormat::Mov));
    }

    #[test]
    fn test_distinct_audio_formats_are_not_copy_compatible() {
        assert!(!CopyCompatibility::is_copy_compatible(ContainerFormat::Wav, ContainerFormat::Aiff));
        assert!(!CopyCompatibility::is_copy_compatible(ContainerFormat::Flac, ContainerFormat::Mp3));
    }

    #[test]
    fn test_video_and_audio_never_copy_compatible() {
        assert!(!CopyCompatibility::is_copy_compatible(ContainerFormat::Mp4, ContainerFormat::Mp3));
        assert!(!CopyCompatibility::is_copy_compatible(ContainerFormat::Wav, ContainerFormat::Mkv));
    }

    #[test]
    fn test_audio_sources_cannot_become_video() {
        assert!(!CopyCompatibility::is_convertible(ContainerFormat::Mp3, ContainerFormat::Mp4));
        assert!(CopyCompatibility::is_convertible(ContainerFormat::Mp4, ContainerFormat::Mp3));
        assert!(CopyCompatibility::is_convertible(ContainerFormat::Wav, ContainerFormat::Flac));
    }

    #[test]
    fn test_scale_decision_classification() {
        let hd = Dimensions::new(1280, 720);
        let upscale = ConversionDirective::re_encode(
            ContainerFormat::Mp4,
            ContainerFormat::Mp4,
            Some(ResolutionTarget::FullHd.dimensions()),
            ScalingFilter::Lanczos,
        );
        assert_eq!(ScaleDecision::classify(hd, &upscale), ScaleDecision::Upscale);

        let uhd = ResolutionTarget::UltraHd.dimensions();
        assert_eq!(ScaleDecision::classify(uhd, &upscale), ScaleDecision::Downscale);

        let full_hd = ResolutionTarget::FullHd.dimensions();
        assert_eq!(ScaleDecision::classify(full_hd, &upscale), ScaleDecision::NoScaling);

        let audio = ConversionDirective::re_encode(
            ContainerFormat::Mp4,
            ContainerFormat::Mp3,
            None,
            ScalingFilter::None,
        );
        assert_eq!(ScaleDecision::classify(hd, &audio), ScaleDecision::NotApplicable);
    }

    #[test]
    fn test_scale_decision_labels() {
        assert_eq!(ScaleDecision::Upscale.action_label(), "Convert (Upscale)");
        assert_eq!(ScaleDecision::NoScaling.action_label(), "Convert (No Scaling)");
        assert_eq!(ScaleDecision::Downscale.action_label(), "Convert");
        assert_eq!(ScaleDecision::Upscale.file_tag(), Some("UPSCALED"));
        assert_eq!(ScaleDecision::Downscale.file_tag(), None);
    }
}
