// Unit tests for domain models

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::domain::errors::*;
    use crate::domain::model::*;

    #[test]
    fn test_canonical_resolution_table() {
        assert_eq!(ResolutionTarget::FullHd.dimensions(), Dimensions::new(1920, 1080));
        assert_eq!(ResolutionTarget::QuadHd.dimensions(), Dimensions::new(2560, 1440));
        assert_eq!(ResolutionTarget::UltraHd.dimensions(), Dimensions::new(3840, 2160));
    }

    #[test]
    fn test_resolution_target_parse() {
        assert_eq!("1080p".parse::<ResolutionTarget>().unwrap(), ResolutionTarget::FullHd);
        assert_eq!("1080".parse::<ResolutionTarget>().unwrap(), ResolutionTarget::FullHd);
        assert_eq!("2K".parse::<ResolutionTarget>().unwrap(), ResolutionTarget::QuadHd);
        assert_eq!("1440p".parse::<ResolutionTarget>().unwrap(), ResolutionTarget::QuadHd);
        assert_eq!("4k".parse::<ResolutionTarget>().unwrap(), ResolutionTarget::UltraHd);
        assert!("720p".parse::<ResolutionTarget>().is_err());
    }

    #[test]
    fn test_container_format_parse() {
        assert_eq!("MP4".parse::<ContainerFormat>().unwrap(), ContainerFormat::Mp4);
        assert_eq!(".mkv".parse::<ContainerFormat>().unwrap(), ContainerFormat::Mkv);
        assert_eq!("aif".parse::<ContainerFormat>().unwrap(), ContainerFormat::Aiff);
        assert!(matches!(
            "ogg".parse::<ContainerFormat>(),
            Err(DomainError::BadArgs(_))
        ));
    }

    #[test]
    fn test_container_format_kinds() {
        let video: Vec<_> = ContainerFormat::ALL.iter().filter(|f| f.is_video()).collect();
        let audio: Vec<_> = ContainerFormat::ALL.iter().filter(|f| f.is_audio()).collect();
        assert_eq!(video.len(), 5);
        assert_eq!(audio.len(), 4);
    }

    #[test]
    fn test_container_format_from_path() {
        assert_eq!(
            ContainerFormat::from_path(Path::new("/tmp/clip.MOV")),
            Some(ContainerFormat::Mov)
        );
        assert_eq!(ContainerFormat::from_path(Path::new("/tmp/notes.txt")), None);
        assert_eq!(ContainerFormat::from_path(Path::new("/tmp/no_extension")), None);
    }

    #[test]
    fn test_dimensions_validity() {
        assert!(Dimensions::new(1920, 1080).is_valid());
        assert!(!Dimensions::new(0, 1080).is_valid());
        assert!(!Dimensions::new(1920, -1).is_valid());
        assert_eq!(Dimensions::new(1280, 720).area(), 921_600);
    }

    #[test]
    fn test_area_of_absurd_dimensions_does_not_overflow() {
        let huge = Dimensions::new(4_000_000_000, 4_000_000_000);
        assert_eq!(huge.area(), 16_000_000_000_000_000_000);
        assert!(huge.area() > Dimensions::new(3840, 2160).area());
    }

    #[test]
    fn test_audio_only_descriptor() {
        let song = MediaDescriptor::audio_only("song.webm", ContainerFormat::Webm);
        assert!(!song.has_video);
        assert_eq!(song.dimensions(), Dimensions::new(0, 0));
        assert!(MediaDescriptor::new("clip.webm", 1280, 720, ContainerFormat::Webm).has_video);
        assert!(!MediaDescriptor::new("song.flac", 0, 0, ContainerFormat::Flac).has_video);
    }

    #[test]
    fn test_audio_bitrate_conversion() {
        assert_eq!(AudioBitrate::try_from(256).unwrap(), AudioBitrate::Kbps256);
        assert!(AudioBitrate::try_from(192).is_err());
        assert_eq!(AudioBitrate::default().kbps(), 320);
    }

    #[test]
    fn test_video_request_requires_resolution() {
        let result = ConversionRequest::new(ContainerFormat::Mp4, None, AudioBitrate::default());
        assert!(matches!(result, Err(DomainError::BadArgs(_))));
    }

    #[test]
    fn test_audio_request_drops_resolution() {
        let request = ConversionRequest::new(
            ContainerFormat::Flac,
            Some(ResolutionTarget::UltraHd),
            AudioBitrate::default(),
        )
        .unwrap();
        assert_eq!(request.resolution, None);
        assert!(ConversionRequest::audio(ContainerFormat::Mkv, AudioBitrate::Kbps128).is_err());
    }

    #[test]
    fn test_stream_copy_directive_has_no_filter() {
        let directive = ConversionDirective::stream_copy(
            ContainerFormat::Mp4,
            ContainerFormat::Mov,
            Some(Dimensions::new(1920, 1080)),
        );
        assert!(directive.is_stream_copy());
        assert_eq!(directive.scaling_filter, None);
    }

    #[test]
    fn test_directive_display() {
        let directive = ConversionDirective::re_encode(
            ContainerFormat::Mp4,
            ContainerFormat::Mp4,
            Some(Dimensions::new(1920, 1080)),
            ScalingFilter::Lanczos,
        );
        assert_eq!(directive.to_string(), "re-encode MP4 -> MP4 at 1920x1080 (lanczos)");
    }

    #[test]
    fn test_directive_serializes_to_json() {
        let directive = ConversionDirective::re_encode(
            ContainerFormat::Mkv,
            ContainerFormat::Mp3,
            None,
            ScalingFilter::None,
        )
        .with_audio_bitrate(AudioBitrate::Kbps128);
        let json = serde_json::to_value(&directive).unwrap();
        assert_eq!(json["mode"], "re_encode");
        assert_eq!(json["output_format"], "mp3");
        assert_eq!(json["audio_bitrate"], 128);
    }
}
