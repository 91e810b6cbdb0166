//! FFprobe adapter for media file probing
//!
//! Shells out to `ffprobe -v error -print_format json -show_format -show_streams`
//! and maps the JSON output into a [`MediaDescriptor`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::adapters::tool_locator::{Tool, ToolLocator};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// FFprobe-based probe adapter
#[derive(Debug, Clone)]
pub struct FFprobeAdapter {
    locator: ToolLocator,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(locator: ToolLocator) -> Self {
        Self { locator }
    }

    async fn run_ffprobe(&self, ffprobe: &Path, path: &Path) -> Result<FfprobeOutput, ProbeError> {
        let output = Command::new(ffprobe)
            .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| unreadable(path, format!("failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr.trim();
            return Err(unreadable(
                path,
                if reason.is_empty() {
                    format!("ffprobe exited with {}", output.status)
                } else {
                    reason.to_string()
                },
            ));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| unreadable(path, format!("ffprobe JSON parse error: {}", e)))
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe(&self, path: &Path) -> Result<MediaDescriptor, ProbeError> {
        let is_file = tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        // Existing but unopenable files count as missing too
        if !is_file || tokio::fs::File::open(path).await.is_err() {
            return Err(ProbeError::NotFound {
                path: path.display().to_string(),
            });
        }

        let ffprobe = self
            .locator
            .locate(Tool::Ffprobe)
            .ok_or_else(|| unreadable(path, "ffprobe executable not found".to_string()))?;

        debug!("Probing {} with {}", path.display(), ffprobe.display());
        let output = self.run_ffprobe(&ffprobe, path).await?;
        let descriptor = descriptor_from_probe(path, output)?;

        info!(
            "Probed {}: {} {}x{}",
            path.display(),
            descriptor.container,
            descriptor.width,
            descriptor.height
        );
        Ok(descriptor)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<i64>,
    height: Option<i64>,
}

/// Map parsed ffprobe output onto a descriptor for `path`
pub(crate) fn descriptor_from_probe(path: &Path, output: FfprobeOutput) -> Result<MediaDescriptor, ProbeError> {
    if output.streams.is_empty() {
        return Err(unreadable(path, "no media streams found".to_string()));
    }

    let format = output
        .format
        .ok_or_else(|| unreadable(path, "no container information reported".to_string()))?;
    let format_name = format.format_name.unwrap_or_default();
    let container = resolve_container(&format_name, ContainerFormat::from_path(path)).ok_or_else(|| {
        unreadable(path, format!("unsupported container '{}'", format_name))
    })?;

    let video = output
        .streams
        .iter()
        .find(|stream| stream.codec_type.as_deref() == Some("video"));

    // Cover art shows up as a video stream in audio files; ignore it
    let mut descriptor = match video {
        Some(stream) if container.is_video() => MediaDescriptor::new(
            PathBuf::from(path),
            stream.width.unwrap_or(0),
            stream.height.unwrap_or(0),
            container,
        ),
        _ => MediaDescriptor::audio_only(PathBuf::from(path), container),
    };
    if let Some(duration) = format
        .duration
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
    {
        descriptor = descriptor.with_duration(duration);
    }
    Ok(descriptor)
}

/// Pick the container out of ffprobe's comma-separated `format_name`.
///
/// Demuxer names are shared (`mov,mp4,m4a,...`, `matroska,webm`), so the
/// file extension decides when it is among the candidates.
fn resolve_container(format_name: &str, by_extension: Option<ContainerFormat>) -> Option<ContainerFormat> {
    let candidates: Vec<ContainerFormat> = format_name
        .split(',')
        .filter_map(|token| match token.trim() {
            "mov" => Some(ContainerFormat::Mov),
            "mp4" | "m4v" => Some(ContainerFormat::Mp4),
            "matroska" => Some(ContainerFormat::Mkv),
            "webm" => Some(ContainerFormat::Webm),
            "avi" => Some(ContainerFormat::Avi),
            "mp3" => Some(ContainerFormat::Mp3),
            "wav" => Some(ContainerFormat::Wav),
            "aiff" => Some(ContainerFormat::Aiff),
            "flac" => Some(ContainerFormat::Flac),
            _ => None,
        })
        .collect();

    match by_extension {
        Some(format) if candidates.contains(&format) => Some(format),
        _ => candidates.first().copied(),
    }
}

fn unreadable(path: &Path, reason: String) -> ProbeError {
    ProbeError::Unreadable {
        path: path.display().to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> FfprobeOutput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_video_descriptor() {
        let output = parse(
            r#"{
                "streams": [
                    {"codec_type": "audio"},
                    {"codec_type": "video", "width": 1280, "height": 720}
                ],
                "format": {"format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "12.480000"}
            }"#,
        );
        let descriptor = descriptor_from_probe(Path::new("clip.mp4"), output).unwrap();
        assert_eq!(descriptor.container, ContainerFormat::Mp4);
        assert_eq!(descriptor.dimensions(), Dimensions::new(1280, 720));
        assert_eq!(descriptor.duration, Some(12.48));
    }

    #[test]
    fn test_extension_disambiguates_shared_demuxer() {
        let json = r#"{
            "streams": [{"codec_type": "video", "width": 1920, "height": 1080}],
            "format": {"format_name": "matroska,webm"}
        }"#;
        let webm = descriptor_from_probe(Path::new("a.webm"), parse(json)).unwrap();
        assert_eq!(webm.container, ContainerFormat::Webm);
        let mkv = descriptor_from_probe(Path::new("a.mkv"), parse(json)).unwrap();
        assert_eq!(mkv.container, ContainerFormat::Mkv);
        // Misnamed file falls back to the first demuxer name
        let odd = descriptor_from_probe(Path::new("a.bin"), parse(json)).unwrap();
        assert_eq!(odd.container, ContainerFormat::Mkv);
    }

    #[test]
    fn test_audio_container_ignores_cover_art() {
        let output = parse(
            r#"{
                "streams": [
                    {"codec_type": "audio"},
                    {"codec_type": "video", "width": 600, "height": 600}
                ],
                "format": {"format_name": "mp3"}
            }"#,
        );
        let descriptor = descriptor_from_probe(Path::new("song.mp3"), output).unwrap();
        assert_eq!(descriptor.container, ContainerFormat::Mp3);
        assert_eq!(descriptor.dimensions(), Dimensions::new(0, 0));
    }

    #[test]
    fn test_audio_only_video_container_reports_zero_size() {
        let output = parse(
            r#"{"streams": [{"codec_type": "audio"}], "format": {"format_name": "mov,mp4,m4a"}}"#,
        );
        let descriptor = descriptor_from_probe(Path::new("voice.mp4"), output).unwrap();
        assert_eq!(descriptor.width, 0);
        assert_eq!(descriptor.height, 0);
        assert!(!descriptor.has_video);
    }

    #[test]
    fn test_audio_only_webm_plans_to_mp3() {
        let output = parse(
            r#"{
                "streams": [{"codec_type": "audio", "codec_name": "opus"}],
                "format": {"format_name": "matroska,webm", "duration": "215.4"}
            }"#,
        );
        let descriptor = descriptor_from_probe(Path::new("download.webm"), output).unwrap();
        assert_eq!(descriptor.container, ContainerFormat::Webm);
        assert!(!descriptor.has_video);

        let directive = crate::planner::plan(&descriptor, ResolutionTarget::FullHd, ContainerFormat::Mp3).unwrap();
        assert_eq!(directive.target, None);
        assert_eq!(directive.output_format, ContainerFormat::Mp3);
    }

    #[test]
    fn test_video_stream_without_size_is_kept_as_video() {
        let output = parse(
            r#"{"streams": [{"codec_type": "video"}], "format": {"format_name": "avi"}}"#,
        );
        let descriptor = descriptor_from_probe(Path::new("broken.avi"), output).unwrap();
        assert!(descriptor.has_video);
        assert_eq!(descriptor.dimensions(), Dimensions::new(0, 0));
    }

    #[test]
    fn test_unreadable_outputs() {
        let empty = parse(r#"{"streams": [], "format": {"format_name": "mp3"}}"#);
        assert!(matches!(
            descriptor_from_probe(Path::new("x.mp3"), empty),
            Err(ProbeError::Unreadable { .. })
        ));

        let unknown = parse(r#"{"streams": [{"codec_type": "video"}], "format": {"format_name": "gif"}}"#);
        assert!(matches!(
            descriptor_from_probe(Path::new("x.gif"), unknown),
            Err(ProbeError::Unreadable { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let adapter = FFprobeAdapter::new(ToolLocator::default());
        let result = adapter.probe(Path::new("/definitely/not/here.mp4")).await;
        assert!(matches!(result, Err(ProbeError::NotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unopenable_file_is_not_found() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked.mp4");
        std::fs::write(&locked, b"video").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can open it regardless of the mode
        if std::fs::File::open(&locked).is_ok() {
            return;
        }

        let adapter = FFprobeAdapter::new(ToolLocator::default());
        let result = adapter.probe(&locked).await;
        assert!(matches!(result, Err(ProbeError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FFprobeAdapter::new(ToolLocator::default());
        let result = adapter.probe(dir.path()).await;
        assert!(matches!(result, Err(ProbeError::NotFound { .. })));
    }
}
