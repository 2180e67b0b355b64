//! Media probing: ffprobe JSON parsing into a `reelsort_core::Video`.

use std::path::Path;
use std::process::Stdio;

use reelsort_core::Video;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// ffprobe's top-level JSON shape.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Probe a video file for metadata and compute its content checksum.
///
/// Fails with [`MediaError::FileNotFound`] for a missing path and
/// [`MediaError::InvalidVideo`] when no video stream is present. Callers
/// that hit a malformed or truncated file should treat the resulting
/// `UnreadableMedia`/`InvalidVideo` errors as non-fatal at the workflow
/// level (spec: never panic on truncated tails).
pub async fn probe_video(path: impl AsRef<Path>) -> MediaResult<Video> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: "ffprobe failed".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)
        .map_err(|_| MediaError::UnreadableMedia(path.display().to_string()))?;

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::InvalidVideo("no video stream found".to_string()))?;

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let fps = video_stream
        .avg_frame_rate
        .as_ref()
        .or(video_stream.r_frame_rate.as_ref())
        .and_then(|r| parse_frame_rate(r))
        .filter(|f| *f > 0.0)
        .unwrap_or(30.0);

    let byte_len = match probe.format.size.as_ref().and_then(|s| s.parse::<u64>().ok()) {
        Some(size) => size,
        None => tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0),
    };

    let checksum = checksum_file(path).await?;

    Ok(Video {
        path: path.display().to_string(),
        byte_len,
        duration_seconds: duration,
        fps,
        width: video_stream.width.unwrap_or(0),
        height: video_stream.height.unwrap_or(0),
        checksum,
    })
}

/// Compute a SHA-256 content checksum, streamed in bounded chunks so large
/// files don't require loading the whole file into memory.
pub async fn checksum_file(path: impl AsRef<Path>) -> MediaResult<String> {
    let mut file = tokio::fs::File::open(path.as_ref()).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 1 << 20];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Parse an ffprobe frame rate string (e.g. `"30/1"` or `"29.97"`).
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_frame_rate_handles_fraction_and_decimal() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("30/0"), None);
    }

    #[tokio::test]
    async fn probe_missing_file_returns_file_not_found() {
        let err = probe_video("/nonexistent/path/does-not-exist.mp4").await.unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
