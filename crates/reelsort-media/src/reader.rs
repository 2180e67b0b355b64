//! The media reader's restartable frame iterator (C1).
//!
//! Decodes grayscale (luma) frames via an ffmpeg subprocess piping raw
//! video to stdout, matching the spawn/stream idiom in
//! [`crate::command`]. The returned frames are windowed: callers are
//! expected to drop each [`Frame`](reelsort_core::Frame) once it leaves
//! their sliding window rather than retain the whole decode.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use reelsort_core::{Frame, Video};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::warn;

use crate::error::{MediaError, MediaResult};

/// Decode-size hint, used to keep per-frame memory bounded regardless of
/// source resolution.
#[derive(Debug, Clone, Copy)]
pub struct DecodeSize {
    pub width: u32,
    pub height: u32,
}

impl Default for DecodeSize {
    fn default() -> Self {
        Self { width: 320, height: 180 }
    }
}

/// A restartable sequence of frames decoded from one video.
///
/// `stride = k` yields every k-th frame (frame indices remain the
/// original source indices, not the yielded position). Each call to
/// [`MediaReader::frames`] spawns a fresh decode process, so the sequence
/// can be restarted from frame 0 by more than one detector.
pub struct MediaReader {
    decode_size: DecodeSize,
}

impl Default for MediaReader {
    fn default() -> Self {
        Self::new(DecodeSize::default())
    }
}

impl MediaReader {
    pub fn new(decode_size: DecodeSize) -> Self {
        Self { decode_size }
    }

    /// Probe a file for [`Video`] metadata.
    pub async fn probe(&self, path: impl AsRef<Path>) -> MediaResult<Video> {
        crate::probe::probe_video(path).await
    }

    /// Decode all frames (honoring `stride`) into memory, bounded by the
    /// configured decode size. Truncated input yields whatever decoded
    /// successfully and logs a `TruncatedInput` warning rather than
    /// failing the whole read.
    pub async fn frames(&self, video: &Video, stride: u64) -> MediaResult<Vec<Frame>> {
        let stride = stride.max(1);
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let path = PathBuf::from(&video.path);
        let DecodeSize { width, height } = self.decode_size;
        let frame_bytes = (width as usize) * (height as usize);

        let mut child: Child = Command::new("ffmpeg")
            .args([
                "-v",
                "error",
                "-i",
            ])
            .arg(&path)
            .args([
                "-vf",
                &format!("scale={}:{},format=gray", width, height),
                "-f",
                "rawvideo",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdout = child.stdout.take().expect("stdout not captured");
        let mut buf = vec![0u8; frame_bytes];
        let mut frames = Vec::new();
        let mut index: u64 = 0;

        loop {
            match read_exact_or_partial(&mut stdout, &mut buf).await? {
                ReadOutcome::Full => {
                    if index % stride == 0 {
                        frames.push(Frame::new(index, video.fps, buf.clone(), width, height));
                    }
                    index += 1;
                }
                ReadOutcome::Partial(n) if n > 0 => {
                    warn!(
                        path = %video.path,
                        bytes_read = n,
                        "TruncatedInput: decoded prefix of file, stopping at a partial frame"
                    );
                    break;
                }
                ReadOutcome::Partial(_) => break,
            }
        }

        let status = child.wait().await?;
        if !status.success() && frames.is_empty() {
            let mut stderr_buf = Vec::new();
            if let Some(mut stderr) = child.stderr.take() {
                let _ = stderr.read_to_end(&mut stderr_buf).await;
            }
            return Err(MediaError::ffmpeg_failed(
                "ffmpeg produced no frames",
                Some(String::from_utf8_lossy(&stderr_buf).to_string()),
                status.code(),
            ));
        }

        Ok(frames)
    }
}

enum ReadOutcome {
    Full,
    Partial(usize),
}

async fn read_exact_or_partial(
    stdout: &mut tokio::process::ChildStdout,
    buf: &mut [u8],
) -> MediaResult<ReadOutcome> {
    let mut filled = 0usize;
    while filled < buf.len() {
        let n = stdout.read(&mut buf[filled..]).await?;
        if n == 0 {
            return Ok(ReadOutcome::Partial(filled));
        }
        filled += n;
    }
    Ok(ReadOutcome::Full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_size_default_is_bounded() {
        let d = DecodeSize::default();
        assert!(d.width * d.height <= 320 * 180);
    }
}
