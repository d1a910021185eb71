use std::path::Path;
use std::process::Command;

use crate::encode::ffmpeg::{ensure_parent_dir, is_ffmpeg_on_path};
use crate::foundation::error::{ReelError, ReelResult, Stage};

/// Raw interleaved `f32le` PCM file description.
#[derive(Clone, Copy, Debug)]
pub struct PcmInput<'a> {
    pub path: &'a Path,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Join an encoded silent video with raw PCM into `out_path`.
///
/// The video stream is copied; audio is encoded with `audio_codec`. Output is cut at
/// `duration_secs`.
#[tracing::instrument(skip_all, fields(out = %out_path.display(), duration = duration_secs))]
pub fn mux_video_with_pcm(
    video: &Path,
    pcm: PcmInput<'_>,
    audio_codec: &str,
    duration_secs: f64,
    out_path: &Path,
) -> ReelResult<()> {
    if pcm.sample_rate == 0 || pcm.channels == 0 {
        return Err(ReelError::validation(
            "audio sample_rate and channels must be non-zero",
        ));
    }
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(ReelError::validation("mux duration must be > 0"));
    }
    if !is_ffmpeg_on_path() {
        return Err(ReelError::precondition(
            "ffmpeg is required for muxing, but was not found on PATH",
        ));
    }
    ensure_parent_dir(out_path)?;

    let out = Command::new("ffmpeg")
        .args(["-y", "-loglevel", "error", "-i"])
        .arg(video)
        .args([
            "-f",
            "f32le",
            "-ar",
            &pcm.sample_rate.to_string(),
            "-ac",
            &pcm.channels.to_string(),
            "-i",
        ])
        .arg(pcm.path)
        .args([
            "-map",
            "0:v:0",
            "-map",
            "1:a:0",
            "-c:v",
            "copy",
            "-c:a",
            audio_codec,
            "-t",
            &format!("{duration_secs:.6}"),
            "-movflags",
            "+faststart",
        ])
        .arg(out_path)
        .output()
        .map_err(|e| ReelError::stage(Stage::Mux, format!("failed to run ffmpeg: {e}")))?;

    if !out.status.success() {
        return Err(ReelError::stage(
            Stage::Mux,
            format!(
                "ffmpeg exited with status {}: {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }
    Ok(())
}
