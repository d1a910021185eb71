use std::path::Path;
use std::process::Command;

use crate::foundation::error::{ReelError, ReelResult};

/// Sample rate used for the muxed soundtrack.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Interleaved `f32` PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.interleaved_f32.len() / usize::from(self.channels)
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f64 / f64::from(self.sample_rate)
        }
    }
}

/// Decode any `ffmpeg`-readable audio to interleaved `f32`, optionally only the first `max_secs`.
pub fn decode_audio_f32(
    path: &Path,
    sample_rate: u32,
    channels: u16,
    max_secs: Option<f64>,
) -> ReelResult<AudioPcm> {
    if sample_rate == 0 || channels == 0 {
        return Err(ReelError::validation(
            "decode sample_rate and channels must be non-zero",
        ));
    }
    if !path.is_file() {
        return Err(ReelError::precondition(format!(
            "audio file '{}' does not exist",
            path.display()
        )));
    }

    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-v", "error", "-i"]).arg(path);
    if let Some(secs) = max_secs {
        cmd.args(["-t", &format!("{secs:.3}")]);
    }
    let out = cmd
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            &channels.to_string(),
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| ReelError::adapter("ffmpeg", format!("failed to run ffmpeg: {e}")))?;

    if !out.status.success() {
        return Err(ReelError::adapter(
            "ffmpeg",
            format!(
                "audio decode failed for '{}': {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }

    Ok(AudioPcm {
        sample_rate,
        channels,
        interleaved_f32: f32le_bytes_to_samples(&out.stdout)?,
    })
}

/// Stereo decode at `sample_rate`, as used for muxing.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> ReelResult<AudioPcm> {
    decode_audio_f32(path, sample_rate, 2, None)
}

/// Container duration reported by `ffprobe`.
pub fn probe_duration(path: &Path) -> ReelResult<f64> {
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        format: Option<ProbeFormat>,
    }

    let out = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .map_err(|e| ReelError::adapter("ffprobe", format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::adapter(
            "ffprobe",
            format!(
                "probe failed for '{}': {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)?;
    parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| ReelError::adapter("ffprobe", "no usable duration in probe output"))
}

fn f32le_bytes_to_samples(bytes: &[u8]) -> ReelResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub fn write_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> ReelResult<()> {
    use anyhow::Context as _;
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("failed to create audio output directory '{}'", parent.display())
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes)
        .with_context(|| format!("failed to write audio file '{}'", out_path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/media.rs"]
mod tests;
