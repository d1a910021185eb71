use crate::audio::media::AudioPcm;
use crate::effects::motion::fade_out_gain;
use crate::foundation::error::{ReelError, ReelResult};

/// Number of sample frames covering exactly `duration_secs`.
pub fn target_frames(duration_secs: f64, sample_rate: u32) -> u64 {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return 0;
    }
    (duration_secs * f64::from(sample_rate)).round() as u64
}

/// Loop `pcm` end-to-end as often as needed, then trim to exactly `duration_secs`.
///
/// Empty input yields silence of the requested length.
pub fn fit_to_duration(pcm: &AudioPcm, duration_secs: f64) -> ReelResult<Vec<f32>> {
    if pcm.channels == 0 || pcm.sample_rate == 0 {
        return Err(ReelError::validation(
            "pcm sample_rate and channels must be non-zero",
        ));
    }
    let channels = usize::from(pcm.channels);
    let frames = target_frames(duration_secs, pcm.sample_rate) as usize;
    let src = &pcm.interleaved_f32[..pcm.frames() * channels];
    if src.is_empty() {
        tracing::warn!("source audio is empty, muxing silence");
        return Ok(vec![0.0; frames * channels]);
    }

    let mut out = Vec::with_capacity(frames * channels);
    while out.len() < frames * channels {
        let take = (frames * channels - out.len()).min(src.len());
        out.extend_from_slice(&src[..take]);
    }
    Ok(out)
}

/// Linear fade-out over the last `fade_secs`, reaching zero at the end of the buffer.
pub fn apply_fade_out(samples: &mut [f32], channels: u16, sample_rate: u32, fade_secs: f64) {
    if channels == 0 || sample_rate == 0 || fade_secs <= 0.0 {
        return;
    }
    let channels = usize::from(channels);
    let frames = samples.len() / channels;
    let duration = frames as f64 / f64::from(sample_rate);
    let fade_frames = target_frames(fade_secs, sample_rate) as usize;
    let first = frames.saturating_sub(fade_frames);

    for (i, frame) in samples
        .chunks_exact_mut(channels)
        .enumerate()
        .skip(first)
    {
        let t = (i + 1) as f64 / f64::from(sample_rate);
        let gain = fade_out_gain(t, duration, fade_secs);
        for s in frame {
            *s *= gain;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/fit.rs"]
mod tests;
