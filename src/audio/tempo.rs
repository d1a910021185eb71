//! Global tempo from spectral-flux onset strength and a tempo-weighted autocorrelation.

use std::f32::consts::PI;
use std::path::Path;

use realfft::RealFftPlanner;

use crate::audio::media::decode_audio_f32;
use crate::foundation::error::{ReelError, ReelResult};

/// Rate the analysed signal is decoded at.
pub const ANALYSIS_SAMPLE_RATE: u32 = 22_050;

const FRAME_LEN: usize = 1024;
const HOP_LEN: usize = 256;
const MIN_BPM: f64 = 60.0;
const MAX_BPM: f64 = 200.0;
const PRIOR_BPM: f64 = 120.0;
/// Width of the log-normal tempo prior, in octaves.
const PRIOR_OCTAVES: f64 = 1.0;

/// Decode the first `window_secs` of `path` as mono and estimate its tempo.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn estimate_tempo(path: &Path, window_secs: f64) -> ReelResult<Option<f64>> {
    let pcm = decode_audio_f32(path, ANALYSIS_SAMPLE_RATE, 1, Some(window_secs))?;
    let bpm = estimate_bpm(&pcm.interleaved_f32, pcm.sample_rate)?;
    match bpm {
        Some(bpm) => tracing::info!(bpm, "estimated tempo"),
        None => tracing::warn!("no periodic onsets found, tempo unavailable"),
    }
    Ok(bpm)
}

/// Tempo of a mono signal, or `None` when it is too short or has no onsets.
pub fn estimate_bpm(samples: &[f32], sample_rate: u32) -> ReelResult<Option<f64>> {
    if sample_rate == 0 {
        return Err(ReelError::validation("sample_rate must be > 0"));
    }
    let envelope = onset_envelope(samples)?;
    let frame_rate = f64::from(sample_rate) / HOP_LEN as f64;
    Ok(tempo_from_envelope(&envelope, frame_rate))
}

/// Half-wave rectified log-magnitude spectral flux, one value per hop, lightly smoothed.
pub fn onset_envelope(samples: &[f32]) -> ReelResult<Vec<f32>> {
    if samples.len() < FRAME_LEN {
        return Ok(Vec::new());
    }

    let mut planner = RealFftPlanner::<f32>::new();
    let plan = planner.plan_fft_forward(FRAME_LEN);
    let mut input = plan.make_input_vec();
    let mut spectrum = plan.make_output_vec();
    let mut scratch = plan.make_scratch_vec();
    let window: Vec<f32> = (0..FRAME_LEN).map(|i| hann_value(i, FRAME_LEN)).collect();

    let frames = (samples.len() - FRAME_LEN) / HOP_LEN + 1;
    let mut prev = vec![0.0f32; spectrum.len()];
    let mut flux = Vec::with_capacity(frames);

    for k in 0..frames {
        let start = k * HOP_LEN;
        for (i, slot) in input.iter_mut().enumerate() {
            *slot = samples[start + i] * window[i];
        }
        plan.process_with_scratch(&mut input, &mut spectrum, &mut scratch)
            .map_err(|e| ReelError::validation(format!("fft failed: {e}")))?;

        let mut sum = 0.0f32;
        for (bin, last) in spectrum.iter().zip(prev.iter_mut()) {
            let mag = (1.0 + 1000.0 * bin.norm()).ln();
            if k > 0 {
                sum += (mag - *last).max(0.0);
            }
            *last = mag;
        }
        flux.push(sum);
    }

    Ok(smooth3(&flux))
}

/// Strongest periodicity in `envelope` between 60 and 200 bpm.
pub fn tempo_from_envelope(envelope: &[f32], frame_rate: f64) -> Option<f64> {
    let min_lag = (60.0 * frame_rate / MAX_BPM).floor().max(1.0) as usize;
    let max_lag = (60.0 * frame_rate / MIN_BPM).ceil() as usize;
    if envelope.len() < max_lag * 2 + 2 {
        return None;
    }

    let mean = envelope.iter().map(|&v| f64::from(v)).sum::<f64>() / envelope.len() as f64;
    let centred: Vec<f64> = envelope.iter().map(|&v| f64::from(v) - mean).collect();
    let energy: f64 = centred.iter().map(|v| v * v).sum();
    if energy <= f64::EPSILON {
        return None;
    }

    let ac = |lag: usize| -> f64 {
        centred
            .iter()
            .zip(&centred[lag..])
            .map(|(a, b)| a * b)
            .sum::<f64>()
            / energy
    };
    let acs: Vec<f64> = (0..=max_lag + 1).map(|lag| if lag == 0 { 1.0 } else { ac(lag) }).collect();

    let mut best: Option<(usize, f64)> = None;
    for lag in min_lag..=max_lag {
        let bpm = 60.0 * frame_rate / lag as f64;
        let score = acs[lag] * tempo_prior(bpm);
        if score > 0.0 && best.is_none_or(|(_, s)| score > s) {
            best = Some((lag, score));
        }
    }
    let (lag, _) = best?;

    let refined = parabolic_peak(acs[lag - 1], acs[lag], acs[lag + 1])
        .map(|delta| lag as f64 + delta)
        .unwrap_or(lag as f64);
    let bpm = 60.0 * frame_rate / refined;
    (bpm.is_finite() && bpm > 0.0).then_some(bpm)
}

fn tempo_prior(bpm: f64) -> f64 {
    let octaves = (bpm / PRIOR_BPM).log2() / PRIOR_OCTAVES;
    (-0.5 * octaves * octaves).exp()
}

/// Vertex offset in `[-0.5, 0.5]` of the parabola through three samples around a peak.
fn parabolic_peak(left: f64, centre: f64, right: f64) -> Option<f64> {
    let denom = left - 2.0 * centre + right;
    if denom.abs() <= f64::EPSILON {
        return None;
    }
    let delta = 0.5 * (left - right) / denom;
    (delta.abs() <= 0.5).then_some(delta)
}

fn smooth3(v: &[f32]) -> Vec<f32> {
    (0..v.len())
        .map(|i| {
            let l = if i > 0 { v[i - 1] } else { v[i] };
            let r = v.get(i + 1).copied().unwrap_or(v[i]);
            0.25 * l + 0.5 * v[i] + 0.25 * r
        })
        .collect()
}

fn hann_value(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }

    0.5 - 0.5 * ((2.0 * PI * index as f32) / (len as f32 - 1.0)).cos()
}

#[cfg(test)]
#[path = "../../tests/unit/audio/tempo.rs"]
mod tests;
