use super::*;

fn click_track(bpm: f64, secs: f64, sample_rate: u32) -> Vec<f32> {
    let len = (secs * f64::from(sample_rate)) as usize;
    let mut out = vec![0.0f32; len];
    let period = 60.0 / bpm * f64::from(sample_rate);
    let burst = (0.03 * f64::from(sample_rate)) as usize;
    let mut beat = 0.0f64;
    while (beat as usize) < len {
        let start = beat as usize;
        for i in 0..burst.min(len - start) {
            let t = i as f32 / sample_rate as f32;
            let env = (-(i as f32) / (burst as f32 / 5.0)).exp();
            out[start + i] += env * (2.0 * PI * 1800.0 * t).sin();
        }
        beat += period;
    }
    out
}

#[test]
fn detects_click_track_tempo() {
    for bpm in [90.0, 120.0, 150.0] {
        let samples = click_track(bpm, 30.0, ANALYSIS_SAMPLE_RATE);
        let est = estimate_bpm(&samples, ANALYSIS_SAMPLE_RATE).unwrap().unwrap();
        assert!((est - bpm).abs() < 3.0, "expected ~{bpm}, got {est}");
    }
}

#[test]
fn silence_has_no_tempo() {
    let samples = vec![0.0f32; ANALYSIS_SAMPLE_RATE as usize * 10];
    assert_eq!(estimate_bpm(&samples, ANALYSIS_SAMPLE_RATE).unwrap(), None);
}

#[test]
fn too_short_signal_has_no_tempo() {
    let samples = click_track(120.0, 1.0, ANALYSIS_SAMPLE_RATE);
    assert_eq!(estimate_bpm(&samples, ANALYSIS_SAMPLE_RATE).unwrap(), None);
}

#[test]
fn envelope_has_one_value_per_hop() {
    let samples = vec![0.0f32; FRAME_LEN + HOP_LEN * 9];
    assert_eq!(onset_envelope(&samples).unwrap().len(), 10);
    assert!(onset_envelope(&samples[..FRAME_LEN - 1]).unwrap().is_empty());
}

#[test]
fn prior_peaks_at_reference_tempo() {
    assert!((tempo_prior(120.0) - 1.0).abs() < 1e-12);
    assert!(tempo_prior(60.0) < tempo_prior(90.0));
    assert!((tempo_prior(60.0) - tempo_prior(240.0)).abs() < 1e-12);
}

#[test]
fn parabolic_refinement_finds_vertex() {
    let d = parabolic_peak(0.5, 1.0, 0.5).unwrap();
    assert!(d.abs() < 1e-12);
    let d = parabolic_peak(0.8, 1.0, 0.4).unwrap();
    assert!(d < 0.0);
    assert!(parabolic_peak(1.0, 1.0, 1.0).is_none());
}
