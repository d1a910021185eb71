use std::path::PathBuf;

use super::*;

#[test]
fn f32le_round_trips_through_file() {
    let path = PathBuf::from("target").join("unit-audio").join("rt.f32le");
    let samples = vec![0.0f32, -1.0, 0.5, 0.25];
    write_f32le_file(&samples, &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 16);
    assert_eq!(f32le_bytes_to_samples(&bytes).unwrap(), samples);
}

#[test]
fn misaligned_bytes_are_rejected() {
    assert!(f32le_bytes_to_samples(&[0, 0, 0]).is_err());
}

#[test]
fn pcm_frames_and_duration() {
    let pcm = AudioPcm {
        sample_rate: 4,
        channels: 2,
        interleaved_f32: vec![0.0; 16],
    };
    assert_eq!(pcm.frames(), 8);
    assert_eq!(pcm.duration_secs(), 2.0);
}

#[test]
fn decoding_missing_file_is_precondition_error() {
    let err = decode_audio_f32_stereo(&PathBuf::from("target/unit-audio/missing.m4a"), 48_000)
        .unwrap_err();
    assert!(matches!(err, ReelError::Precondition(_)));
}
