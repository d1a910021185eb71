//! Audio decoding, duration fitting and tempo analysis.

/// Loop/trim PCM to an exact duration and apply the closing fade.
pub mod fit;
/// `ffmpeg`/`ffprobe` decoding helpers.
pub mod media;
/// Beat tempo estimation.
pub mod tempo;
