//! Encoding sinks and the audio mux pass.
//!
//! Sinks consume rendered frames in timeline order. Audio is joined afterwards by [`mux`].

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Video + raw PCM muxing.
pub mod mux;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
