//! Beat-synchronized compositing of lyric frames into the final MP4.

/// Frame scheduling, motion, encode and audio mux.
pub mod compositor;
/// `<output>.json` sidecar.
pub mod metadata;
