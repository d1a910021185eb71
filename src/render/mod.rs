//! CPU rasterization.

/// Frame buffer type exchanged with sinks.
pub mod backend;
pub(crate) mod cpu;
/// Lyric and title frame rendering.
pub mod lyric;
