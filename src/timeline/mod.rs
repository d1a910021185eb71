//! Source timeline: which image is on screen when.

/// Frame ordering and image-folder discovery.
pub mod frames;
/// Timestamp-to-segment scheduling.
pub mod schedule;
