#![forbid(unsafe_code)]

//! Beat-synchronized vertical lyric videos.
//!
//! A run picks a track from a Deezer playlist, fetches synced lyrics and audio, renders one
//! frame per lyric line, composes them over the background with beat-locked motion, muxes the
//! looped or trimmed audio and optionally posts the result to TikTok.

pub mod acquire;
pub(crate) mod assets;
pub mod audio;
pub mod catalog;
pub mod compose;
pub mod config;
pub mod effects;
pub mod encode;
pub(crate) mod foundation;
pub mod lyrics;
pub mod model;
pub mod pipeline;
pub mod publish;
pub mod render;
pub mod timeline;

pub use compose::compositor::{ComposeJob, ComposeReport, Compositor, RenderStats};
pub use config::AppConfig;
pub use foundation::core::{Affine, Canvas, Fps, FrameIndex, FrameRange, Vec2};
pub use foundation::error::{ReelError, ReelResult, Stage};
pub use model::{LyricLine, RenderedFrame, TrackInfo};
pub use pipeline::{Pipeline, RunOutcome};
