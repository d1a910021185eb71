use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{EffectConfig, VideoConfig};
use crate::foundation::error::{ReelError, ReelResult, Stage};

pub const METADATA_VERSION: &str = "2.0";

/// Descriptive sidecar written next to a finished video.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub duration: f64,
    pub fps: u32,
    pub resolution: String,
    pub aspect_ratio: String,
    pub bpm: f64,
    pub effects_applied: Vec<String>,
    pub artist: String,
    pub song: String,
}

impl VideoMetadata {
    pub fn new(
        video: &VideoConfig,
        effects: &EffectConfig,
        duration: f64,
        bpm: f64,
        artist: &str,
        song: &str,
    ) -> Self {
        Self {
            version: METADATA_VERSION.to_owned(),
            created_at: Utc::now(),
            duration,
            fps: video.fps,
            resolution: format!("{}x{}", video.width, video.height),
            aspect_ratio: "9:16".to_owned(),
            bpm,
            effects_applied: effects_applied(effects),
            artist: artist.to_owned(),
            song: song.to_owned(),
        }
    }
}

/// Names of the effects actually active for `effects`.
pub fn effects_applied(effects: &EffectConfig) -> Vec<String> {
    let mut out = Vec::with_capacity(4);
    if effects.sway_amplitude_x != 0.0 || effects.sway_amplitude_y != 0.0 {
        out.push("sway");
    }
    if effects.zoom_max > effects.zoom_min {
        out.push("zoom");
    }
    if !out.is_empty() {
        out.push("beat_sync");
    }
    if effects.fade_duration > 0.0 {
        out.push("fade_out");
    }
    out.into_iter().map(str::to_owned).collect()
}

/// `clip.mp4` -> `clip.mp4.json`.
pub fn sidecar_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Write `meta` as pretty JSON to the sidecar of `output`.
pub fn write_sidecar(output: &Path, meta: &VideoMetadata) -> ReelResult<PathBuf> {
    let path = sidecar_path(output);
    let json = serde_json::to_string_pretty(meta)
        .map_err(|e| ReelError::stage(Stage::Metadata, format!("serialize metadata: {e}")))?;
    std::fs::write(&path, json).map_err(|e| {
        ReelError::stage(
            Stage::Metadata,
            format!("write metadata '{}': {e}", path.display()),
        )
    })?;
    Ok(path)
}

/// Read a sidecar written by [`write_sidecar`].
pub fn read_sidecar(path: &Path) -> ReelResult<VideoMetadata> {
    let bytes = std::fs::read(path)
        .map_err(|e| ReelError::precondition(format!("read '{}': {e}", path.display())))?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/metadata.rs"]
mod tests;
