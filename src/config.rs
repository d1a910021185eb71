//! Run configuration.
//!
//! Every field has a default so a partial `lyricreel.json` (or none at all) is valid. Adapters
//! receive the sub-config they need through their constructors; nothing below this module reads
//! the environment.

use std::path::{Path, PathBuf};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};

/// Tempo used whenever estimation is unavailable or produced a non-usable value.
pub const DEFAULT_BPM: f64 = 120.0;

/// Encode quality tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// 1500k, `ultrafast`.
    Low,
    /// 3000k, `medium`.
    #[default]
    Medium,
    /// 6000k, `slow`.
    High,
    /// 10000k, `veryslow`.
    Ultra,
}

impl Quality {
    /// Video bitrate passed to the encoder.
    pub fn bitrate(self) -> &'static str {
        match self {
            Self::Low => "1500k",
            Self::Medium => "3000k",
            Self::High => "6000k",
            Self::Ultra => "10000k",
        }
    }

    /// x264 preset passed to the encoder.
    pub fn preset(self) -> &'static str {
        match self {
            Self::Low => "ultrafast",
            Self::Medium => "medium",
            Self::High => "slow",
            Self::Ultra => "veryslow",
        }
    }
}

/// Output video parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    /// Hard ceiling on output duration.
    pub max_duration_secs: f64,
    /// Duration given to the final frame, which has no successor timestamp.
    pub default_last_segment_secs: f64,
    pub video_codec: String,
    pub audio_codec: String,
    pub quality: Quality,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            width: 1080,
            height: 1920,
            max_duration_secs: 60.0,
            default_last_segment_secs: 4.0,
            video_codec: "libx264".to_owned(),
            audio_codec: "aac".to_owned(),
            quality: Quality::Medium,
        }
    }
}

impl VideoConfig {
    pub fn validate(&self) -> ReelResult<()> {
        Fps::new(self.fps)?;
        Canvas::portrait(self.width, self.height)?;
        if !self.max_duration_secs.is_finite() || self.max_duration_secs <= 0.0 {
            return Err(ReelError::validation("max_duration_secs must be > 0"));
        }
        if !self.default_last_segment_secs.is_finite() || self.default_last_segment_secs <= 0.0 {
            return Err(ReelError::validation(
                "default_last_segment_secs must be > 0",
            ));
        }
        if self.video_codec.trim().is_empty() || self.audio_codec.trim().is_empty() {
            return Err(ReelError::validation("codec names must be non-empty"));
        }
        Ok(())
    }

    pub fn fps(&self) -> ReelResult<Fps> {
        Fps::new(self.fps)
    }

    pub fn canvas(&self) -> ReelResult<Canvas> {
        Canvas::portrait(self.width, self.height)
    }
}

/// Beat-reactive motion parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub sway_amplitude_x: f64,
    pub sway_amplitude_y: f64,
    /// Beats per sway cycle.
    pub sway_speed: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Attack slope of the zoom pulse, per second of phase.
    pub zoom_sharpness: f64,
    /// Release slope of the zoom pulse, in beats.
    pub zoom_decay_rate: f64,
    /// Length of the closing fade-out, in seconds.
    pub fade_duration: f64,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            sway_amplitude_x: 3.0,
            sway_amplitude_y: 5.0,
            sway_speed: 4.0,
            zoom_min: 1.0,
            zoom_max: 1.02,
            zoom_sharpness: 8.0,
            zoom_decay_rate: 3.0,
            fade_duration: 2.0,
        }
    }
}

impl EffectConfig {
    pub fn validate(&self) -> ReelResult<()> {
        let finite = [
            self.sway_amplitude_x,
            self.sway_amplitude_y,
            self.sway_speed,
            self.zoom_min,
            self.zoom_max,
            self.zoom_sharpness,
            self.zoom_decay_rate,
            self.fade_duration,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ReelError::validation("effect parameters must be finite"));
        }
        if self.sway_amplitude_x < 0.0 || self.sway_amplitude_y < 0.0 {
            return Err(ReelError::validation("sway amplitudes must be >= 0"));
        }
        if self.sway_speed <= 0.0 {
            return Err(ReelError::validation("sway_speed must be > 0"));
        }
        if self.zoom_min <= 0.0 {
            return Err(ReelError::validation("zoom_min must be > 0"));
        }
        if self.zoom_min > self.zoom_max {
            return Err(ReelError::validation("zoom_min must be <= zoom_max"));
        }
        if self.zoom_sharpness < 0.0 || self.zoom_decay_rate < 0.0 {
            return Err(ReelError::validation(
                "zoom_sharpness and zoom_decay_rate must be >= 0",
            ));
        }
        if self.fade_duration < 0.0 {
            return Err(ReelError::validation("fade_duration must be >= 0"));
        }
        Ok(())
    }
}

/// Lyrics provider strategy, tried in configured order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LyricsProviderKind {
    /// Musixmatch richsync, then subtitle (LRC). Needs an API key.
    Musixmatch,
    /// LRCLib synced lyrics.
    Lrclib,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    pub providers: Vec<LyricsProviderKind>,
    pub musixmatch_api_key: Option<String>,
    pub musixmatch_api_base: String,
    pub lrclib_api_base: String,
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            providers: vec![LyricsProviderKind::Musixmatch, LyricsProviderKind::Lrclib],
            musixmatch_api_key: None,
            musixmatch_api_base: "https://api.musixmatch.com/ws/1.1".to_owned(),
            lrclib_api_base: "https://lrclib.net/api".to_owned(),
        }
    }
}

/// Strategy for turning a search query into a media URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    /// YouTube Data API v3 search. Needs an API key.
    YoutubeApi,
    /// Scrape the public results page.
    YoutubeScrape,
    /// `yt-dlp ytsearch1:` with query variations.
    YtDlpSearch,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub resolvers: Vec<ResolverKind>,
    pub youtube_api_key: Option<String>,
    pub ytdlp_path: PathBuf,
    pub cookies_file: Option<PathBuf>,
    pub cookies_from_browser: Option<String>,
    pub user_agent: String,
    pub limit_rate: Option<String>,
    /// Estimate tempo from the downloaded audio; otherwise use `default_bpm`.
    pub estimate_tempo: bool,
    /// Seconds of audio analysed for tempo.
    pub tempo_window_secs: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            resolvers: vec![ResolverKind::YtDlpSearch],
            youtube_api_key: None,
            ytdlp_path: PathBuf::from("yt-dlp"),
            cookies_file: None,
            cookies_from_browser: None,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_owned(),
            limit_rate: Some("1M".to_owned()),
            estimate_tempo: true,
            tempo_window_secs: 120.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_base: String,
    pub playlist_id: String,
    /// Edge length of the square cover thumbnail.
    pub cover_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.deezer.com".to_owned(),
            playlist_id: "10110124442".to_owned(),
            cover_size: 1000,
        }
    }
}

/// Where an uploaded video lands on the platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostMode {
    /// Drafts inbox; the user finishes the post in the app.
    #[default]
    Inbox,
    /// Direct post with `post_info`.
    Direct,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub enabled: bool,
    pub api_base: String,
    pub token_url: String,
    pub client_key: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub token_path: PathBuf,
    pub mode: PostMode,
    pub privacy_level: String,
    pub disable_comment: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: "https://open.tiktokapis.com/v2".to_owned(),
            token_url: "https://open.tiktokapis.com/v2/oauth/token/".to_owned(),
            client_key: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            token_path: PathBuf::from("tiktok_tokens.json"),
            mode: PostMode::Inbox,
            privacy_level: "MUTUAL_FOLLOW_FRIENDS".to_owned(),
            disable_comment: true,
        }
    }
}

/// Whole-run configuration, loaded from `lyricreel.json`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Parent of the per-track working directories.
    pub work_dir: PathBuf,
    pub background: PathBuf,
    pub font: PathBuf,
    pub default_bpm: f64,
    /// Worker threads for lyric frame rendering; `None` uses all cores.
    pub render_threads: Option<usize>,
    /// Tracks tried before giving up on finding one with lyrics and audio.
    pub max_track_attempts: u32,
    pub video: VideoConfig,
    pub effects: EffectConfig,
    pub lyrics: LyricsConfig,
    pub audio: AudioConfig,
    pub catalog: CatalogConfig,
    pub publish: PublishConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            background: PathBuf::from("assets/background.jpg"),
            font: PathBuf::from("assets/font.ttf"),
            default_bpm: DEFAULT_BPM,
            render_threads: None,
            max_track_attempts: 25,
            video: VideoConfig::default(),
            effects: EffectConfig::default(),
            lyrics: LyricsConfig::default(),
            audio: AudioConfig::default(),
            catalog: CatalogConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read and validate a JSON config file.
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        use anyhow::Context as _;
        let bytes = std::fs::read(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Config file if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> ReelResult<Self> {
        if path.exists() {
            Self::from_path(path)
        } else {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        self.video.validate()?;
        self.effects.validate()?;
        if !self.default_bpm.is_finite() || self.default_bpm <= 0.0 {
            return Err(ReelError::validation("default_bpm must be > 0"));
        }
        if self.render_threads == Some(0) {
            return Err(ReelError::validation("render_threads must be >= 1 when set"));
        }
        if self.max_track_attempts == 0 {
            return Err(ReelError::validation("max_track_attempts must be >= 1"));
        }
        if !self.audio.tempo_window_secs.is_finite() || self.audio.tempo_window_secs <= 0.0 {
            return Err(ReelError::validation("tempo_window_secs must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
