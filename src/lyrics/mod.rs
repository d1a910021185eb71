//! Synchronized lyrics retrieval.
//!
//! Providers are tried in order and the first non-empty result wins. Provider failures are logged
//! and treated as "no lyrics" so the caller can move on to another track.

use async_trait::async_trait;

use crate::config::{LyricsConfig, LyricsProviderKind};
use crate::foundation::error::ReelResult;
use crate::model::{LyricLine, sort_lyrics};

/// LRC text parsing.
pub mod lrc;
/// LRCLib `get` endpoint.
pub mod lrclib;
/// Musixmatch richsync and subtitle endpoints.
pub mod musixmatch;
/// Musixmatch richsync JSON parsing.
pub mod richsync;

/// One source of synchronized lyrics.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Short lowercase name used in logs, e.g. `"lrclib"`.
    fn name(&self) -> &'static str;

    /// Synced lines for a track, or `None` when the provider has none.
    async fn fetch(&self, artist: &str, title: &str) -> ReelResult<Option<Vec<LyricLine>>>;
}

/// Ordered provider chain.
pub struct LyricsFetcher {
    providers: Vec<Box<dyn LyricsProvider>>,
}

impl LyricsFetcher {
    pub fn new(providers: Vec<Box<dyn LyricsProvider>>) -> Self {
        Self { providers }
    }

    /// Build the chain named by `cfg`. Musixmatch is left out when no API key is configured.
    pub fn from_config(cfg: &LyricsConfig, http: &reqwest::Client) -> Self {
        let mut providers: Vec<Box<dyn LyricsProvider>> = Vec::with_capacity(cfg.providers.len());
        for kind in &cfg.providers {
            match kind {
                LyricsProviderKind::Musixmatch => match &cfg.musixmatch_api_key {
                    Some(key) if !key.trim().is_empty() => {
                        providers.push(Box::new(musixmatch::MusixmatchProvider::new(
                            http.clone(),
                            &cfg.musixmatch_api_base,
                            key,
                        )));
                    }
                    _ => tracing::warn!("musixmatch configured without an API key, skipping it"),
                },
                LyricsProviderKind::Lrclib => {
                    providers.push(Box::new(lrclib::LrclibProvider::new(
                        http.clone(),
                        &cfg.lrclib_api_base,
                    )));
                }
            }
        }
        Self::new(providers)
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// First non-empty result across providers, sorted by timestamp.
    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, artist: &str, title: &str) -> Option<Vec<LyricLine>> {
        for provider in &self.providers {
            match provider.fetch(artist, title).await {
                Ok(Some(mut lines)) if !lines.is_empty() => {
                    sort_lyrics(&mut lines);
                    tracing::info!(
                        provider = provider.name(),
                        lines = lines.len(),
                        "synced lyrics found"
                    );
                    return Some(lines);
                }
                Ok(_) => tracing::debug!(provider = provider.name(), "no synced lyrics"),
                Err(e) => tracing::warn!(provider = provider.name(), error = %e, "provider failed"),
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lyrics/mod.rs"]
mod tests;
