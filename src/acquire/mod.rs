//! Audio acquisition: resolve a track to a media URL, then extract its audio with `yt-dlp`.

use std::path::Path;

use crate::config::{AudioConfig, ResolverKind};

/// Search strategies.
pub mod resolver;
/// `yt-dlp` process wrapper.
pub mod ytdlp;

use resolver::{
    LinkResolver, YoutubeApiResolver, YoutubeScrapeResolver, YtDlpSearchResolver,
};
use ytdlp::YtDlp;

/// Resolver chain plus downloader.
pub struct AudioFetcher {
    resolvers: Vec<Box<dyn LinkResolver>>,
    ytdlp: YtDlp,
}

impl AudioFetcher {
    pub fn new(resolvers: Vec<Box<dyn LinkResolver>>, ytdlp: YtDlp) -> Self {
        Self { resolvers, ytdlp }
    }

    /// Build the resolvers named by `cfg`. The API strategy is left out without a key.
    pub fn from_config(cfg: &AudioConfig, http: &reqwest::Client) -> Self {
        let ytdlp = YtDlp::from_config(cfg);
        let mut resolvers: Vec<Box<dyn LinkResolver>> = Vec::with_capacity(cfg.resolvers.len());
        for kind in &cfg.resolvers {
            match kind {
                ResolverKind::YoutubeApi => match &cfg.youtube_api_key {
                    Some(key) if !key.trim().is_empty() => {
                        resolvers.push(Box::new(YoutubeApiResolver::new(http.clone(), key)));
                    }
                    _ => tracing::warn!("youtube_api resolver configured without a key, skipping it"),
                },
                ResolverKind::YoutubeScrape => resolvers.push(Box::new(
                    YoutubeScrapeResolver::new(http.clone(), &cfg.user_agent),
                )),
                ResolverKind::YtDlpSearch => {
                    resolvers.push(Box::new(YtDlpSearchResolver::new(ytdlp.clone())));
                }
            }
        }
        Self::new(resolvers, ytdlp)
    }

    pub fn resolver_names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// First URL any resolver finds.
    pub async fn resolve(&self, artist: &str, title: &str) -> Option<String> {
        for resolver in &self.resolvers {
            match resolver.resolve(artist, title).await {
                Ok(Some(url)) => {
                    tracing::info!(resolver = resolver.name(), url = %url, "media link found");
                    return Some(url);
                }
                Ok(None) => tracing::debug!(resolver = resolver.name(), "no media link"),
                Err(e) => tracing::warn!(resolver = resolver.name(), error = %e, "resolver failed"),
            }
        }
        None
    }

    /// Download the track's audio to `out`. Failures are logged and reported as `false`.
    #[tracing::instrument(skip(self, out), fields(out = %out.display()))]
    pub async fn fetch_audio(&self, artist: &str, title: &str, out: &Path) -> bool {
        let Some(url) = self.resolve(artist, title).await else {
            tracing::warn!("no media link found for track");
            return false;
        };
        match self.ytdlp.download_audio(&url, out).await {
            Ok(()) => {
                tracing::info!("audio downloaded");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "audio download failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/acquire/mod.rs"]
mod tests;
