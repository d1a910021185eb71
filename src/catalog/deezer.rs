use rand::seq::IndexedRandom;
use serde::Deserialize;
use serde_json::Value;

use crate::config::CatalogConfig;
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::TrackInfo;

#[derive(Debug, Deserialize)]
struct Playlist {
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    data: Vec<DeezerTrack>,
}

#[derive(Debug, Deserialize)]
struct DeezerTrack {
    id: u64,
    title: String,
    artist: DeezerArtist,
    #[serde(default)]
    isrc: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeezerArtist {
    name: String,
}

impl From<DeezerTrack> for TrackInfo {
    fn from(t: DeezerTrack) -> Self {
        Self {
            id: t.id,
            artist: t.artist.name,
            title: t.title,
            isrc: t.isrc.filter(|s| !s.is_empty()),
            link: t.link,
        }
    }
}

/// Parse a playlist document into its tracks.
pub fn parse_playlist(body: &str) -> ReelResult<Vec<TrackInfo>> {
    let playlist: Playlist = serde_json::from_str(body)?;
    Ok(playlist
        .tracks
        .data
        .into_iter()
        .map(TrackInfo::from)
        .collect())
}

/// Uniform random pick.
pub fn pick_track<R: rand::Rng + ?Sized>(tracks: &[TrackInfo], rng: &mut R) -> Option<TrackInfo> {
    tracks.choose(rng).cloned()
}

/// API path for an `/album/<id>` or `/track/<id>` web link.
pub fn lookup_path(link: &str) -> Option<String> {
    for kind in ["album", "track"] {
        let marker = format!("/{kind}/");
        if let Some(pos) = link.rfind(&marker) {
            let id = link[pos + marker.len()..]
                .split(['?', '#', '/'])
                .next()
                .unwrap_or_default();
            if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
                return Some(format!("{kind}/{id}"));
            }
        }
    }
    None
}

/// `album.cover_xl`, `cover_xl`, `album.cover_big`, then `cover_big`.
pub fn cover_from_value(value: &Value) -> Option<String> {
    let album = value.get("album");
    [
        album.and_then(|a| a.get("cover_xl")),
        value.get("cover_xl"),
        album.and_then(|a| a.get("cover_big")),
        value.get("cover_big"),
    ]
    .into_iter()
    .flatten()
    .find_map(|v| v.as_str().filter(|s| !s.is_empty()))
    .map(str::to_owned)
}

pub struct DeezerClient {
    http: reqwest::Client,
    base: String,
    playlist_id: String,
}

impl DeezerClient {
    pub fn new(http: reqwest::Client, cfg: &CatalogConfig) -> Self {
        Self {
            http,
            base: cfg.api_base.trim_end_matches('/').to_owned(),
            playlist_id: cfg.playlist_id.clone(),
        }
    }

    async fn get_text(&self, path: &str) -> ReelResult<String> {
        let resp = self
            .http
            .get(format!("{}/{path}", self.base))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ReelError::adapter(
                "deezer",
                format!("GET {path} returned HTTP {}", resp.status()),
            ));
        }
        Ok(resp.text().await?)
    }

    pub async fn playlist_tracks(&self) -> ReelResult<Vec<TrackInfo>> {
        let body = self
            .get_text(&format!("playlist/{}", self.playlist_id))
            .await?;
        parse_playlist(&body)
    }

    /// Random track from the configured playlist; `None` when empty or unreachable.
    #[tracing::instrument(skip(self), fields(playlist = %self.playlist_id))]
    pub async fn choose_track(&self) -> Option<TrackInfo> {
        let tracks = match self.playlist_tracks().await {
            Ok(tracks) => tracks,
            Err(e) => {
                tracing::warn!(error = %e, "playlist fetch failed");
                return None;
            }
        };
        if tracks.is_empty() {
            tracing::warn!("playlist has no tracks");
            return None;
        }
        let track = pick_track(&tracks, &mut rand::rng());
        if let Some(t) = &track {
            tracing::info!(artist = %t.artist, title = %t.title, "track chosen");
        }
        track
    }

    /// Cover image URL for a Deezer album or track link.
    pub async fn cover_url(&self, link: &str) -> ReelResult<Option<String>> {
        let Some(path) = lookup_path(link) else {
            return Ok(None);
        };
        let body = self.get_text(&path).await?;
        let value: Value = serde_json::from_str(&body)?;
        Ok(cover_from_value(&value))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/deezer.rs"]
mod tests;
