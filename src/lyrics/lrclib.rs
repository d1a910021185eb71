use async_trait::async_trait;
use serde::Deserialize;

use crate::foundation::error::{ReelError, ReelResult};
use crate::lyrics::LyricsProvider;
use crate::lyrics::lrc::parse_lrc;
use crate::model::LyricLine;

/// LRCLib exact-match lookup.
pub struct LrclibProvider {
    http: reqwest::Client,
    base: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetResponse {
    #[serde(default)]
    synced_lyrics: Option<String>,
}

impl LrclibProvider {
    pub fn new(http: reqwest::Client, base: &str) -> Self {
        Self {
            http,
            base: base.trim_end_matches('/').to_owned(),
        }
    }

    pub fn get_url(&self, artist: &str, title: &str) -> String {
        format!(
            "{}/get?artist_name={}&track_name={}",
            self.base,
            urlencoding::encode(artist.trim()),
            urlencoding::encode(title.trim())
        )
    }
}

#[async_trait]
impl LyricsProvider for LrclibProvider {
    fn name(&self) -> &'static str {
        "lrclib"
    }

    async fn fetch(&self, artist: &str, title: &str) -> ReelResult<Option<Vec<LyricLine>>> {
        let resp = self.http.get(self.get_url(artist, title)).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(ReelError::adapter(
                "lrclib",
                format!("get returned HTTP {}", resp.status()),
            ));
        }
        let body: GetResponse = resp.json().await?;
        Ok(body
            .synced_lyrics
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_lrc(&s))
            .filter(|lines| !lines.is_empty()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lyrics/lrclib.rs"]
mod tests;
