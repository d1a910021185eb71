use async_trait::async_trait;
use serde::Deserialize;

use crate::foundation::error::{ReelError, ReelResult};
use crate::lyrics::LyricsProvider;
use crate::lyrics::lrc::parse_lrc;
use crate::lyrics::richsync::parse_richsync;
use crate::model::LyricLine;

/// Musixmatch API client: richsync first, then the LRC subtitle.
///
/// Each body is looked up by ISRC, then common track id, then track id.
pub struct MusixmatchProvider {
    http: reqwest::Client,
    base: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    message: Message<T>,
}

#[derive(Debug, Deserialize)]
struct Message<T> {
    header: Header,
    body: Option<T>,
}

#[derive(Debug, Deserialize)]
struct Header {
    status_code: u16,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    track_list: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    track: TrackRef,
}

/// Identifiers of a search hit.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TrackRef {
    #[serde(default)]
    pub track_id: Option<u64>,
    #[serde(default)]
    pub track_isrc: Option<String>,
    #[serde(default)]
    pub commontrack_id: Option<u64>,
}

impl TrackRef {
    /// Lookup parameters in the order they are tried.
    pub fn lookup_params(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::with_capacity(3);
        if let Some(isrc) = self.track_isrc.as_deref().filter(|s| !s.is_empty()) {
            out.push(("track_isrc", isrc.to_owned()));
        }
        if let Some(id) = self.commontrack_id {
            out.push(("commontrack_id", id.to_string()));
        }
        if let Some(id) = self.track_id {
            out.push(("track_id", id.to_string()));
        }
        out
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BodyKind {
    Richsync,
    Subtitle,
}

impl BodyKind {
    fn method(self) -> &'static str {
        match self {
            Self::Richsync => "track.richsync.get",
            Self::Subtitle => "track.subtitle.get",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Richsync => "richsync",
            Self::Subtitle => "subtitle",
        }
    }
}

impl MusixmatchProvider {
    pub fn new(http: reqwest::Client, base: &str, api_key: &str) -> Self {
        Self {
            http,
            base: base.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        }
    }

    async fn get_json(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> ReelResult<serde_json::Value> {
        let url = format!("{}/{method}", self.base);
        let resp = self
            .http
            .get(&url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str()), ("format", "json")])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ReelError::adapter(
                "musixmatch",
                format!("{method} returned HTTP {}", resp.status()),
            ));
        }
        Ok(resp.json().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn search(&self, artist: &str, title: &str) -> ReelResult<Option<TrackRef>> {
        let value = self
            .get_json(
                "track.search",
                &[
                    ("q_track", title.to_owned()),
                    ("q_artist", artist.to_owned()),
                    ("page_size", "1".to_owned()),
                    ("s_track_rating", "desc".to_owned()),
                ],
            )
            .await?;
        let env: Envelope<SearchBody> = serde_json::from_value(value)?;
        if env.message.header.status_code != 200 {
            return Ok(None);
        }
        Ok(env
            .message
            .body
            .and_then(|b| b.track_list.into_iter().next())
            .map(|item| item.track))
    }

    async fn body(&self, track: &TrackRef, kind: BodyKind) -> Option<String> {
        for param in track.lookup_params() {
            let mut params = vec![param];
            if kind == BodyKind::Subtitle {
                params.push(("subtitle_format", "lrc".to_owned()));
            }
            match self.get_json(kind.method(), &params).await {
                Ok(value) => {
                    if let Some(body) = extract_body(&value, kind.key()) {
                        return Some(body);
                    }
                }
                Err(e) => tracing::debug!(lookup = params[0].0, error = %e, "musixmatch lookup failed"),
            }
        }
        None
    }
}

/// `message.body.<key>.<key>_body`, or `message.body.<key>_body`, when non-blank.
pub fn extract_body(value: &serde_json::Value, key: &str) -> Option<String> {
    let body = value.get("message")?.get("body")?;
    let field = format!("{key}_body");
    let text = body
        .get(key)
        .and_then(|inner| inner.get(&field))
        .or_else(|| body.get(&field))?
        .as_str()?;
    (!text.trim().is_empty()).then(|| text.to_owned())
}

#[async_trait]
impl LyricsProvider for MusixmatchProvider {
    fn name(&self) -> &'static str {
        "musixmatch"
    }

    async fn fetch(&self, artist: &str, title: &str) -> ReelResult<Option<Vec<LyricLine>>> {
        let Some(track) = self.search(artist, title).await? else {
            return Ok(None);
        };

        if let Some(body) = self.body(&track, BodyKind::Richsync).await {
            let lines = parse_richsync(&body);
            if !lines.is_empty() {
                tracing::debug!("using musixmatch richsync");
                return Ok(Some(lines));
            }
        }
        if let Some(body) = self.body(&track, BodyKind::Subtitle).await {
            let lines = parse_lrc(&body);
            if !lines.is_empty() {
                tracing::debug!("using musixmatch subtitle");
                return Ok(Some(lines));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lyrics/musixmatch.rs"]
mod tests;
