use std::ops::Range;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use serde_json::Value;

use crate::acquire::ytdlp::YtDlp;
use crate::foundation::error::{ReelError, ReelResult};

const YOUTUBE_API_SEARCH: &str = "https://www.googleapis.com/youtube/v3/search";
const YOUTUBE_RESULTS: &str = "https://www.youtube.com/results";
const INITIAL_DATA_MARKER: &str = "var ytInitialData = ";

static WATCH_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"watch\?v=([a-zA-Z0-9_-]{11})").expect("valid watch id regex"));

/// Turns a track into a playable media URL.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, artist: &str, title: &str) -> ReelResult<Option<String>>;
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Query used by the API and scraping strategies.
pub fn search_query(artist: &str, title: &str) -> String {
    format!("{artist} {title} audio officiel lyrics")
}

/// Queries tried in turn by the `yt-dlp` search strategy.
pub fn query_variations(artist: &str, title: &str) -> [String; 5] {
    [
        format!("{artist} {title}"),
        format!("{artist} {title} official"),
        format!("{artist} {title} audio"),
        format!("{artist} {title} lyrics"),
        format!("\"{artist}\" \"{title}\""),
    ]
}

/// YouTube Data API v3 search.
pub struct YoutubeApiResolver {
    http: reqwest::Client,
    api_key: String,
}

impl YoutubeApiResolver {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
        }
    }
}

/// First `items[].id.videoId` of a search response.
pub fn video_id_from_api(value: &Value) -> Option<String> {
    value
        .get("items")?
        .as_array()?
        .iter()
        .find_map(|item| item.get("id")?.get("videoId")?.as_str())
        .map(str::to_owned)
}

#[async_trait]
impl LinkResolver for YoutubeApiResolver {
    fn name(&self) -> &'static str {
        "youtube_api"
    }

    async fn resolve(&self, artist: &str, title: &str) -> ReelResult<Option<String>> {
        let resp = self
            .http
            .get(YOUTUBE_API_SEARCH)
            .query(&[
                ("part", "snippet"),
                ("q", search_query(artist, title).as_str()),
                ("type", "video"),
                ("maxResults", "1"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ReelError::adapter(
                "youtube_api",
                format!("search returned HTTP {}", resp.status()),
            ));
        }
        let value: Value = resp.json().await?;
        Ok(video_id_from_api(&value).map(|id| watch_url(&id)))
    }
}

/// Public results-page scraping.
pub struct YoutubeScrapeResolver {
    http: reqwest::Client,
    user_agent: String,
}

impl YoutubeScrapeResolver {
    pub fn new(http: reqwest::Client, user_agent: impl Into<String>) -> Self {
        Self {
            http,
            user_agent: user_agent.into(),
        }
    }
}

/// First video id in the embedded `ytInitialData`, else the first `watch?v=` link in the page.
pub fn video_id_from_results_page(html: &str) -> Option<String> {
    initial_data_video_id(html).or_else(|| {
        WATCH_ID
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_owned())
    })
}

fn initial_data_video_id(html: &str) -> Option<String> {
    let start = html.find(INITIAL_DATA_MARKER)? + INITIAL_DATA_MARKER.len();
    let end = start + html[start..].find("};")? + 1;
    let data: Value = serde_json::from_str(&html[start..end]).ok()?;

    data.pointer("/contents/twoColumnSearchResultsRenderer/primaryContents/sectionListRenderer/contents")?
        .as_array()?
        .iter()
        .filter_map(|section| section.pointer("/itemSectionRenderer/contents")?.as_array())
        .flatten()
        .find_map(|item| item.pointer("/videoRenderer/videoId")?.as_str())
        .map(str::to_owned)
}

#[async_trait]
impl LinkResolver for YoutubeScrapeResolver {
    fn name(&self) -> &'static str {
        "youtube_scrape"
    }

    async fn resolve(&self, artist: &str, title: &str) -> ReelResult<Option<String>> {
        let resp = self
            .http
            .get(YOUTUBE_RESULTS)
            .query(&[("search_query", search_query(artist, title))])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ReelError::adapter(
                "youtube_scrape",
                format!("results page returned HTTP {}", resp.status()),
            ));
        }
        let html = resp.text().await?;
        Ok(video_id_from_results_page(&html).map(|id| watch_url(&id)))
    }
}

/// `yt-dlp ytsearch1:` over several query variations with a random pause between attempts.
pub struct YtDlpSearchResolver {
    ytdlp: YtDlp,
    delay_secs: Range<f64>,
}

impl YtDlpSearchResolver {
    pub fn new(ytdlp: YtDlp) -> Self {
        Self {
            ytdlp,
            delay_secs: 1.0..3.0,
        }
    }

    /// Pause range between query variations; an empty range disables the pause.
    pub fn with_delay(mut self, delay_secs: Range<f64>) -> Self {
        self.delay_secs = delay_secs;
        self
    }

    fn pause(&self) -> Option<Duration> {
        if self.delay_secs.is_empty() {
            return None;
        }
        let secs = rand::rng().random_range(self.delay_secs.clone());
        Some(Duration::from_secs_f64(secs))
    }
}

#[async_trait]
impl LinkResolver for YtDlpSearchResolver {
    fn name(&self) -> &'static str {
        "ytdlp_search"
    }

    async fn resolve(&self, artist: &str, title: &str) -> ReelResult<Option<String>> {
        let queries = query_variations(artist, title);
        for (i, query) in queries.iter().enumerate() {
            if i > 0
                && let Some(pause) = self.pause()
            {
                tokio::time::sleep(pause).await;
            }
            tracing::debug!(attempt = i + 1, query = %query, "yt-dlp search");
            match self.ytdlp.search_id(query).await {
                Ok(Some(id)) => return Ok(Some(watch_url(&id))),
                Ok(None) => {}
                Err(e) => tracing::debug!(error = %e, "yt-dlp search attempt failed"),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/acquire/resolver.rs"]
mod tests;
