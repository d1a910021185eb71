use std::path::Path;

use anyhow::Context as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{ReelError, ReelResult};
use crate::publish::chunk::{ChunkParams, compute_chunk_params, content_range};

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    data: Option<T>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    log_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CreatorInfo {
    #[serde(default)]
    pub creator_username: Option<String>,
    #[serde(default)]
    pub creator_nickname: Option<String>,
    #[serde(default)]
    pub privacy_level_options: Vec<String>,
    #[serde(default)]
    pub max_video_post_duration_sec: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UploadInit {
    pub publish_id: String,
    pub upload_url: String,
}

/// Publish status as reported by the status endpoint.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PostStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub fail_reason: Option<String>,
    #[serde(default)]
    pub uploaded_bytes: Option<u64>,
}

/// `post_info` for direct posts.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PostInfo {
    pub title: String,
    pub privacy_level: String,
    pub disable_duet: bool,
    pub disable_comment: bool,
    pub disable_stitch: bool,
    pub video_cover_timestamp_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SourceInfo {
    pub source: &'static str,
    pub video_size: u64,
    pub chunk_size: u64,
    pub total_chunk_count: u64,
}

impl From<ChunkParams> for SourceInfo {
    fn from(p: ChunkParams) -> Self {
        Self {
            source: "FILE_UPLOAD",
            video_size: p.video_size,
            chunk_size: p.chunk_size,
            total_chunk_count: p.total_chunk_count,
        }
    }
}

#[derive(Debug, Serialize)]
struct InitRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    post_info: Option<PostInfo>,
    source_info: SourceInfo,
}

/// Content Posting API client bound to one access token.
pub struct TikTokClient {
    http: reqwest::Client,
    base: String,
    access_token: String,
}

impl TikTokClient {
    pub fn new(http: reqwest::Client, api_base: &str, access_token: impl Into<String>) -> Self {
        Self {
            http,
            base: format!("{}/post/publish", api_base.trim_end_matches('/')),
            access_token: access_token.into(),
        }
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> ReelResult<T> {
        let mut req = self
            .http
            .post(format!("{}/{path}", self.base))
            .bearer_auth(&self.access_token)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/json; charset=UTF-8",
            );
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ReelError::adapter(
                "tiktok",
                format!("{path} returned HTTP {status}: {}", text.trim()),
            ));
        }
        unwrap_envelope(path, &text)
    }

    #[tracing::instrument(skip(self))]
    pub async fn creator_info(&self) -> ReelResult<CreatorInfo> {
        self.post::<(), _>("creator_info/query/", None).await
    }

    /// Upload to the user's drafts inbox.
    pub async fn init_inbox(&self, params: ChunkParams) -> ReelResult<UploadInit> {
        let body = InitRequest {
            post_info: None,
            source_info: params.into(),
        };
        self.post("inbox/video/init/", Some(&body)).await
    }

    pub async fn init_direct(&self, params: ChunkParams, info: PostInfo) -> ReelResult<UploadInit> {
        let body = InitRequest {
            post_info: Some(info),
            source_info: params.into(),
        };
        self.post("video/init/", Some(&body)).await
    }

    /// PUT `video` to `upload_url` in the chunks announced at init.
    #[tracing::instrument(skip(self, upload_url), fields(video = %video.display()))]
    pub async fn upload_file(&self, upload_url: &str, video: &Path) -> ReelResult<()> {
        let bytes = tokio::fs::read(video)
            .await
            .with_context(|| format!("read video '{}'", video.display()))?;
        let total = bytes.len() as u64;
        let params = compute_chunk_params(total);
        for range in params.ranges() {
            let chunk = bytes[range.start as usize..=range.end as usize].to_vec();
            let resp = self
                .http
                .put(upload_url)
                .header(reqwest::header::CONTENT_RANGE, content_range(range, total))
                .header(reqwest::header::CONTENT_TYPE, "video/mp4")
                .body(chunk)
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(ReelError::adapter(
                    "tiktok",
                    format!(
                        "chunk {} returned HTTP {}",
                        content_range(range, total),
                        resp.status()
                    ),
                ));
            }
            tracing::debug!(end = range.end, total, "chunk uploaded");
        }
        Ok(())
    }

    pub async fn fetch_status(&self, publish_id: &str) -> ReelResult<PostStatus> {
        let body = serde_json::json!({ "publish_id": publish_id });
        self.post("status/fetch/", Some(&body)).await
    }
}

/// `data` of an API response, or the `error` it carries when its code is not `ok`.
fn unwrap_envelope<T: DeserializeOwned>(path: &str, text: &str) -> ReelResult<T> {
    let env: ApiEnvelope<T> = serde_json::from_str(text)?;
    if let Some(err) = env.error
        && !err.code.is_empty()
        && err.code != "ok"
    {
        return Err(ReelError::adapter(
            "tiktok",
            format!("{path}: {} ({}) log_id={}", err.message, err.code, err.log_id),
        ));
    }
    env.data
        .ok_or_else(|| ReelError::adapter("tiktok", format!("{path}: response has no data")))
}

#[cfg(test)]
#[path = "../../tests/unit/publish/tiktok.rs"]
mod tests;
