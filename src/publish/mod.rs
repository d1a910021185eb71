//! Posting finished videos: chunked upload to the TikTok Content Posting API plus OAuth2.

use std::path::Path;

use async_trait::async_trait;

use crate::config::{PostMode, PublishConfig};
use crate::foundation::error::{ReelError, ReelResult};

/// Token exchange, refresh and storage.
pub mod auth;
/// Upload chunk layout.
pub mod chunk;
/// Content Posting API client.
pub mod tiktok;

use auth::{OAuthClient, TokenStore};
use chunk::compute_chunk_params;
use tiktok::{PostInfo, PostStatus, TikTokClient};

/// What the post should say.
#[derive(Clone, Debug, PartialEq)]
pub struct PostMeta {
    pub title: String,
}

impl PostMeta {
    pub fn for_track(artist: &str, song: &str) -> Self {
        Self {
            title: format!("{artist} - {song}"),
        }
    }
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, video: &Path, meta: &PostMeta) -> ReelResult<PostStatus>;
}

/// Creator check, init, chunked upload, status.
pub struct TikTokPublisher {
    client: TikTokClient,
    mode: PostMode,
    privacy_level: String,
    disable_comment: bool,
}

impl TikTokPublisher {
    pub fn new(client: TikTokClient, cfg: &PublishConfig) -> Self {
        Self {
            client,
            mode: cfg.mode,
            privacy_level: cfg.privacy_level.clone(),
            disable_comment: cfg.disable_comment,
        }
    }

    /// Publisher using the stored token, refreshed when expired.
    pub async fn from_config(http: &reqwest::Client, cfg: &PublishConfig) -> ReelResult<Self> {
        let oauth = OAuthClient::from_config(http.clone(), cfg);
        let token = oauth.fresh_token(&TokenStore::new(&cfg.token_path)).await?;
        Ok(Self::new(
            TikTokClient::new(http.clone(), &cfg.api_base, token.access_token),
            cfg,
        ))
    }

    fn post_info(&self, meta: &PostMeta) -> PostInfo {
        PostInfo {
            title: meta.title.clone(),
            privacy_level: self.privacy_level.clone(),
            disable_duet: false,
            disable_comment: self.disable_comment,
            disable_stitch: false,
            video_cover_timestamp_ms: 1000,
        }
    }
}

#[async_trait]
impl Publisher for TikTokPublisher {
    #[tracing::instrument(skip(self, meta), fields(video = %video.display(), title = %meta.title))]
    async fn publish(&self, video: &Path, meta: &PostMeta) -> ReelResult<PostStatus> {
        let size = tokio::fs::metadata(video)
            .await
            .map_err(|e| ReelError::precondition(format!("video '{}': {e}", video.display())))?
            .len();
        if size == 0 {
            return Err(ReelError::precondition("video file is empty"));
        }

        let creator = self.client.creator_info().await?;
        tracing::info!(
            creator = creator.creator_username.as_deref().unwrap_or("unknown"),
            "creator info"
        );

        let params = compute_chunk_params(size);
        let init = match self.mode {
            PostMode::Inbox => self.client.init_inbox(params).await?,
            PostMode::Direct => {
                self.client
                    .init_direct(params, self.post_info(meta))
                    .await?
            }
        };
        self.client.upload_file(&init.upload_url, video).await?;

        let status = self.client.fetch_status(&init.publish_id).await?;
        tracing::info!(publish_id = %init.publish_id, status = %status.status, "post status");
        Ok(status)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/publish/mod.rs"]
mod tests;
