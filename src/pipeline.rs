//! End-to-end run: pick a track, gather lyrics and audio, render, compose, publish.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::acquire::AudioFetcher;
use crate::audio::tempo::estimate_tempo;
use crate::catalog::cover::{download_cover, resize_cover};
use crate::catalog::deezer::DeezerClient;
use crate::compose::compositor::{ComposeJob, ComposeReport, Compositor};
use crate::config::AppConfig;
use crate::effects::motion::effective_bpm;
use crate::foundation::error::{ReelError, ReelResult};
use crate::lyrics::LyricsFetcher;
use crate::model::{LyricLine, RenderedFrame, TrackInfo};
use crate::publish::tiktok::PostStatus;
use crate::publish::{PostMeta, Publisher, TikTokPublisher};
use crate::render::lyric::LyricFrameRenderer;
use crate::timeline::frames::folder_timestamps;

pub const AUDIO_FILE: &str = "audio.m4a";
pub const IMAGES_DIR: &str = "images";
pub const OUTPUT_FILE: &str = "output.mp4";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP client for every adapter.
pub fn http_client(user_agent: &str) -> ReelResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(HTTP_TIMEOUT)
        .build()?)
}

/// Where a tempo came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tempo {
    pub bpm: f64,
    pub estimated: bool,
}

impl Tempo {
    pub fn resolve(estimated: Option<f64>, default_bpm: f64) -> Self {
        let bpm = effective_bpm(estimated, default_bpm);
        Self {
            bpm,
            estimated: estimated.is_some_and(|b| b.is_finite() && b > 0.0),
        }
    }
}

/// A track whose lyrics and audio are both in hand.
#[derive(Clone, Debug)]
pub struct PreparedTrack {
    pub track: TrackInfo,
    pub dir: PathBuf,
    pub lyrics: Vec<LyricLine>,
    pub audio: PathBuf,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub track: TrackInfo,
    pub dir: PathBuf,
    pub cover: Option<PathBuf>,
    pub tempo: Tempo,
    pub report: ComposeReport,
    pub post: Option<PostStatus>,
}

pub struct Pipeline {
    cfg: AppConfig,
    http: reqwest::Client,
    catalog: DeezerClient,
    lyrics: LyricsFetcher,
    audio: AudioFetcher,
}

impl Pipeline {
    pub fn new(cfg: AppConfig) -> ReelResult<Self> {
        cfg.validate()?;
        let http = http_client(&cfg.audio.user_agent)?;
        Ok(Self {
            catalog: DeezerClient::new(http.clone(), &cfg.catalog),
            lyrics: LyricsFetcher::from_config(&cfg.lyrics, &http),
            audio: AudioFetcher::from_config(&cfg.audio, &http),
            http,
            cfg,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.cfg
    }

    #[tracing::instrument(skip(self))]
    pub async fn run(&self) -> ReelResult<RunOutcome> {
        let prepared = self.prepare_track().await?;
        let PreparedTrack {
            track,
            dir,
            lyrics,
            audio,
        } = prepared;

        let cover = self.fetch_cover(&track, &dir).await;
        let tempo = self.tempo(&audio).await;
        tracing::info!(bpm = tempo.bpm, estimated = tempo.estimated, "tempo");

        let frames = render_frames(
            self.cfg.clone(),
            lyrics,
            track.artist.clone(),
            track.title.clone(),
            dir.join(IMAGES_DIR),
        )
        .await?;

        let job = ComposeJob::new(frames, &self.cfg.background, &audio, dir.join(OUTPUT_FILE))
            .with_bpm(tempo.bpm)
            .with_track(&track.artist, &track.title);
        let report = compose_with_fallback(self.cfg.clone(), job, tempo).await?;

        let post = if self.cfg.publish.enabled {
            self.publish(&report.output, &track).await
        } else {
            None
        };

        Ok(RunOutcome {
            track,
            dir,
            cover,
            tempo,
            report,
            post,
        })
    }

    /// Draw tracks until one has both synced lyrics and downloadable audio.
    pub async fn prepare_track(&self) -> ReelResult<PreparedTrack> {
        let attempts = self.cfg.max_track_attempts;
        for attempt in 1..=attempts {
            let Some(track) = self.catalog.choose_track().await else {
                return Err(ReelError::adapter("deezer", "could not choose a track"));
            };
            tracing::info!(attempt, artist = %track.artist, title = %track.title, "trying track");

            let dir = self.cfg.work_dir.join(track.folder_name());
            tokio::fs::create_dir_all(&dir).await.map_err(|e| {
                ReelError::precondition(format!("create work dir '{}': {e}", dir.display()))
            })?;

            let Some(lyrics) = self.lyrics.fetch(&track.artist, &track.title).await else {
                tracing::warn!("no synced lyrics, picking another track");
                remove_if_empty(&dir).await;
                continue;
            };

            let audio = dir.join(AUDIO_FILE);
            if !self.audio.fetch_audio(&track.artist, &track.title, &audio).await {
                tracing::warn!("no audio, picking another track");
                remove_if_empty(&dir).await;
                continue;
            }

            return Ok(PreparedTrack {
                track,
                dir,
                lyrics,
                audio,
            });
        }
        Err(ReelError::precondition(format!(
            "no track with lyrics and audio after {attempts} attempts"
        )))
    }

    async fn fetch_cover(&self, track: &TrackInfo, dir: &Path) -> Option<PathBuf> {
        let link = track.link.as_deref()?;
        let result = async {
            let Some(url) = self.catalog.cover_url(link).await? else {
                return Ok(None);
            };
            let path = download_cover(&self.http, &url, dir).await?;
            let size = self.cfg.catalog.cover_size;
            let resized = tokio::task::spawn_blocking(move || resize_cover(&path, size))
                .await
                .map_err(join_error)??;
            Ok::<_, ReelError>(Some(resized))
        }
        .await;
        match result {
            Ok(cover) => cover,
            Err(e) => {
                tracing::warn!(error = %e, "cover unavailable");
                None
            }
        }
    }

    async fn tempo(&self, audio: &Path) -> Tempo {
        if !self.cfg.audio.estimate_tempo {
            return Tempo::resolve(None, self.cfg.default_bpm);
        }
        let audio = audio.to_path_buf();
        let window = self.cfg.audio.tempo_window_secs;
        let estimated =
            match tokio::task::spawn_blocking(move || estimate_tempo(&audio, window)).await {
                Ok(Ok(bpm)) => bpm,
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "tempo estimation failed");
                    None
                }
                Err(e) => {
                    tracing::warn!(error = %e, "tempo task failed");
                    None
                }
            };
        Tempo::resolve(estimated, self.cfg.default_bpm)
    }

    async fn publish(&self, video: &Path, track: &TrackInfo) -> Option<PostStatus> {
        let result = async {
            let publisher = TikTokPublisher::from_config(&self.http, &self.cfg.publish).await?;
            publisher
                .publish(video, &PostMeta::for_track(&track.artist, &track.title))
                .await
        }
        .await;
        match result {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::error!(error = %e, "publishing failed");
                None
            }
        }
    }
}

/// Render the title card and every lyric line into `out_dir` on a blocking thread.
///
/// Returned frames carry the timestamps a scan of `out_dir` would give them, so a `run` and a
/// later `compose` over the same folder schedule identically.
pub async fn render_frames(
    cfg: AppConfig,
    lyrics: Vec<LyricLine>,
    artist: String,
    title: String,
    out_dir: PathBuf,
) -> ReelResult<Vec<RenderedFrame>> {
    tokio::task::spawn_blocking(move || {
        let renderer = LyricFrameRenderer::new(&cfg.background, &cfg.font, out_dir, &cfg.video)?
            .with_threads(cfg.render_threads);
        renderer.prepare_output_dir()?;
        let mut frames = vec![renderer.render_title(&artist, &title)?];
        frames.extend(renderer.render_all(&lyrics)?);
        Ok(folder_timestamps(frames))
    })
    .await
    .map_err(join_error)?
}

/// Compose on a blocking thread, retrying once at the default tempo when an estimated tempo
/// was in use.
pub async fn compose_with_fallback(
    cfg: AppConfig,
    job: ComposeJob,
    tempo: Tempo,
) -> ReelResult<ComposeReport> {
    tokio::task::spawn_blocking(move || {
        let compositor = Compositor::new(cfg.video.clone(), cfg.effects.clone())?
            .with_default_bpm(cfg.default_bpm);
        match compositor.compose(&job) {
            Ok(report) => Ok(report),
            Err(e) if tempo.estimated && !matches!(e, ReelError::Precondition(_)) => {
                tracing::warn!(
                    error = %e,
                    bpm = tempo.bpm,
                    fallback = cfg.default_bpm,
                    "compose failed with estimated tempo, retrying with the default"
                );
                compositor.compose(&job.with_bpm(cfg.default_bpm))
            }
            Err(e) => Err(e),
        }
    })
    .await
    .map_err(join_error)?
}

async fn remove_if_empty(dir: &Path) {
    // Fails harmlessly when something was written there.
    let _ = tokio::fs::remove_dir(dir).await;
}

fn join_error(e: tokio::task::JoinError) -> ReelError {
    ReelError::Other(anyhow::anyhow!("blocking task failed: {e}"))
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
