use std::path::{Path, PathBuf};

use crate::assets::background::load_background;
use crate::assets::decode::{PreparedImage, load_image_fitted};
use crate::audio::fit::{apply_fade_out, fit_to_duration};
use crate::audio::media::{MIX_SAMPLE_RATE, decode_audio_f32_stereo, write_f32le_file};
use crate::compose::metadata::{VideoMetadata, write_sidecar};
use crate::config::{DEFAULT_BPM, EffectConfig, VideoConfig};
use crate::effects::motion::{MotionEngine, effective_bpm};
use crate::encode::ffmpeg::{
    EncodeSettings, FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path,
};
use crate::encode::mux::{PcmInput, mux_video_with_pcm};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{ReelError, ReelResult, Stage};
use crate::foundation::math::scale_premul_rgba8;
use crate::model::RenderedFrame;
use crate::render::cpu::{CpuCanvas, ImagePaint, image_paint};
use crate::timeline::frames::{order_frames, scan_frame_folder};
use crate::timeline::schedule::{SegmentSource, schedule_segments};

/// Inputs for one finished video.
#[derive(Clone, Debug)]
pub struct ComposeJob {
    /// Ordered frames; title card first.
    pub frames: Vec<RenderedFrame>,
    pub background: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
    pub bpm: f64,
    pub artist: String,
    pub song: String,
}

impl ComposeJob {
    pub fn new(
        frames: Vec<RenderedFrame>,
        background: impl Into<PathBuf>,
        audio: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            frames: order_frames(frames),
            background: background.into(),
            audio: audio.into(),
            output: output.into(),
            bpm: DEFAULT_BPM,
            artist: "Unknown Artist".to_owned(),
            song: "Unknown Song".to_owned(),
        }
    }

    /// Job over every recognised image in `folder`.
    pub fn from_folder(
        folder: &Path,
        background: impl Into<PathBuf>,
        audio: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> ReelResult<Self> {
        Ok(Self::new(
            scan_frame_folder(folder)?,
            background,
            audio,
            output,
        ))
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn with_track(mut self, artist: impl Into<String>, song: impl Into<String>) -> Self {
        self.artist = artist.into();
        self.song = song.into();
        self
    }
}

/// Counters from one pass over the timeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderStats {
    pub duration_secs: f64,
    pub total_frames: u64,
    pub segments: usize,
    /// Segments whose image failed to load and showed the background instead.
    pub fallback_segments: usize,
    /// Tempo the motion was locked to.
    pub bpm: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComposeReport {
    pub stats: RenderStats,
    pub output: PathBuf,
    pub metadata: PathBuf,
}

/// Renders scheduled frames with beat-locked motion and joins them with the track audio.
///
/// Never retries; a failure is reported with the stage it happened in.
pub struct Compositor {
    video: VideoConfig,
    effects: EffectConfig,
    default_bpm: f64,
}

impl Compositor {
    pub fn new(video: VideoConfig, effects: EffectConfig) -> ReelResult<Self> {
        video.validate()?;
        effects.validate()?;
        Ok(Self {
            video,
            effects,
            default_bpm: DEFAULT_BPM,
        })
    }

    /// Tempo used when a job carries an unusable bpm.
    pub fn with_default_bpm(mut self, bpm: f64) -> Self {
        self.default_bpm = effective_bpm(Some(bpm), DEFAULT_BPM);
        self
    }

    pub fn video(&self) -> &VideoConfig {
        &self.video
    }

    /// Encode the silent video, mux the fitted audio and write the metadata sidecar.
    #[tracing::instrument(
        skip(self, job),
        fields(output = %job.output.display(), frames = job.frames.len(), bpm = job.bpm)
    )]
    pub fn compose(&self, job: &ComposeJob) -> ReelResult<ComposeReport> {
        check_inputs(&job.frames, &job.background)?;
        if !job.audio.is_file() {
            return Err(ReelError::precondition(format!(
                "audio file '{}' not found",
                job.audio.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(ReelError::precondition(
                "ffmpeg is required for composing, but was not found on PATH",
            ));
        }
        ensure_parent_dir(&job.output)?;

        let silent_path = job.output.with_extension("silent.mp4");
        let pcm_path = job.output.with_extension("pcm.f32le");
        let _silent_tmp = TempFileGuard(Some(silent_path.clone()));
        let _pcm_tmp = TempFileGuard(Some(pcm_path.clone()));

        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(
            silent_path.clone(),
            EncodeSettings::from_video(&self.video),
        ));
        let stats = self.render_silent(&job.frames, &job.background, job.bpm, &mut sink)?;
        drop(sink);

        self.mux_audio(&job.audio, stats.duration_secs, &silent_path, &pcm_path, &job.output)?;

        let meta = VideoMetadata::new(
            &self.video,
            &self.effects,
            stats.duration_secs,
            stats.bpm,
            &job.artist,
            &job.song,
        );
        let metadata = write_sidecar(&job.output, &meta)?;

        tracing::info!(
            duration = stats.duration_secs,
            frames = stats.total_frames,
            fallbacks = stats.fallback_segments,
            "video composed"
        );
        Ok(ComposeReport {
            stats,
            output: job.output.clone(),
            metadata,
        })
    }

    /// Push every scheduled frame, in order, into `sink`.
    pub fn render_silent(
        &self,
        frames: &[RenderedFrame],
        background: &Path,
        bpm: f64,
        sink: &mut dyn FrameSink,
    ) -> ReelResult<RenderStats> {
        check_inputs(frames, background)?;
        let fps = self.video.fps()?;
        let canvas = self.video.canvas()?;
        let bpm = effective_bpm(Some(bpm), self.default_bpm);

        let schedule = schedule_segments(frames, &self.video).map_err(in_stage(Stage::Schedule))?;
        if schedule.is_empty() {
            return Err(ReelError::precondition(
                "no frame starts before the duration ceiling",
            ));
        }

        let bg = load_background(background, canvas)
            .and_then(|img| image_paint(&PreparedImage::from_rgba(img)))
            .map_err(in_stage(Stage::Load))?;
        let motion = MotionEngine::new(self.effects.clone(), canvas);
        let mut surface = CpuCanvas::new(canvas).map_err(in_stage(Stage::Render))?;

        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
        })
        .map_err(in_stage(Stage::Encode))?;

        let mut stats = RenderStats {
            duration_secs: schedule.duration_secs,
            total_frames: schedule.total_frames,
            segments: schedule.segments.len(),
            fallback_segments: 0,
            bpm,
        };

        for seg in &schedule.segments {
            let loaded: Option<ImagePaint> = match seg.source {
                SegmentSource::Background => None,
                SegmentSource::Frame(i) => {
                    let path = &frames[i].image_path;
                    match load_image_fitted(path, canvas).and_then(|img| image_paint(&img)) {
                        Ok(paint) => Some(paint),
                        Err(e) => {
                            tracing::warn!(
                                path = %path.display(),
                                error = %e,
                                "frame image unusable, showing the background"
                            );
                            stats.fallback_segments += 1;
                            None
                        }
                    }
                }
            };
            let paint = loaded.as_ref().unwrap_or(&bg);

            for idx in seg.frames.iter() {
                let t = fps.frame_to_secs(idx);
                surface.begin();
                surface.draw_image(paint, motion.frame_transform(bpm, t));
                let mut frame = surface.finish();
                scale_premul_rgba8(&mut frame.data, motion.fade_out_gain(t, schedule.duration_secs));
                sink.push_frame(idx, &frame)
                    .map_err(in_stage(Stage::Encode))?;
            }
        }

        sink.end().map_err(in_stage(Stage::Encode))?;
        Ok(stats)
    }

    fn mux_audio(
        &self,
        audio: &Path,
        duration_secs: f64,
        silent: &Path,
        pcm_path: &Path,
        output: &Path,
    ) -> ReelResult<()> {
        let pcm = decode_audio_f32_stereo(audio, MIX_SAMPLE_RATE).map_err(in_stage(Stage::Mux))?;
        tracing::debug!(
            source_secs = pcm.duration_secs(),
            target_secs = duration_secs,
            "fitting audio"
        );
        let mut samples = fit_to_duration(&pcm, duration_secs).map_err(in_stage(Stage::Mux))?;
        apply_fade_out(
            &mut samples,
            pcm.channels,
            pcm.sample_rate,
            self.effects.fade_duration,
        );
        write_f32le_file(&samples, pcm_path).map_err(in_stage(Stage::Mux))?;

        mux_video_with_pcm(
            silent,
            PcmInput {
                path: pcm_path,
                sample_rate: pcm.sample_rate,
                channels: pcm.channels,
            },
            &self.video.audio_codec,
            duration_secs,
            output,
        )
    }
}

fn check_inputs(frames: &[RenderedFrame], background: &Path) -> ReelResult<()> {
    if frames.is_empty() {
        return Err(ReelError::precondition("no frames to compose"));
    }
    if !background.is_file() {
        return Err(ReelError::precondition(format!(
            "background image '{}' not found",
            background.display()
        )));
    }
    Ok(())
}

/// Tag a failure with `stage`, leaving stage and precondition errors as they are.
fn in_stage(stage: Stage) -> impl Fn(ReelError) -> ReelError {
    move |e| match e {
        ReelError::Stage { .. } | ReelError::Precondition(_) => e,
        other => ReelError::stage(stage, other.to_string()),
    }
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take()
            && let Err(e) = std::fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::debug!(path = %path.display(), error = %e, "could not remove temp file");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
