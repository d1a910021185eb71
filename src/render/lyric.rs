use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use rayon::prelude::*;

use crate::assets::background::{darken, darken_gradient, load_background, soften};
use crate::assets::decode::PreparedImage;
use crate::assets::text::{TextBrushRgba8, TextLayoutEngine, display_text, lyric_font_size};
use crate::config::VideoConfig;
use crate::foundation::core::{Affine, Canvas, Vec2};
use crate::foundation::error::{ReelError, ReelResult, Stage};
use crate::model::{LyricLine, RenderedFrame};
use crate::render::backend::FrameRGBA;
use crate::render::cpu::{CpuCanvas, ImagePaint, font_data, image_paint};
use crate::timeline::frames::{TITLE_CARD_FILE, lyric_file_name};

const WHITE: TextBrushRgba8 = TextBrushRgba8::opaque(255, 255, 255);
const SILVER: TextBrushRgba8 = TextBrushRgba8::opaque(200, 200, 200);
const SHADOW: [u8; 4] = [0, 0, 0, 100];
const OUTLINE: [u8; 4] = [0, 0, 0, 180];
const JPEG_QUALITY: u8 = 95;

/// Rasterizes lyric lines and the title card over a shared, pre-processed background.
///
/// The background and font are decoded once and shared read-only across workers.
pub struct LyricFrameRenderer {
    canvas: Canvas,
    base: Arc<PreparedImage>,
    title_base: Arc<PreparedImage>,
    font_bytes: Arc<Vec<u8>>,
    out_dir: PathBuf,
    threads: Option<usize>,
}

impl LyricFrameRenderer {
    /// Load the background and font and target `out_dir` for written frames.
    pub fn new(
        background: &Path,
        font: &Path,
        out_dir: impl Into<PathBuf>,
        video: &VideoConfig,
    ) -> ReelResult<Self> {
        let canvas = video.canvas()?;
        let mut base = soften(&load_background(background, canvas)?);
        let mut title_base = base.clone();
        darken_gradient(&mut base, 30, 10);
        darken(&mut title_base, 120);

        let font_bytes = std::fs::read(font).map_err(|e| {
            ReelError::precondition(format!("failed to read font '{}': {e}", font.display()))
        })?;
        let font_bytes = Arc::new(font_bytes);
        // Fail early on an unusable font rather than once per worker.
        TextLayoutEngine::new(&font_bytes)?;

        Ok(Self {
            canvas,
            base: Arc::new(PreparedImage::from_rgba(base)),
            title_base: Arc::new(PreparedImage::from_rgba(title_base)),
            font_bytes,
            out_dir: out_dir.into(),
            threads: None,
        })
    }

    /// Bound the worker pool used by [`LyricFrameRenderer::render_all`].
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Create the output folder, removing frames left by an earlier run.
    pub fn prepare_output_dir(&self) -> ReelResult<()> {
        if self.out_dir.is_dir() {
            let entries = std::fs::read_dir(&self.out_dir)
                .with_context(|| format!("read '{}'", self.out_dir.display()))?;
            for entry in entries {
                let path = entry.context("read frame folder entry")?.path();
                if path.is_file() {
                    std::fs::remove_file(&path)
                        .with_context(|| format!("remove stale frame '{}'", path.display()))?;
                }
            }
        } else {
            std::fs::create_dir_all(&self.out_dir)
                .with_context(|| format!("create frame folder '{}'", self.out_dir.display()))?;
        }
        Ok(())
    }

    /// Render one lyric line to `lyrics_<timestamp>.jpg`.
    pub fn render_line(&self, line: &LyricLine) -> ReelResult<RenderedFrame> {
        let path = self.out_dir.join(lyric_file_name(line.timestamp));
        let mut worker = self.worker()?;
        self.render_line_to(&mut worker, line, &path)?;
        Ok(RenderedFrame::lyric(line.timestamp, path))
    }

    /// Render the title card to `title_card.jpg`.
    #[tracing::instrument(skip(self))]
    pub fn render_title(&self, artist: &str, title: &str) -> ReelResult<RenderedFrame> {
        let path = self.out_dir.join(TITLE_CARD_FILE);
        let mut worker = self.worker()?;
        let frame = worker.draw_title(self.canvas, artist, title)?;
        write_jpeg(&frame, &path)?;
        Ok(RenderedFrame::title(path))
    }

    /// Render every line on a bounded pool, joining before returning.
    ///
    /// A line that fails to render is logged and still yields a frame; its image path does not
    /// exist, so the compositor shows the background for that segment.
    #[tracing::instrument(skip(self, lines), fields(lines = lines.len()))]
    pub fn render_all(&self, lines: &[LyricLine]) -> ReelResult<Vec<RenderedFrame>> {
        let jobs = unique_paths(lines, &self.out_dir);
        let pool = build_thread_pool(self.threads)?;

        let frames = pool.install(|| {
            jobs.par_iter()
                .map_init(
                    || self.worker(),
                    |worker, (line, path)| {
                        let result = match worker {
                            Ok(w) => self.render_line_to(w, line, path),
                            Err(e) => Err(ReelError::stage(
                                Stage::Render,
                                format!("frame worker unavailable: {e}"),
                            )),
                        };
                        if let Err(e) = result {
                            tracing::warn!(
                                timestamp = line.timestamp,
                                error = %e,
                                "lyric frame failed, segment will show the background"
                            );
                            remove_partial_frame(path);
                        }
                        RenderedFrame::lyric(line.timestamp, path.clone())
                    },
                )
                .collect::<Vec<_>>()
        });
        Ok(frames)
    }

    fn worker(&self) -> ReelResult<FrameWorker> {
        Ok(FrameWorker {
            surface: CpuCanvas::new(self.canvas)?,
            text: TextLayoutEngine::new(&self.font_bytes)?,
            font: font_data(&self.font_bytes),
            base: image_paint(&self.base)?,
            title_base: image_paint(&self.title_base)?,
        })
    }

    fn render_line_to(
        &self,
        worker: &mut FrameWorker,
        line: &LyricLine,
        path: &Path,
    ) -> ReelResult<()> {
        let frame = worker.draw_line(self.canvas, &line.text)?;
        write_jpeg(&frame, path)
    }
}

struct FrameWorker {
    surface: CpuCanvas,
    text: TextLayoutEngine,
    font: vello_cpu::peniko::FontData,
    base: ImagePaint,
    title_base: ImagePaint,
}

impl FrameWorker {
    fn draw_line(&mut self, canvas: Canvas, raw: &str) -> ReelResult<FrameRGBA> {
        let text = display_text(raw);
        let words = text.split_whitespace().count();
        let width = f64::from(canvas.width);
        let scale = width / 1080.0;
        let box_width = (width * 0.8) as f32;
        let size = lyric_font_size(words, canvas.width);

        let layout = self.text.layout(&text, size, WHITE, Some(box_width))?;
        let origin = Vec2::new(
            width * 0.1,
            (f64::from(canvas.height) - f64::from(layout.height())) / 2.0,
        );

        self.surface.begin();
        self.surface.draw_image(&self.base, Affine::IDENTITY);

        let shadow = (4.0 * scale).max(1.0);
        self.surface.draw_layout(
            &layout,
            &self.font,
            origin + Vec2::new(shadow, shadow),
            box_width,
            Some(SHADOW),
        );
        let outline = (2.0 * scale).round().max(1.0) as i32;
        for dx in -outline..=outline {
            for dy in -outline..=outline {
                if dx == 0 && dy == 0 {
                    continue;
                }
                self.surface.draw_layout(
                    &layout,
                    &self.font,
                    origin + Vec2::new(f64::from(dx), f64::from(dy)),
                    box_width,
                    Some(OUTLINE),
                );
            }
        }
        self.surface
            .draw_layout(&layout, &self.font, origin, box_width, None);
        Ok(self.surface.finish())
    }

    fn draw_title(&mut self, canvas: Canvas, artist: &str, title: &str) -> ReelResult<FrameRGBA> {
        let width = f64::from(canvas.width);
        let scale = width / 1080.0;
        let box_width = (width * 0.8) as f32;

        let title_layout = self.text.layout(
            &display_text(title),
            ((0.12 * width) as f32).max(1.0),
            WHITE,
            Some(box_width),
        )?;
        let artist_layout = self.text.layout(
            &display_text(artist),
            ((0.08 * width) as f32).max(1.0),
            SILVER,
            Some(box_width),
        )?;

        let title_y = f64::from(canvas.height) / 2.0 - 100.0 * scale;
        let artist_y = title_y + f64::from(title_layout.height()).max(120.0 * scale);
        let rule_y = artist_y + f64::from(artist_layout.height()).max(150.0 * scale);
        let rule_w = 200.0 * scale;
        let rule_x = (width - rule_w) / 2.0;

        self.surface.begin();
        self.surface.draw_image(&self.title_base, Affine::IDENTITY);
        self.surface.draw_layout(
            &title_layout,
            &self.font,
            Vec2::new(width * 0.1, title_y),
            box_width,
            None,
        );
        self.surface.draw_layout(
            &artist_layout,
            &self.font,
            Vec2::new(width * 0.1, artist_y),
            box_width,
            None,
        );
        self.surface.fill_rect(
            rule_x,
            rule_y,
            rule_x + rule_w,
            rule_y + (3.0 * scale).max(1.0),
            [255, 255, 255, 255],
        );
        Ok(self.surface.finish())
    }
}

/// Pair each line with a distinct output path; repeated timestamps get a numeric suffix.
fn unique_paths(lines: &[LyricLine], dir: &Path) -> Vec<(LyricLine, PathBuf)> {
    let mut seen = HashMap::<String, usize>::new();
    lines
        .iter()
        .map(|line| {
            let name = lyric_file_name(line.timestamp);
            let n = seen.entry(name.clone()).or_insert(0);
            let unique = if *n == 0 {
                name
            } else {
                let stem = name.trim_end_matches(".jpg");
                format!("{stem}-{n}.jpg")
            };
            *n += 1;
            (line.clone(), dir.join(unique))
        })
        .collect()
}

/// Drop whatever a failed render left at `path`; a missing file is expected.
fn remove_partial_frame(path: &Path) {
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::debug!(path = %path.display(), error = %e, "could not remove partial frame");
    }
}

fn write_jpeg(frame: &FrameRGBA, path: &Path) -> ReelResult<()> {
    let rgb = frame
        .to_rgb_image()
        .ok_or_else(|| ReelError::validation("frame buffer does not match its dimensions"))?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("create frame image '{}'", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .with_context(|| format!("encode jpeg '{}'", path.display()))?;
    Ok(())
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::validation(
            "render threads must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReelError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/lyric.rs"]
mod tests;
