use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::assets::text::TextBrushRgba8;
use crate::foundation::core::{Affine, Canvas, Vec2};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::FrameRGBA;

/// Image paint plus its intrinsic size.
#[derive(Clone)]
pub(crate) struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

pub(crate) fn image_paint(img: &PreparedImage) -> ReelResult<ImagePaint> {
    let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
    Ok(ImagePaint {
        paint: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
        w: img.width,
        h: img.height,
    })
}

pub(crate) fn font_data(font_bytes: &Arc<Vec<u8>>) -> vello_cpu::peniko::FontData {
    vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes.to_vec()), 0)
}

/// Reusable `vello_cpu` context and readback target for one canvas size.
pub(crate) struct CpuCanvas {
    canvas: Canvas,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl CpuCanvas {
    pub(crate) fn new(canvas: Canvas) -> ReelResult<Self> {
        let w: u16 = canvas
            .width
            .try_into()
            .map_err(|_| ReelError::validation("canvas width exceeds u16"))?;
        let h: u16 = canvas
            .height
            .try_into()
            .map_err(|_| ReelError::validation("canvas height exceeds u16"))?;
        Ok(Self {
            canvas,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    pub(crate) fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Start a frame cleared to opaque black.
    pub(crate) fn begin(&mut self) {
        self.ctx.reset();
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.fill_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width),
            f64::from(self.canvas.height),
            [0, 0, 0, 255],
        );
    }

    /// Fill an axis-aligned rectangle with a straight-alpha colour.
    pub(crate) fn fill_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, rgba: [u8; 4]) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            rgba[0], rgba[1], rgba[2], rgba[3],
        ));
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(x0, y0, x1, y1));
    }

    /// Draw `paint` with its top-left at the origin of `transform`.
    pub(crate) fn draw_image(&mut self, paint: &ImagePaint, transform: Affine) {
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint(paint.paint.clone());
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(paint.w),
            f64::from(paint.h),
        ));
    }

    /// Draw a laid-out paragraph with each line centred in `box_width`.
    ///
    /// `origin` is the top-left of the paragraph box. `color` overrides the layout brushes.
    pub(crate) fn draw_layout(
        &mut self,
        layout: &parley::Layout<TextBrushRgba8>,
        font: &vello_cpu::peniko::FontData,
        origin: Vec2,
        box_width: f32,
        color: Option<[u8; 4]>,
    ) {
        for line in layout.lines() {
            let dx = f64::from((box_width - line.metrics().advance).max(0.0) / 2.0);
            self.ctx.set_transform(affine_to_cpu(Affine::translate(
                origin + Vec2::new(dx, 0.0),
            )));
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let [r, g, b, a] = color.unwrap_or_else(|| {
                    let brush = run.style().brush;
                    [brush.r, brush.g, brush.b, brush.a]
                });
                self.ctx
                    .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    /// Rasterize everything drawn since [`CpuCanvas::begin`].
    pub(crate) fn finish(&mut self) -> FrameRGBA {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::validation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::validation("pixmap height exceeds u16"))?;
    if bytes.len() != (width as usize) * (height as usize) * 4 {
        return Err(ReelError::validation("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
