use std::f64::consts::TAU;

use crate::config::EffectConfig;
use crate::foundation::core::{Affine, Canvas, Vec2};

/// Tempo to drive motion with: `estimated` when it is a usable bpm, `default_bpm` otherwise.
pub fn effective_bpm(estimated: Option<f64>, default_bpm: f64) -> f64 {
    match estimated {
        Some(bpm) if bpm.is_finite() && bpm > 0.0 => bpm,
        _ => default_bpm,
    }
}

/// Per-frame motion parameters for a fixed canvas and effect set.
#[derive(Clone, Debug)]
pub struct MotionEngine {
    effects: EffectConfig,
    canvas: Canvas,
}

impl MotionEngine {
    pub fn new(effects: EffectConfig, canvas: Canvas) -> Self {
        Self { effects, canvas }
    }

    pub fn effects(&self) -> &EffectConfig {
        &self.effects
    }

    /// Zoom pulse: a sharp attack over the first quarter beat, then a linear release.
    ///
    /// Always within `[zoom_min, zoom_max]` and periodic with period `60 / bpm`.
    pub fn zoom_scale(&self, bpm: f64, t: f64) -> f64 {
        let e = &self.effects;
        let beat = 60.0 / bpm;
        let range = e.zoom_max - e.zoom_min;
        let phase = t.rem_euclid(beat);
        let attack = beat / 4.0;

        let z = if phase < attack {
            e.zoom_min + range * phase * e.zoom_sharpness
        } else {
            let decay = phase - attack;
            e.zoom_max - range * decay * e.zoom_decay_rate / beat
        };
        z.clamp(e.zoom_min, e.zoom_max)
    }

    /// Sway offsets in output pixels; one full cycle every `sway_speed` beats.
    pub fn sway_offsets(&self, bpm: f64, t: f64) -> (f64, f64) {
        let e = &self.effects;
        let freq = (bpm / 60.0) / e.sway_speed;
        let phase = TAU * freq * t;
        (e.sway_amplitude_x * phase.sin(), e.sway_amplitude_y * phase.cos())
    }

    /// Source-to-canvas transform at time `t`: scale about the canvas centre, then sway.
    pub fn frame_transform(&self, bpm: f64, t: f64) -> Affine {
        let z = self.zoom_scale(bpm, t);
        let (sx, sy) = self.sway_offsets(bpm, t);
        let (cx, cy) = self.canvas.center();
        let zoom = Affine::new([z, 0.0, 0.0, z, (1.0 - z) * cx, (1.0 - z) * cy]);
        Affine::translate(Vec2::new(sx, sy)) * zoom
    }

    /// Linear fade from 1 to 0 over the final `fade_duration` seconds before `duration`.
    pub fn fade_out_gain(&self, t: f64, duration: f64) -> f32 {
        fade_out_gain(t, duration, self.effects.fade_duration)
    }
}

/// Gain at time `t` of a linear fade ending at `duration`. A zero-length fade is a no-op.
pub fn fade_out_gain(t: f64, duration: f64, fade: f64) -> f32 {
    if fade <= 0.0 {
        return 1.0;
    }
    let remaining = (duration - t).max(0.0);
    (remaining / fade).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
#[path = "../../tests/unit/effects/motion.rs"]
mod tests;
