use crate::config::VideoConfig;
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::RenderedFrame;

/// What a segment shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentSource {
    /// The bare background, before the first timestamped frame.
    Background,
    /// Index into the ordered frame list.
    Frame(usize),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start_secs: f64,
    pub end_secs: f64,
    /// Output frames `[round(start * fps), round(end * fps))`.
    pub frames: FrameRange,
    pub source: SegmentSource,
}

impl Segment {
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// Ordered, contiguous segments covering `[0, duration_secs)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schedule {
    pub segments: Vec<Segment>,
    pub duration_secs: f64,
    pub total_frames: u64,
}

impl Schedule {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment owning output frame `f`.
    pub fn segment_at(&self, f: FrameIndex) -> Option<&Segment> {
        let i = self
            .segments
            .partition_point(|s| s.frames.end.0 <= f.0);
        self.segments.get(i).filter(|s| s.frames.contains(f))
    }
}

/// Turn ordered frames into timeline segments bounded by `video.max_duration_secs`.
///
/// A frame lasts until the next frame's timestamp; the last one lasts
/// `default_last_segment_secs`. Scanning stops at the first frame starting at or past the
/// ceiling, and at the first frame whose clamped duration is not positive (such as a frame whose
/// successor shares its timestamp).
pub fn schedule_segments(frames: &[RenderedFrame], video: &VideoConfig) -> ReelResult<Schedule> {
    let fps = video.fps()?;
    let max = video.max_duration_secs;
    if !max.is_finite() || max <= 0.0 {
        return Err(ReelError::validation("max_duration_secs must be > 0"));
    }
    if frames
        .iter()
        .any(|f| !f.source_timestamp.is_finite() || f.source_timestamp < 0.0)
    {
        return Err(ReelError::validation(
            "frame timestamps must be finite and >= 0",
        ));
    }

    let mut segments = Vec::with_capacity(frames.len() + 1);
    let mut push = |start: f64, end: f64, source: SegmentSource| -> ReelResult<()> {
        let frames = FrameRange::new(fps.secs_to_frame_round(start), fps.secs_to_frame_round(end))?;
        segments.push(Segment {
            start_secs: start,
            end_secs: end,
            frames,
            source,
        });
        Ok(())
    };

    if let Some(first) = frames.first()
        && first.source_timestamp > 0.0
    {
        push(0.0, first.source_timestamp.min(max), SegmentSource::Background)?;
    }

    for (i, frame) in frames.iter().enumerate() {
        let start = frame.source_timestamp;
        if start >= max {
            break;
        }
        let end = frames
            .get(i + 1)
            .map(|next| next.source_timestamp)
            .unwrap_or(start + video.default_last_segment_secs)
            .min(max);
        if end <= start {
            tracing::debug!(index = i, start, "zero-length segment, timeline ends here");
            break;
        }
        push(start, end, SegmentSource::Frame(i))?;
    }

    let duration_secs = segments.last().map(|s| s.end_secs).unwrap_or(0.0);
    let total_frames = segments.last().map(|s| s.frames.end.0).unwrap_or(0);
    Ok(Schedule {
        segments,
        duration_secs,
        total_frames,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/schedule.rs"]
mod tests;
