use std::path::Path;

use crate::foundation::error::{ReelError, ReelResult};
use crate::model::RenderedFrame;

/// Reserved file name of the title card.
pub const TITLE_CARD_FILE: &str = "title_card.jpg";

const LYRIC_PREFIX: &str = "lyrics_";
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// File name for a lyric frame starting at `timestamp`.
pub fn lyric_file_name(timestamp: f64) -> String {
    format!("{LYRIC_PREFIX}{timestamp:.2}.jpg")
}

/// Title frame first, then lyric frames by timestamp. Ties keep their relative order.
pub fn order_frames(mut frames: Vec<RenderedFrame>) -> Vec<RenderedFrame> {
    frames.sort_by(|a, b| {
        b.is_title
            .cmp(&a.is_title)
            .then(a.source_timestamp.total_cmp(&b.source_timestamp))
    });
    frames
}

/// Give lyric frames the timestamp their file name schedules at, so in-process frames and a
/// rescanned image folder produce the same timeline. Falls back to whole seconds for names that
/// do not follow the `lyrics_<ts>` pattern.
pub fn folder_timestamps(frames: Vec<RenderedFrame>) -> Vec<RenderedFrame> {
    let frames = frames
        .into_iter()
        .map(|mut frame| {
            if !frame.is_title {
                frame.source_timestamp = frame
                    .image_path
                    .file_name()
                    .and_then(|n| parse_frame_name(&n.to_string_lossy()))
                    .map(|(ts, _)| ts)
                    .unwrap_or_else(|| frame.source_timestamp.trunc());
            }
            frame
        })
        .collect();
    order_frames(frames)
}

/// Classify an image file name.
///
/// `title_card.jpg` is the title frame. `lyrics_<ts>.<ext>` is a lyric frame at the integer part
/// of `<ts>`. Anything else is `None`.
pub fn parse_frame_name(name: &str) -> Option<(f64, bool)> {
    if name == TITLE_CARD_FILE {
        return Some((0.0, true));
    }
    let (stem, ext) = name.rsplit_once('.')?;
    if !IMAGE_EXTENSIONS
        .iter()
        .any(|e| e.eq_ignore_ascii_case(ext))
    {
        return None;
    }
    let ts = stem.strip_prefix(LYRIC_PREFIX)?;
    let whole = ts.split('.').next()?;
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let secs = whole.parse::<u64>().ok()?;
    Some((secs as f64, false))
}

/// Collect frames from an image folder, ordered for scheduling.
pub fn scan_frame_folder(dir: &Path) -> ReelResult<Vec<RenderedFrame>> {
    if !dir.is_dir() {
        return Err(ReelError::precondition(format!(
            "image folder '{}' does not exist",
            dir.display()
        )));
    }

    use anyhow::Context as _;
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("read image folder '{}'", dir.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in '{}'", dir.display()))?;
        if !entry.path().is_file() {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    // read_dir order is platform dependent.
    names.sort();

    let mut frames = Vec::with_capacity(names.len());
    for name in names {
        match parse_frame_name(&name) {
            Some((ts, true)) => frames.push(RenderedFrame {
                source_timestamp: ts,
                image_path: dir.join(&name),
                is_title: true,
            }),
            Some((ts, false)) => frames.push(RenderedFrame::lyric(ts, dir.join(&name))),
            None => tracing::warn!(file = %name, "skipping unrecognised file in image folder"),
        }
    }
    Ok(order_frames(frames))
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/frames.rs"]
mod tests;
