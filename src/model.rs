use std::path::PathBuf;

/// One synchronized lyric line.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LyricLine {
    /// Start time in seconds, `>= 0`.
    pub timestamp: f64,
    pub text: String,
}

impl LyricLine {
    pub fn new(timestamp: f64, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            text: text.into(),
        }
    }
}

/// Stable ascending sort by timestamp; ties keep provider order.
pub fn sort_lyrics(lines: &mut [LyricLine]) {
    lines.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
}

/// A rasterized lyric (or title) image plus its position on the source timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderedFrame {
    pub source_timestamp: f64,
    pub image_path: PathBuf,
    pub is_title: bool,
}

impl RenderedFrame {
    pub fn lyric(source_timestamp: f64, image_path: impl Into<PathBuf>) -> Self {
        Self {
            source_timestamp,
            image_path: image_path.into(),
            is_title: false,
        }
    }

    pub fn title(image_path: impl Into<PathBuf>) -> Self {
        Self {
            source_timestamp: 0.0,
            image_path: image_path.into(),
            is_title: true,
        }
    }
}

/// Track picked from the catalog.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackInfo {
    pub id: u64,
    pub artist: String,
    pub title: String,
    pub isrc: Option<String>,
    pub link: Option<String>,
}

impl TrackInfo {
    /// Working-directory name, `"<artist> - <title>"` with path separators replaced.
    pub fn folder_name(&self) -> String {
        format!("{} - {}", self.artist, self.title)
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect::<String>()
            .trim()
            .to_owned()
    }
}

#[cfg(test)]
#[path = "../tests/unit/model.rs"]
mod tests;
