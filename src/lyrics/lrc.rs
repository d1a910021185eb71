use std::sync::LazyLock;

use regex::Regex;

use crate::model::LyricLine;

/// One or more leading `[mm:ss.xx]` stamps followed by the line text.
static LRC_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:\[\d{2,}:\d{2}[.:]\d{2,3}\])+)(.*)$").expect("valid LRC line regex")
});

static LRC_STAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d{2,}):(\d{2})[.:](\d{2,3})\]").expect("valid LRC timestamp regex")
});

/// Parse LRC text. Metadata tags and untimed lines are skipped.
///
/// Accepts `[mm:ss.xx]`, `[mm:ss:xx]` and `[mm:ss.xxx]`. A line with several stamps yields one
/// entry per stamp. Output keeps source order.
pub fn parse_lrc(text: &str) -> Vec<LyricLine> {
    let mut out = Vec::new();
    for raw in text.lines() {
        let line = raw.trim();
        let Some(caps) = LRC_LINE.captures(line) else {
            continue;
        };
        let stamps = caps.get(1).map_or("", |m| m.as_str());
        let body = caps.get(2).map_or("", |m| m.as_str()).trim();

        for stamp in LRC_STAMP.captures_iter(stamps) {
            let minutes = stamp.get(1).map_or("0", |m| m.as_str());
            let seconds = stamp.get(2).map_or("0", |m| m.as_str());
            let fraction = stamp.get(3).map_or("0", |m| m.as_str());
            if let Some(ts) = stamp_seconds(minutes, seconds, fraction) {
                out.push(LyricLine::new(ts, body));
            }
        }
    }
    out
}

fn stamp_seconds(minutes: &str, seconds: &str, fraction: &str) -> Option<f64> {
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    let frac: u64 = fraction.parse().ok()?;
    let frac = match fraction.len() {
        2 => frac as f64 / 100.0,
        _ => frac as f64 / 1000.0,
    };
    Some((minutes * 60 + seconds) as f64 + frac)
}

#[cfg(test)]
#[path = "../../tests/unit/lyrics/lrc.rs"]
mod tests;
