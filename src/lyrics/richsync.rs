use serde_json::Value;

use crate::lyrics::lrc::parse_lrc;
use crate::model::LyricLine;

/// Parse a richsync body into one line per `{ts, l: [{c}]}` entry.
///
/// The body may be a bare array or an object with a `lyrics` array. Entries missing `ts` or `l`
/// are skipped. A body that is not JSON is parsed as LRC.
pub fn parse_richsync(body: &str) -> Vec<LyricLine> {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return parse_lrc(body),
    };

    let entries = match &value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("lyrics") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    entries.iter().filter_map(parse_entry).collect()
}

fn parse_entry(item: &Value) -> Option<LyricLine> {
    let ts = match item.get("ts")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    if !ts.is_finite() || ts < 0.0 {
        return None;
    }
    let text: String = item
        .get("l")?
        .as_array()
        .map(|chars| {
            chars
                .iter()
                .filter_map(|c| c.get("c").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    Some(LyricLine::new(ts, text.trim()))
}

#[cfg(test)]
#[path = "../../tests/unit/lyrics/richsync.rs"]
mod tests;
