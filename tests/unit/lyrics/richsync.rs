use super::*;

#[test]
fn parses_bare_list() {
    let body = r#"[{"ts": 1.2, "te": 2.0, "l": [{"c": "Hel", "o": 0}, {"c": "lo ", "o": 0.2}]},
                  {"ts": 3.4, "l": [{"c": "world"}]}]"#;
    let lines = parse_richsync(body);
    assert_eq!(
        lines,
        vec![LyricLine::new(1.2, "Hello"), LyricLine::new(3.4, "world")]
    );
}

#[test]
fn parses_lyrics_object() {
    let body = r#"{"lyrics": [{"ts": "0.5", "l": [{"c": "x"}]}]}"#;
    assert_eq!(parse_richsync(body), vec![LyricLine::new(0.5, "x")]);
}

#[test]
fn skips_incomplete_entries() {
    let body = r#"[{"ts": 1.0}, {"l": [{"c": "no ts"}]}, {"ts": -1, "l": []}, {"ts": 2.0, "l": []}]"#;
    assert_eq!(parse_richsync(body), vec![LyricLine::new(2.0, "")]);
}

#[test]
fn other_json_shapes_yield_nothing() {
    assert!(parse_richsync(r#"{"foo": 1}"#).is_empty());
    assert!(parse_richsync("42").is_empty());
}

#[test]
fn invalid_json_falls_back_to_lrc() {
    let lines = parse_richsync("[00:04.00] from lrc");
    assert_eq!(lines, vec![LyricLine::new(4.0, "from lrc")]);
}
