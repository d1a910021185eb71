use super::*;

#[test]
fn parses_all_stamp_forms() {
    let text = "[00:01.50] first\n[00:02:25] second\n[01:03.125] third";
    let lines = parse_lrc(text);
    assert_eq!(lines.len(), 3);
    assert!((lines[0].timestamp - 1.5).abs() < 1e-9);
    assert_eq!(lines[0].text, "first");
    assert!((lines[1].timestamp - 2.25).abs() < 1e-9);
    assert!((lines[2].timestamp - 63.125).abs() < 1e-9);
    assert_eq!(lines[2].text, "third");
}

#[test]
fn skips_metadata_and_untimed_lines() {
    let text = "[ar:Someone]\n[ti:Song]\n[length:03:20]\nplain text\n\n[00:05.00]hello";
    let lines = parse_lrc(text);
    assert_eq!(lines, vec![LyricLine::new(5.0, "hello")]);
}

#[test]
fn keeps_empty_instrumental_lines() {
    let lines = parse_lrc("[00:10.00]\n[00:12.00] ♪ ");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text, "");
    assert_eq!(lines[1].text, "♪");
}

#[test]
fn repeated_stamps_expand() {
    let lines = parse_lrc("[00:01.00][00:30.00]chorus");
    assert_eq!(
        lines,
        vec![LyricLine::new(1.0, "chorus"), LyricLine::new(30.0, "chorus")]
    );
}

#[test]
fn handles_crlf_and_indentation() {
    let lines = parse_lrc("  [00:01.00] a\r\n[00:02.00] b\r\n");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].text, "b");
}
