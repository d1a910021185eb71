use super::*;

#[test]
fn display_text_uppercases_and_fills_blank_lines() {
    assert_eq!(display_text("  hello world "), "HELLO WORLD");
    assert_eq!(display_text(""), "...");
    assert_eq!(display_text("   \t"), "...");
    assert_eq!(display_text("ça va"), "ÇA VA");
}

#[test]
fn font_size_steps_down_with_word_count() {
    // base = 8% of 1080 = 86.
    assert_eq!(lyric_font_size(1, 1080), 106.0);
    assert_eq!(lyric_font_size(3, 1080), 106.0);
    assert_eq!(lyric_font_size(4, 1080), 96.0);
    assert_eq!(lyric_font_size(6, 1080), 96.0);
    assert_eq!(lyric_font_size(10, 1080), 86.0);
    assert_eq!(lyric_font_size(11, 1080), 76.0);
}

#[test]
fn font_size_never_drops_below_one_pixel() {
    assert_eq!(lyric_font_size(20, 36), 1.0);
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let bytes = std::sync::Arc::new(vec![0u8; 16]);
    assert!(TextLayoutEngine::new(&bytes).is_err());
}
