use super::*;

#[test]
fn sort_lyrics_is_stable_for_ties() {
    let mut lines = vec![
        LyricLine::new(5.0, "c"),
        LyricLine::new(1.0, "a"),
        LyricLine::new(5.0, "d"),
        LyricLine::new(2.5, "b"),
    ];
    sort_lyrics(&mut lines);
    let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "b", "c", "d"]);
}

#[test]
fn title_frames_start_at_zero() {
    let f = RenderedFrame::title("title_card.jpg");
    assert!(f.is_title);
    assert_eq!(f.source_timestamp, 0.0);
}

#[test]
fn folder_name_replaces_separators() {
    let t = TrackInfo {
        id: 1,
        artist: "AC/DC".to_owned(),
        title: "T.N.T: Live?".to_owned(),
        isrc: None,
        link: None,
    };
    assert_eq!(t.folder_name(), "AC_DC - T.N.T_ Live_");
}
