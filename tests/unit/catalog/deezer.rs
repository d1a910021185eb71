use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;

const PLAYLIST: &str = r#"{"id": 1, "tracks": {"data": [
    {"id": 11, "title": "One", "artist": {"id": 5, "name": "A"}, "isrc": "US1", "link": "https://www.deezer.com/track/11"},
    {"id": 12, "title": "Two", "artist": {"name": "B"}, "isrc": ""}
]}}"#;

#[test]
fn playlist_maps_to_track_info() {
    let tracks = parse_playlist(PLAYLIST).unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].artist, "A");
    assert_eq!(tracks[0].isrc.as_deref(), Some("US1"));
    assert_eq!(tracks[1].isrc, None);
    assert_eq!(tracks[1].link, None);
}

#[test]
fn malformed_playlist_is_a_serde_error() {
    let err = parse_playlist(r#"{"error": {}}"#).unwrap_err();
    assert!(matches!(err, ReelError::Serde(_)));
}

#[test]
fn pick_is_from_the_list_and_none_when_empty() {
    let tracks = parse_playlist(PLAYLIST).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..10 {
        let t = pick_track(&tracks, &mut rng).unwrap();
        assert!(tracks.contains(&t));
    }
    assert!(pick_track(&[], &mut rng).is_none());
}

#[test]
fn lookup_path_handles_album_and_track_links() {
    assert_eq!(
        lookup_path("https://www.deezer.com/fr/album/302127?utm=x").as_deref(),
        Some("album/302127")
    );
    assert_eq!(
        lookup_path("https://www.deezer.com/track/3135556").as_deref(),
        Some("track/3135556")
    );
    assert!(lookup_path("https://www.deezer.com/artist/27").is_none());
    assert!(lookup_path("https://www.deezer.com/track/").is_none());
}

#[test]
fn cover_preference_order() {
    let both = json!({"album": {"cover_xl": "album_xl", "cover_big": "album_big"}, "cover_xl": "xl"});
    assert_eq!(cover_from_value(&both).as_deref(), Some("album_xl"));

    let album = json!({"cover_big": "big", "cover_xl": "xl"});
    assert_eq!(cover_from_value(&album).as_deref(), Some("xl"));

    let big_only = json!({"album": {"cover_big": "album_big"}, "cover_big": "big"});
    assert_eq!(cover_from_value(&big_only).as_deref(), Some("album_big"));

    assert!(cover_from_value(&json!({"title": "x"})).is_none());
}
