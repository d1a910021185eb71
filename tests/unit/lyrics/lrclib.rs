use super::*;

#[test]
fn get_url_encodes_query() {
    let p = LrclibProvider::new(reqwest::Client::new(), "https://lrclib.net/api/");
    assert_eq!(
        p.get_url(" The Band ", "Song & Dance"),
        "https://lrclib.net/api/get?artist_name=The%20Band&track_name=Song%20%26%20Dance"
    );
}

#[test]
fn response_reads_synced_lyrics() {
    let body: GetResponse =
        serde_json::from_str(r#"{"id": 1, "plainLyrics": "a", "syncedLyrics": "[00:01.00] a"}"#)
            .unwrap();
    assert_eq!(body.synced_lyrics.as_deref(), Some("[00:01.00] a"));

    let body: GetResponse = serde_json::from_str(r#"{"syncedLyrics": null}"#).unwrap();
    assert!(body.synced_lyrics.is_none());
}
