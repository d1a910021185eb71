use super::*;
use serde_json::json;

#[test]
fn variations_cover_plain_official_audio_lyrics_and_quoted() {
    let q = query_variations("Daft Punk", "Get Lucky");
    assert_eq!(q[0], "Daft Punk Get Lucky");
    assert_eq!(q[1], "Daft Punk Get Lucky official");
    assert_eq!(q[4], "\"Daft Punk\" \"Get Lucky\"");
}

#[test]
fn api_response_yields_first_video() {
    let v = json!({"items": [{"id": {"kind": "youtube#channel"}}, {"id": {"videoId": "abcdefghijk"}}]});
    assert_eq!(video_id_from_api(&v).as_deref(), Some("abcdefghijk"));
    assert!(video_id_from_api(&json!({"items": []})).is_none());
}

#[test]
fn results_page_prefers_initial_data() {
    let html = r#"<a href="/watch?v=ZZZZZZZZZZZ"></a><script>var ytInitialData = {"contents":{"twoColumnSearchResultsRenderer":{"primaryContents":{"sectionListRenderer":{"contents":[{"itemSectionRenderer":{"contents":[{"adRenderer":{}},{"videoRenderer":{"videoId":"AAAAAAAAAAA"}}]}}]}}}}};</script>"#;
    assert_eq!(
        video_id_from_results_page(html).as_deref(),
        Some("AAAAAAAAAAA")
    );
}

#[test]
fn results_page_falls_back_to_watch_links() {
    let html = r#"var ytInitialData = {not json};  <a href="/watch?v=dQw4w9WgXcQ&t=1">"#;
    assert_eq!(
        video_id_from_results_page(html).as_deref(),
        Some("dQw4w9WgXcQ")
    );
    assert!(video_id_from_results_page("<html></html>").is_none());
}

#[test]
fn watch_url_format() {
    assert_eq!(
        watch_url("dQw4w9WgXcQ"),
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
    );
}

#[test]
fn empty_delay_range_disables_pause() {
    let ytdlp = YtDlp::from_config(&crate::config::AudioConfig::default());
    let r = YtDlpSearchResolver::new(ytdlp.clone()).with_delay(0.0..0.0);
    assert!(r.pause().is_none());
    let r = YtDlpSearchResolver::new(ytdlp);
    let p = r.pause().unwrap();
    assert!(p >= Duration::from_secs(1) && p < Duration::from_secs(3));
}
