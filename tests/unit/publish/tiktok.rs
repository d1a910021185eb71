use super::*;

#[test]
fn envelope_with_ok_error_yields_data() {
    let text = r#"{"data":{"publish_id":"p1","upload_url":"https://up"},"error":{"code":"ok","message":"","log_id":"l"}}"#;
    let init: UploadInit = unwrap_envelope("inbox/video/init/", text).unwrap();
    assert_eq!(init.publish_id, "p1");
    assert_eq!(init.upload_url, "https://up");
}

#[test]
fn envelope_error_code_is_an_adapter_error() {
    let text = r#"{"data":{},"error":{"code":"spam_risk_too_many_posts","message":"slow down","log_id":"l"}}"#;
    let err = unwrap_envelope::<CreatorInfo>("creator_info/query/", text).unwrap_err();
    assert!(err.to_string().contains("spam_risk_too_many_posts"));
}

#[test]
fn status_and_creator_info_tolerate_missing_fields() {
    let status: PostStatus =
        unwrap_envelope("status/fetch/", r#"{"data":{"status":"PROCESSING_UPLOAD"}}"#).unwrap();
    assert_eq!(status.status, "PROCESSING_UPLOAD");
    assert!(status.fail_reason.is_none());

    let info: CreatorInfo = unwrap_envelope(
        "creator_info/query/",
        r#"{"data":{"creator_username":"me","privacy_level_options":["SELF_ONLY"]}}"#,
    )
    .unwrap();
    assert_eq!(info.creator_username.as_deref(), Some("me"));
}

#[test]
fn inbox_init_body_has_only_source_info() {
    let body = InitRequest {
        post_info: None,
        source_info: compute_chunk_params(1234).into(),
    };
    let v = serde_json::to_value(&body).unwrap();
    assert!(v.get("post_info").is_none());
    assert_eq!(v["source_info"]["source"], "FILE_UPLOAD");
    assert_eq!(v["source_info"]["video_size"], 1234);
    assert_eq!(v["source_info"]["chunk_size"], 1234);
    assert_eq!(v["source_info"]["total_chunk_count"], 1);
}

#[test]
fn client_endpoints_hang_off_post_publish() {
    let c = TikTokClient::new(reqwest::Client::new(), "https://open.tiktokapis.com/v2/", "t");
    assert_eq!(c.base, "https://open.tiktokapis.com/v2/post/publish");
}
