use super::*;

fn token(saved_at: i64, expires_in: i64) -> TokenData {
    TokenData {
        access_token: "act".to_owned(),
        refresh_token: "rft".to_owned(),
        expires_in,
        refresh_expires_in: None,
        open_id: None,
        scope: None,
        token_type: None,
        saved_at,
    }
}

#[test]
fn expiry_uses_a_sixty_second_margin() {
    let t = token(1_000, 3_600);
    assert!(!t.is_expired_at(1_000 + 3_540));
    assert!(t.is_expired_at(1_000 + 3_541));
    assert!(token(0, 0).is_expired_at(1));
}

#[test]
fn store_roundtrip_stamps_saved_at() {
    let dir = PathBuf::from("target").join("lyricreel_token_test");
    std::fs::create_dir_all(&dir).unwrap();
    let store = TokenStore::new(dir.join("tokens.json"));
    let _ = std::fs::remove_file(store.path());
    assert!(store.load().unwrap().is_none());

    let mut t = token(0, 86_400);
    store.save(&mut t).unwrap();
    assert!(t.saved_at > 0);
    let back = store.load().unwrap().unwrap();
    assert_eq!(back, t);
    assert!(!back.is_expired());
}

#[test]
fn token_response_parses_success_and_error() {
    let ok = r#"{"access_token":"a","refresh_token":"r","expires_in":86400,"open_id":"o","scope":"video.upload","token_type":"Bearer","refresh_expires_in":31536000}"#;
    let t = parse_token_response(ok).unwrap();
    assert_eq!(t.access_token, "a");
    assert_eq!(t.expires_in, 86_400);
    assert_eq!(t.saved_at, 0);

    let err = r#"{"error":"invalid_grant","error_description":"Authorization code is expired.","log_id":"x"}"#;
    let e = parse_token_response(err).unwrap_err();
    assert!(matches!(e, ReelError::Adapter { adapter: "oauth", .. }));
}

#[tokio::test]
async fn missing_credentials_are_a_precondition() {
    let client = OAuthClient::from_config(reqwest::Client::new(), &PublishConfig::default());
    let e = client.exchange_code("code").await.unwrap_err();
    assert!(matches!(e, ReelError::Precondition(_)));
}

#[tokio::test]
async fn fresh_token_without_file_is_a_precondition() {
    let client = OAuthClient::from_config(reqwest::Client::new(), &PublishConfig::default());
    let store = TokenStore::new("target/lyricreel_no_such_tokens.json");
    let e = client.fresh_token(&store).await.unwrap_err();
    assert!(matches!(e, ReelError::Precondition(_)));
}
