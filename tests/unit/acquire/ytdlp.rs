use super::*;

fn config() -> AudioConfig {
    AudioConfig::default()
}

#[test]
fn common_args_include_agent_headers_and_rate() {
    let args = YtDlp::from_config(&config()).common_args();
    let ua = args.iter().position(|a| a == "--user-agent").unwrap();
    assert!(args[ua + 1].starts_with("Mozilla/5.0"));
    assert_eq!(args.iter().filter(|a| *a == "--add-header").count(), 2);
    let rate = args.iter().position(|a| a == "--limit-rate").unwrap();
    assert_eq!(args[rate + 1], "1M");
    assert!(!args.iter().any(|a| a.starts_with("--cookies")));
}

#[test]
fn browser_cookies_win_over_file() {
    let dir = PathBuf::from("target").join("lyricreel_ytdlp_test");
    std::fs::create_dir_all(&dir).unwrap();
    let cookies = dir.join("cookies.txt");
    std::fs::write(&cookies, "# Netscape HTTP Cookie File\n").unwrap();

    let mut cfg = config();
    cfg.cookies_file = Some(cookies.clone());
    assert_eq!(
        YtDlp::from_config(&cfg).cookie_args(),
        vec!["--cookies".to_owned(), cookies.display().to_string()]
    );

    cfg.cookies_from_browser = Some("firefox".to_owned());
    assert_eq!(
        YtDlp::from_config(&cfg).cookie_args(),
        vec!["--cookies-from-browser".to_owned(), "firefox".to_owned()]
    );
}

#[test]
fn missing_cookie_file_is_ignored() {
    let mut cfg = config();
    cfg.cookies_file = Some(PathBuf::from("target/definitely/missing/cookies.txt"));
    assert!(YtDlp::from_config(&cfg).cookie_args().is_empty());
}

#[test]
fn no_rate_limit_when_unset() {
    let mut cfg = config();
    cfg.limit_rate = None;
    let args = YtDlp::from_config(&cfg).common_args();
    assert!(!args.iter().any(|a| a == "--limit-rate"));
}

#[tokio::test]
async fn missing_program_is_an_adapter_error() {
    let mut cfg = config();
    cfg.ytdlp_path = PathBuf::from("target/no-such-yt-dlp-binary");
    let ytdlp = YtDlp::from_config(&cfg);
    assert!(!ytdlp.is_available().await);
    let err = ytdlp.search_id("query").await.unwrap_err();
    assert!(matches!(err, ReelError::Adapter { adapter: "yt-dlp", .. }));
}
