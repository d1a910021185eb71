use super::*;

#[test]
fn estimated_tempo_is_used_when_usable() {
    let t = Tempo::resolve(Some(128.0), 120.0);
    assert_eq!(t.bpm, 128.0);
    assert!(t.estimated);
}

#[test]
fn unusable_tempo_falls_back_to_default() {
    for bad in [None, Some(f64::NAN), Some(0.0), Some(-90.0), Some(f64::INFINITY)] {
        let t = Tempo::resolve(bad, 110.0);
        assert_eq!(t.bpm, 110.0, "{bad:?}");
        assert!(!t.estimated, "{bad:?}");
    }
}

#[test]
fn pipeline_rejects_invalid_config() {
    let cfg = AppConfig {
        max_track_attempts: 0,
        ..AppConfig::default()
    };
    assert!(matches!(Pipeline::new(cfg), Err(ReelError::Validation(_))));
}

#[test]
fn pipeline_builds_from_default_config() {
    let p = Pipeline::new(AppConfig::default()).unwrap();
    assert_eq!(p.config().max_track_attempts, AppConfig::default().max_track_attempts);
}

#[tokio::test]
async fn compose_precondition_is_not_retried() {
    let dir = PathBuf::from("target").join("lyricreel_pipeline").join("missing");
    let job = ComposeJob::new(
        Vec::new(),
        dir.join("bg.png"),
        dir.join(AUDIO_FILE),
        dir.join(OUTPUT_FILE),
    );
    let tempo = Tempo::resolve(Some(140.0), 120.0);
    let err = compose_with_fallback(AppConfig::default(), job, tempo)
        .await
        .unwrap_err();
    assert!(matches!(err, ReelError::Precondition(_)), "{err}");
}

#[tokio::test]
async fn render_frames_fails_without_background() {
    let dir = PathBuf::from("target").join("lyricreel_pipeline").join("no_bg");
    let cfg = AppConfig {
        background: dir.join("missing.png"),
        ..AppConfig::default()
    };
    let result = render_frames(
        cfg,
        vec![LyricLine::new(1.0, "hello")],
        "Artist".to_owned(),
        "Song".to_owned(),
        dir.join(IMAGES_DIR),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn remove_if_empty_keeps_populated_dirs() {
    let root = PathBuf::from("target").join("lyricreel_pipeline").join("cleanup");
    let _ = std::fs::remove_dir_all(&root);
    let empty = root.join("empty");
    let full = root.join("full");
    std::fs::create_dir_all(&empty).unwrap();
    std::fs::create_dir_all(&full).unwrap();
    std::fs::write(full.join("audio.m4a"), b"x").unwrap();

    remove_if_empty(&empty).await;
    remove_if_empty(&full).await;
    assert!(!empty.exists());
    assert!(full.join("audio.m4a").exists());
}

fn local_font() -> Option<PathBuf> {
    ["assets/font.ttf", "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"]
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

#[tokio::test]
async fn rendered_frames_schedule_like_a_folder_scan() {
    let Some(font) = local_font() else {
        return;
    };
    let dir = PathBuf::from("target").join("lyricreel_pipeline").join("same_schedule");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let bg = dir.join("bg.png");
    image::RgbImage::from_pixel(90, 160, image::Rgb([40, 40, 40]))
        .save(&bg)
        .unwrap();

    let cfg = AppConfig {
        background: bg,
        font,
        render_threads: Some(2),
        video: crate::config::VideoConfig {
            width: 90,
            height: 160,
            ..Default::default()
        },
        ..AppConfig::default()
    };
    let lines = vec![
        LyricLine::new(1.4, "one"),
        LyricLine::new(3.75, "two"),
        LyricLine::new(3.9, "three"),
        LyricLine::new(8.999, "four"),
    ];
    let images = dir.join(IMAGES_DIR);
    let rendered = render_frames(
        cfg.clone(),
        lines,
        "Artist".to_owned(),
        "Song".to_owned(),
        images.clone(),
    )
    .await
    .unwrap();
    let scanned = crate::timeline::frames::scan_frame_folder(&images).unwrap();

    let from_run = crate::timeline::schedule::schedule_segments(&rendered, &cfg.video).unwrap();
    let from_scan = crate::timeline::schedule::schedule_segments(&scanned, &cfg.video).unwrap();
    assert_eq!(from_run, from_scan);
    // Two lines in second 3 end the timeline after the first of them.
    assert_eq!(from_run.duration_secs, 3.0);
    assert!(rendered.iter().all(|f| f.source_timestamp.fract() == 0.0));
}
