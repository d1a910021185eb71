use super::*;

const FONT_CANDIDATES: [&str; 2] = [
    "assets/font.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
];

fn local_font() -> Option<PathBuf> {
    FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

fn small_video() -> VideoConfig {
    VideoConfig {
        width: 90,
        height: 160,
        ..VideoConfig::default()
    }
}

fn fixture_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit-lyric").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let bg = image::RgbImage::from_fn(200, 120, |x, y| image::Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
    bg.save(dir.join("background.png")).unwrap();
    dir
}

#[test]
fn unique_paths_suffix_repeated_timestamps() {
    let lines = vec![
        LyricLine::new(1.0, "a"),
        LyricLine::new(1.0, "b"),
        LyricLine::new(2.5, "c"),
        LyricLine::new(1.0, "d"),
    ];
    let names: Vec<_> = unique_paths(&lines, Path::new("out"))
        .into_iter()
        .map(|(_, p)| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "lyrics_1.00.jpg",
            "lyrics_1.00-1.jpg",
            "lyrics_2.50.jpg",
            "lyrics_1.00-2.jpg"
        ]
    );
}

#[test]
fn partial_frame_is_removed_and_missing_one_is_tolerated() {
    let dir = fixture_dir("partial");
    let partial = dir.join("lyrics_2.00.jpg");
    std::fs::write(&partial, b"half a jpeg").unwrap();

    remove_partial_frame(&partial);
    assert!(!partial.exists());
    remove_partial_frame(&partial);
    remove_partial_frame(&dir);
    assert!(dir.is_dir());
}

#[test]
fn zero_threads_is_rejected() {
    assert!(build_thread_pool(Some(0)).is_err());
    assert!(build_thread_pool(Some(2)).is_ok());
}

#[test]
fn missing_font_is_precondition_error() {
    let dir = fixture_dir("missing-font");
    let err = LyricFrameRenderer::new(
        &dir.join("background.png"),
        &dir.join("nope.ttf"),
        dir.join("frames"),
        &small_video(),
    )
    .err()
    .unwrap();
    assert!(matches!(err, ReelError::Precondition(_)));
}

#[test]
fn renders_lines_and_title_with_local_font_if_present() {
    let Some(font) = local_font() else {
        return;
    };
    let dir = fixture_dir("render");
    let renderer = LyricFrameRenderer::new(
        &dir.join("background.png"),
        &font,
        dir.join("frames"),
        &small_video(),
    )
    .unwrap()
    .with_threads(Some(2));
    renderer.prepare_output_dir().unwrap();

    let lines = vec![
        LyricLine::new(0.5, "hello"),
        LyricLine::new(3.25, ""),
        LyricLine::new(7.0, "a much longer lyric line that has to wrap across rows"),
    ];
    let frames = renderer.render_all(&lines).unwrap();
    assert_eq!(frames.len(), 3);
    for (frame, line) in frames.iter().zip(&lines) {
        assert_eq!(frame.source_timestamp, line.timestamp);
        assert!(!frame.is_title);
        let img = image::open(&frame.image_path).unwrap();
        assert_eq!((img.width(), img.height()), (90, 160));
    }

    let title = renderer.render_title("Artist", "Song").unwrap();
    assert!(title.is_title);
    assert!(title.image_path.ends_with("title_card.jpg"));
    assert!(title.image_path.is_file());

    let scanned = crate::timeline::frames::scan_frame_folder(renderer.out_dir()).unwrap();
    assert_eq!(scanned.len(), 4);
    assert!(scanned[0].is_title);
}

#[test]
fn prepare_output_dir_clears_stale_frames() {
    let Some(font) = local_font() else {
        return;
    };
    let dir = fixture_dir("stale");
    let frames_dir = dir.join("frames");
    std::fs::create_dir_all(&frames_dir).unwrap();
    std::fs::write(frames_dir.join("lyrics_1.00.jpg"), b"old").unwrap();

    let renderer = LyricFrameRenderer::new(
        &dir.join("background.png"),
        &font,
        &frames_dir,
        &small_video(),
    )
    .unwrap();
    renderer.prepare_output_dir().unwrap();
    assert_eq!(std::fs::read_dir(&frames_dir).unwrap().count(), 0);
}
