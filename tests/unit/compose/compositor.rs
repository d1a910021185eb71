use super::*;
use crate::encode::sink::InMemorySink;

fn small_video() -> VideoConfig {
    VideoConfig {
        fps: 10,
        width: 36,
        height: 64,
        ..VideoConfig::default()
    }
}

fn fixture_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("lyricreel_compositor").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn solid_png(path: &Path, rgb: [u8; 3]) {
    image::RgbImage::from_pixel(36, 64, image::Rgb(rgb))
        .save(path)
        .unwrap();
}

fn centre(frame: &crate::render::backend::FrameRGBA) -> [u8; 4] {
    frame.pixel(frame.width / 2, frame.height / 2).unwrap()
}

#[test]
fn renders_background_lead_in_frames_and_fallback() {
    let dir = fixture_dir("lead_in");
    let bg = dir.join("bg.png");
    let blue = dir.join("lyrics_1.00.png");
    solid_png(&bg, [255, 0, 0]);
    solid_png(&blue, [0, 0, 255]);

    let frames = vec![
        RenderedFrame::lyric(1.0, &blue),
        RenderedFrame::lyric(2.0, dir.join("lyrics_2.00.png")),
    ];
    let comp = Compositor::new(small_video(), EffectConfig::default()).unwrap();
    let mut sink = InMemorySink::new();
    let stats = comp.render_silent(&frames, &bg, 120.0, &mut sink).unwrap();

    assert_eq!(stats.segments, 3);
    assert_eq!(stats.fallback_segments, 1);
    assert!((stats.duration_secs - 6.0).abs() < 1e-9);
    assert_eq!(stats.total_frames, 60);
    assert!(sink.is_ended());
    assert_eq!(sink.config().unwrap().width, 36);

    let out = sink.frames();
    assert_eq!(out.len(), 60);
    for (i, (idx, _)) in out.iter().enumerate() {
        assert_eq!(idx.0, i as u64);
    }

    let lead_in = centre(&out[0].1);
    assert!(lead_in[0] > 200 && lead_in[2] < 50, "{lead_in:?}");
    let lyric = centre(&out[15].1);
    assert!(lyric[2] > 200 && lyric[0] < 50, "{lyric:?}");
    let fallback = centre(&out[30].1);
    assert!(fallback[0] > 200, "{fallback:?}");
    let faded = centre(&out[59].1);
    assert!(faded[0] < 30, "{faded:?}");
}

#[test]
fn ceiling_truncates_the_timeline() {
    let dir = fixture_dir("ceiling");
    let bg = dir.join("bg.png");
    solid_png(&bg, [0, 255, 0]);

    let video = VideoConfig {
        max_duration_secs: 2.5,
        ..small_video()
    };
    let frames = vec![
        RenderedFrame::lyric(0.0, &bg),
        RenderedFrame::lyric(2.0, &bg),
        RenderedFrame::lyric(4.0, &bg),
    ];
    let comp = Compositor::new(video, EffectConfig::default()).unwrap();
    let mut sink = InMemorySink::new();
    let stats = comp.render_silent(&frames, &bg, 100.0, &mut sink).unwrap();

    assert_eq!(stats.segments, 2);
    assert!((stats.duration_secs - 2.5).abs() < 1e-9);
    assert_eq!(sink.frames().len(), 25);
}

#[test]
fn identical_inputs_render_identically() {
    let dir = fixture_dir("deterministic");
    let bg = dir.join("bg.png");
    solid_png(&bg, [90, 120, 200]);
    let frames = vec![RenderedFrame::lyric(0.5, &bg)];
    let comp = Compositor::new(small_video(), EffectConfig::default()).unwrap();

    let mut a = InMemorySink::new();
    let mut b = InMemorySink::new();
    let sa = comp.render_silent(&frames, &bg, 128.0, &mut a).unwrap();
    let sb = comp.render_silent(&frames, &bg, 128.0, &mut b).unwrap();
    assert_eq!(sa, sb);
    assert_eq!(a.frames().len(), b.frames().len());
    assert_eq!(a.frames()[7].1.data, b.frames()[7].1.data);
}

#[test]
fn unusable_bpm_falls_back_to_default() {
    let dir = fixture_dir("bpm");
    let bg = dir.join("bg.png");
    solid_png(&bg, [10, 10, 10]);
    let frames = vec![RenderedFrame::lyric(0.0, &bg)];
    let comp = Compositor::new(small_video(), EffectConfig::default())
        .unwrap()
        .with_default_bpm(95.0);

    let mut sink = InMemorySink::new();
    let stats = comp.render_silent(&frames, &bg, f64::NAN, &mut sink).unwrap();
    assert_eq!(stats.bpm, 95.0);
    let stats = comp.render_silent(&frames, &bg, -3.0, &mut sink).unwrap();
    assert_eq!(stats.bpm, 95.0);
}

#[test]
fn missing_inputs_fail_before_rendering() {
    let dir = fixture_dir("missing");
    let bg = dir.join("bg.png");
    solid_png(&bg, [0, 0, 0]);
    let comp = Compositor::new(small_video(), EffectConfig::default()).unwrap();

    let mut sink = InMemorySink::new();
    let err = comp.render_silent(&[], &bg, 120.0, &mut sink).unwrap_err();
    assert!(matches!(err, ReelError::Precondition(_)));

    let frames = vec![RenderedFrame::lyric(0.0, &bg)];
    let err = comp
        .render_silent(&frames, &dir.join("nope.png"), 120.0, &mut sink)
        .unwrap_err();
    assert!(matches!(err, ReelError::Precondition(_)));
    assert!(sink.config().is_none());

    let job = ComposeJob::new(frames, &bg, dir.join("nope.m4a"), dir.join("out.mp4"));
    let err = comp.compose(&job).unwrap_err();
    assert!(matches!(err, ReelError::Precondition(_)));
}

#[test]
fn bad_timestamps_fail_in_schedule_stage() {
    let dir = fixture_dir("bad_ts");
    let bg = dir.join("bg.png");
    solid_png(&bg, [0, 0, 0]);
    let comp = Compositor::new(small_video(), EffectConfig::default()).unwrap();
    let frames = vec![RenderedFrame::lyric(f64::INFINITY, &bg)];
    let err = comp
        .render_silent(&frames, &bg, 120.0, &mut InMemorySink::new())
        .unwrap_err();
    assert_eq!(err.failed_stage(), Some(Stage::Schedule));
}

#[test]
fn job_puts_title_first() {
    let job = ComposeJob::new(
        vec![
            RenderedFrame::lyric(0.0, "lyrics_0.00.jpg"),
            RenderedFrame::title("title_card.jpg"),
        ],
        "bg.jpg",
        "audio.m4a",
        "out.mp4",
    )
    .with_bpm(99.0)
    .with_track("A", "B");
    assert!(job.frames[0].is_title);
    assert_eq!(job.bpm, 99.0);
    assert_eq!(job.artist, "A");
}

#[test]
fn invalid_configs_are_rejected() {
    let video = VideoConfig {
        width: 100,
        ..small_video()
    };
    assert!(Compositor::new(video, EffectConfig::default()).is_err());
    let effects = EffectConfig {
        zoom_min: 1.1,
        zoom_max: 1.0,
        ..EffectConfig::default()
    };
    assert!(Compositor::new(small_video(), effects).is_err());
}
