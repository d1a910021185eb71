use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.iter().count() as u64, r.len_frames());
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
}

#[test]
fn secs_to_frame_rounds_to_nearest_boundary() {
    let fps = Fps::new(30).unwrap();
    assert_eq!(fps.secs_to_frame_round(3.0), FrameIndex(90));
    assert_eq!(fps.secs_to_frame_round(0.049), FrameIndex(1));
    assert_eq!(fps.secs_to_frame_round(0.016), FrameIndex(0));
    assert_eq!(fps.secs_to_frame_round(-1.0), FrameIndex(0));
    assert_eq!(fps.secs_to_frame_round(f64::NAN), FrameIndex(0));
    assert!((fps.frame_to_secs(FrameIndex(45)) - 1.5).abs() < 1e-12);
}

#[test]
fn zero_fps_is_rejected() {
    assert!(Fps::new(0).is_err());
}

#[test]
fn portrait_canvas_requires_even_nine_by_sixteen() {
    assert!(Canvas::portrait(1080, 1920).is_ok());
    assert!(Canvas::portrait(36, 64).is_ok());
    assert!(Canvas::portrait(1920, 1080).is_err());
    assert!(Canvas::portrait(9, 16).is_err());
    assert!(Canvas::portrait(0, 0).is_err());
}
