use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ReelError::precondition("x")
            .to_string()
            .contains("precondition failed:")
    );
    assert!(
        ReelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert_eq!(
        ReelError::adapter("lrclib", "404").to_string(),
        "adapter error (lrclib): 404"
    );
}

#[test]
fn stage_errors_carry_stage_name() {
    let err = ReelError::stage(Stage::Mux, "ffmpeg exited with status 1");
    assert_eq!(err.to_string(), "mux stage failed: ffmpeg exited with status 1");
    assert_eq!(err.failed_stage(), Some(Stage::Mux));
    assert_eq!(ReelError::validation("x").failed_stage(), None);
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let e = serde_json::from_str::<u32>("nope").unwrap_err();
    assert!(matches!(ReelError::from(e), ReelError::Serde(_)));
}
