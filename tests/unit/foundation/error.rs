use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PopError::invalid_frame_spec("x")
            .to_string()
            .contains("invalid frame spec:")
    );
    assert!(
        PopError::placement_out_of_bounds("x")
            .to_string()
            .contains("placement out of bounds:")
    );
    assert!(
        PopError::target_compile("x")
            .to_string()
            .contains("target compile failure:")
    );
    assert!(
        PopError::CameraTimeout { timeout_ms: 5000 }
            .to_string()
            .contains("5000 ms")
    );
    assert!(
        PopError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn classification_splits_authoring_and_runtime() {
    assert!(PopError::invalid_frame_spec("x").is_authoring());
    assert!(!PopError::invalid_frame_spec("x").is_recoverable());
    assert!(PopError::camera_unavailable("x").is_recoverable());
    assert!(!PopError::camera_unavailable("x").is_retriable());
    assert!(PopError::asset_load("x").is_retriable());
    assert!(PopError::target_compile("x").is_retriable());
    assert!(!PopError::AutoplayBlocked.is_recoverable());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PopError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(err.duplicate().to_string().contains("boom"));
}
