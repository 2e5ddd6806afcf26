use super::*;

#[test]
fn defaults_match_documented_values() {
    let cfg = PipelineConfig::default();
    assert_eq!(cfg.qr_size, 300);
    assert_eq!(cfg.border_width, 4);
    assert_eq!(cfg.padding, 16);
    assert_eq!(cfg.animation_duration_ms, 1500);
    assert_eq!(cfg.pop_out_distance, 0.8);
    assert_eq!(cfg.lift_height, 0.3);
    assert_eq!(cfg.viewer_angle, 60.0);
    assert_eq!(cfg.camera_timeout_ms, 5000);
    cfg.validate().unwrap();
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = PipelineConfig::from_json_str(r#"{ "qrSize": 200, "maxZoom": 2.5 }"#).unwrap();
    assert_eq!(cfg.qr_size, 200);
    assert_eq!(cfg.max_zoom, 2.5);
    assert_eq!(cfg.padding, 16);
}

#[test]
fn unknown_and_invalid_fields_are_rejected() {
    assert!(PipelineConfig::from_json_str(r#"{ "qrSise": 200 }"#).is_err());
    let err = PipelineConfig::from_json_str(r#"{ "maxZoom": 0 }"#).unwrap_err();
    assert!(err.to_string().contains("maxZoom"));
    let err = PipelineConfig::from_json_str(r#"{ "qrSize": 0 }"#).unwrap_err();
    assert!(err.to_string().contains("qrSize"));
}

#[test]
fn derived_views_carry_config_values() {
    let cfg = PipelineConfig {
        viewer_angle: 45.0,
        max_viewport_width: 640.0,
        ..PipelineConfig::default()
    };
    assert_eq!(cfg.animation().viewer_angle_deg, 45.0);
    assert_eq!(cfg.viewport_bounds().max_width, 640.0);
    assert_eq!(cfg.sticker_metrics().qr_size, 300);
}

#[test]
fn from_path_reports_missing_file() {
    let err = PipelineConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("read config"));
}
