use super::*;

#[test]
fn frame_type_roundtrips_through_wire_numbers() {
    for (i, ft) in FrameType::ALL.iter().enumerate() {
        assert_eq!(usize::from(ft.number()), i + 1);
        assert_eq!(FrameType::try_from(ft.number()).unwrap(), *ft);
    }
    assert!(FrameType::try_from(0).is_err());
    assert!(FrameType::try_from(11).is_err());
}

#[test]
fn label_placement_follows_variant_table() {
    assert_eq!(FrameType::BottomFlat.label_placement(), LabelPlacement::Below);
    assert_eq!(FrameType::TopFlat.label_placement(), LabelPlacement::Above);
    assert_eq!(FrameType::Brackets.label_placement(), LabelPlacement::Above);
    assert_eq!(FrameType::SideLabel.label_placement(), LabelPlacement::Right);
    assert_eq!(FrameType::Plain.label_placement(), LabelPlacement::Hidden);
}

#[test]
fn parses_spec_with_color() {
    let spec = FrameSpec::from_json_str(
        r##"{
            "frameType": 5,
            "textContent": "SCAN ME",
            "textStyle": { "bold": true, "italic": false, "color": "#000000", "gradient": null },
            "transparentBackground": false
        }"##,
    )
    .unwrap();
    assert_eq!(spec.frame_type, FrameType::BottomFlat);
    // Black is kept as black: no silent override to white.
    assert_eq!(spec.color(), Some(Rgba8::BLACK));
    assert!(spec.gradient().is_none());
}

#[test]
fn rejects_color_and_gradient_together() {
    let err = FrameSpec::from_json_str(
        r##"{
            "frameType": 1,
            "textStyle": { "color": "#ff0000", "gradient": ["#000", "#fff"] }
        }"##,
    )
    .unwrap_err();
    assert!(matches!(err, PopError::InvalidFrameSpec(_)));
}

#[test]
fn rejects_unknown_frame_type_and_long_text() {
    assert!(FrameSpec::from_json_str(r#"{ "frameType": 11 }"#).is_err());
    let err = FrameSpec::from_json_str(
        r#"{ "frameType": 1, "textContent": "this label is way too long" }"#,
    )
    .unwrap_err();
    assert!(matches!(err, PopError::InvalidFrameSpec(_)));
}

#[test]
fn text_limit_counts_characters_not_bytes() {
    let mut spec = FrameSpec::default();
    spec.set_text("éééééééééééééééééééé").unwrap();
    assert_eq!(spec.text_content.chars().count(), 20);
}

#[test]
fn setting_color_clears_gradient_and_vice_versa() {
    let mut spec = FrameSpec::default();
    spec.set_gradient(&["#ff0000", "#00ff00", "#0000ff"]).unwrap();
    assert_eq!(spec.gradient().map(|g| g.len()), Some(3));
    assert!(spec.color().is_none());

    spec.set_color("#123456").unwrap();
    assert_eq!(spec.color(), Some(Rgba8::opaque(0x12, 0x34, 0x56)));
    assert!(spec.gradient().is_none());
}

#[test]
fn failed_edits_leave_spec_untouched() {
    let mut spec = FrameSpec::default();
    let before = spec.clone();
    assert!(spec.set_text("012345678901234567890").is_err());
    assert!(spec.set_color("not-a-color").is_err());
    assert!(spec.set_gradient(&["#fff"]).is_err());
    assert_eq!(spec, before);
}

#[test]
fn serializes_back_to_wire_shape() {
    let mut spec = FrameSpec::default();
    spec.set_gradient(&["#ff0000", "#0000ff"]).unwrap();
    let v = serde_json::to_value(&spec).unwrap();
    assert_eq!(v["frameType"], 1);
    assert_eq!(v["textStyle"]["color"], serde_json::Value::Null);
    assert_eq!(v["textStyle"]["gradient"][1], "#0000ff");
}
