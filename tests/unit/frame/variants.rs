use super::*;

fn svg_for(spec: &FrameSpec) -> String {
    let metrics = StickerMetrics::default();
    let layout = StickerLayout::compute(spec.frame_type, &metrics, metrics.qr_size);
    build_svg(&DrawCtx {
        spec,
        metrics: &metrics,
        layout: &layout,
    })
}

#[test]
fn table_covers_every_framed_variant() {
    for ft in FrameType::ALL {
        assert_eq!(draw_fn(ft).is_some(), ft != FrameType::Plain, "{ft:?}");
    }
}

#[test]
fn every_variant_parses_as_svg() {
    for ft in FrameType::ALL.into_iter().filter(|f| *f != FrameType::Plain) {
        let spec = FrameSpec {
            frame_type: ft,
            ..FrameSpec::default()
        };
        let svg = svg_for(&spec);
        usvg::Tree::from_str(&svg, &usvg::Options::default())
            .unwrap_or_else(|e| panic!("{ft:?}: {e}"));
    }
}

#[test]
fn gradient_spans_full_sticker_width() {
    let mut spec = FrameSpec {
        frame_type: FrameType::SideLabel,
        ..FrameSpec::default()
    };
    spec.set_gradient(&["#ff0000", "#0000ff"]).unwrap();
    let svg = svg_for(&spec);
    assert!(svg.contains(r#"gradientUnits="userSpaceOnUse" x1="0" y1="0" x2="380""#));
    assert!(svg.contains("url(#label-fill)"));
}

#[test]
fn transparent_background_skips_paper_fill() {
    let opaque = svg_for(&FrameSpec::default());
    let transparent = svg_for(&FrameSpec {
        transparent_background: true,
        ..FrameSpec::default()
    });
    assert!(opaque.contains(r##"fill="#ffffff"/>"##));
    assert!(!transparent.contains(r##"fill="#ffffff"/>"##));
}

#[test]
fn bracket_variant_is_always_transparent() {
    let svg = svg_for(&FrameSpec {
        frame_type: FrameType::Brackets,
        transparent_background: false,
        ..FrameSpec::default()
    });
    assert!(!svg.contains(r##"fill="#ffffff"/>"##));
}

#[test]
fn label_text_is_escaped() {
    let mut spec = FrameSpec::default();
    spec.set_text("<a&b>").unwrap();
    let svg = svg_for(&spec);
    assert!(svg.contains("&lt;a&amp;b&gt;"));
    assert_eq!(escape_xml("\"x'"), "&quot;x&apos;");
}

#[test]
fn side_label_rotates_text() {
    let svg = svg_for(&FrameSpec {
        frame_type: FrameType::SideLabel,
        ..FrameSpec::default()
    });
    assert!(svg.contains("rotate(90 360.00 170.00)"));
}
