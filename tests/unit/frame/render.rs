use super::*;

fn checker_marker(side: u32) -> MarkerBitmap {
    MarkerBitmap::from_fn(side, side, |x, y| {
        if (x / 10 + y / 10) % 2 == 0 {
            image::Rgba([0, 0, 0, 255])
        } else {
            image::Rgba([255, 255, 255, 255])
        }
    })
}

fn metrics() -> StickerMetrics {
    StickerMetrics {
        qr_size: 300,
        border_width: 4,
        padding: 16,
        label_height: 40,
        label_width: 40,
        corner_radius: 8.0,
    }
}

#[test]
fn identical_inputs_render_identical_bytes() {
    let marker = checker_marker(300);
    for ft in FrameType::ALL {
        let mut spec = FrameSpec {
            frame_type: ft,
            ..FrameSpec::default()
        };
        if ft != FrameType::Plain {
            spec.set_text("SCAN ME").unwrap();
            spec.set_gradient(&["#ff0000", "#00ff00", "#0000ff"]).unwrap();
        }
        let a = render_sticker(&marker, &spec, &metrics()).unwrap();
        let b = render_sticker(&marker, &spec, &metrics()).unwrap();
        assert_eq!(a.dimensions(), b.dimensions(), "{ft:?}");
        assert_eq!(a.as_raw(), b.as_raw(), "{ft:?}");
    }
}

#[test]
fn plain_frame_returns_marker_unchanged() {
    let marker = checker_marker(57);
    let sticker = render_sticker(&marker, &FrameSpec::plain(), &metrics()).unwrap();
    assert_eq!(sticker, marker);
}

#[test]
fn bottom_flat_sticker_is_340_by_380() {
    let spec = FrameSpec {
        frame_type: FrameType::BottomFlat,
        ..FrameSpec::default()
    };
    let sticker = render_sticker(&checker_marker(300), &spec, &metrics()).unwrap();
    assert_eq!(sticker.dimensions(), (340, 380));
}

#[test]
fn marker_is_drawn_at_layout_origin() {
    let marker = checker_marker(300);
    for ft in [FrameType::BottomNotch, FrameType::TopFlat, FrameType::SideLabel] {
        let spec = FrameSpec {
            frame_type: ft,
            ..FrameSpec::default()
        };
        let layout = StickerLayout::compute(ft, &metrics(), 300);
        let sticker = render_sticker(&marker, &spec, &metrics()).unwrap();
        let (ox, oy) = layout.marker_origin;
        assert_eq!(sticker.get_pixel(ox, oy), marker.get_pixel(0, 0), "{ft:?}");
        assert_eq!(
            sticker.get_pixel(ox + 15, oy + 5),
            marker.get_pixel(15, 5),
            "{ft:?}"
        );
    }
}

#[test]
fn transparent_background_leaves_padding_clear() {
    let marker = checker_marker(300);
    let opaque = render_sticker(
        &marker,
        &FrameSpec {
            frame_type: FrameType::BottomFlat,
            ..FrameSpec::default()
        },
        &metrics(),
    )
    .unwrap();
    let transparent = render_sticker(
        &marker,
        &FrameSpec {
            frame_type: FrameType::BottomFlat,
            transparent_background: true,
            ..FrameSpec::default()
        },
        &metrics(),
    )
    .unwrap();
    assert_eq!(opaque.get_pixel(10, 100).0, [255, 255, 255, 255]);
    assert_eq!(transparent.get_pixel(10, 100).0[3], 0);
}

#[test]
fn small_marker_is_resampled_to_qr_size() {
    let spec = FrameSpec {
        frame_type: FrameType::TopFlat,
        ..FrameSpec::default()
    };
    let sticker = render_sticker(&checker_marker(150), &spec, &metrics()).unwrap();
    assert_eq!(sticker.dimensions(), (340, 380));
    // 2x nearest upsample: marker pixel (5,5) lands on (10..12, 10..12).
    assert_eq!(sticker.get_pixel(20 + 10, 60 + 10).0, [0, 0, 0, 255]);
}

#[test]
fn rejects_non_square_marker_and_bad_spec() {
    let marker = MarkerBitmap::new(10, 12);
    let err = render_sticker(&marker, &FrameSpec::default(), &metrics()).unwrap_err();
    assert!(matches!(err, PopError::Validation(_)));

    let spec = FrameSpec {
        text_content: "x".repeat(21),
        ..FrameSpec::default()
    };
    let err = render_sticker(&checker_marker(30), &spec, &metrics()).unwrap_err();
    assert!(matches!(err, PopError::InvalidFrameSpec(_)));
}

#[test]
fn svg_markup_is_available_for_framed_variants_only() {
    assert!(
        render_sticker_svg(&FrameSpec::default(), &metrics())
            .unwrap()
            .starts_with("<svg")
    );
    assert!(render_sticker_svg(&FrameSpec::plain(), &metrics()).is_err());
}
