use super::*;
use crate::mapping::viewport::PlacementRect;

fn bounds() -> ViewportBounds {
    ViewportBounds {
        max_width: 200.0,
        max_height: 150.0,
        max_zoom: 1.0,
        min_width: 10.0,
        min_height: 10.0,
    }
}

fn solid(w: u32, h: u32, px: [u8; 4]) -> image::RgbaImage {
    image::RgbaImage::from_pixel(w, h, image::Rgba(px))
}

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 1)
}

fn placement(rect: PlacementRect) -> Placement {
    Placement {
        rect,
        natural: Size::new(400, 300).unwrap(),
    }
}

const BLUE: [u8; 4] = [0, 0, 255, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

#[test]
fn sticker_lands_on_mapped_natural_rect() {
    let design = solid(400, 300, BLUE);
    let sticker = solid(6, 8, RED);
    let p = placement(PlacementRect::new(10.0, 20.0, 30.0, 40.0));

    let out = compose(&design, &sticker, &p, &bounds()).unwrap();
    let img = out.image();
    assert_eq!(img.dimensions(), (400, 300));
    assert_eq!(img.get_pixel(19, 39).0, BLUE);
    assert!(close(img.get_pixel(20, 40).0, RED));
    assert!(close(img.get_pixel(79, 119).0, RED));
    assert_eq!(img.get_pixel(80, 120).0, BLUE);
    assert_eq!(img.get_pixel(80, 40).0, BLUE);
}

#[test]
fn aspect_is_not_preserved() {
    let p = placement(PlacementRect::new(0.0, 0.0, 100.0, 10.0));
    let rect = snap_to_pixels(&p, &bounds()).unwrap();
    assert_eq!(
        rect,
        PixelRect {
            x: 0,
            y: 0,
            width: 200,
            height: 20
        }
    );
}

#[test]
fn inputs_are_not_mutated_and_output_is_deterministic() {
    let design = solid(400, 300, BLUE);
    let sticker = solid(6, 8, [255, 0, 0, 128]);
    let (d0, s0) = (design.clone(), sticker.clone());
    let p = placement(PlacementRect::new(50.0, 50.0, 20.0, 20.0));

    let a = compose(&design, &sticker, &p, &bounds()).unwrap();
    let b = compose(&design, &sticker, &p, &bounds()).unwrap();
    assert_eq!(design, d0);
    assert_eq!(sticker, s0);
    assert_eq!(a, b);
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), CompositeImage::from_image(d0).fingerprint());
}

#[test]
fn design_resized_after_placement_is_rejected() {
    let design = solid(401, 300, BLUE);
    let p = placement(PlacementRect::new(10.0, 10.0, 20.0, 20.0));
    let err = compose(&design, &solid(4, 4, RED), &p, &bounds()).unwrap_err();
    assert!(matches!(
        err,
        PopError::CompositeSizeMismatch {
            expected_width: 400,
            actual_width: 401,
            ..
        }
    ));
}

#[test]
fn out_of_bounds_placement_is_rejected() {
    let design = solid(400, 300, BLUE);
    let p = placement(PlacementRect::new(190.0, 10.0, 20.0, 20.0));
    let err = compose(&design, &solid(4, 4, RED), &p, &bounds()).unwrap_err();
    assert!(matches!(err, PopError::PlacementOutOfBounds(_)));
}

#[test]
fn png_encoding_decodes_back() {
    let design = solid(400, 300, BLUE);
    let p = placement(PlacementRect::new(10.0, 10.0, 20.0, 20.0));
    let out = compose(&design, &solid(4, 4, RED), &p, &bounds()).unwrap();
    let png = out.encode_png().unwrap();
    assert_eq!(&png[..4], b"\x89PNG");
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(&decoded, out.image());
}

#[test]
fn translucent_design_pixels_outside_the_sticker_are_kept_exactly() {
    const HAZE: [u8; 4] = [200, 100, 50, 10];
    let design = solid(400, 300, HAZE);
    let p = placement(PlacementRect::new(10.0, 20.0, 30.0, 40.0));

    let out = compose(&design, &solid(6, 8, RED), &p, &bounds()).unwrap();
    let img = out.image();
    for (x, y) in [(0, 0), (19, 39), (80, 120), (399, 299)] {
        assert_eq!(img.get_pixel(x, y).0, HAZE, "({x},{y})");
    }
    assert!(close(img.get_pixel(40, 60).0, RED));

    let clear = compose(&design, &solid(6, 8, [0, 0, 0, 0]), &p, &bounds()).unwrap();
    assert_eq!(clear.image(), &design);
}
