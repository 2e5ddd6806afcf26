use super::*;

fn gradient(w: u32, h: u32) -> image::RgbaImage {
    image::RgbaImage::from_fn(w, h, |x, y| image::Rgba([(x % 256) as u8, (y % 256) as u8, 7, 255]))
}

#[test]
fn pyramid_halves_until_min_side() {
    let compiler = PyramidCompiler::default();
    let bytes = compiler
        .compile_image_targets(&[gradient(200, 100)], &CancelToken::new())
        .unwrap();
    let info = PyramidCompiler::inspect(&bytes).unwrap();
    assert_eq!(info.images, vec![vec![(200, 100), (100, 50), (50, 25)]]);
}

#[test]
fn pyramid_respects_max_levels() {
    let compiler = PyramidCompiler {
        max_levels: 2,
        min_side: 1,
    };
    let bytes = compiler
        .compile_image_targets(&[gradient(64, 64), gradient(32, 8)], &CancelToken::new())
        .unwrap();
    let info = PyramidCompiler::inspect(&bytes).unwrap();
    assert_eq!(
        info.images,
        vec![vec![(64, 64), (32, 32)], vec![(32, 8), (16, 4)]]
    );
}

#[test]
fn compile_is_deterministic() {
    let compiler = PyramidCompiler::default();
    let img = [gradient(120, 90)];
    let a = compiler
        .compile_image_targets(&img, &CancelToken::new())
        .unwrap();
    let b = compiler
        .compile_image_targets(&img, &CancelToken::new())
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn cancelled_token_aborts() {
    let token = CancelToken::new();
    token.cancel();
    let err = PyramidCompiler::default()
        .compile_image_targets(&[gradient(40, 40)], &token)
        .unwrap_err();
    assert!(err.to_string().contains("cancelled"));
}

#[test]
fn empty_input_is_rejected() {
    assert!(
        PyramidCompiler::default()
            .compile_image_targets(&[], &CancelToken::new())
            .is_err()
    );
}

#[test]
fn inspect_rejects_truncated_and_foreign_data() {
    let bytes = PyramidCompiler::default()
        .compile_image_targets(&[gradient(40, 40)], &CancelToken::new())
        .unwrap();
    assert!(PyramidCompiler::inspect(&bytes[..bytes.len() - 1]).is_err());
    assert!(PyramidCompiler::inspect(b"GIF89a").is_err());
}

#[test]
fn compiled_target_tracks_its_composite() {
    let composite = CompositeImage::from_image(gradient(8, 8));
    let other = CompositeImage::from_image(gradient(9, 8));
    let target = CompiledTarget::new(vec![1u8, 2, 3], composite.fingerprint());
    assert!(target.matches(&composite));
    assert!(!target.matches(&other));
    assert_eq!(target.bytes(), &[1, 2, 3]);
}
