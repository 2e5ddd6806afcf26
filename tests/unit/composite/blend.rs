use super::*;

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_half_alpha_mixes() {
    let dst = [0, 0, 255, 255];
    let src = [128, 0, 0, 128];
    assert_eq!(over(dst, src), [128, 0, 127, 255]);
}

#[test]
fn placed_blit_clips_to_destination() {
    let (dw, dh) = (4u32, 3u32);
    let mut dst = vec![0u8; (dw * dh * 4) as usize];
    let src = [9u8, 9, 9, 255].repeat(4);

    over_in_place_at(&mut dst, dw, dh, &src, 2, 2, (3, 2)).unwrap();

    let px = |x: u32, y: u32| {
        let i = ((y * dw + x) * 4) as usize;
        [dst[i], dst[i + 1], dst[i + 2], dst[i + 3]]
    };
    assert_eq!(px(3, 2), [9, 9, 9, 255]);
    assert_eq!(px(2, 2), [0, 0, 0, 0]);
    assert_eq!(px(3, 1), [0, 0, 0, 0]);
}

#[test]
fn placed_blit_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 16];
    assert!(over_in_place_at(&mut dst, 2, 2, &[0u8; 4], 2, 2, (0, 0)).is_err());
}

#[test]
fn origin_outside_destination_is_noop() {
    let mut dst = vec![1u8; 16];
    over_in_place_at(&mut dst, 2, 2, &[200u8; 4], 1, 1, (5, 0)).unwrap();
    assert_eq!(dst, vec![1u8; 16]);
}
