use super::*;

#[test]
fn endpoints_match_exactly() {
    let c = Channel::new(-90.0, -60.0, Ease::OutCubic);
    assert_eq!(c.sample(0.0), -90.0);
    assert_eq!(c.sample(1.0), -60.0);
}

#[test]
fn linear_midpoint() {
    let c = Channel::new(0.1, 0.3, Ease::Linear);
    assert!((c.sample(0.5) - 0.2).abs() < 1e-12);
}
