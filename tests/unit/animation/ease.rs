use super::*;

const ALL: [Ease; 4] = [Ease::Linear, Ease::InOutQuad, Ease::OutCubic, Ease::OutBack];

#[test]
fn endpoints_are_exact() {
    for ease in ALL {
        assert_eq!(ease.apply(0.0), 0.0, "{ease:?}");
        assert_eq!(ease.apply(1.0), 1.0, "{ease:?}");
        assert_eq!(ease.apply(-3.0), 0.0, "{ease:?}");
        assert_eq!(ease.apply(7.0), 1.0, "{ease:?}");
        assert_eq!(ease.apply(f64::NAN), 0.0, "{ease:?}");
    }
}

#[test]
fn in_out_quad_is_symmetric() {
    for t in [0.1, 0.25, 0.4] {
        let a = Ease::InOutQuad.apply(t);
        let b = Ease::InOutQuad.apply(1.0 - t);
        assert!((a + b - 1.0).abs() < 1e-12);
    }
    assert!((Ease::InOutQuad.apply(0.5) - 0.5).abs() < 1e-12);
}

#[test]
fn out_back_overshoots() {
    let peak = (1..100)
        .map(|i| Ease::OutBack.apply(f64::from(i) / 100.0))
        .fold(f64::MIN, f64::max);
    assert!(peak > 1.05, "peak {peak}");
}

#[test]
fn out_cubic_is_monotonic() {
    let mut prev = 0.0;
    for i in 1..=20 {
        let v = Ease::OutCubic.apply(f64::from(i) / 20.0);
        assert!(v > prev);
        prev = v;
    }
}
