use super::*;

#[test]
fn parses_short_long_and_alpha_hex() {
    assert_eq!(Rgba8::parse_hex("#fff").unwrap(), Rgba8::WHITE);
    assert_eq!(Rgba8::parse_hex("#FF0000").unwrap(), Rgba8::opaque(255, 0, 0));
    assert_eq!(
        Rgba8::parse_hex("0000ff80").unwrap(),
        Rgba8 {
            r: 0,
            g: 0,
            b: 255,
            a: 128
        }
    );
}

#[test]
fn rejects_malformed_hex() {
    assert!(Rgba8::parse_hex("#ff00").is_err());
    assert!(Rgba8::parse_hex("#gg0000").is_err());
    assert!(Rgba8::parse_hex("#ééé").is_err());
    assert!(Rgba8::parse_hex("#+f+f+f").is_err());
    assert!(Rgba8::parse_hex("+f+f+f+f").is_err());
}

#[test]
fn hex_output_is_lowercase_and_omits_opaque_alpha() {
    assert_eq!(Rgba8::opaque(0xAB, 0xCD, 0xEF).to_hex(), "#abcdef");
    assert_eq!(
        Rgba8 {
            r: 1,
            g: 2,
            b: 3,
            a: 4
        }
        .to_hex(),
        "#01020304"
    );
}

#[test]
fn size_rejects_empty() {
    assert!(Size::new(0, 10).is_err());
    assert_eq!(
        Size::new(3, 4).unwrap(),
        Size {
            width: 3,
            height: 4
        }
    );
}
