use super::*;

#[test]
fn parse_hex_accepts_common_spellings() {
    let red = Rgb8::new(255, 0, 0);
    assert_eq!(Rgb8::parse_hex("#ff0000").unwrap(), red);
    assert_eq!(Rgb8::parse_hex("FF0000").unwrap(), red);
    assert_eq!(Rgb8::parse_hex(" #f00 ").unwrap(), red);
    assert_eq!(Rgb8::parse_hex("f00").unwrap(), red);
}

#[test]
fn parse_hex_rejects_garbage() {
    assert!(Rgb8::parse_hex("").is_err());
    assert!(Rgb8::parse_hex("#").is_err());
    assert!(Rgb8::parse_hex("#ff00").is_err());
    assert!(Rgb8::parse_hex("#gg0000").is_err());
    assert!(Rgb8::parse_hex("red").is_err());
    assert!(Rgb8::parse_hex("#ff0000ff").is_err());
}

#[test]
fn to_hex_is_lowercase_with_hash() {
    assert_eq!(Rgb8::new(0x1a, 0xAB, 0x03).to_hex(), "#1aab03");
    assert_eq!(Rgb8::parse_hex("ABC").unwrap().to_string(), "#aabbcc");
}

#[test]
fn serde_uses_hex_strings() {
    let c: Rgb8 = serde_json::from_str("\"#102030\"").unwrap();
    assert_eq!(c, Rgb8::new(0x10, 0x20, 0x30));
    assert_eq!(serde_json::to_string(&c).unwrap(), "\"#102030\"");
    assert!(serde_json::from_str::<Rgb8>("\"nope\"").is_err());
}

#[test]
fn premultiply_then_unpremultiply_keeps_opaque_and_clear_pixels() {
    let mut px = vec![10u8, 20, 30, 255, 200, 100, 50, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[10, 20, 30, 255]);
    assert_eq!(&px[4..], &[0, 0, 0, 0]);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[10, 20, 30, 255]);
}

#[test]
fn premultiply_half_alpha() {
    let mut px = vec![100u8, 50, 200, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(
        px,
        vec![
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
    unpremultiply_rgba8_in_place(&mut px);
    assert!((px[0] as i16 - 100).abs() <= 1);
    assert!((px[2] as i16 - 200).abs() <= 1);
}
