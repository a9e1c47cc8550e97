use super::*;

#[test]
fn parses_short_and_long_forms() {
    assert_eq!(parse_hex_color("#FFF").unwrap(), Rgba8::WHITE);
    assert_eq!(parse_hex_color("#f00").unwrap(), Rgba8::opaque(255, 0, 0));
    assert_eq!(
        parse_hex_color("#1a1a1a").unwrap(),
        Rgba8::opaque(0x1a, 0x1a, 0x1a)
    );
    let c = parse_hex_color("#0000ff80").unwrap();
    assert_eq!((c.b, c.a), (255, 128));
    let c = parse_hex_color("0008").unwrap();
    assert_eq!(c.a, 0x88);
}

#[test]
fn rejects_malformed_colors() {
    for bad in ["", "#", "#12", "#12345", "#GGGGGG", "red", "#ffé"] {
        let err = parse_hex_color(bad).unwrap_err();
        assert!(err.to_string().contains("validation error:"), "{bad}");
    }
}
