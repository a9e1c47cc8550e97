use super::*;

#[test]
fn canvas_defaults_to_720p() {
    let c = Canvas::default();
    assert_eq!((c.width, c.height), (1280, 720));
    assert_eq!(c.center(), Point::new(640.0, 360.0));
}

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 720).is_err());
    assert!(Canvas::new(1280, 0).is_err());
    assert!(Canvas::new(1, 1).is_ok());
}

#[test]
fn canvas_fields_default_when_absent() {
    let c: Canvas = serde_json::from_str(r#"{"width": 1920}"#).unwrap();
    assert_eq!((c.width, c.height), (1920, 720));
}

#[test]
fn alpha_mul_rounds_and_clamps() {
    let c = Rgba8::WHITE.with_alpha_mul(0.5);
    assert_eq!(c.a, 128);
    assert_eq!(Rgba8::WHITE.with_alpha_mul(2.0).a, 255);
    assert_eq!(Rgba8::BLACK.with_alpha_mul(-1.0).a, 0);
}
