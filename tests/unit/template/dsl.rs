use super::*;

#[test]
fn builders_create_expected_structure() {
    let t = TemplateBuilder::new("t0", "Weekly", "secnews")
        .canvas(Canvas {
            width: 1920,
            height: 1080,
        })
        .background_image("bg.png")
        .subject(subject("host.png"))
        .zone(
            "title",
            TextZoneBuilder::new(position(60, 700, 1800, 300))
                .font("Anton")
                .size(40, 120, true)
                .layout_mode(LayoutMode::StackedWords)
                .align(TextAlign::Left, TextVAlign::Bottom)
                .stack_gap(8.0)
                .transform(TextCase::Uppercase)
                .build()
                .unwrap(),
        )
        .unwrap()
        .zone("logo", image_zone(position(20, 20, 100, 100), [("default", "logo.png")]))
        .unwrap()
        .overlay("grain")
        .build()
        .unwrap();

    assert_eq!(t.canvas.width, 1920);
    assert_eq!(t.background.fixed_images, vec!["bg.png"]);
    assert!(t.subject.as_ref().unwrap().is_active());
    assert_eq!(t.zones.len(), 2);
    assert_eq!(t.overlays, vec!["grain"]);
    let Some(Zone::Text(z)) = t.zone("title") else {
        panic!("expected text zone");
    };
    assert_eq!(z.font, "Anton");
    assert_eq!(z.size.max, 120);
    assert_eq!(z.stack_gap, 8.0);
}

#[test]
fn duplicate_zone_name_is_rejected() {
    let builder = TemplateBuilder::new("t0", "n", "p")
        .zone("a", badge_zone(position(0, 0, 10, 10), [("x", "x.png")]))
        .unwrap();
    assert!(
        builder
            .zone("a", badge_zone(position(0, 0, 10, 10), [("y", "y.png")]))
            .is_err()
    );
}

#[test]
fn build_validates() {
    assert!(TemplateBuilder::new("", "n", "p").build().is_err());
    assert!(
        TextZoneBuilder::new(position(0, 0, 10, 10))
            .size(90, 40, true)
            .build()
            .is_err()
    );
    assert!(
        TextZoneBuilder::new(position(0, 0, 10, 10))
            .line_height(0.0)
            .build()
            .is_err()
    );
}
