use super::*;
use crate::template::dsl::{TemplateBuilder, TextZoneBuilder, position, subject};

fn sample() -> Template {
    TemplateBuilder::new("t", "n", "p")
        .subject(subject("host.png"))
        .zone(
            "title",
            TextZoneBuilder::new(position(100, 200, 640, 100))
                .build()
                .unwrap(),
        )
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn apply_edit_returns_new_snapshot() {
    let t = sample();
    let next = t
        .apply_edit(&TemplateEdit::SetZonePosition {
            zone: "title".into(),
            position: position(1, 2, 3, 4),
        })
        .unwrap();
    assert_eq!(*next.zone("title").unwrap().position(), position(1, 2, 3, 4));
    assert_eq!(*t.zone("title").unwrap().position(), position(100, 200, 640, 100));
}

#[test]
fn apply_edit_rejects_unknown_targets() {
    let t = sample();
    assert!(matches!(
        t.apply_edit(&TemplateEdit::SetZonePosition {
            zone: "nope".into(),
            position: position(0, 0, 1, 1),
        }),
        Err(ThumbError::Edit(_))
    ));

    let mut bare = t.clone();
    bare.subject = None;
    assert!(
        bare.apply_edit(&TemplateEdit::SetLayerOffset {
            layer: Layer::Subject,
            x: 1,
            y: 1,
        })
        .is_err()
    );
    assert!(
        t.apply_edit(&TemplateEdit::SetLayerScale {
            layer: Layer::Background,
            scale: -1.0,
        })
        .is_err()
    );
}

#[test]
fn reset_layer_restores_neutral_placement() {
    let t = sample()
        .apply_edit(&TemplateEdit::SetLayerOffset {
            layer: Layer::Subject,
            x: 40,
            y: -15,
        })
        .unwrap()
        .apply_edit(&TemplateEdit::SetLayerScale {
            layer: Layer::Subject,
            scale: 1.7,
        })
        .unwrap();
    let reset = t
        .apply_edit(&TemplateEdit::ResetLayer {
            layer: Layer::Subject,
        })
        .unwrap();
    let s = reset.subject.unwrap();
    assert_eq!((s.offset_x, s.offset_y, s.scale), (0, 0, 1.0));
    assert!(s.enabled);
}

#[test]
fn add_text_zone_names_title_then_numbered() {
    let mut t = Template::new("t", "n", "p");
    assert_eq!(t.add_text_zone().unwrap(), "title");
    assert_eq!(t.add_text_zone().unwrap(), "zone_2");
    assert_eq!(t.add_text_zone().unwrap(), "zone_3");
    assert_eq!(*t.zone("zone_2").unwrap().position(), DEFAULT_ZONE_POSITION);

    t.zones.remove("zone_2");
    // len is 2 again, so zone_3 would collide
    assert_eq!(t.add_text_zone().unwrap(), "zone_4");
}

#[test]
fn duplicate_resets_identity() {
    let mut t = sample();
    t.version = 7;
    t.created_at = Some("2024-01-01T00:00:00".into());
    let d = t.duplicate("t2", "Copy");
    assert_eq!(d.id, "t2");
    assert_eq!(d.name, "Copy");
    assert_eq!(d.version, 1);
    assert!(d.created_at.is_none());
    assert_eq!(d.zones, t.zones);
}

#[test]
fn resize_rejects_when_zones_exist() {
    let t = sample();
    let err = t
        .resize_canvas(
            Canvas {
                width: 1920,
                height: 1080,
            },
            CanvasResize::Reject,
        )
        .unwrap_err();
    assert!(matches!(err, ThumbError::Validation(_)));

    let same = t.resize_canvas(t.canvas, CanvasResize::Reject).unwrap();
    assert_eq!(same, t);

    let empty = Template::new("e", "n", "p")
        .resize_canvas(
            Canvas {
                width: 640,
                height: 360,
            },
            CanvasResize::Reject,
        )
        .unwrap();
    assert_eq!(empty.canvas.width, 640);
}

#[test]
fn resize_rescales_geometry_proportionally() {
    let t = sample()
        .apply_edit(&TemplateEdit::SetLayerOffset {
            layer: Layer::Background,
            x: 50,
            y: -20,
        })
        .unwrap();
    let big = t
        .resize_canvas(
            Canvas {
                width: 1920,
                height: 1080,
            },
            CanvasResize::Rescale,
        )
        .unwrap();
    assert_eq!(*big.zone("title").unwrap().position(), position(150, 300, 960, 150));
    assert_eq!((big.background.offset_x, big.background.offset_y), (75, -30));

    assert!(
        t.resize_canvas(
            Canvas {
                width: 0,
                height: 10,
            },
            CanvasResize::Rescale,
        )
        .is_err()
    );
}

#[test]
fn generated_background_becomes_first_fixed_image() {
    let mut t = sample();
    t.background.mode = BackgroundMode::Ai;
    t.background.fixed_images = vec!["old.png".into(), "gen.png".into()];
    t.accept_generated_background("gen.png").unwrap();
    assert_eq!(t.background.mode, BackgroundMode::Fixed);
    assert_eq!(t.background.fixed_images, vec!["gen.png", "old.png"]);
    assert!(t.accept_generated_background("  ").is_err());
}

#[test]
fn edits_serialize_with_op_tag() {
    let edit = TemplateEdit::SetLayerOffset {
        layer: Layer::Background,
        x: 20,
        y: 0,
    };
    let v = serde_json::to_value(&edit).unwrap();
    assert_eq!(v["op"], "set_layer_offset");
    assert_eq!(v["layer"], "background");
}
