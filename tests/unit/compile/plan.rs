use super::*;
use crate::assets::catalog::{AssetIndex, AssumePresent};
use crate::foundation::core::Point;
use crate::template::dsl::{
    TemplateBuilder, TextZoneBuilder, badge_zone, image_zone, position, subject,
};
use crate::template::model::{LayoutMode, TextBackground};
use crate::text::metrics::ApproxMetrics;

fn data(pairs: &[(&str, &str)]) -> DataRecord {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn plan_with(template: &Template, d: &DataRecord) -> RenderPlan {
    let mut metrics = ApproxMetrics::new();
    let mut ctx = RenderContext::new(&AssumePresent, &mut metrics);
    render(template, d, &mut ctx)
}

fn text(plan: &RenderPlan, name: &str) -> TextPlan {
    match &plan.zone(name).unwrap().content {
        ZoneContent::Text(t) => t.clone(),
        other => panic!("expected text zone, got {other:?}"),
    }
}

fn severity_template() -> Template {
    TemplateBuilder::new("sev", "Severity", "alerts")
        .zone(
            "severity",
            TextZoneBuilder::new(position(100, 100, 600, 120))
                .color_rule("CRITICAL", "#FF0000")
                .color_rule("default", "#FFFFFF")
                .build()
                .unwrap(),
        )
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn color_rules_pick_exact_match_then_default() {
    let t = severity_template();

    let crit = text(&plan_with(&t, &data(&[("severity", "CRITICAL")])), "severity");
    assert_eq!(crit.fill.source, "#FF0000");
    assert_eq!(crit.fill.rgba, Rgba8::opaque(255, 0, 0));

    let low = text(&plan_with(&t, &data(&[("severity", "LOW")])), "severity");
    assert_eq!(low.fill.source, "#FFFFFF");
    assert_eq!(low.fill.rgba, Rgba8::WHITE);
}

#[test]
fn color_rules_match_the_raw_value_before_case_transform() {
    let mut t = severity_template();
    if let Some(Zone::Text(z)) = t.zones.get_mut("severity") {
        z.transform = crate::template::model::TextCase::Lowercase;
    }
    let plan = plan_with(&t, &data(&[("severity", "CRITICAL")]));
    let z = text(&plan, "severity");
    assert_eq!(z.text, "critical");
    assert_eq!(z.fill.source, "#FF0000");
}

#[test]
fn missing_or_empty_text_values_omit_the_zone() {
    let t = severity_template();
    assert!(plan_with(&t, &data(&[])).zones.is_empty());
    assert!(plan_with(&t, &data(&[("severity", "")])).zones.is_empty());
}

#[test]
fn zones_keep_template_order() {
    let t = TemplateBuilder::new("o", "Order", "p")
        .zone(
            "zeta",
            TextZoneBuilder::new(position(0, 0, 400, 100)).build().unwrap(),
        )
        .unwrap()
        .zone(
            "alpha",
            TextZoneBuilder::new(position(0, 200, 400, 100)).build().unwrap(),
        )
        .unwrap()
        .build()
        .unwrap();
    let plan = plan_with(&t, &data(&[("alpha", "A"), ("zeta", "Z")]));
    let names: Vec<_> = plan.zones.iter().map(|z| z.name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
    assert_eq!(plan.zones[1].area, Rect::new(0.0, 200.0, 400.0, 300.0));
}

#[test]
fn rotate_policy_cycles_with_render_count() {
    let t = TemplateBuilder::new("r", "Rotate", "p")
        .background_image("a.png")
        .background_image("b.png")
        .background_image("c.png")
        .selection(SelectionPolicy::Rotate)
        .build()
        .unwrap();

    let mut picked = Vec::new();
    for n in 0..5 {
        let mut metrics = ApproxMetrics::new();
        let mut ctx = RenderContext::new(&AssumePresent, &mut metrics).render_count(n);
        match render(&t, &DataRecord::new(), &mut ctx).background {
            BackgroundPlan::Image(img) => picked.push(img.reference),
            other => panic!("unexpected background {other:?}"),
        }
    }
    assert_eq!(picked, vec!["a.png", "b.png", "c.png", "a.png", "b.png"]);
}

#[test]
fn random_policy_is_reproducible_for_a_seed() {
    let t = TemplateBuilder::new("r", "Random", "p")
        .background_image("a.png")
        .background_image("b.png")
        .background_image("c.png")
        .selection(SelectionPolicy::Random)
        .build()
        .unwrap();

    let pick = |seed: u64| {
        let mut metrics = ApproxMetrics::new();
        let mut ctx = RenderContext::new(&AssumePresent, &mut metrics).seed(seed);
        match render(&t, &DataRecord::new(), &mut ctx).background {
            BackgroundPlan::Image(img) => img.selected_index.unwrap(),
            other => panic!("unexpected background {other:?}"),
        }
    };
    for seed in [0, 1, 42, u64::MAX] {
        let i = pick(seed);
        assert!(i < 3);
        assert_eq!(i, pick(seed));
    }
}

#[test]
fn first_policy_and_override() {
    let t = TemplateBuilder::new("f", "First", "p")
        .background_image("a.png")
        .background_image("b.png")
        .build()
        .unwrap();

    match plan_with(&t, &DataRecord::new()).background {
        BackgroundPlan::Image(img) => {
            assert_eq!(img.reference, "a.png");
            assert_eq!(img.selected_index, Some(0));
            assert_eq!(img.placement, t.canvas.rect());
            assert_eq!(img.visible, Some(t.canvas.rect()));
        }
        other => panic!("unexpected background {other:?}"),
    }

    let mut metrics = ApproxMetrics::new();
    let mut ctx = RenderContext::new(&AssumePresent, &mut metrics)
        .background_override(Some("generated.png".into()));
    match render(&t, &DataRecord::new(), &mut ctx).background {
        BackgroundPlan::Image(img) => {
            assert_eq!(img.reference, "generated.png");
            assert_eq!(img.selected_index, None);
        }
        other => panic!("unexpected background {other:?}"),
    }
}

#[test]
fn empty_and_missing_backgrounds_use_placeholder_fill() {
    let empty = Template::new("e", "Empty", "p");
    assert_eq!(
        plan_with(&empty, &DataRecord::new()).background,
        BackgroundPlan::Empty {
            fill: Rgba8::opaque(0x1a, 0x1a, 0x1a)
        }
    );

    let t = TemplateBuilder::new("m", "Missing", "p")
        .background_image("gone.png")
        .build()
        .unwrap();
    let assets = AssetIndex::new();
    let mut metrics = ApproxMetrics::new();
    let mut ctx = RenderContext::new(&assets, &mut metrics);
    match render(&t, &DataRecord::new(), &mut ctx).background {
        BackgroundPlan::Missing { reference, .. } => assert_eq!(reference, "gone.png"),
        other => panic!("unexpected background {other:?}"),
    }
}

#[test]
fn background_image_is_cover_fitted_inside_placement() {
    let t = TemplateBuilder::new("c", "Cover", "p")
        .background_image("square.png")
        .build()
        .unwrap();
    let assets = AssetIndex::new().with(
        AssetKind::Background,
        "square.png",
        Some(Size::new(500.0, 500.0)),
    );
    let mut metrics = ApproxMetrics::new();
    let mut ctx = RenderContext::new(&assets, &mut metrics);
    match render(&t, &DataRecord::new(), &mut ctx).background {
        BackgroundPlan::Image(img) => {
            assert!((img.image_rect.width() - 1280.0).abs() < 1e-9);
            assert!((img.image_rect.height() - 1280.0).abs() < 1e-9);
            assert_eq!(img.visible, Some(t.canvas.rect()));
        }
        other => panic!("unexpected background {other:?}"),
    }
}

#[test]
fn subject_plan_tracks_presence_and_bounds() {
    let t = TemplateBuilder::new("s", "Subject", "p")
        .subject(subject("host.png"))
        .build()
        .unwrap();
    let assets = AssetIndex::new().with(AssetKind::Subject, "host.png", Some(Size::new(200.0, 100.0)));
    let mut metrics = ApproxMetrics::new();
    let mut ctx = RenderContext::new(&assets, &mut metrics);
    let s = render(&t, &DataRecord::new(), &mut ctx).subject.unwrap();
    assert!(!s.missing);
    assert_eq!(s.bounds, Some(Rect::new(540.0, 310.0, 740.0, 410.0)));

    let assumed = plan_with(&t, &DataRecord::new());
    assert!(!assumed.subject.unwrap().missing);

    let empty_assets = AssetIndex::new();
    let mut metrics = ApproxMetrics::new();
    let mut ctx = RenderContext::new(&empty_assets, &mut metrics);
    let s = render(&t, &DataRecord::new(), &mut ctx).subject.unwrap();
    assert!(s.missing);
    assert_eq!(s.bounds, None);

    let mut disabled = t.clone();
    if let Some(s) = disabled.subject.as_mut() {
        s.enabled = false;
    }
    assert!(plan_with(&disabled, &DataRecord::new()).subject.is_none());
}

#[test]
fn badge_respects_visibility_and_default_variant() {
    let mut zone = badge_zone(
        position(1100, 20, 160, 60),
        [("CRITICAL", "badge_red.png"), ("default", "badge_grey.png")],
    );
    if let Zone::Badge(b) = &mut zone {
        b.visible_when = Some("show_badge".into());
    }
    let t = TemplateBuilder::new("b", "Badge", "p")
        .zone("severity", zone)
        .unwrap()
        .build()
        .unwrap();

    let hidden = plan_with(&t, &data(&[("severity", "CRITICAL")]));
    assert!(hidden.zone("severity").is_none());

    let plan = plan_with(&t, &data(&[("severity", "CRITICAL"), ("show_badge", "yes")]));
    match &plan.zone("severity").unwrap().content {
        ZoneContent::Badge(b) => assert_eq!(b.variant, "badge_red.png"),
        other => panic!("expected badge, got {other:?}"),
    }

    let plan = plan_with(&t, &data(&[("severity", "MEDIUM"), ("show_badge", "yes")]));
    match &plan.zone("severity").unwrap().content {
        ZoneContent::Badge(b) => assert_eq!(b.variant, "badge_grey.png"),
        other => panic!("expected badge, got {other:?}"),
    }
}

#[test]
fn badge_without_match_or_default_is_omitted() {
    let t = TemplateBuilder::new("b", "Badge", "p")
        .zone(
            "severity",
            badge_zone(position(0, 0, 10, 10), [("CRITICAL", "red.png")]),
        )
        .unwrap()
        .build()
        .unwrap();
    assert!(plan_with(&t, &data(&[("severity", "LOW")])).zones.is_empty());
}

#[test]
fn image_zone_maps_value_and_flags_missing_assets() {
    let t = TemplateBuilder::new("i", "Image", "p")
        .zone(
            "vendor",
            image_zone(
                position(40, 40, 200, 200),
                [("acme", "acme_logo.png"), ("default", "generic.png")],
            ),
        )
        .unwrap()
        .build()
        .unwrap();
    let assets = AssetIndex::new().with(AssetKind::Image, "acme_logo.png", None);
    let mut metrics = ApproxMetrics::new();

    let mut ctx = RenderContext::new(&assets, &mut metrics);
    let plan = render(&t, &data(&[("vendor", "acme")]), &mut ctx);
    match &plan.zone("vendor").unwrap().content {
        ZoneContent::Image(img) => {
            assert_eq!(img.reference, "acme_logo.png");
            assert!(!img.missing);
        }
        other => panic!("expected image, got {other:?}"),
    }

    let mut ctx = RenderContext::new(&assets, &mut metrics);
    let plan = render(&t, &data(&[("vendor", "other")]), &mut ctx);
    match &plan.zone("vendor").unwrap().content {
        ZoneContent::Image(img) => {
            assert_eq!(img.reference, "generic.png");
            assert!(img.missing);
        }
        other => panic!("expected image, got {other:?}"),
    }
}

#[test]
fn overlays_resolve_effects_and_assets_in_order() {
    let t = TemplateBuilder::new("o", "Overlays", "p")
        .overlay("vignette")
        .overlay("frame.png")
        .overlay("grain")
        .overlay("vignette_subtle")
        .build()
        .unwrap();
    let assets = AssetIndex::new();
    let mut metrics = ApproxMetrics::new();
    let mut ctx = RenderContext::new(&assets, &mut metrics);
    let plan = render(&t, &DataRecord::new(), &mut ctx);
    assert_eq!(
        plan.overlays,
        vec![
            OverlayPlan::Vignette { strength: 0.5 },
            OverlayPlan::Asset {
                reference: "frame.png".into(),
                missing: true
            },
            OverlayPlan::Grain { amount: 0.1 },
            OverlayPlan::Vignette { strength: 0.3 },
        ]
    );
}

#[test]
fn unavailable_font_falls_back_to_settings_font() {
    let t = TemplateBuilder::new("f", "Font", "p")
        .zone(
            "title",
            TextZoneBuilder::new(position(0, 0, 800, 200))
                .font("Anton")
                .build()
                .unwrap(),
        )
        .unwrap()
        .build()
        .unwrap();
    let mut metrics = ApproxMetrics::with_families(["Impact"]);
    let mut ctx = RenderContext::new(&AssumePresent, &mut metrics);
    let z = text(&render(&t, &data(&[("title", "Hi")]), &mut ctx), "title");
    assert!(z.font_fallback);
    assert_eq!(z.requested_font, "Anton");
    assert_eq!(z.font_family, "sans-serif");
}

#[test]
fn zone_opacity_is_a_group_alpha() {
    let t = TemplateBuilder::new("a", "Alpha", "p")
        .zone(
            "title",
            TextZoneBuilder::new(position(0, 0, 800, 200))
                .opacity(0.5)
                .plate(TextBackground {
                    enabled: true,
                    ..TextBackground::default()
                })
                .build()
                .unwrap(),
        )
        .unwrap()
        .build()
        .unwrap();
    let z = text(&plan_with(&t, &data(&[("title", "Hi")])), "title");
    assert_eq!(z.opacity, 0.5);
    // element colors keep their own alpha; the zone composites once at `opacity`
    assert_eq!(z.fill.rgba.a, 255);
    assert_eq!(z.stroke.as_ref().unwrap().color.rgba.a, 255);
    assert_eq!(z.shadow.as_ref().unwrap().color.rgba.a, 255);
    let plate = z.plate.unwrap();
    assert_eq!(plate.color.rgba.a, (0.7_f64 * 255.0).round() as u8);
    assert_eq!(plate.rect, z.block.inflate(20.0, 20.0));
}

#[test]
fn opaque_zone_reports_full_group_alpha() {
    let z = text(
        &plan_with(&severity_template(), &data(&[("severity", "LOW")])),
        "severity",
    );
    assert_eq!(z.opacity, 1.0);
    assert_eq!(z.stroke.unwrap().color.rgba.a, 255);
}

#[test]
fn default_effects_produce_stroke_and_shadow() {
    let z = text(
        &plan_with(&severity_template(), &data(&[("severity", "LOW")])),
        "severity",
    );
    let stroke = z.stroke.unwrap();
    assert_eq!(stroke.width, 4.0);
    assert_eq!(stroke.offsets, stroke_offsets(4.0));
    let shadow = z.shadow.unwrap();
    assert_eq!(shadow.blur, 8.0);
    assert_eq!(shadow.offset, Vec2::new(2.0, 2.0));
    assert!(z.plate.is_none());
}

#[test]
fn stacked_chars_gap_scales_into_preview() {
    let t = TemplateBuilder::new("v", "Vertical", "p")
        .zone(
            "tag",
            TextZoneBuilder::new(position(100, 0, 200, 600))
                .size(100, 100, false)
                .line_height(1.0)
                .stack_gap(10.0)
                .layout_mode(LayoutMode::StackedChars)
                .build()
                .unwrap(),
        )
        .unwrap()
        .build()
        .unwrap();
    let plan = plan_with(&t, &data(&[("tag", "AB")]));
    let z = text(&plan, "tag");
    assert_eq!(z.units.len(), 2);
    let gap = z.units[1].rect.y0 - z.units[0].rect.y1;
    assert!((gap - 10.0).abs() < 1e-9);

    let space = PreviewSpace::new(t.canvas, 640.0).unwrap();
    let to_preview = plan.preview_transform(&space);
    let top = to_preview * Point::new(z.units[1].rect.x0, z.units[1].rect.y0);
    let bottom = to_preview * Point::new(z.units[0].rect.x0, z.units[0].rect.y1);
    assert!((top.y - bottom.y - 5.0).abs() < 1e-9);
}

#[test]
fn plan_serializes_with_tagged_variants() {
    let t = severity_template();
    let v = serde_json::to_value(plan_with(&t, &data(&[("severity", "LOW")]))).unwrap();
    assert_eq!(v["background"]["kind"], "empty");
    assert_eq!(v["zones"][0]["content"]["type"], "text");
    assert_eq!(v["zones"][0]["content"]["text"], "LOW");
}
