//! End-to-end tests: backend payload -> session -> overlay frame

use overlay_core::{
    CoordinateConvention, Diagnostic, ElementCategory, OverlayConfig, OverlayDisplayMode,
    PageViewSession, RecordingSink, ScreenRect, ViewportGeometry,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::rc::Rc;

const NORMALIZED_PAYLOAD: &str = r#"```json
{
    "summary": "Mounting bracket, single view",
    "classification": {"document_type": "technical drawing", "industry": "manufacturing", "confidence": "high"},
    "dimension": [
        {"value": "100", "coordinate": {"x": {"left_x": "0.25", "right_x": "0.5"}, "y": {"lower_y": "0.25", "upper_y": "0.125"}}},
        {"value": "25.4mm", "coordinate": {"x": {"left_x": "0.5", "right_x": "0.5"}, "y": {"lower_y": "0.5", "upper_y": "0.5"}}},
        {"value": "105x155x4.5", "coordinate": {"x": {"left_x": "0", "right_x": "0.1"}, "y": {"lower_y": "0.1", "upper_y": "0"}}}
    ],
    "annotation": [
        {"value": "全周溶接", "value_en": "Weld all around",
         "coordinate": {"x": {"left_x": "0.625", "right_x": "0.875"}, "y": {"lower_y": "0.5", "upper_y": "0.375"}}},
        {"value": "注記", "value_en": "   ",
         "coordinate": {"x": {"left_x": "0.1", "right_x": "0.2"}, "y": {"lower_y": "0.2", "upper_y": "0.1"}}}
    ],
    "title_block": [
        {"value": "材質: SS400", "value_en": "Material: SS400",
         "coordinate": {"x": {"left_x": "1.125", "right_x": "1.5"}, "y": {"lower_y": "1.125", "upper_y": "0.875"}}}
    ],
    "others": [
        {"value": "Sheet 1/1", "coordinate": {"x": {"left_x": "unknown", "right_x": "1"}, "y": {"lower_y": "1", "upper_y": "0.9"}}}
    ]
}
```"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn recording_session(config: &OverlayConfig) -> (PageViewSession, Rc<RecordingSink>) {
    let sink = Rc::new(RecordingSink::new());
    (PageViewSession::with_sink(config, sink.clone()), sink)
}

// ============================================================
// Normalized convention
// ============================================================

#[test]
fn fenced_payload_renders_eligible_overlays() {
    init_tracing();
    let (mut session, sink) = recording_session(&OverlayConfig::default());
    session.load_payload(NORMALIZED_PAYLOAD).unwrap();
    session.on_page_rendered(ViewportGeometry::new(800.0, 1000.0, 612.0, 792.0));

    let frame = session.frame().unwrap();
    let shown: Vec<_> = frame
        .boxes
        .iter()
        .map(|b| (b.category, b.text.as_str()))
        .collect();
    assert_eq!(
        shown,
        vec![
            (ElementCategory::Dimension, "3.94\""),
            (ElementCategory::Dimension, "1.00\""),
            (ElementCategory::Annotation, "Weld all around"),
            (ElementCategory::TitleBlock, "Material: SS400"),
        ]
    );

    let first = &frame.boxes[0];
    assert_eq!(first.rect, ScreenRect::new(200.0, 125.0, 200.0, 125.0));
    assert_eq!(first.tooltip.original, "100");
    assert_eq!(first.tooltip.display, "3.94\"");

    // Zero-area box is floored to the minimum visible size
    assert_eq!(frame.boxes[1].rect, ScreenRect::new(400.0, 500.0, 50.0, 20.0));

    // Title block extends past the page: flagged, still drawn unclipped
    let title = &frame.boxes[3];
    assert!(title.out_of_bounds);
    assert_eq!(title.rect, ScreenRect::new(900.0, 875.0, 300.0, 250.0));

    assert_eq!(
        sink.count_where(|d| matches!(d, Diagnostic::Rejected { .. })),
        1
    );
    assert_eq!(
        sink.count_where(|d| matches!(d, Diagnostic::OutOfBounds { .. })),
        1
    );
    assert_eq!(
        sink.count_where(|d| matches!(d, Diagnostic::Clamped { .. })),
        1
    );
}

#[test]
fn resize_recomputes_and_discards_old_frame() {
    let (mut session, _) = recording_session(&OverlayConfig::default());
    session.load_payload(NORMALIZED_PAYLOAD).unwrap();

    session.on_page_rendered(ViewportGeometry::new(800.0, 1000.0, 612.0, 792.0));
    let before = session.frame().unwrap();
    session.on_page_rendered(ViewportGeometry::new(1600.0, 2000.0, 612.0, 792.0));
    let after = session.frame().unwrap();

    assert!(!session.is_current(&before));
    assert!(session.is_current(&after));
    assert_eq!(after.boxes[0].rect, ScreenRect::new(400.0, 250.0, 400.0, 250.0));
    assert_eq!(after.boxes[2].rect, ScreenRect::new(1000.0, 750.0, 400.0, 250.0));
}

#[test]
fn hidden_mode_keeps_toggle_control() {
    let (mut session, _) = recording_session(&OverlayConfig::default());
    session.load_payload(NORMALIZED_PAYLOAD).unwrap();
    session.on_page_rendered(ViewportGeometry::new(800.0, 1000.0, 612.0, 792.0));

    session.set_mode(OverlayDisplayMode::Hidden);
    let hidden = session.frame().unwrap();
    assert!(hidden.boxes.is_empty());
    assert_eq!(hidden.toggle.label, "Show overlays");

    session.toggle_mode();
    let visible = session.frame().unwrap();
    assert_eq!(visible.boxes.len(), 4);
    assert_eq!(visible.toggle.label, "Hide overlays");
}

#[test]
fn frame_serializes_for_rendering_surface() {
    let (mut session, _) = recording_session(&OverlayConfig::default());
    session.load_payload(NORMALIZED_PAYLOAD).unwrap();
    session.on_page_rendered(ViewportGeometry::new(800.0, 1000.0, 612.0, 792.0));

    let json = serde_json::to_value(session.frame().unwrap()).unwrap();
    assert_eq!(json["mode"], "visible");
    assert_eq!(json["boxes"][0]["category"], "dimension");
    assert_eq!(json["boxes"][0]["rect"]["left"], 200.0);
    assert_eq!(json["boxes"][2]["tooltip"]["original"], "全周溶接");
}

// ============================================================
// Absolute bottom-origin convention
// ============================================================

#[test]
fn absolute_convention_from_config() {
    let config = OverlayConfig::from_toml_str(
        r#"
        [placement]
        convention = "absolute_bottom_origin"

        [display]
        categories = ["dimension", "annotation"]
        "#,
    )
    .unwrap();
    let (mut session, _) = recording_session(&config);
    session
        .load_payload(
            r#"{
            "dimension": [
                {"value": "100mm", "coordinate": {"x": {"left_x": "50", "right_x": "150"}, "y": {"lower_y": "692", "upper_y": "792"}}}
            ],
            "annotation": [
                {"value": "サンプル", "value_en": "Sample",
                 "coordinate": {"x": {"left_x": "0", "right_x": "612"}, "y": {"lower_y": "0", "upper_y": "792"}}}
            ],
            "title_block": [
                {"value": "図番", "value_en": "Drawing No.",
                 "coordinate": {"x": {"left_x": "0", "right_x": "100"}, "y": {"lower_y": "0", "upper_y": "20"}}}
            ]
        }"#,
        )
        .unwrap();

    // Rendered at exactly 2x the intrinsic page size
    session.on_page_rendered(ViewportGeometry::new(1224.0, 1584.0, 612.0, 792.0));
    let frame = session.frame().unwrap();

    assert_eq!(frame.boxes.len(), 2);
    assert_eq!(frame.boxes[0].rect, ScreenRect::new(100.0, 0.0, 200.0, 200.0));
    assert_eq!(frame.boxes[1].rect, ScreenRect::new(0.0, 0.0, 1224.0, 1584.0));
    assert_eq!(
        session.categories().iter().collect::<Vec<_>>(),
        vec![ElementCategory::Dimension, ElementCategory::Annotation]
    );
    assert_eq!(
        config.placement.convention,
        CoordinateConvention::AbsoluteBottomOrigin
    );
}

#[test]
fn undecodable_payload_yields_zero_overlays() {
    let (mut session, _) = recording_session(&OverlayConfig::default());
    session.on_page_rendered(ViewportGeometry::new(800.0, 1000.0, 612.0, 792.0));

    assert!(session.load_payload("I could not analyze this drawing.").is_err());
    let frame = session.frame().unwrap();
    assert!(frame.boxes.is_empty());
    assert_eq!(frame.mode, OverlayDisplayMode::Visible);
}

#[test]
fn malformed_elements_do_not_hide_valid_ones() {
    init_tracing();
    let payload = r#"{
        "dimension": [
            {"value": "100", "coordinate": {"x": {"left_x": "0.25", "right_x": "0.5"}, "y": {"lower_y": "0.25", "upper_y": "0.125"}}},
            {"value": "50", "coordinate": "unknown"},
            {"value": "25.4", "coordinate": {"x": null, "y": {"lower_y": "0.5", "upper_y": "0.25"}}}
        ],
        "annotation": null,
        "others": [
            {"value": null, "coordinate": {"x": {"left_x": "0", "right_x": "0.5"}, "y": {"lower_y": "0.5", "upper_y": "0"}}}
        ]
    }"#;
    let (mut session, sink) = recording_session(&OverlayConfig::default());
    session.load_payload(payload).unwrap();
    session.on_page_rendered(ViewportGeometry::new(800.0, 1000.0, 612.0, 792.0));

    let frame = session.frame().unwrap();
    assert_eq!(frame.boxes.len(), 1);
    assert_eq!(frame.boxes[0].text, "3.94\"");
    assert_eq!(frame.boxes[0].rect, ScreenRect::new(200.0, 125.0, 200.0, 125.0));
    assert_eq!(
        sink.count_where(|d| matches!(d, Diagnostic::Rejected { .. })),
        2
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // ============================================================
    // Idempotence
    // ============================================================

    #[test]
    fn identical_inputs_give_identical_frames(
        width in 100.0f64..4000.0,
        height in 100.0f64..4000.0,
    ) {
        let build = || {
            let (mut session, _) = recording_session(&OverlayConfig::default());
            session.load_payload(NORMALIZED_PAYLOAD).unwrap();
            session.on_page_rendered(ViewportGeometry::new(width, height, 612.0, 792.0));
            session.frame().unwrap()
        };
        prop_assert_eq!(build(), build());
    }
}
