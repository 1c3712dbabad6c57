//! Integration tests for pattern fields backed by registry converters.

use std::net::Ipv4Addr;
use std::sync::Arc;

use horizon_fields::converter::{
    ConverterContext, ConverterRegistry, EnumConverter, EnumVariants, GeometryConverter, Rectangle,
};
use horizon_fields::edit::{EditConfig, EditEngine, EditState};
use horizon_fields::verifier::{
    BoundedIntegerVerifier, EnumeratedStringVerifier, GroupValue, HexRangeVerifier, Projected,
};
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Level {
    Low,
    Medium,
    High,
}

impl EnumVariants for Level {
    fn variants() -> &'static [Self] {
        &[Level::Low, Level::Medium, Level::High]
    }

    fn name(&self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

#[test]
fn ip_field_uses_registry_converter() {
    init_tracing();
    let registry = ConverterRegistry::new();
    let converter = registry
        .lookup::<Ipv4Addr>(&ConverterContext::default())
        .expect("addresses have a default converter");
    let mut engine = EditEngine::builder("h.h.h.h", converter)
        .verifier("h", BoundedIntegerVerifier::new(0, 255))
        .build()
        .unwrap();

    let committed = Arc::new(Mutex::new(Vec::new()));
    let c = committed.clone();
    engine.value_changed().connect(move |v| c.lock().push(*v));

    engine.insert("10.0.0.1");
    assert!(engine.is_complete());
    assert!(engine.commit());
    engine.set_caret(0);
    assert!(engine.increase_value());

    assert_eq!(
        *committed.lock(),
        [Some(Ipv4Addr::new(10, 0, 0, 1)), Some(Ipv4Addr::new(11, 0, 0, 1))]
    );
}

#[test]
fn percent_field_reads_ratio() {
    let registry = ConverterRegistry::new();
    let percent = ConverterContext::percent();
    let converter = registry.lookup::<f64>(&percent).unwrap();
    let mut engine = EditEngine::builder("p%", converter)
        .verifier("p", BoundedIntegerVerifier::new(0, 100))
        .context(percent)
        .value(Some(0.5))
        .build()
        .unwrap();

    assert_eq!(engine.text(), "50%");
    assert!(engine.select_group("p"));
    assert_eq!(engine.insert("75"), 2);
    assert!(engine.commit());
    assert_eq!(engine.value(), Some(0.75));
    assert_eq!(engine.text(), "75%");
}

#[test]
fn enumerated_field_steps_and_accepts_prefixes() {
    let mut engine = EditEngine::builder("level", EnumConverter::<Level>::new())
        .verifier("level", EnumeratedStringVerifier::new(["Low", "Medium", "High"]))
        .value(Some(Level::Low))
        .build()
        .unwrap();

    engine.set_caret(0);
    assert!(engine.increase_value());
    assert_eq!(engine.value(), Some(Level::Medium));
    assert_eq!(engine.text(), "Medium");

    engine.set_value(None);
    assert_eq!(engine.text(), "");
    assert_eq!(engine.insert("Hi"), 2);
    assert!(!engine.insert_char('x'));
    assert_eq!(engine.insert("gh"), 2);
    assert!(engine.commit());
    assert_eq!(engine.value(), Some(Level::High));
}

#[test]
fn unreadable_enum_prefix_reverts() {
    init_tracing();
    let mut engine = EditEngine::builder("level", EnumConverter::<Level>::new())
        .verifier("level", EnumeratedStringVerifier::new(["Low", "Medium", "High"]))
        .value(Some(Level::Low))
        .build()
        .unwrap();

    engine.select(0..3);
    assert_eq!(engine.insert("M"), 1);
    assert_eq!(engine.state(), EditState::Editing);
    assert!(!engine.commit());
    assert_eq!(engine.text(), "Low");
    assert_eq!(engine.value(), Some(Level::Low));
}

#[test]
fn rectangle_components_adjust_through_projection() {
    fn component(
        get: fn(&Rectangle) -> f64,
        set: fn(&mut Rectangle, f64),
    ) -> Projected<BoundedIntegerVerifier, Rectangle> {
        Projected::new(
            BoundedIntegerVerifier::new(0, 9999),
            move |r: &Rectangle| Some(GroupValue::Integer(get(r) as i64)),
            move |r: &Rectangle, v: &GroupValue| {
                let mut next = *r;
                set(&mut next, v.as_integer()? as f64);
                Some(next)
            },
        )
    }

    let mut engine = EditEngine::builder("x; y; w; h", GeometryConverter::<Rectangle>::new())
        .verifier("x", component(|r| r.x, |r, v| r.x = v))
        .verifier("y", component(|r| r.y, |r, v| r.y = v))
        .verifier("w", component(|r| r.width, |r, v| r.width = v))
        .verifier("h", component(|r| r.height, |r, v| r.height = v))
        .value(Some(Rectangle::new(0.0, 0.0, 10.0, 20.0)))
        .build()
        .unwrap();

    assert_eq!(engine.text(), "0; 0; 10; 20");
    assert!(engine.select_group("w"));
    assert!(engine.increase_value());
    assert_eq!(engine.value(), Some(Rectangle::new(0.0, 0.0, 11.0, 20.0)));
    assert_eq!(engine.text(), "0; 0; 11; 20");
    assert_eq!(engine.selection(), Some(6..8));
}

#[test]
fn hex_groups_with_wrapping_steps() {
    let mut engine = EditEngine::builder("b:b", horizon_fields::converter::StringConverter)
        .verifier("b", HexRangeVerifier::new(0, 255).with_width(2))
        .config(EditConfig::new().wrap(true))
        .value(Some("FF:00".to_string()))
        .build()
        .unwrap();

    engine.set_caret(0);
    assert!(engine.increase_value());
    assert_eq!(engine.text(), "00:00");
    engine.set_caret(3);
    assert!(engine.decrease_value());
    assert_eq!(engine.value().as_deref(), Some("00:FF"));
}
