//! Integration tests for the converter registry and its built-in converters.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use horizon_fields::converter::{
    Color, ConverterContext, ConverterRegistry, EnumVariants, LabelStyle, LazyEnumConverter, Point,
    TemporalConverter,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Priority {
    Low,
    VeryHigh,
}

impl EnumVariants for Priority {
    fn variants() -> &'static [Self] {
        &[Priority::Low, Priority::VeryHigh]
    }

    fn name(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::VeryHigh => "VeryHigh",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::variants()
            .iter()
            .find(|p| p.name() == s)
            .copied()
            .ok_or(())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn dates_render_per_style_and_read_any_known_form() {
    let registry = ConverterRegistry::new();
    let day = date(2024, 3, 9);

    assert_eq!(registry.to_text(Some(&day), &ConverterContext::new("Short")), "3/9/24");
    assert_eq!(registry.to_text(Some(&day), &ConverterContext::default()), "Mar 9, 2024");
    assert_eq!(registry.to_text(Some(&day), &ConverterContext::new("Long")), "March 9, 2024");

    for text in ["3/9/2024", "2024-03-09", "20240309", "March 9, 2024", " 3/9/24 "] {
        assert_eq!(
            registry.from_text::<NaiveDate>(text, &ConverterContext::default()),
            Some(day),
            "{text}"
        );
    }
    assert_eq!(registry.from_text::<NaiveDate>("not a date", &ConverterContext::default()), None);
}

#[test]
fn times_and_date_times() {
    let registry = ConverterRegistry::new();
    let time = NaiveTime::from_hms_opt(9, 5, 0).unwrap();

    assert_eq!(registry.to_text(Some(&time), &ConverterContext::time()), "09:05:00");
    assert_eq!(registry.from_text::<NaiveTime>("9:05 PM", &ConverterContext::time()), NaiveTime::from_hms_opt(21, 5, 0));

    let moment: NaiveDateTime = date(2024, 3, 9).and_time(time);
    assert_eq!(
        registry.from_text::<NaiveDateTime>("2024-03-09T09:05:00", &ConverterContext::date_time()),
        Some(moment)
    );
}

#[test]
fn explicit_format_property_wins() {
    let registry = ConverterRegistry::without_defaults();
    registry.register::<NaiveDate>(ConverterContext::new("German"), TemporalConverter::<NaiveDate>::new());

    let german = ConverterContext::new("German").with_property("format", "%d.%m.%Y");
    assert_eq!(registry.to_text(Some(&date(2024, 3, 9)), &german), "09.03.2024");
    assert_eq!(registry.from_text::<NaiveDate>("09.03.2024", &german), Some(date(2024, 3, 9)));
    assert_eq!(registry.len(), 1);
}

#[test]
fn numbers_in_each_context() {
    let registry = ConverterRegistry::new();

    assert_eq!(registry.to_text(Some(&0.5_f64), &ConverterContext::percent()), "50%");
    assert_eq!(registry.from_text::<f64>("50", &ConverterContext::percent()), Some(0.5));
    assert_eq!(registry.to_text(Some(&2.0_f64), &ConverterContext::fraction(2)), "2.00");
    assert_eq!(registry.to_text(Some(&1234.5_f64), &ConverterContext::currency()), "$1,234.50");
    assert_eq!(registry.from_text::<i32>(" 42 ", &ConverterContext::default()), Some(42));
    assert_eq!(registry.from_text::<i32>("", &ConverterContext::default()), None);
}

#[test]
fn deferred_enum_converter_uses_label_style() {
    let registry = ConverterRegistry::new();
    registry.register_deferred::<Priority, _>(
        ConverterContext::default(),
        LazyEnumConverter::<Priority>::with_style(LabelStyle::Words),
    );

    let ctx = ConverterContext::default();
    assert_eq!(registry.to_text(Some(&Priority::VeryHigh), &ctx), "Very High");
    assert_eq!(registry.from_text::<Priority>("very high", &ctx), Some(Priority::VeryHigh));
    assert_eq!(registry.from_text::<Priority>("VeryHigh", &ctx), Some(Priority::VeryHigh));
    assert_eq!(registry.from_text::<Priority>("Medium", &ctx), None);
}

#[test]
fn geometry_and_color_defaults() {
    let registry = ConverterRegistry::new();
    let ctx = ConverterContext::default();

    assert_eq!(registry.to_text(Some(&Point::new(3.0, 4.5)), &ctx), "3; 4.5");
    assert_eq!(registry.from_text::<Point>("3, 4.5", &ctx), Some(Point::new(3.0, 4.5)));
    assert_eq!(registry.to_text(Some(&Color::rgb(255, 128, 0)), &ctx), "#FF8000");
    assert_eq!(registry.from_text::<Color>("#f80", &ctx), Some(Color::rgb(255, 136, 0)));
}

#[test]
fn arrays_of_registered_elements() {
    let registry = ConverterRegistry::new();
    let ctx = ConverterContext::default();

    assert_eq!(registry.to_text_array(Some(&vec![1_i32, 2, 3]), &ctx), "1; 2; 3");
    assert_eq!(registry.from_text_array::<i32>("4;5 ; 6", &ctx), Some(vec![4, 5, 6]));
    assert_eq!(registry.from_text_array::<i32>("4; x", &ctx), None);
    assert_eq!(registry.to_text_array::<i32>(None, &ctx), "");
}

#[test]
fn arrays_of_geometry_read_back() {
    let registry = ConverterRegistry::new();
    let ctx = ConverterContext::default();
    let points = vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)];

    let text = registry.to_text_array(Some(&points), &ctx);
    assert_eq!(text, "[1; 2]; [3; 4]");
    assert_eq!(registry.from_text_array::<Point>(&text, &ctx), Some(points));
}
