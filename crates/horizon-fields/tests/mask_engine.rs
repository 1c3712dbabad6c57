//! Integration tests for character masks.

use std::sync::Arc;

use horizon_fields::mask::{Mask, MaskEngine};
use horizon_fields::MaskError;
use parking_lot::Mutex;

#[test]
fn phone_number_skips_separators() {
    let mut phone = MaskEngine::new("(999) 999-9999").unwrap();
    let texts = Arc::new(Mutex::new(Vec::new()));
    let t = texts.clone();
    phone.text_changed.connect(move |s| t.lock().push(s.clone()));

    assert_eq!(phone.insert_str("555"), 3);
    assert!(phone.insert('1'));
    assert_eq!(phone.text(), "(555) 1__-____");
    assert_eq!(texts.lock().last().map(String::as_str), Some("(555) 1__-____"));
    assert_eq!(texts.lock().len(), 4);

    assert!(!phone.insert('a'));
    assert_eq!(phone.insert_str("234567"), 6);
    assert!(phone.is_complete());
    assert_eq!(phone.input_text(), "5551234567");
}

#[test]
fn mac_address_is_uppercased() {
    let mask = Mask::with_masks("HH:HH:HH", Some("UU_UU_UU"), None).unwrap();
    let mut mac = MaskEngine::with_mask(mask);
    mac.insert_str("0a1b2c");
    assert_eq!(mac.text(), "0A:1B:2C");
    assert!(!mac.accepts('g', 0));
}

#[test]
fn capped_digits_limit_a_clock() {
    let mut clock = MaskEngine::new("29:59").unwrap();
    assert!(!clock.insert('3'));
    assert_eq!(clock.insert_str("2359"), 4);
    assert_eq!(clock.text(), "23:59");

    clock.clear();
    assert_eq!(clock.set_text("19:60"), Err(MaskError::Rejected { position: 3, ch: '6' }));
    assert_eq!(clock.text(), "__:__");
}

#[test]
fn optional_positions_and_custom_placeholder() {
    let mask = Mask::with_masks("99999-9999", None, Some("RRRRR_____"))
        .unwrap()
        .with_placeholder(' ');
    let mut zip = MaskEngine::with_mask(mask);
    assert_eq!(zip.text(), "     -    ");

    zip.insert_str("90210");
    assert!(zip.is_complete());
    assert_eq!(zip.input_text(), "90210");

    zip.end();
    assert!(zip.delete_backward());
    assert_eq!(zip.cursor_position(), 9);
    zip.home();
    assert!(zip.delete_forward());
    assert!(!zip.is_complete());
}
