use super::*;
use std::cmp::Ordering;

#[test]
fn strict_order_cmp_mixes_int_and_float_numerically() {
    assert_eq!(
        strict_order_cmp(&Value::Int(2), &Value::Float64(2.5)),
        Some(Ordering::Less)
    );
    assert_eq!(
        strict_order_cmp(&Value::Float64(3.0), &Value::Int(3)),
        Some(Ordering::Equal)
    );
}

#[test]
fn strict_order_cmp_rejects_null_and_mismatched_variants() {
    assert_eq!(strict_order_cmp(&Value::Null, &Value::Int(1)), None);
    assert_eq!(strict_order_cmp(&Value::Null, &Value::Null), None);
    assert_eq!(strict_order_cmp(&Value::from("a"), &Value::Int(1)), None);
    assert_eq!(
        strict_order_cmp(&Value::Float64(f64::NAN), &Value::Float64(1.0)),
        None
    );
}

#[test]
fn only_bool_true_is_true() {
    assert!(Value::Bool(true).is_true());
    assert!(!Value::Bool(false).is_true());
    assert!(!Value::Null.is_true());
    assert!(!Value::Int(1).is_true());
}

#[test]
fn checked_add_widens_and_detects_overflow() {
    assert_eq!(
        Value::Int(2).checked_add(&Value::Int(3)),
        Some(Value::Int(5))
    );
    assert_eq!(
        Value::Int(2).checked_add(&Value::Float64(0.5)),
        Some(Value::Float64(2.5))
    );
    assert_eq!(Value::Int(i64::MAX).checked_add(&Value::Int(1)), None);
    assert_eq!(Value::from("x").checked_add(&Value::Int(1)), None);
}

#[test]
fn display_quotes_text_and_spells_null() {
    assert_eq!(Value::from("ann").to_string(), "'ann'");
    assert_eq!(Value::Null.to_string(), "NULL");
    assert_eq!(Value::Int(-4).to_string(), "-4");
}

#[test]
fn tags_have_stable_labels() {
    assert_eq!(Value::Int(1).tag().label(), "Int");
    assert_eq!(Value::Null.tag().to_u8(), 4);
}
