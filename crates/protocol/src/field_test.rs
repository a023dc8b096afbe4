//! Tests for FieldValue

use crate::FieldValue;

#[test]
fn test_from_conversions() {
    assert_eq!(FieldValue::from(1.5), FieldValue::Float(1.5));
    assert_eq!(FieldValue::from(-3i64), FieldValue::Int(-3));
    assert_eq!(FieldValue::from(7u32), FieldValue::UInt(7));
    assert_eq!(FieldValue::from(true), FieldValue::Bool(true));
    assert_eq!(FieldValue::from("up"), FieldValue::String("up".into()));
}

#[test]
fn test_as_f64_widens_integers() {
    assert_eq!(FieldValue::Int(-2).as_f64(), Some(-2.0));
    assert_eq!(FieldValue::UInt(9).as_f64(), Some(9.0));
    assert_eq!(FieldValue::Float(0.25).as_f64(), Some(0.25));
    assert_eq!(FieldValue::Bool(true).as_f64(), None);
    assert_eq!(FieldValue::String("1".into()).as_f64(), None);
}

#[test]
fn test_type_name() {
    assert_eq!(FieldValue::Float(0.0).type_name(), "float");
    assert_eq!(FieldValue::String(String::new()).type_name(), "string");
}
