use std::rc::Rc;

use super::convert::FromStack;
use super::Handle;
use crate::runtime::{table::Table, value::Value};

#[test]
fn test_integer_is_strict() {
    assert_eq!(i64::from_value(&Value::Integer(5)), Some(5));
    assert_eq!(i64::from_value(&Value::Float(5.0)), None);
    assert_eq!(i64::from_value(&Value::String(Rc::from("5"))), None);
}

#[test]
fn test_number_widens_integers() {
    assert_eq!(f64::from_value(&Value::Float(2.5)), Some(2.5));
    assert_eq!(f64::from_value(&Value::Integer(2)), Some(2.0));
    assert_eq!(f64::from_value(&Value::Boolean(true)), None);
}

#[test]
fn test_string_does_not_coerce_numbers() {
    assert_eq!(
        String::from_value(&Value::String(Rc::from("foobar"))),
        Some("foobar".to_string())
    );
    assert_eq!(String::from_value(&Value::Integer(1)), None);
}

#[test]
fn test_value_accepts_anything() {
    assert!(matches!(Value::from_value(&Value::Nil), Some(Value::Nil)));
    assert!(matches!(
        Value::from_value(&Value::Boolean(true)),
        Some(Value::Boolean(true))
    ));
}

#[test]
fn test_vec_reads_the_array_part() {
    let table = Value::Table(Rc::new(Table::from_array(vec![
        Value::Integer(1),
        Value::Integer(2),
        Value::Integer(3),
    ])));
    assert_eq!(Vec::<i64>::from_value(&table), Some(vec![1, 2, 3]));
}

#[test]
fn test_vec_rejects_mixed_elements() {
    let table = Value::Table(Rc::new(Table::from_array(vec![
        Value::Integer(1),
        Value::Boolean(false),
    ])));
    assert_eq!(Vec::<i64>::from_value(&table), None);
    assert_eq!(Vec::<i64>::from_value(&Value::Integer(1)), None);
}

#[test]
fn test_nested_vec() {
    let inner = Value::Table(Rc::new(Table::from_array(vec![
        Value::Integer(1),
        Value::Integer(2),
    ])));
    let outer = Value::Table(Rc::new(Table::from_array(vec![inner])));
    assert_eq!(Vec::<Vec<i64>>::from_value(&outer), Some(vec![vec![1, 2]]));
}

#[test]
fn test_expected_names() {
    assert_eq!(i64::expected(), "integer");
    assert_eq!(f64::expected(), "number");
    assert_eq!(bool::expected(), "boolean");
    assert_eq!(String::expected(), "string");
    assert_eq!(Vec::<i64>::expected(), "array table");
}

#[test]
fn test_handle_from_value_only_accepts_nil() {
    let handle = Handle::from_value(&Value::Nil).unwrap();
    assert!(handle.is_nil());
    assert!(Handle::from_value(&Value::Integer(1)).is_none());
}
