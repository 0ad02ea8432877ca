use super::Value;
use pretty_assertions::assert_eq;

#[test]
fn test_display_scalars() {
    assert_eq!(Value::Integer(42).to_string(), "42");
    assert_eq!(Value::Float(3.5).to_string(), "3.5");
    assert_eq!(Value::Float(2.0).to_string(), "2.0");
    assert_eq!(Value::Float(f64::INFINITY).to_string(), "inf");
    assert_eq!(Value::string("a\"b").to_string(), "\"a\\\"b\"");
    assert_eq!(Value::Undefined.to_string(), "<undefined>");
}

#[test]
fn test_display_composites() {
    let array = Value::array([Value::Integer(1), Value::Float(0.5)]);
    assert_eq!(array.to_string(), "[1, 0.5]");

    let dict = Value::dictionary([("sd", Value::Float(0.2)), ("mu", Value::Float(1.0))]);
    assert_eq!(dict.to_string(), "{mu: 1.0, sd: 0.2}");
}

#[test]
fn test_dictionary_last_key_wins() {
    let dict = Value::dictionary([
        ("mu", Value::Integer(1)),
        ("sd", Value::Integer(2)),
        ("mu", Value::Integer(3)),
    ]);
    assert_eq!(dict.get("mu"), Some(&Value::Integer(3)));
    assert_eq!(dict.get("sd"), Some(&Value::Integer(2)));
    assert_eq!(dict.as_dictionary().map(|d| d.len()), Some(2));
}

#[test]
fn test_numeric_views() {
    assert_eq!(Value::Integer(3).as_float(), Some(3.0));
    assert_eq!(Value::Float(3.0).as_int(), None);
    assert_eq!(Value::string("x").as_float(), None);
    assert!(Value::Undefined.is_undefined());
    assert_eq!(Value::Array(vec![]).kind(), "array");
}
