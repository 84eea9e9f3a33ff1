//! Conversion between JSON records and DynamoDB attribute maps.
//!
//! DynamoDB numbers are arbitrary-precision decimal strings. They come back as
//! JSON integers or floats when that is lossless enough, and as their decimal
//! string otherwise, so decoding a record never fails.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{Number, Value};

use super::Record;

pub(crate) fn to_item(record: Record) -> HashMap<String, AttributeValue> {
    record
        .into_iter()
        .map(|(name, value)| (name, to_attribute(value)))
        .collect()
}

pub(crate) fn to_attribute(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(values) => AttributeValue::L(values.into_iter().map(to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(to_item(map)),
    }
}

pub(crate) fn from_item(item: HashMap<String, AttributeValue>) -> Record {
    item.into_iter()
        .map(|(name, value)| (name, from_attribute(value)))
        .collect()
}

pub(crate) fn from_attribute(value: AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s),
        AttributeValue::N(n) => number(&n),
        AttributeValue::Bool(b) => Value::Bool(b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(values) => Value::Array(values.into_iter().map(from_attribute).collect()),
        AttributeValue::M(map) => Value::Object(from_item(map)),
        AttributeValue::Ss(values) => Value::Array(values.into_iter().map(Value::String).collect()),
        AttributeValue::Ns(values) => Value::Array(values.iter().map(|n| number(n)).collect()),
        AttributeValue::B(blob) => Value::String(BASE64.encode(blob.as_ref())),
        AttributeValue::Bs(blobs) => Value::Array(
            blobs
                .iter()
                .map(|blob| Value::String(BASE64.encode(blob.as_ref())))
                .collect(),
        ),
        _ => Value::Null,
    }
}

fn number(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Value::from(n);
    }
    // integers wider than 64 bits keep every digit as a string
    let fractional = raw.contains(['.', 'e', 'E']);
    if fractional {
        if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::primitives::Blob;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case("0", json!(0))]
    #[case("-42", json!(-42))]
    #[case("18446744073709551615", json!(18446744073709551615u64))]
    #[case("12.50", json!(12.5))]
    #[case("1E+2", json!(100.0))]
    #[case("123456789012345678901234567890", json!("123456789012345678901234567890"))]
    fn decimals_become_json_safe_values(#[case] raw: &str, #[case] expected: Value) {
        assert_eq!(from_attribute(AttributeValue::N(raw.to_string())), expected);
    }

    #[test]
    fn todo_record_survives_the_attribute_encoding() {
        let record = json!({
            "id": "4f1c",
            "text": "buy milk",
            "completed": false,
            "createdAt": "2024-05-01T09:30:00.000Z",
            "tags": ["home", 2],
            "meta": {"priority": null},
        });
        let Value::Object(record) = record else {
            unreachable!()
        };

        let item = to_item(record.clone());
        assert_eq!(item["completed"], AttributeValue::Bool(false));
        assert_eq!(item["text"], AttributeValue::S("buy milk".to_string()));

        assert_eq!(from_item(item), record);
    }

    #[test]
    fn sets_and_binary_decode_to_arrays_and_base64() {
        assert_eq!(
            from_attribute(AttributeValue::Ns(vec!["1".into(), "2.5".into()])),
            json!([1, 2.5])
        );
        assert_eq!(
            from_attribute(AttributeValue::Ss(vec!["a".into()])),
            json!(["a"])
        );
        assert_eq!(
            from_attribute(AttributeValue::B(Blob::new(b"hi".to_vec()))),
            json!("aGk=")
        );
        assert_eq!(
            from_attribute(AttributeValue::Bs(vec![Blob::new(vec![0xff])])),
            json!(["/w=="])
        );
    }
}
