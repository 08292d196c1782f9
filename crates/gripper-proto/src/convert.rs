//! Conversion between `serde_json` documents and `google.protobuf.Struct`.
//!
//! Row payloads travel as `Struct`, which only knows doubles, strings,
//! booleans, null, lists and nested structs. Integers are widened to `f64`
//! on the way out; on the way back, integral doubles that fit in an `i64`
//! are narrowed again so documents read naturally on the client side.

use prost_types::value::Kind;
use prost_types::{ListValue, NullValue, Struct, Value};
use serde_json::{Map, Number, Value as Json};

/// Build a `Struct` from a JSON object.
pub fn struct_from_json(map: Map<String, Json>) -> Struct {
    Struct {
        fields: map
            .into_iter()
            .map(|(key, value)| (key, value_from_json(value)))
            .collect(),
    }
}

/// Rebuild a JSON object from a `Struct`.
pub fn json_from_struct(s: Struct) -> Map<String, Json> {
    s.fields
        .into_iter()
        .map(|(key, value)| (key, json_from_value(value)))
        .collect()
}

fn value_from_json(value: Json) -> Value {
    let kind = match value {
        Json::Null => Kind::NullValue(NullValue::NullValue as i32),
        Json::Bool(b) => Kind::BoolValue(b),
        Json::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        Json::String(s) => Kind::StringValue(s),
        Json::Array(items) => Kind::ListValue(ListValue {
            values: items.into_iter().map(value_from_json).collect(),
        }),
        Json::Object(map) => Kind::StructValue(struct_from_json(map)),
    };
    Value { kind: Some(kind) }
}

fn json_from_value(value: Value) -> Json {
    match value.kind {
        None | Some(Kind::NullValue(_)) => Json::Null,
        Some(Kind::BoolValue(b)) => Json::Bool(b),
        Some(Kind::NumberValue(n)) => json_number(n),
        Some(Kind::StringValue(s)) => Json::String(s),
        Some(Kind::ListValue(list)) => {
            Json::Array(list.values.into_iter().map(json_from_value).collect())
        }
        Some(Kind::StructValue(s)) => Json::Object(json_from_struct(s)),
    }
}

fn json_number(n: f64) -> Json {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        return Json::Number(Number::from(n as i64));
    }
    // NaN and infinities have no JSON representation
    Number::from_f64(n).map(Json::Number).unwrap_or(Json::Null)
}
