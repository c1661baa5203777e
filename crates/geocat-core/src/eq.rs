use crate::{AttributeValues, Schema, Value};

use serde_json::Value as Json;

/// Structural equality of two value stores of the same type.
///
/// Two stores are equal when every serializable attribute serializes to the
/// same wire value, an unset attribute counting as null. Non-serializable
/// attributes never take part, nor does container identity. Values without a
/// wire form, such as non-finite floats, are compared directly.
pub fn attributes_equal(schema: &Schema, a: &AttributeValues, b: &AttributeValues) -> bool {
    let null = Value::Null;

    for attribute in schema.attribute_types().values() {
        if !attribute.is_serializable() {
            continue;
        }

        let lhs = a.get(attribute.name()).unwrap_or(&null);
        let rhs = b.get(attribute.name()).unwrap_or(&null);

        let equal = match (
            attribute.serialize(lhs, false),
            attribute.serialize(rhs, false),
        ) {
            (Ok(lhs), Ok(rhs)) => json_eq(&lhs, &rhs),
            _ => lhs == rhs,
        };

        if !equal {
            return false;
        }
    }

    true
}

/// Wire equality where integers and floats compare numerically, so `60`
/// and `60.0` are the same value.
pub(crate) fn json_eq(a: &Json, b: &Json) -> bool {
    Value::from_json(a.clone()) == Value::from_json(b.clone())
}
