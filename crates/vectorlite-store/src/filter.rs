//! Metadata filter evaluation.
//!
//! A predicate is a JSON object. Each key is either compared for equality
//! against a plain value, or holds an object of operator constraints:
//!
//! | operator | meaning |
//! |---|---|
//! | `$eq` | equal to operand |
//! | `$gt` | numerically greater than operand |
//! | `$lt` | numerically less than operand |
//! | `$in` | operand is an array containing the value |
//!
//! All keys and operators are ANDed. Unknown operators never match.

use serde_json::Value;
use vectorlite_types::Metadata;

/// Check whether `metadata` satisfies `predicate`.
///
/// An empty predicate matches everything. Missing metadata keys are absent
/// and fail every constraint.
pub fn matches(metadata: &Metadata, predicate: &Metadata) -> bool {
    predicate.iter().all(|(key, condition)| {
        let value = metadata.get(key);
        match condition {
            Value::Object(operators) => operators
                .iter()
                .all(|(op, operand)| apply_operator(op, value, operand)),
            _ => value.is_some_and(|v| values_equal(v, condition)),
        }
    })
}

fn apply_operator(op: &str, value: Option<&Value>, operand: &Value) -> bool {
    match op {
        "$eq" => value.is_some_and(|v| values_equal(v, operand)),
        "$gt" => compare_numbers(value, operand).is_some_and(|(v, o)| v > o),
        "$lt" => compare_numbers(value, operand).is_some_and(|(v, o)| v < o),
        "$in" => match (value, operand) {
            (Some(v), Value::Array(items)) => items.iter().any(|item| values_equal(v, item)),
            _ => false,
        },
        _ => false,
    }
}

fn compare_numbers(value: Option<&Value>, operand: &Value) -> Option<(f64, f64)> {
    Some((value?.as_f64()?, operand.as_f64()?))
}

/// Equality that ignores the integer/float split in JSON numbers.
///
/// Two integers compare exactly; only a float on either side widens both to f64.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if x.is_f64() || y.is_f64() {
                x.as_f64() == y.as_f64()
            } else {
                x == y
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}
