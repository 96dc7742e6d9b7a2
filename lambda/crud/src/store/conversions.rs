//! DynamoDB attribute conversion functions.
//!
//! Pure functions for moving records between `serde_json` values and
//! DynamoDB `AttributeValue` maps, and for building update expressions.
//! These are testable in isolation without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::Value;

use super::{Record, Result, StoreError};

/// Placeholder for the key attribute inside condition expressions.
pub const KEY_PLACEHOLDER: &str = "#key";

/// Convert a JSON value to a DynamoDB attribute.
pub fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(to_item(map)),
    }
}

/// Convert a DynamoDB attribute to a JSON value.
///
/// String and number sets become arrays. Binary attributes have no JSON form
/// and are rejected.
pub fn from_attribute(field: &str, attribute: &AttributeValue) -> Result<Value> {
    let value = match attribute {
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::N(n) => parse_number(field, n)?,
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::Ss(set) => Value::Array(set.iter().cloned().map(Value::String).collect()),
        AttributeValue::Ns(set) => Value::Array(
            set.iter()
                .map(|n| parse_number(field, n))
                .collect::<Result<_>>()?,
        ),
        AttributeValue::L(items) => Value::Array(
            items
                .iter()
                .map(|item| from_attribute(field, item))
                .collect::<Result<_>>()?,
        ),
        AttributeValue::M(map) => Value::Object(from_item(map)?),
        _ => {
            return Err(StoreError::Conversion {
                field: field.to_string(),
                reason: "binary and unknown attribute types are not supported".to_string(),
            })
        }
    };

    Ok(value)
}

fn parse_number(field: &str, raw: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(number @ Value::Number(_)) => Ok(number),
        _ => Err(StoreError::Conversion {
            field: field.to_string(),
            reason: format!("invalid number {raw:?}"),
        }),
    }
}

/// Convert a record to a DynamoDB item.
pub fn to_item(record: &Record) -> HashMap<String, AttributeValue> {
    record
        .iter()
        .map(|(name, value)| (name.clone(), to_attribute(value)))
        .collect()
}

/// Convert a DynamoDB item to a record.
pub fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Record> {
    item.iter()
        .map(|(name, attribute)| Ok((name.clone(), from_attribute(name, attribute)?)))
        .collect()
}

/// The expression parts of an `UpdateItem` call that sets every field.
#[derive(Debug, PartialEq)]
pub struct UpdatePlan {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

/// Build a `SET` expression for `fields`.
///
/// Field names go through placeholders so reserved words (`location`, `name`,
/// ...) are safe. The key attribute is registered as [`KEY_PLACEHOLDER`] for
/// the existence condition.
pub fn update_plan(key_name: &str, fields: &Record) -> UpdatePlan {
    let mut names = HashMap::from([(KEY_PLACEHOLDER.to_string(), key_name.to_string())]);
    let mut values = HashMap::new();
    let mut assignments = Vec::with_capacity(fields.len());

    for (i, (field, value)) in fields.iter().enumerate() {
        let name = format!("#f{i}");
        let placeholder = format!(":v{i}");
        assignments.push(format!("{name} = {placeholder}"));
        names.insert(name, field.clone());
        values.insert(placeholder, to_attribute(value));
    }

    UpdatePlan {
        expression: format!("SET {}", assignments.join(", ")),
        names,
        values,
    }
}
