use std::collections::HashSet;
use std::env;

use serde_json::{json, Value};
use thiserror::Error;

use crate::store::Record;

/// Errors raised while loading the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("DEFAULT_RECORD is not valid JSON: {0}")]
    InvalidDefaultRecord(String),
    #[error("DEFAULT_RECORD must be a JSON object")]
    DefaultRecordNotObject,
    #[error("field {0} is listed more than once in RECORD_FIELDS")]
    DuplicateField(String),
    #[error("key {0} cannot also be a record field")]
    KeyIsField(String),
    #[error("DEFAULT_RECORD field {0} is not in RECORD_FIELDS")]
    UnlistedDefault(String),
}

/// Table layout and record shape, loaded once at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// DynamoDB table name.
    pub table_name: String,
    /// Name of the table's hash key attribute.
    pub key_name: String,
    /// Fields a create or update body may write, in order.
    pub fields: Vec<String>,
    /// Template every new record starts from.
    pub default_record: Record,
    /// Region used when the AWS provider chain finds none.
    pub region: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TABLE_NAME` - DynamoDB table (default: "Lunch")
    /// - `KEY_NAME` - hash key attribute (default: "mykey")
    /// - `RECORD_FIELDS` - comma-separated writable fields (default: "location,cost")
    /// - `DEFAULT_RECORD` - JSON object new records start from
    ///   (default: `{"mykey":null,"location":"unknown","cost":0}`)
    /// - `DEFAULT_REGION` - fallback AWS region (default: "us-east-1")
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, falling back to the defaults for
    /// every variable it returns `None` for.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let default_record = match lookup("DEFAULT_RECORD") {
            Some(raw) => {
                match serde_json::from_str::<Value>(&raw)
                    .map_err(|e| ConfigError::InvalidDefaultRecord(e.to_string()))?
                {
                    Value::Object(record) => record,
                    _ => return Err(ConfigError::DefaultRecordNotObject),
                }
            }
            None => defaults.default_record,
        };

        let fields = match lookup("RECORD_FIELDS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.fields,
        };

        let config = Self {
            table_name: lookup("TABLE_NAME").unwrap_or(defaults.table_name),
            key_name: lookup("KEY_NAME").unwrap_or(defaults.key_name),
            fields,
            default_record,
            region: lookup("DEFAULT_REGION").unwrap_or(defaults.region),
        };
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.table_name.is_empty() {
            return Err(ConfigError::Empty("TABLE_NAME"));
        }
        if self.key_name.is_empty() {
            return Err(ConfigError::Empty("KEY_NAME"));
        }
        if self.fields.is_empty() {
            return Err(ConfigError::Empty("RECORD_FIELDS"));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if *field == self.key_name {
                return Err(ConfigError::KeyIsField(field.clone()));
            }
            if !seen.insert(field.as_str()) {
                return Err(ConfigError::DuplicateField(field.clone()));
            }
        }

        if let Some(field) = self
            .default_record
            .keys()
            .find(|name| **name != self.key_name && !seen.contains(name.as_str()))
        {
            return Err(ConfigError::UnlistedDefault(field.clone()));
        }

        Ok(())
    }

    /// Whitelisted fields present in `body`, in configured order.
    pub fn permitted<'a>(&'a self, body: &'a Record) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.fields
            .iter()
            .filter_map(|field| body.get(field).map(|value| (field.as_str(), value)))
    }
}

impl Default for Config {
    fn default() -> Self {
        let default_record = match json!({
            "mykey": null,
            "location": "unknown",
            "cost": 0,
        }) {
            Value::Object(record) => record,
            _ => Record::new(),
        };

        Self {
            table_name: "Lunch".to_string(),
            key_name: "mykey".to_string(),
            fields: vec!["location".to_string(), "cost".to_string()],
            default_record,
            region: "us-east-1".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.table_name, "Lunch");
        assert_eq!(config.key_name, "mykey");
        assert_eq!(config.fields, vec!["location", "cost"]);
        assert_eq!(config.default_record["location"], "unknown");
        assert_eq!(config.default_record["cost"], 0);
        assert!(config.default_record["mykey"].is_null());
        assert_eq!(config.region, "us-east-1");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("TABLE_NAME", "Dinner"),
            ("KEY_NAME", "id"),
            ("RECORD_FIELDS", " venue , price ,"),
            ("DEFAULT_RECORD", r#"{"venue":"home","price":1}"#),
            ("DEFAULT_REGION", "eu-west-1"),
        ]))
        .unwrap();

        assert_eq!(config.table_name, "Dinner");
        assert_eq!(config.key_name, "id");
        assert_eq!(config.fields, vec!["venue", "price"]);
        assert_eq!(config.default_record["venue"], "home");
        assert_eq!(config.region, "eu-west-1");
    }

    #[test]
    fn test_invalid_default_record() {
        let err = Config::from_lookup(lookup(&[("DEFAULT_RECORD", "{not json")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDefaultRecord(_)));

        let err = Config::from_lookup(lookup(&[("DEFAULT_RECORD", "[1, 2]")])).unwrap_err();
        assert_eq!(err, ConfigError::DefaultRecordNotObject);
    }

    #[test]
    fn test_rejects_key_in_fields() {
        let err =
            Config::from_lookup(lookup(&[("RECORD_FIELDS", "location,mykey")])).unwrap_err();
        assert_eq!(err, ConfigError::KeyIsField("mykey".to_string()));
    }

    #[test]
    fn test_rejects_duplicate_fields() {
        let err = Config::from_lookup(lookup(&[("RECORD_FIELDS", "location,cost,cost")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateField("cost".to_string()));
    }

    #[test]
    fn test_rejects_unlisted_default_field() {
        let err = Config::from_lookup(lookup(&[("RECORD_FIELDS", "location")])).unwrap_err();
        assert_eq!(err, ConfigError::UnlistedDefault("cost".to_string()));
    }

    #[test]
    fn test_rejects_empty_values() {
        let err = Config::from_lookup(lookup(&[("TABLE_NAME", "")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty("TABLE_NAME"));

        let err = Config::from_lookup(lookup(&[("RECORD_FIELDS", " , ")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty("RECORD_FIELDS"));
    }

    #[test]
    fn test_permitted_keeps_configured_order() {
        let config = Config::default();
        let body = match json!({"cost": 9, "calories": 800, "location": "waffle house"}) {
            Value::Object(body) => body,
            _ => unreachable!(),
        };

        let permitted: Vec<_> = config.permitted(&body).collect();
        assert_eq!(
            permitted,
            vec![
                ("location", &json!("waffle house")),
                ("cost", &json!(9)),
            ]
        );
    }
}
