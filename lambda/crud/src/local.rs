//! Local harness: runs one canned request against the configured table.
//!
//! ```text
//! $ crud test create
//! ```

use clap::ValueEnum;
use lambda_runtime::Error;
use serde_json::{json, Value};

use crate::config::Config;
use crate::event_handler::dispatch;
use crate::store::RecordStore;

/// Key every canned request targets.
pub const TEST_KEY: &str = "ZZZZZZZZZZZZZZZZA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Create,
    Read,
    Update,
    Delete,
}

/// The event the harness sends for `mode`.
pub fn canned_event(mode: Mode, config: &Config) -> Value {
    let mut event = match mode {
        Mode::Create => json!({
            "operation": "create",
            "body": {"location": "taco bell"}
        }),
        Mode::Read => json!({"operation": "read"}),
        Mode::Update => json!({
            "operation": "update",
            "body": {"location": "waffle house", "cost": 9}
        }),
        Mode::Delete => json!({"operation": "delete"}),
    };
    event[config.key_name.as_str()] = Value::String(TEST_KEY.to_string());
    event
}

pub async fn run<S>(store: &S, config: &Config, mode: Mode) -> Result<(), Error>
where
    S: RecordStore + ?Sized,
{
    let event = canned_event(mode, config);
    tracing::info!(?mode, table = %config.table_name, event = %event, "Running canned request");

    match dispatch(store, config, &event).await {
        Ok(envelope) => {
            println!("succeed {}", serde_json::to_string_pretty(&envelope)?);
            Ok(())
        }
        Err(err) => {
            eprintln!("fail {err}");
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn test_canned_events_use_configured_key() {
        let config = Config {
            key_name: "id".to_string(),
            ..Config::default()
        };

        let event = canned_event(Mode::Update, &config);

        assert_eq!(event["id"], TEST_KEY);
        assert_eq!(event["operation"], "update");
        assert_eq!(event["body"]["cost"], 9);
        assert!(event.get("mykey").is_none());
    }

    #[tokio::test]
    async fn test_full_cycle() {
        let store = InMemoryStore::new();
        let config = Config::default();

        run(&store, &config, Mode::Create).await.unwrap();
        assert!(run(&store, &config, Mode::Create).await.is_err());
        run(&store, &config, Mode::Update).await.unwrap();
        run(&store, &config, Mode::Read).await.unwrap();

        let stored = store.snapshot(&json!(TEST_KEY)).await.unwrap();
        assert_eq!(stored["location"], "waffle house");
        assert_eq!(stored["cost"], 9);

        run(&store, &config, Mode::Delete).await.unwrap();
        assert!(run(&store, &config, Mode::Read).await.is_err());
    }
}
