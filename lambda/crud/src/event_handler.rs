use std::str::FromStr;

use http::StatusCode;
use lambda_runtime::{Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::CrudError;
use crate::store::{Record, RecordStore, StoreError};

/// Successful result, shaped for the API Gateway response mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub status: String,
    pub data: Value,
}

impl Envelope {
    fn new(status: StatusCode, data: Value) -> Self {
        Self {
            status_code: status.as_u16(),
            status: status.canonical_reason().unwrap_or_default().to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl FromStr for Operation {
    type Err = CrudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Operation::Create),
            "read" => Ok(Operation::Read),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            other => Err(CrudError::ServerError(format!(
                "unrecognized operation - {other}"
            ))),
        }
    }
}

/// Key value as it appears in error details: bare for strings, JSON otherwise.
fn key_detail(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) async fn function_handler<S>(
    store: &S,
    config: &Config,
    event: LambdaEvent<Value>,
) -> Result<Envelope, Error>
where
    S: RecordStore + ?Sized,
{
    let (payload, context) = event.into_parts();
    tracing::info!(request_id = %context.request_id, event = %payload, "Received event");

    dispatch(store, config, &payload).await.map_err(|err| {
        if err.is_server_error() {
            tracing::error!(request_id = %context.request_id, error = %err, "Request failed");
        } else {
            tracing::warn!(request_id = %context.request_id, error = %err, "Request rejected");
        }
        Error::from(err)
    })
}

/// Route one event to its handler.
pub async fn dispatch<S>(store: &S, config: &Config, event: &Value) -> Result<Envelope, CrudError>
where
    S: RecordStore + ?Sized,
{
    let operation: Operation = event
        .get("operation")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .parse()?;
    let key = event.get(&config.key_name).cloned().unwrap_or(Value::Null);
    let empty = Record::new();
    let body = event
        .get("body")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    tracing::debug!(?operation, key = %key, "Dispatching");

    match operation {
        Operation::Create => create(store, config, key, body).await,
        Operation::Read => read(store, key).await,
        Operation::Update => update(store, config, key, body).await,
        Operation::Delete => delete(store, key).await,
    }
}

async fn create<S>(
    store: &S,
    config: &Config,
    key: Value,
    body: &Record,
) -> Result<Envelope, CrudError>
where
    S: RecordStore + ?Sized,
{
    let mut record = config.default_record.clone();
    record.insert(config.key_name.clone(), key.clone());
    for (field, value) in config.permitted(body) {
        record.insert(field.to_string(), value.clone());
    }

    match store.put_if_absent(&key, &record).await {
        // The full record goes back, defaults included.
        Ok(()) => Ok(Envelope::new(StatusCode::CREATED, Value::Object(record))),
        Err(StoreError::ConditionFailed(detail)) => Err(CrudError::Conflict(detail)),
        Err(err) => Err(CrudError::ServerError(err.to_string())),
    }
}

async fn read<S>(store: &S, key: Value) -> Result<Envelope, CrudError>
where
    S: RecordStore + ?Sized,
{
    match store.get(&key).await {
        Ok(Some(record)) => Ok(Envelope::new(StatusCode::OK, Value::Object(record))),
        Ok(None) => Err(CrudError::NotFound(key_detail(&key))),
        Err(err) => Err(CrudError::ServerError(err.to_string())),
    }
}

async fn update<S>(
    store: &S,
    config: &Config,
    key: Value,
    body: &Record,
) -> Result<Envelope, CrudError>
where
    S: RecordStore + ?Sized,
{
    let fields: Record = config
        .permitted(body)
        .map(|(field, value)| (field.to_string(), value.clone()))
        .collect();

    if fields.is_empty() {
        return Err(CrudError::BadRequest(
            "no valid keys for update in body".to_string(),
        ));
    }

    match store.update(&key, &fields).await {
        Ok(record) => Ok(Envelope::new(StatusCode::OK, Value::Object(record))),
        // Updates never create records.
        Err(StoreError::ConditionFailed(_)) => Err(CrudError::NotFound(key_detail(&key))),
        Err(err) => Err(CrudError::ServerError(err.to_string())),
    }
}

async fn delete<S>(store: &S, key: Value) -> Result<Envelope, CrudError>
where
    S: RecordStore + ?Sized,
{
    match store.delete(&key).await {
        Ok(attributes) => Ok(Envelope::new(StatusCode::OK, Value::Object(attributes))),
        Err(err) => Err(CrudError::ServerError(err.to_string())),
    }
}
