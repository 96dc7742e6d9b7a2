//! DynamoDB record store.

use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::ReturnValue;
use aws_sdk_dynamodb::Client;
use serde_json::Value;

use super::conversions::{
    from_item, to_attribute, to_item, update_plan, UpdatePlan, KEY_PLACEHOLDER,
};
use super::{Record, RecordStore, Result, StoreError};
use crate::config::Config;

/// [`RecordStore`] backed by a single DynamoDB table with a hash key only.
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
    key_name: String,
}

impl DynamoDbStore {
    /// Creates a store for the table and key named in `config`.
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            table_name: config.table_name.clone(),
            key_name: config.key_name.clone(),
        }
    }
}

#[async_trait]
impl RecordStore for DynamoDbStore {
    async fn get(&self, key: &Value) -> Result<Option<Record>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(&self.key_name, to_attribute(key))
            .send()
            .await
            .map_err(map_service_error)?;

        result.item.as_ref().map(from_item).transpose()
    }

    async fn put_if_absent(&self, _key: &Value, record: &Record) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(record)))
            .condition_expression(format!("attribute_not_exists({KEY_PLACEHOLDER})"))
            .expression_attribute_names(KEY_PLACEHOLDER, &self.key_name)
            .send()
            .await
            .map_err(map_put_item_error)?;

        Ok(())
    }

    async fn update(&self, key: &Value, fields: &Record) -> Result<Record> {
        let UpdatePlan {
            expression,
            names,
            values,
        } = update_plan(&self.key_name, fields);

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(&self.key_name, to_attribute(key))
            .update_expression(expression)
            .condition_expression(format!("attribute_exists({KEY_PLACEHOLDER})"))
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(map_update_item_error)?;

        Ok(result
            .attributes
            .as_ref()
            .map(from_item)
            .transpose()?
            .unwrap_or_default())
    }

    async fn delete(&self, key: &Value) -> Result<Record> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(&self.key_name, to_attribute(key))
            .send()
            .await
            .map_err(map_service_error)?;

        Ok(result
            .attributes
            .as_ref()
            .map(from_item)
            .transpose()?
            .unwrap_or_default())
    }
}

/// Map any SDK error to [`StoreError::Service`], keeping the full error chain.
fn map_service_error<E, R>(err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + 'static,
    R: Debug,
{
    StoreError::Service(DisplayErrorContext(&err).to_string())
}

/// Map a PutItem SDK error, singling out the failed existence check.
fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
) -> StoreError {
    let detail = DisplayErrorContext(&err).to_string();
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(_) => StoreError::ConditionFailed(detail),
        _ => StoreError::Service(detail),
    }
}

/// Map an UpdateItem SDK error, singling out the failed existence check.
fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
) -> StoreError {
    let detail = DisplayErrorContext(&err).to_string();
    match err.into_service_error() {
        UpdateItemError::ConditionalCheckFailedException(_) => StoreError::ConditionFailed(detail),
        _ => StoreError::Service(detail),
    }
}
