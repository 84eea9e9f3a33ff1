use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    types::{AttributeValue, ReturnValue},
    Client,
};

use super::{attribute, ItemStore, Record, StoreError, KEY_ATTRIBUTE};

/// [`ItemStore`] backed by a single DynamoDB table with a string `id` hash key.
pub(crate) struct DynamoDbStore {
    client: Client,
    table_name: String,
}

impl DynamoDbStore {
    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    fn key(id: &str) -> AttributeValue {
        AttributeValue::S(id.to_string())
    }
}

/// `SET` expression for a partial update, with every field name and value
/// bound through placeholders so reserved words like `text` need no special
/// casing.
#[derive(Debug, PartialEq)]
pub(crate) struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

impl UpdateExpression {
    pub fn set(changes: Record) -> Option<Self> {
        if changes.is_empty() {
            return None;
        }

        let mut assignments = Vec::with_capacity(changes.len());
        let mut names = HashMap::new();
        let mut values = HashMap::new();
        for (i, (field, value)) in changes.into_iter().enumerate() {
            assignments.push(format!("#f{i} = :v{i}"));
            names.insert(format!("#f{i}"), field);
            values.insert(format!(":v{i}"), attribute::to_attribute(value));
        }

        Some(Self {
            expression: format!("SET {}", assignments.join(", ")),
            names,
            values,
        })
    }
}

#[async_trait]
impl ItemStore for DynamoDbStore {
    #[tracing::instrument(skip_all, level = "debug", fields(table = %self.table_name))]
    async fn scan_all(&self) -> Result<Vec<Record>, StoreError> {
        let mut items = Vec::new();
        let mut start_key = None;

        // a single Scan stops at 1 MB, keep going until the table is exhausted
        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| StoreError::dynamo_db("Scan", e))?;

            items.extend(
                output
                    .items
                    .unwrap_or_default()
                    .into_iter()
                    .map(attribute::from_item),
            );

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        tracing::debug!(count = items.len(), "scan finished");
        Ok(items)
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn get_item(&self, id: &str) -> Result<Option<Record>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, Self::key(id))
            .send()
            .await
            .map_err(|e| StoreError::dynamo_db("GetItem", e))?;

        Ok(output.item.map(attribute::from_item))
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn put_item(&self, item: Record) -> Result<(), StoreError> {
        if !item.get(KEY_ATTRIBUTE).is_some_and(|id| id.is_string()) {
            return Err(StoreError::Malformed(format!(
                "item is missing a string `{KEY_ATTRIBUTE}`"
            )));
        }

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(attribute::to_item(item)))
            .send()
            .await
            .map_err(|e| StoreError::dynamo_db("PutItem", e))?;

        Ok(())
    }

    #[tracing::instrument(skip(self, changes), level = "debug")]
    async fn update_item(&self, id: &str, changes: Record) -> Result<Record, StoreError> {
        let update = UpdateExpression::set(changes)
            .ok_or_else(|| StoreError::Malformed("update without fields".to_string()))?;

        let output = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, Self::key(id))
            .update_expression(update.expression)
            .set_expression_attribute_names(Some(update.names))
            .set_expression_attribute_values(Some(update.values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| StoreError::dynamo_db("UpdateItem", e))?;

        output
            .attributes
            .map(attribute::from_item)
            .ok_or_else(|| StoreError::Malformed("UpdateItem returned no attributes".to_string()))
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn delete_item(&self, id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, Self::key(id))
            .send()
            .await
            .map_err(|e| StoreError::dynamo_db("DeleteItem", e))?;

        Ok(())
    }
}
