use async_trait::async_trait;
use aws_sdk_dynamodb::{types::AttributeValue, Client as DynamoClient};
use std::collections::HashMap;

use crate::error::DirectoryError;
use crate::types::{AccountType, UserRecord};

/// Read-only user lookup.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user_by_id(&self, user_id: i64) -> Result<Option<UserRecord>, DirectoryError>;
}

/// Users stored in DynamoDB with PK=USER#id, SK=USER#id
pub struct DynamoUserDirectory {
    client: DynamoClient,
    table_name: String,
}

impl DynamoUserDirectory {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl UserDirectory for DynamoUserDirectory {
    async fn get_user_by_id(&self, user_id: i64) -> Result<Option<UserRecord>, DirectoryError> {
        let pk = format!("USER#{}", user_id);

        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(pk.clone()))
            .key("SK", AttributeValue::S(pk))
            .send()
            .await
            .map_err(|e| DirectoryError::Dynamo(format!("get user {}: {}", user_id, e)))?;

        match result.item() {
            Some(item) => Ok(Some(user_from_item(user_id, item))),
            None => Ok(None),
        }
    }
}

/// A missing `account_type` is kept as `None`; only the caller of the lookup
/// knows whether it matters.
pub(crate) fn user_from_item(
    user_id: i64,
    item: &HashMap<String, AttributeValue>,
) -> UserRecord {
    let is_admin = item
        .get("is_admin")
        .and_then(|v| v.as_bool().ok())
        .copied()
        .unwrap_or(false);

    let account_type = item
        .get("account_type")
        .and_then(|v| v.as_s().ok())
        .map(|s| AccountType::parse(s));

    UserRecord {
        id: user_id,
        is_admin,
        account_type,
    }
}
