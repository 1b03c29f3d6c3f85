use async_trait::async_trait;
use aws_sdk_dynamodb::{types::AttributeValue, Client as DynamoClient};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::error::DirectoryError;
use crate::types::SessionContext;

/// Resolves a session id (from the session cookie) to the caller identity.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<SessionContext>, DirectoryError>;
}

/// Sessions stored in DynamoDB with PK=SESSION#id, SK=SESSION#id
pub struct DynamoSessionStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoSessionStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl SessionStore for DynamoSessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionContext>, DirectoryError> {
        let pk = format!("SESSION#{}", session_id);

        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(pk.clone()))
            .key("SK", AttributeValue::S(pk))
            .send()
            .await
            .map_err(|e| DirectoryError::Dynamo(format!("get session: {}", e)))?;

        match result.item() {
            Some(item) => session_from_item(item, Utc::now()),
            None => Ok(None),
        }
    }
}

/// Expired sessions resolve to `None`.
pub(crate) fn session_from_item(
    item: &HashMap<String, AttributeValue>,
    now: DateTime<Utc>,
) -> Result<Option<SessionContext>, DirectoryError> {
    if let Some(expires_at) = item.get("expires_at").and_then(|v| v.as_s().ok()) {
        let expires_at = DateTime::parse_from_rfc3339(expires_at)
            .map_err(|e| DirectoryError::Malformed(format!("session expires_at: {}", e)))?;
        if expires_at.with_timezone(&Utc) <= now {
            return Ok(None);
        }
    }

    let user_logged_in = item
        .get("user_logged_in")
        .and_then(|v| v.as_bool().ok())
        .copied()
        .unwrap_or(false);

    let user_id = match item.get("user_id").and_then(|v| v.as_n().ok()) {
        Some(n) => Some(
            n.parse::<i64>()
                .map_err(|e| DirectoryError::Malformed(format!("session user_id: {}", e)))?,
        ),
        None => None,
    };

    Ok(Some(SessionContext {
        user_logged_in,
        user_id,
    }))
}

/// Find a cookie value in a `Cookie` header.
pub fn session_id_from_cookie_header<'a>(header: &'a str, cookie_name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}
