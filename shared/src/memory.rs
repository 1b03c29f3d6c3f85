//! In-memory collaborators for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{DirectoryError, StorageError};
use crate::profile_images::{effective_expiry_minutes, ImageStorage};
use crate::session::SessionStore;
use crate::types::{AccountType, ImageInfo, PresignedImage, SessionContext, UserRecord};
use crate::users::UserDirectory;

#[derive(Default)]
pub struct MemoryUserDirectory {
    users: HashMap<i64, UserRecord>,
    failure: Option<String>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: i64, is_admin: bool, account_type: &str) -> Self {
        self.users.insert(
            id,
            UserRecord {
                id,
                is_admin,
                account_type: Some(AccountType::parse(account_type)),
            },
        );
        self
    }

    /// A record with no `account_type` attribute.
    pub fn with_untyped_user(mut self, id: i64, is_admin: bool) -> Self {
        self.users.insert(
            id,
            UserRecord {
                id,
                is_admin,
                account_type: None,
            },
        );
        self
    }

    /// Every lookup fails with this message.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn get_user_by_id(&self, user_id: i64) -> Result<Option<UserRecord>, DirectoryError> {
        if let Some(message) = &self.failure {
            return Err(DirectoryError::Dynamo(message.clone()));
        }
        Ok(self.users.get(&user_id).cloned())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: HashMap<String, SessionContext>,
    failure: Option<String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, session_id: &str, session: SessionContext) -> Self {
        self.sessions.insert(session_id.to_string(), session);
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionContext>, DirectoryError> {
        if let Some(message) = &self.failure {
            return Err(DirectoryError::Dynamo(message.clone()));
        }
        Ok(self.sessions.get(session_id).cloned())
    }
}

/// A URL request as seen by [`MemoryImageStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRequest {
    pub target_user_id: i64,
    pub requesting_user_id: i64,
    pub admin_context: bool,
    pub expiry_minutes: u64,
}

#[derive(Default)]
pub struct MemoryImageStorage {
    images: HashMap<i64, (String, ImageInfo)>,
    failure: Option<String>,
    requests: Mutex<Vec<UrlRequest>>,
    info_requests: Mutex<Vec<String>>,
}

impl MemoryImageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, user_id: i64, url: &str, key: &str) -> Self {
        let info = ImageInfo {
            key: key.to_string(),
            content_type: Some("image/jpeg".to_string()),
            size_bytes: Some(2048),
            last_modified: Some("2026-01-01T00:00:00Z".to_string()),
        };
        self.images.insert(user_id, (url.to_string(), info));
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn requests(&self) -> Vec<UrlRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Keys passed to `get_profile_image_info`, in call order.
    pub fn info_requests(&self) -> Vec<String> {
        self.info_requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ImageStorage for MemoryImageStorage {
    async fn get_user_profile_image_url(
        &self,
        target_user_id: i64,
        requesting_user_id: i64,
        admin_context: bool,
        expiry_minutes: u64,
    ) -> Result<Option<PresignedImage>, StorageError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(UrlRequest {
                target_user_id,
                requesting_user_id,
                admin_context,
                expiry_minutes,
            });
        }
        if let Some(message) = &self.failure {
            return Err(StorageError::S3(message.clone()));
        }
        if !admin_context && target_user_id != requesting_user_id {
            return Ok(None);
        }

        Ok(self
            .images
            .get(&target_user_id)
            .map(|(url, info)| PresignedImage {
                key: info.key.clone(),
                url: url.clone(),
                expires_in: effective_expiry_minutes(admin_context, expiry_minutes) * 60,
            }))
    }

    async fn get_profile_image_info(
        &self,
        target_user_id: i64,
        key: &str,
    ) -> Result<Option<ImageInfo>, StorageError> {
        if let Ok(mut requests) = self.info_requests.lock() {
            requests.push(key.to_string());
        }
        if let Some(message) = &self.failure {
            return Err(StorageError::S3(message.clone()));
        }
        Ok(self
            .images
            .get(&target_user_id)
            .filter(|(_, info)| info.key == key)
            .map(|(_, info)| info.clone()))
    }
}
