use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::DateTimeFormat;
use aws_sdk_s3::types::Object;
use aws_sdk_s3::Client as S3Client;
use std::time::Duration;

use crate::error::StorageError;
use crate::types::{ImageInfo, PresignedImage};

/// Longest URL lifetime handed out outside admin context.
pub const SELF_SERVICE_MAX_EXPIRY_MINUTES: u64 = 15;

/// Object store holding user profile images.
///
/// `admin_context` lets the requesting user read any user's image with the
/// requested expiry. Without it a user can only read their own image and the
/// expiry is capped at [`SELF_SERVICE_MAX_EXPIRY_MINUTES`].
#[async_trait]
pub trait ImageStorage: Send + Sync {
    async fn get_user_profile_image_url(
        &self,
        target_user_id: i64,
        requesting_user_id: i64,
        admin_context: bool,
        expiry_minutes: u64,
    ) -> Result<Option<PresignedImage>, StorageError>;

    /// Metadata for `key`, the object a presigned URL was issued for.
    async fn get_profile_image_info(
        &self,
        target_user_id: i64,
        key: &str,
    ) -> Result<Option<ImageInfo>, StorageError>;
}

pub fn effective_expiry_minutes(admin_context: bool, requested_minutes: u64) -> u64 {
    let minutes = if admin_context {
        requested_minutes
    } else {
        requested_minutes.min(SELF_SERVICE_MAX_EXPIRY_MINUTES)
    };
    minutes.max(1)
}

/// Profile images live under `{prefix}/{user_id}/`; the newest object wins.
pub struct S3ImageStorage {
    client: S3Client,
    bucket: String,
    prefix: String,
}

impl S3ImageStorage {
    pub fn new(client: S3Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    fn user_prefix(&self, user_id: i64) -> String {
        user_prefix(&self.prefix, user_id)
    }

    async fn latest_object(&self, user_id: i64) -> Result<Option<Object>, StorageError> {
        let prefix = self.user_prefix(user_id);

        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&prefix)
            .into_paginator()
            .send();

        let mut latest: Option<Object> = None;
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| StorageError::S3(format!("list {}: {}", prefix, e)))?;
            latest = select_latest(latest.iter().chain(page.contents())).cloned();
        }

        Ok(latest)
    }
}

#[async_trait]
impl ImageStorage for S3ImageStorage {
    async fn get_user_profile_image_url(
        &self,
        target_user_id: i64,
        requesting_user_id: i64,
        admin_context: bool,
        expiry_minutes: u64,
    ) -> Result<Option<PresignedImage>, StorageError> {
        if !admin_context && target_user_id != requesting_user_id {
            tracing::warn!(
                "User {} requested profile image of user {} without admin context",
                requesting_user_id,
                target_user_id
            );
            return Ok(None);
        }

        let Some(object) = self.latest_object(target_user_id).await? else {
            return Ok(None);
        };
        let Some(key) = object.key() else {
            return Ok(None);
        };

        let expires_in = effective_expiry_minutes(admin_context, expiry_minutes) * 60;
        let presigning = PresigningConfig::expires_in(Duration::from_secs(expires_in))
            .map_err(|e| StorageError::Presign(e.to_string()))?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Presign(format!("{}: {}", key, e)))?;

        tracing::info!(
            "Presigned profile image {} for user {} (admin: {}, {}s)",
            key,
            requesting_user_id,
            admin_context,
            expires_in
        );

        Ok(Some(PresignedImage {
            key: key.to_string(),
            url: presigned_request.uri().to_string(),
            expires_in,
        }))
    }

    async fn get_profile_image_info(
        &self,
        target_user_id: i64,
        key: &str,
    ) -> Result<Option<ImageInfo>, StorageError> {
        if !is_user_image_key(&self.user_prefix(target_user_id), key) {
            tracing::warn!("Key {} is not a profile image of user {}", key, target_user_id);
            return Ok(None);
        }

        let head = match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(head) => head,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => {
                return Ok(None)
            }
            Err(e) => return Err(StorageError::S3(format!("head {}: {}", key, e))),
        };

        Ok(Some(ImageInfo {
            key: key.to_string(),
            content_type: head.content_type().map(|s| s.to_string()),
            size_bytes: head.content_length(),
            last_modified: head
                .last_modified()
                .and_then(|dt| dt.fmt(DateTimeFormat::DateTime).ok()),
        }))
    }
}

fn user_prefix(prefix: &str, user_id: i64) -> String {
    if prefix.is_empty() {
        format!("{}/", user_id)
    } else {
        format!("{}/{}/", prefix, user_id)
    }
}

fn is_user_image_key(user_prefix: &str, key: &str) -> bool {
    key.strip_prefix(user_prefix)
        .is_some_and(|rest| !rest.is_empty() && !rest.ends_with('/'))
}

/// Newest object by last-modified, ignoring folder markers. Ties go to the greater key.
fn select_latest<'a, I>(objects: I) -> Option<&'a Object>
where
    I: IntoIterator<Item = &'a Object>,
{
    objects
        .into_iter()
        .filter(|o| o.key().is_some_and(|k| !k.ends_with('/')))
        .max_by_key(|o| {
            (
                o.last_modified().map(|dt| (dt.secs(), dt.subsec_nanos())),
                o.key().map(|k| k.to_string()),
            )
        })
}
