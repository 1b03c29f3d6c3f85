pub mod types;
pub mod error;
pub mod config;
pub mod session;
pub mod users;
pub mod profile_images;
pub mod responses;
pub mod admin_profile_image;

#[cfg(any(test, feature = "testing"))]
pub mod memory;

use aws_config::SdkConfig;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;
use std::sync::Arc;

use config::Config;
use profile_images::{ImageStorage, S3ImageStorage};
use session::{DynamoSessionStore, SessionStore};
use users::{DynamoUserDirectory, UserDirectory};

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<dyn SessionStore>,
    pub users: Arc<dyn UserDirectory>,
    pub images: Arc<dyn ImageStorage>,
}

impl AppState {
    pub fn new(
        config: Config,
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserDirectory>,
        images: Arc<dyn ImageStorage>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            sessions,
            users,
            images,
        })
    }

    /// DynamoDB-backed sessions and users, S3-backed images.
    pub fn from_aws(config: Config, sdk_config: &SdkConfig) -> Arc<Self> {
        let dynamo_client = DynamoClient::new(sdk_config);
        let s3_client = S3Client::new(sdk_config);

        let sessions = DynamoSessionStore::new(dynamo_client.clone(), &config.sessions_table_name);
        let users = DynamoUserDirectory::new(dynamo_client, &config.table_name);
        let images = S3ImageStorage::new(s3_client, &config.bucket_name, &config.image_prefix);

        Self::new(config, Arc::new(sessions), Arc::new(users), Arc::new(images))
    }
}
