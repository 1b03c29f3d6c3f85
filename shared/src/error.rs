use lambda_http::http::StatusCode;
use thiserror::Error;

/// Failure talking to the session store or the user directory.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("DynamoDB request failed: {0}")]
    Dynamo(String),

    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Failure talking to the image object store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("S3 request failed: {0}")]
    S3(String),

    #[error("failed to presign URL: {0}")]
    Presign(String),
}

/// Every way the admin profile image request can end without an image.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Admin access required")]
    Forbidden,

    #[error("Invalid user ID")]
    InvalidUserId,

    #[error("User not found")]
    UserNotFound,

    #[error("This endpoint is only for manual account profile images")]
    NotManualAccount,

    #[error("Profile image not found")]
    ImageNotFound,

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::InvalidUserId | ApiError::NotManualAccount => StatusCode::BAD_REQUEST,
            ApiError::UserNotFound | ApiError::ImageNotFound => StatusCode::NOT_FOUND,
            ApiError::Directory(_) | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status() == StatusCode::INTERNAL_SERVER_ERROR
    }
}
