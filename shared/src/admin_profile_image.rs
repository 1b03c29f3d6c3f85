use lambda_http::{http::StatusCode, Body, Error, Response};

use crate::error::ApiError;
use crate::profile_images::ImageStorage;
use crate::responses;
use crate::types::{
    AccountType, AdminProfileImageResponse, ProfileImageQuery, SessionContext,
};
use crate::users::UserDirectory;

/// Lifetime of the URL handed to an admin.
pub const ADMIN_URL_EXPIRY_MINUTES: u64 = 60;

#[derive(Debug)]
pub enum ProfileImageOutcome {
    Json(AdminProfileImageResponse),
    Redirect(String),
}

/// Positive integer, optionally signed with `+`, surrounding whitespace ignored.
pub fn parse_user_id(raw: Option<&str>) -> Result<i64, ApiError> {
    let raw = raw.map(str::trim).ok_or(ApiError::InvalidUserId)?;
    let digits = raw.strip_prefix('+').unwrap_or(raw);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::InvalidUserId);
    }

    match digits.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::InvalidUserId),
    }
}

/// Run every check and fetch the image reference for an admin.
pub async fn resolve(
    session: &SessionContext,
    query: &ProfileImageQuery,
    users: &dyn UserDirectory,
    images: &dyn ImageStorage,
) -> Result<ProfileImageOutcome, ApiError> {
    let admin_id = session
        .authenticated_user_id()
        .ok_or(ApiError::Unauthorized)?;

    let is_admin = users
        .get_user_by_id(admin_id)
        .await?
        .is_some_and(|user| user.is_admin);
    if !is_admin {
        return Err(ApiError::Forbidden);
    }

    let target_id = parse_user_id(query.user_id.as_deref())?;

    let target = users
        .get_user_by_id(target_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    // A record without an account type is not a manual account
    if target.account_type != Some(AccountType::Manual) {
        return Err(ApiError::NotManualAccount);
    }

    let image = images
        .get_user_profile_image_url(target.id, admin_id, true, ADMIN_URL_EXPIRY_MINUTES)
        .await?
        .filter(|image| !image.url.is_empty())
        .ok_or(ApiError::ImageNotFound)?;

    tracing::info!(
        "Admin {} accessed profile image of user {}",
        admin_id,
        target.id
    );

    if query.json.as_deref() == Some("1") {
        let image_info = images
            .get_profile_image_info(target.id, &image.key)
            .await?
            .ok_or(ApiError::ImageNotFound)?;

        return Ok(ProfileImageOutcome::Json(AdminProfileImageResponse {
            success: true,
            image_url: image.url,
            expires_in: image.expires_in,
            image_info,
        }));
    }

    Ok(ProfileImageOutcome::Redirect(image.url))
}

/// GET admin profile image: JSON with `json=1`, otherwise a redirect.
pub async fn handle(
    session: &SessionContext,
    query: &ProfileImageQuery,
    users: &dyn UserDirectory,
    images: &dyn ImageStorage,
    allowed_origin: &str,
) -> Result<Response<Body>, Error> {
    match resolve(session, query, users, images).await {
        Ok(ProfileImageOutcome::Json(body)) => responses::json(StatusCode::OK, allowed_origin, &body),
        Ok(ProfileImageOutcome::Redirect(url)) => responses::redirect(&url, allowed_origin),
        Err(err) => {
            if err.is_internal() {
                tracing::error!("admin profile image: {}", err);
            } else {
                tracing::warn!("admin profile image rejected: {}", err);
            }
            responses::error(&err, allowed_origin)
        }
    }
}
