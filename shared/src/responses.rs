use lambda_http::{
    http::{response::Builder, StatusCode},
    Body, Error, Response,
};
use serde::Serialize;

use crate::error::ApiError;

/// CORS headers for a credentialed (cookie) request from `allowed_origin`.
fn with_cors(builder: Builder, allowed_origin: &str) -> Builder {
    let builder = builder.header("Access-Control-Allow-Origin", allowed_origin);

    // Browsers reject credentialed requests against a wildcard origin
    if allowed_origin == "*" {
        builder
    } else {
        builder.header("Access-Control-Allow-Credentials", "true")
    }
}

/// JSON response with CORS headers.
pub fn json<T: Serialize>(
    status: StatusCode,
    allowed_origin: &str,
    body: &T,
) -> Result<Response<Body>, Error> {
    let builder = Response::builder()
        .status(status)
        .header("Content-Type", "application/json");

    Ok(with_cors(builder, allowed_origin)
        .body(serde_json::to_string(body)?.into())
        .map_err(Box::new)?)
}

/// `{"error": ...}` with the error's status. Internal errors get a generic message.
pub fn error(err: &ApiError, allowed_origin: &str) -> Result<Response<Body>, Error> {
    json(
        err.status(),
        allowed_origin,
        &serde_json::json!({ "error": err.public_message() }),
    )
}

pub fn error_message(
    status: StatusCode,
    allowed_origin: &str,
    message: &str,
) -> Result<Response<Body>, Error> {
    json(status, allowed_origin, &serde_json::json!({ "error": message }))
}

/// 302 to a presigned URL. Never cached: the URL expires.
pub fn redirect(location: &str, allowed_origin: &str) -> Result<Response<Body>, Error> {
    let builder = Response::builder()
        .status(StatusCode::FOUND)
        .header("Location", location)
        .header("Cache-Control", "no-store");

    Ok(with_cors(builder, allowed_origin)
        .body(Body::Empty)
        .map_err(Box::new)?)
}

pub fn not_found(allowed_origin: &str) -> Result<Response<Body>, Error> {
    error_message(StatusCode::NOT_FOUND, allowed_origin, "Not found")
}

pub fn method_not_allowed(allowed_origin: &str) -> Result<Response<Body>, Error> {
    error_message(StatusCode::METHOD_NOT_ALLOWED, allowed_origin, "Method not allowed")
}

pub fn cors_preflight(allowed_origin: &str) -> Result<Response<Body>, Error> {
    let builder = Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Methods", "GET,OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type,Cookie");

    Ok(with_cors(builder, allowed_origin)
        .body(Body::Empty)
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_shape() {
        let resp = error(&ApiError::UserNotFound, "*").unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()["Content-Type"], "application/json");
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body, serde_json::json!({"error": "User not found"}));
    }

    #[test]
    fn redirect_has_location_and_no_body() {
        let resp = redirect("https://bucket.s3.amazonaws.com/a?X-Amz-Signature=1", "*").unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers()["Location"],
            "https://bucket.s3.amazonaws.com/a?X-Amz-Signature=1"
        );
        assert!(resp.body().is_empty());
    }

    #[test]
    fn credentials_allowed_for_named_origin() {
        let origin = "https://admin.example.com";
        let responses = [
            json(StatusCode::OK, origin, &serde_json::json!({"success": true})).unwrap(),
            error(&ApiError::Forbidden, origin).unwrap(),
            redirect("https://bucket.s3.amazonaws.com/a", origin).unwrap(),
            cors_preflight(origin).unwrap(),
        ];
        for resp in &responses {
            assert_eq!(resp.headers()["Access-Control-Allow-Origin"], origin);
            assert_eq!(resp.headers()["Access-Control-Allow-Credentials"], "true");
        }
    }

    #[test]
    fn no_credentials_for_wildcard_origin() {
        let resp = json(StatusCode::OK, "*", &serde_json::json!({})).unwrap();
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
        assert!(resp.headers().get("Access-Control-Allow-Credentials").is_none());
    }
}
