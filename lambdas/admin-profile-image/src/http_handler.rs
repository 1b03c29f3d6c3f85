use lambda_http::{http::Method, Body, Error, Request, RequestExt, Response};
use profile_shared::{
    admin_profile_image,
    error::{ApiError, DirectoryError},
    responses,
    session::session_id_from_cookie_header,
    types::{ProfileImageQuery, SessionContext},
    AppState,
};
use std::sync::Arc;

const PROFILE_IMAGE_PATH: &str = "/admin/users/profile-image";

/// Main Lambda handler - routes requests to the admin profile image endpoint
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let origin = state.config.allowed_origin.as_str();
    tracing::info!("Lambda invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == Method::OPTIONS {
        return responses::cors_preflight(origin);
    }

    if path.trim_end_matches('/') != PROFILE_IMAGE_PATH {
        tracing::warn!("No route matched - Method: {} Path: {}", method, path);
        return responses::not_found(origin);
    }

    if method != Method::GET {
        return responses::method_not_allowed(origin);
    }

    let session = match load_session(&event, &state).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("admin profile image: session lookup failed: {}", e);
            return responses::error(&ApiError::from(e), origin);
        }
    };

    let params = event.query_string_parameters_ref();
    let query = ProfileImageQuery {
        user_id: params
            .and_then(|p| p.first("user_id"))
            .map(|s| s.to_string()),
        json: params.and_then(|p| p.first("json")).map(|s| s.to_string()),
    };

    admin_profile_image::handle(
        &session,
        &query,
        state.users.as_ref(),
        state.images.as_ref(),
        origin,
    )
    .await
}

/// No cookie, or an unknown session id, is an anonymous caller.
async fn load_session(event: &Request, state: &AppState) -> Result<SessionContext, DirectoryError> {
    let session_id = event
        .headers()
        .get_all("Cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|header| session_id_from_cookie_header(header, &state.config.session_cookie_name));

    match session_id {
        Some(id) => Ok(state.sessions.load(id).await?.unwrap_or_default()),
        None => Ok(SessionContext::anonymous()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::http::StatusCode;
    use profile_shared::config::Config;
    use profile_shared::memory::{MemoryImageStorage, MemorySessionStore, MemoryUserDirectory};
    use std::collections::HashMap;

    const URL: &str = "https://profile-images.s3.amazonaws.com/profile-images/10/me.jpg?X-Amz-Signature=f00";

    fn state_with(sessions: MemorySessionStore) -> Arc<AppState> {
        let users = MemoryUserDirectory::new()
            .with_user(1, true, "manual")
            .with_user(2, false, "manual")
            .with_user(10, false, "manual");
        let images = MemoryImageStorage::new().with_image(10, URL, "profile-images/10/me.jpg");
        AppState::new(
            Config::default(),
            Arc::new(sessions),
            Arc::new(users),
            Arc::new(images),
        )
    }

    fn state() -> Arc<AppState> {
        state_with(
            MemorySessionStore::new()
                .with_session("admin-session", SessionContext::logged_in(1))
                .with_session("member-session", SessionContext::logged_in(2)),
        )
    }

    fn request(method: Method, path: &str, cookie: Option<&str>, params: &[(&str, &str)]) -> Request {
        let mut builder = lambda_http::http::Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header("Cookie", cookie);
        }
        let params: HashMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        builder
            .body(Body::Empty)
            .unwrap()
            .with_query_string_parameters(params)
    }

    fn json_body(resp: &Response<Body>) -> serde_json::Value {
        serde_json::from_slice(resp.body()).unwrap()
    }

    #[tokio::test]
    async fn admin_gets_json_reference() {
        let resp = function_handler(
            request(
                Method::GET,
                PROFILE_IMAGE_PATH,
                Some("theme=dark; session_id=admin-session"),
                &[("user_id", "10"), ("json", "1")],
            ),
            state(),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(&resp);
        assert_eq!(body["success"], true);
        assert_eq!(body["image_url"], URL);
        assert_eq!(body["expires_in"], 3600);
        assert_eq!(body["image_info"]["content_type"], "image/jpeg");
    }

    #[tokio::test]
    async fn admin_is_redirected_without_json_flag() {
        let resp = function_handler(
            request(
                Method::GET,
                PROFILE_IMAGE_PATH,
                Some("session_id=admin-session"),
                &[("user_id", "10")],
            ),
            state(),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()["Location"], URL);
    }

    #[tokio::test]
    async fn missing_or_unknown_session_is_unauthorized() {
        for cookie in [None, Some("session_id=nope"), Some("other=admin-session")] {
            let resp = function_handler(
                request(Method::GET, PROFILE_IMAGE_PATH, cookie, &[("user_id", "10")]),
                state(),
            )
            .await
            .unwrap();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(json_body(&resp)["error"], "Unauthorized access");
        }
    }

    #[tokio::test]
    async fn member_is_forbidden() {
        let resp = function_handler(
            request(
                Method::GET,
                PROFILE_IMAGE_PATH,
                Some("session_id=member-session"),
                &[("user_id", "10")],
            ),
            state(),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn session_store_failure_is_generic_500() {
        let resp = function_handler(
            request(
                Method::GET,
                PROFILE_IMAGE_PATH,
                Some("session_id=admin-session"),
                &[("user_id", "10")],
            ),
            state_with(MemorySessionStore::new().failing("connection reset by 10.0.0.7")),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(&resp),
            serde_json::json!({"error": "Internal server error"})
        );
    }

    #[tokio::test]
    async fn routing() {
        let preflight = function_handler(
            request(Method::OPTIONS, PROFILE_IMAGE_PATH, None, &[]),
            state(),
        )
        .await
        .unwrap();
        assert_eq!(preflight.status(), StatusCode::OK);

        let post = function_handler(
            request(Method::POST, PROFILE_IMAGE_PATH, None, &[]),
            state(),
        )
        .await
        .unwrap();
        assert_eq!(post.status(), StatusCode::METHOD_NOT_ALLOWED);

        let unknown = function_handler(request(Method::GET, "/admin/users", None, &[]), state())
            .await
            .unwrap();
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(&unknown)["error"], "Not found");
    }
}
