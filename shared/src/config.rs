use std::env;

const DEFAULT_TABLE_NAME: &str = "profile-users";
const DEFAULT_BUCKET_NAME: &str = "profile-images";
const DEFAULT_IMAGE_PREFIX: &str = "profile-images";
const DEFAULT_SESSION_COOKIE: &str = "session_id";

/// Runtime settings, read once at cold start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub table_name: String,
    pub sessions_table_name: String,
    pub bucket_name: String,
    pub image_prefix: String,
    pub session_cookie_name: String,
    pub allowed_origin: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let table_name = get("TABLE_NAME").unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string());
        let sessions_table_name = get("SESSIONS_TABLE_NAME").unwrap_or_else(|| table_name.clone());

        Self {
            table_name,
            sessions_table_name,
            bucket_name: get("PROFILE_IMAGE_BUCKET")
                .unwrap_or_else(|| DEFAULT_BUCKET_NAME.to_string()),
            image_prefix: get("PROFILE_IMAGE_PREFIX")
                .map(|p| p.trim_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_IMAGE_PREFIX.to_string()),
            session_cookie_name: get("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string()),
            allowed_origin: get("ALLOWED_ORIGIN").unwrap_or_else(|| "*".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        let config = Config::default();
        assert_eq!(config.table_name, "profile-users");
        assert_eq!(config.sessions_table_name, "profile-users");
        assert_eq!(config.bucket_name, "profile-images");
        assert_eq!(config.session_cookie_name, "session_id");
        assert_eq!(config.allowed_origin, "*");
    }

    #[test]
    fn reads_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("TABLE_NAME", "users-prod"),
            ("PROFILE_IMAGE_PREFIX", "/avatars/"),
            ("SESSION_COOKIE_NAME", ""),
        ]);
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.table_name, "users-prod");
        assert_eq!(config.sessions_table_name, "users-prod");
        assert_eq!(config.image_prefix, "avatars");
        assert_eq!(config.session_cookie_name, "session_id");
    }
}
