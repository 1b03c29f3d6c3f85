use serde::Serialize;

// ========== SESSION ==========
/// Caller identity as established by the session store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub user_logged_in: bool,
    pub user_id: Option<i64>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn logged_in(user_id: i64) -> Self {
        Self {
            user_logged_in: true,
            user_id: Some(user_id),
        }
    }

    /// The session's user id, only if the session is marked logged in.
    pub fn authenticated_user_id(&self) -> Option<i64> {
        if self.user_logged_in {
            self.user_id
        } else {
            None
        }
    }
}

// ========== USER ==========
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountType {
    Manual,
    Other(String), // sso | oauth | ...
}

impl AccountType {
    /// Only the exact value `manual` is a manual account.
    pub fn parse(value: &str) -> Self {
        if value == "manual" {
            AccountType::Manual
        } else {
            AccountType::Other(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub is_admin: bool,
    pub account_type: Option<AccountType>,
}

// ========== PROFILE IMAGE ==========
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedImage {
    pub key: String,
    pub url: String,
    pub expires_in: u64, // seconds
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub key: String,
    pub content_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub last_modified: Option<String>,
}

// ========== ADMIN PROFILE IMAGE ==========
#[derive(Debug, Default)]
pub struct ProfileImageQuery {
    pub user_id: Option<String>,
    pub json: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminProfileImageResponse {
    pub success: bool,
    pub image_url: String,
    pub expires_in: u64,
    pub image_info: ImageInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_requires_logged_in_flag() {
        let session = SessionContext {
            user_logged_in: false,
            user_id: Some(7),
        };
        assert_eq!(session.authenticated_user_id(), None);
        assert_eq!(SessionContext::logged_in(7).authenticated_user_id(), Some(7));
        assert_eq!(SessionContext::anonymous().authenticated_user_id(), None);
    }

    #[test]
    fn account_type_parsing() {
        assert_eq!(AccountType::parse("manual"), AccountType::Manual);
        assert_eq!(
            AccountType::parse("Manual"),
            AccountType::Other("Manual".to_string())
        );
        assert_eq!(
            AccountType::parse("MANUAL"),
            AccountType::Other("MANUAL".to_string())
        );
        assert_eq!(
            AccountType::parse("google"),
            AccountType::Other("google".to_string())
        );
    }
}
