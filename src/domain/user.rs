use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pagination::PageRequest;

/// Role given to accounts created through OAuth sign-in.
pub const DEFAULT_ROLE: &str = "user";

/// OAuth provider name stored for Google accounts.
pub const GOOGLE_PROVIDER: &str = "google";

/// How long a password reset token stays valid.
pub const RESET_TOKEN_TTL_HOURS: i64 = 1;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRole {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

/// Operator account of the dashboard.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// False for accounts that only sign in through OAuth.
    pub has_password: bool,
    pub role_id: i32,
    pub role: Option<String>,
    pub google_id: Option<String>,
    pub oauth_provider: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub role_id: i32,
    pub google_id: Option<String>,
    pub oauth_provider: Option<String>,
}

impl NewUser {
    #[must_use]
    pub fn new(username: String, email: String, role_id: i32) -> Self {
        Self {
            username,
            email: email.to_lowercase(),
            role_id,
            google_id: None,
            oauth_provider: None,
        }
    }

    #[must_use]
    pub fn with_google(mut self, google_id: String) -> Self {
        self.google_id = Some(google_id);
        self.oauth_provider = Some(GOOGLE_PROVIDER.to_string());
        self
    }
}

/// Identity returned by Google once the OAuth code exchange succeeded.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct GoogleProfile {
    pub google_id: String,
    pub email: String,
    pub name: Option<String>,
}

impl GoogleProfile {
    /// Display name, defaulting to the local part of the email.
    pub fn username(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub active_only: bool,
    pub pagination: Option<PageRequest>,
}

impl UserListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn active_only(mut self) -> Self {
        self.active_only = true;
        self
    }

    pub fn paginate(mut self, page: PageRequest) -> Self {
        self.pagination = Some(page);
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasswordResetToken {
    pub id: i32,
    pub user_id: i32,
    pub token: String,
    pub expires_at: NaiveDateTime,
    pub used: bool,
    pub created_at: NaiveDateTime,
}

impl PasswordResetToken {
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.expires_at < now
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPasswordResetToken {
    pub user_id: i32,
    pub token: String,
    pub expires_at: NaiveDateTime,
}

impl NewPasswordResetToken {
    /// Fresh random token for `user_id`, valid for [`RESET_TOKEN_TTL_HOURS`].
    pub fn issue(user_id: i32, now: NaiveDateTime) -> Self {
        Self {
            user_id,
            token: Uuid::new_v4().simple().to_string(),
            expires_at: now + Duration::hours(RESET_TOKEN_TTL_HOURS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 13)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap_or_default()
    }

    #[test]
    fn issued_token_expires_after_an_hour() {
        let issued = NewPasswordResetToken::issue(7, now());
        assert_eq!(issued.token.len(), 32);
        let token = PasswordResetToken {
            id: 1,
            user_id: 7,
            token: issued.token,
            expires_at: issued.expires_at,
            used: false,
            created_at: now(),
        };
        assert!(!token.is_expired(now() + Duration::minutes(59)));
        assert!(token.is_expired(now() + Duration::minutes(61)));
    }

    #[test]
    fn google_username_falls_back_to_email() {
        let profile = GoogleProfile {
            google_id: "g-1".to_string(),
            email: "jane.doe@example.com".to_string(),
            name: None,
        };
        assert_eq!(profile.username(), "jane.doe");
    }

    #[test]
    fn new_user_lowercases_email() {
        let user = NewUser::new("Jane".to_string(), "Jane@Example.COM".to_string(), 2)
            .with_google("g-1".to_string());
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.oauth_provider.as_deref(), Some(GOOGLE_PROVIDER));
    }
}
