use std::time::Duration;

use poem::web::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

use crate::types::internal::user::AdminUser;

/// Name of the cookie carrying the signed session token
pub const SESSION_COOKIE_NAME: &str = "admin-session";

/// Session payload carried inside the signed cookie
///
/// `timestamp` is the issue time in unix milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: i32,
    pub username: String,
    pub must_change_password: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verein_id: Option<i32>,
    pub timestamp: i64,
}

impl Session {
    /// Snapshot of the user's current state
    pub fn for_user(user: &AdminUser, issued_at_ms: i64) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            must_change_password: user.must_change_password,
            role_id: user.role_id,
            role_name: user.role_name.clone(),
            verein_id: user.verein_id,
            timestamp: issued_at_ms,
        }
    }

    /// Valid iff `0 <= now - timestamp <= max_age`
    pub fn is_valid_at(&self, now_ms: i64, max_age: Duration) -> bool {
        let age = now_ms.saturating_sub(self.timestamp);
        age >= 0 && (age as u128) <= max_age.as_millis()
    }
}

/// Cookie to hand back to the client: either a fresh session or a removal
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub value: String,
    pub max_age: Duration,
    pub secure: bool,
}

impl SessionCookie {
    pub fn issue(token: String, max_age: Duration, secure: bool) -> Self {
        Self { value: token, max_age, secure }
    }

    pub fn removal(secure: bool) -> Self {
        Self {
            value: String::new(),
            max_age: Duration::ZERO,
            secure,
        }
    }

    pub fn is_removal(&self) -> bool {
        self.value.is_empty()
    }

    pub fn to_cookie(&self) -> Cookie {
        let mut cookie = Cookie::new_with_str(SESSION_COOKIE_NAME, &self.value);
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_path("/");
        cookie.set_max_age(self.max_age);
        cookie
    }
}

impl std::fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookie")
            .field("value", &if self.is_removal() { "" } else { "[REDACTED]" })
            .field("max_age", &self.max_age)
            .field("secure", &self.secure)
            .finish()
    }
}
