use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::internal::AuthorizationError;

/// Dotted permission key of the form `{resource}.{verb}`, or the wildcard `*`
///
/// Construction through [`PermissionKey::parse`] only checks syntax. Whether a key
/// exists in the catalog is checked separately (at boot and when granting).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionKey(Cow<'static, str>);

impl PermissionKey {
    /// Grants every permission unconditionally
    pub const WILDCARD: PermissionKey = PermissionKey(Cow::Borrowed("*"));

    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    pub fn parse(raw: &str) -> Result<Self, AuthorizationError> {
        let raw = raw.trim();
        if raw == "*" {
            return Ok(Self::WILDCARD);
        }

        let valid_segment = |segment: &str| {
            !segment.is_empty()
                && segment.starts_with(|c: char| c.is_ascii_lowercase())
                && segment.chars().all(|c| c.is_ascii_lowercase() || c == '_')
        };

        match raw.split_once('.') {
            Some((resource, verb)) if valid_segment(resource) && valid_segment(verb) => {
                Ok(Self(Cow::Owned(raw.to_string())))
            }
            _ => Err(AuthorizationError::UnknownPermission(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == "*"
    }

    /// Resource segment, e.g. `news` for `news.edit`
    pub fn resource(&self) -> &str {
        self.0.split_once('.').map(|(resource, _)| resource).unwrap_or(&self.0)
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PermissionKey {
    type Error = AuthorizationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PermissionKey> for String {
    fn from(key: PermissionKey) -> Self {
        key.0.into_owned()
    }
}

/// Catalog entry describing a single permission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub key: PermissionKey,
    pub category: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}
