use std::fmt;

/// Failure while reading startup settings from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    InvalidFormat { setting_name: String, expected: String, actual: String },
    OutOfRange { setting_name: String, reason: String },
}

impl SettingsError {
    pub fn invalid_format(setting_name: &str, expected: &str, actual: &str) -> Self {
        Self::InvalidFormat {
            setting_name: setting_name.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn out_of_range(setting_name: &str, reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            setting_name: setting_name.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat { setting_name, expected, actual } => {
                write!(
                    f,
                    "Setting '{}' has invalid format. Expected: {}, got: {}",
                    setting_name, expected, actual
                )
            }
            Self::OutOfRange { setting_name, reason } => {
                write!(f, "Setting '{}' is out of range: {}", setting_name, reason)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
