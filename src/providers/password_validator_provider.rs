use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::PasswordPolicy;

/// Password strength checks
///
/// Deterministic and side-effect free. Rules are applied in order and the
/// first failure is reported:
/// - Length (policy minimum, at most the policy maximum)
/// - At least one lowercase letter, one uppercase letter and one digit
/// - Username must not appear as a substring (case-insensitive)
pub struct PasswordValidatorProvider {
    policy: PasswordPolicy,
}

impl PasswordValidatorProvider {
    pub fn new(policy: PasswordPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PasswordPolicy {
        self.policy
    }

    /// Validate a password against all configured rules
    ///
    /// # Returns
    /// * `Ok(())` - Password passes all validation rules
    /// * `Err(PasswordValidationError)` - First failed rule
    pub fn validate(&self, password: &str, username: Option<&str>) -> Result<(), PasswordValidationError> {
        let length = password.chars().count();
        if length < self.policy.min_length {
            return Err(PasswordValidationError::TooShort(self.policy.min_length));
        }
        if length > self.policy.max_length {
            return Err(PasswordValidationError::TooLong(self.policy.max_length));
        }

        if !password.chars().any(char::is_lowercase) {
            return Err(PasswordValidationError::MissingLowercase);
        }
        if !password.chars().any(char::is_uppercase) {
            return Err(PasswordValidationError::MissingUppercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordValidationError::MissingDigit);
        }

        if let Some(username) = username.filter(|u| !u.is_empty()) {
            if password.to_lowercase().contains(&username.to_lowercase()) {
                return Err(PasswordValidationError::ContainsUsername);
            }
        }

        Ok(())
    }

    /// Generate a random password that always passes `validate`
    ///
    /// At least one character from each class, shuffled, padded up to
    /// `max(policy.min_length, 16)` characters.
    pub fn generate_secure_password(&self) -> String {
        const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
        const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
        const DIGITS: &[u8] = b"23456789";
        const SYMBOLS: &[u8] = b"!@#$%^&*-_=+";
        const ALL: [&[u8]; 4] = [LOWER, UPPER, DIGITS, SYMBOLS];

        let length = self.policy.min_length.max(16).min(self.policy.max_length);
        let mut rng = rand::rng();

        let mut chars: Vec<char> = ALL
            .iter()
            .map(|set| set[rng.random_range(0..set.len())] as char)
            .collect();

        while chars.len() < length {
            let set = ALL[rng.random_range(0..ALL.len())];
            chars.push(set[rng.random_range(0..set.len())] as char);
        }

        chars.shuffle(&mut rng);
        chars.into_iter().collect()
    }
}

/// Reasons a password fails the strength checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordValidationError {
    #[error("Password must be at least {0} characters")]
    TooShort(usize),

    #[error("Password must not exceed {0} characters")]
    TooLong(usize),

    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("Password must contain at least one digit")]
    MissingDigit,

    #[error("Password must not contain your username")]
    ContainsUsername,
}
