/// Where a secret is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretType {
    /// Environment variable (or `.env`, loaded at startup)
    EnvVar { name: String },
}

/// Loading and validation rules for one secret
#[derive(Debug, Clone)]
pub struct SecretConfig {
    pub secret_type: SecretType,
    pub required: bool,
    /// Minimum length in bytes (None = no minimum)
    pub min_length: Option<usize>,
}

impl SecretConfig {
    pub fn new(secret_type: SecretType) -> Self {
        Self {
            secret_type,
            required: true,
            min_length: None,
        }
    }

    /// Shorthand for a required environment variable secret
    pub fn env(name: &str) -> Self {
        Self::new(SecretType::EnvVar { name: name.to_string() })
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn min_length(mut self, length: usize) -> Self {
        self.min_length = Some(length);
        self
    }

    /// Name used in error messages
    pub fn name(&self) -> &str {
        match &self.secret_type {
            SecretType::EnvVar { name } => name,
        }
    }
}
