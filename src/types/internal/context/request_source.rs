use std::fmt;

/// Source of the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSource {
    /// Request originated from API endpoint
    API,

    /// Request originated from CLI command
    CLI,

    /// Request originated from system (automated operations)
    System,
}

impl fmt::Display for RequestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestSource::API => f.write_str("api"),
            RequestSource::CLI => f.write_str("cli"),
            RequestSource::System => f.write_str("system"),
        }
    }
}
