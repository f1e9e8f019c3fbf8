use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("WordPress API error: {0}")]
    WordPress(#[from] WordPressApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// The three credential fields of an endpoint, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    Host,
    User,
    Password,
}

impl CredentialField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialField::Host => "host",
            CredentialField::User => "user",
            CredentialField::Password => "password",
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing credentials: {field}")]
    MissingCredentials { field: CredentialField },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid file: {}", .path.display())]
    InvalidFile { path: PathBuf },

    #[error("Invalid category id: {value}")]
    InvalidCategory { value: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WordPressApiError {
    #[error("Network error (status {}): {body}", .status.map_or_else(|| "none".to_string(), |s| s.to_string()))]
    NetworkError { status: Option<u16>, body: String },

    #[error("Publish failed with status {status}: {body}")]
    PublishFailed { status: u16, body: String },

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration format: {details}")]
    InvalidFormat { details: String },

    #[error("Permission denied accessing config: {path}")]
    PermissionDenied { path: String },

    #[error("No platform configuration directory available")]
    NoConfigDirectory,

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
