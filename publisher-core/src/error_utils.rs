use crate::error::*;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Validation(e) => {
                error!("Validation error details: {:?}", e);
            }
            CoreError::WordPress(e) => {
                error!("WordPress API error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Validation(e) => e.user_friendly_message(),
            CoreError::WordPress(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Io(e) => format!("File access failed: {}", e),
            _ => "An unexpected error occurred. Please try again.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Validation(_) => "VALIDATION".to_string(),
            CoreError::WordPress(_) => "WORDPRESS_API".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for ValidationError {
    fn log_error(&self) -> &Self {
        error!("ValidationError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ValidationError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ValidationError::MissingCredentials { field } => match field {
                CredentialField::Host => "Missing blog domain or IP address.".to_string(),
                CredentialField::User => "Missing user name.".to_string(),
                CredentialField::Password => "Missing REST API password.".to_string(),
            },
            ValidationError::MissingField { field } if field == "title" => {
                "The post title must not be empty.".to_string()
            }
            ValidationError::MissingField { field } if field == "slug" => {
                "The slug that uniquely identifies the post must not be empty.".to_string()
            }
            ValidationError::MissingField { field } => {
                format!("Required field '{}' must not be empty.", field)
            }
            ValidationError::InvalidFile { path } => format!(
                "The file path '{}' is not valid. Please check it and try again.",
                path.display()
            ),
            ValidationError::InvalidCategory { value } => format!(
                "'{}' is not a category id. Use comma-separated numeric ids.",
                value
            ),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ValidationError::MissingCredentials { .. } => "MISSING_CREDENTIALS".to_string(),
            ValidationError::MissingField { .. } => "MISSING_FIELD".to_string(),
            ValidationError::InvalidFile { .. } => "INVALID_FILE".to_string(),
            ValidationError::InvalidCategory { .. } => "INVALID_CATEGORY".to_string(),
        }
    }
}

impl ErrorExt for WordPressApiError {
    fn log_error(&self) -> &Self {
        error!("WordPressApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("WordPressApiError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            WordPressApiError::NetworkError {
                status: Some(status),
                body,
            } => format!("Request failed with status {}: {}", status, body),
            WordPressApiError::NetworkError { status: None, body } => {
                format!("Could not reach the blog: {}", body)
            }
            WordPressApiError::PublishFailed { status, body } => {
                format!("Publish failed with status {}: {}", status, body)
            }
            WordPressApiError::InvalidResponse { details } => {
                format!("The blog returned an unexpected response: {}", details)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            WordPressApiError::NetworkError { .. } => "WP_NETWORK_ERROR".to_string(),
            WordPressApiError::PublishFailed { .. } => "WP_PUBLISH_FAILED".to_string(),
            WordPressApiError::InvalidResponse { .. } => "WP_INVALID_RESPONSE".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::InvalidFormat { .. } | ConfigError::Parse(_) => {
                "The saved configuration is invalid. Please re-enter and save it.".to_string()
            }
            ConfigError::PermissionDenied { path } => format!(
                "Permission denied accessing configuration at {}.",
                path
            ),
            ConfigError::NoConfigDirectory => {
                "No configuration directory is available on this system.".to_string()
            }
            ConfigError::Serialize(_) => "Failed to write the configuration.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::InvalidFormat { .. } => "CONFIG_INVALID_FORMAT".to_string(),
            ConfigError::PermissionDenied { .. } => "CONFIG_PERMISSION_DENIED".to_string(),
            ConfigError::NoConfigDirectory => "CONFIG_NO_DIRECTORY".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
            ConfigError::Serialize(_) => "CONFIG_SERIALIZE_ERROR".to_string(),
        }
    }
}

/// Turns a failure into the notice shown to the user, logging it on the way.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    /// Logs the error with its code and returns the message to show the user.
    pub fn report_error(&self, error: &CoreError) -> String {
        let message = error.user_friendly_message();
        error.log_error();
        info!("Error code: {}", error.error_code());
        info!("User message: {}", message);
        message
    }

    /// Logs at warning level and returns the message to show the user.
    pub fn report_warning(&self, error: &CoreError) -> String {
        error.log_warn();
        error.user_friendly_message()
    }

    pub fn report(&self, error: &CoreError) -> String {
        match error {
            CoreError::Validation(_) => self.report_warning(error),
            _ => self.report_error(error),
        }
    }
}
