use crate::error::{CredentialField, ValidationError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Path of the WordPress REST namespace every request is made under.
pub const REST_NAMESPACE: &str = "/wp-json/wp/v2/";

/// Category id WordPress assigns when none is given ("Uncategorized").
pub const DEFAULT_CATEGORY_ID: u64 = 1;

/// Host and Basic credentials of a WordPress site.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

impl EndpointConfig {
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    /// Host with surrounding whitespace and trailing slashes removed.
    pub fn normalized_host(&self) -> &str {
        self.host.trim().trim_end_matches('/')
    }

    pub fn base_url(&self) -> String {
        format!("https://{}{}", self.normalized_host(), REST_NAMESPACE)
    }

    /// `Authorization` header value: `Basic base64(user:password)`.
    pub fn auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.user, self.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    /// Checks host, user and password in that order, reporting the first empty one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            (CredentialField::Host, self.normalized_host()),
            (CredentialField::User, self.user.as_str()),
            (CredentialField::Password, self.password.as_str()),
        ];

        match fields.iter().find(|(_, value)| value.is_empty()) {
            Some((field, _)) => Err(ValidationError::MissingCredentials { field: *field }),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A post as entered in the form, before anything is read or rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub slug: String,
    pub file_path: PathBuf,
    /// Comma-separated category ids, or empty for the default category.
    pub categories: String,
}

impl PostDraft {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            file_path: file_path.into(),
            categories: String::new(),
        }
    }

    pub fn with_categories(mut self, categories: impl Into<String>) -> Self {
        self.categories = categories.into();
        self
    }

    /// Parses the comma-separated category list. Empty input yields the default category.
    pub fn category_ids(&self) -> Result<Vec<u64>, ValidationError> {
        let mut ids = Vec::new();
        for token in self.categories.split(',').map(str::trim) {
            if token.is_empty() {
                continue;
            }
            match token.parse::<u64>() {
                Ok(id) if id > 0 => ids.push(id),
                _ => {
                    return Err(ValidationError::InvalidCategory {
                        value: token.to_string(),
                    })
                }
            }
        }

        if ids.is_empty() {
            ids.push(DEFAULT_CATEGORY_ID);
        }
        Ok(ids)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

/// Result of looking up a post by slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugLookup {
    NotFound,
    Found { post_id: u64 },
}

/// Where a submit goes: the posts collection, or an existing post resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishTarget {
    Create,
    Update { post_id: u64 },
}

impl PublishTarget {
    /// Endpoint path relative to the REST namespace.
    pub fn endpoint(&self) -> String {
        match self {
            PublishTarget::Create => "posts".to_string(),
            PublishTarget::Update { post_id } => format!("posts/{}", post_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_and_auth_header() {
        let config = EndpointConfig::new("blog.example.com", "alice", "secret");
        assert_eq!(config.base_url(), "https://blog.example.com/wp-json/wp/v2/");
        assert_eq!(config.auth_header(), "Basic YWxpY2U6c2VjcmV0");
    }

    #[test]
    fn test_host_is_normalized() {
        let config = EndpointConfig::new("  blog.example.com/ ", "alice", "secret");
        assert_eq!(config.base_url(), "https://blog.example.com/wp-json/wp/v2/");
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let missing_all = EndpointConfig::default();
        assert_eq!(
            missing_all.validate(),
            Err(ValidationError::MissingCredentials {
                field: CredentialField::Host
            })
        );

        let missing_user = EndpointConfig::new("blog.example.com", "", "");
        assert_eq!(
            missing_user.validate(),
            Err(ValidationError::MissingCredentials {
                field: CredentialField::User
            })
        );

        let missing_password = EndpointConfig::new("blog.example.com", "alice", "");
        assert_eq!(
            missing_password.validate(),
            Err(ValidationError::MissingCredentials {
                field: CredentialField::Password
            })
        );

        let whitespace_host = EndpointConfig::new("  ", "alice", "secret");
        assert!(whitespace_host.validate().is_err());

        assert!(EndpointConfig::new("blog.example.com", "alice", "secret")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = EndpointConfig::new("blog.example.com", "alice", "secret");
        let debug = format!("{:?}", config);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_category_ids() {
        let draft = PostDraft::new("Hello", "hello", "hello.md");
        assert_eq!(draft.category_ids(), Ok(vec![DEFAULT_CATEGORY_ID]));

        let draft = draft.with_categories(" 3, 5,,7 ,");
        assert_eq!(draft.category_ids(), Ok(vec![3, 5, 7]));

        let draft = draft.with_categories("3,news");
        assert_eq!(
            draft.category_ids(),
            Err(ValidationError::InvalidCategory {
                value: "news".to_string()
            })
        );

        let draft = draft.with_categories("0");
        assert!(draft.category_ids().is_err());
    }

    #[test]
    fn test_publish_target_endpoint() {
        assert_eq!(PublishTarget::Create.endpoint(), "posts");
        assert_eq!(PublishTarget::Update { post_id: 42 }.endpoint(), "posts/42");
    }
}
