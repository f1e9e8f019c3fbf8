use publisher_core::{CoreError, EndpointConfig, ValidationError};
use tracing::debug;
use wordpress_client::WordPressClient;

/// Endpoint settings captured for one workflow run.
#[derive(Debug, Clone)]
pub struct Site {
    config: EndpointConfig,
    origin: Option<String>,
}

impl Site {
    pub fn new(config: EndpointConfig) -> Self {
        Self {
            config,
            origin: None,
        }
    }

    /// Talk to `origin` (e.g. `http://127.0.0.1:8080`) instead of `https://<host>`.
    pub fn with_origin(config: EndpointConfig, origin: impl Into<String>) -> Self {
        Self {
            config,
            origin: Some(origin.into()),
        }
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.config.validate()
    }

    /// Builds the authenticated client. No request is sent.
    pub fn connect(&self) -> Result<WordPressClient, CoreError> {
        let client = match &self.origin {
            Some(origin) => WordPressClient::with_origin(self.config.clone(), origin)?,
            None => WordPressClient::new(self.config.clone())?,
        };
        debug!("Connected to {}", client.base_url());
        Ok(client)
    }
}
