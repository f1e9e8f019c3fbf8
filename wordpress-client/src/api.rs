use chrono::NaiveDateTime;
use publisher_core::{
    Category, ConfigError, CoreError, EndpointConfig, PublishTarget, SlugLookup,
    WordPressApiError, REST_NAMESPACE,
};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

pub const POST_STATUS_PUBLISH: &str = "publish";

const USER_AGENT: &str = concat!("wp-publisher/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CATEGORIES_PER_PAGE: &str = "100";

/// JSON body sent to create or update a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPayload {
    pub title: String,
    pub slug: String,
    pub status: String,
    pub content: String,
    /// Local time, `YYYY-MM-DDTHH:MM:SS`, no offset.
    pub date: String,
    pub categories: Vec<u64>,
}

impl PostPayload {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        content: impl Into<String>,
        published_at: NaiveDateTime,
        categories: Vec<u64>,
    ) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            status: POST_STATUS_PUBLISH.to_string(),
            content: content.into(),
            date: published_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            categories,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostId {
    id: u64,
}

#[derive(Debug, Clone)]
pub struct WordPressClient {
    http_client: Client,
    config: EndpointConfig,
    base_url: Url,
}

impl WordPressClient {
    /// Client for `https://<host>/wp-json/wp/v2/`.
    pub fn new(config: EndpointConfig) -> Result<Self, CoreError> {
        let base_url = config.base_url();
        Self::build(config, &base_url)
    }

    /// Client for the REST namespace under an explicit origin such as `http://127.0.0.1:8080`.
    pub fn with_origin(config: EndpointConfig, origin: &str) -> Result<Self, CoreError> {
        let base_url = format!("{}{}", origin.trim_end_matches('/'), REST_NAMESPACE);
        Self::build(config, &base_url)
    }

    fn build(config: EndpointConfig, base_url: &str) -> Result<Self, CoreError> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidFormat {
            details: format!("invalid blog address '{}': {}", base_url, e),
        })?;

        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CoreError::Internal {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            config,
            base_url,
        })
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, CoreError> {
        self.base_url
            .join(endpoint)
            .map_err(|e| CoreError::Internal {
                message: format!("invalid endpoint '{}': {}", endpoint, e),
            })
    }

    /// Sends one authenticated request. Only transport failures are errors here; the
    /// caller decides which statuses count as success.
    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        query_params: Option<&[(&str, &str)]>,
        body: Option<&PostPayload>,
    ) -> Result<Response, CoreError> {
        let url = self.endpoint_url(endpoint)?;

        let mut request_builder = self
            .http_client
            .request(method.clone(), url)
            .header(AUTHORIZATION, self.config.auth_header());

        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }
        if let Some(payload) = body {
            request_builder = request_builder.json(payload);
        }

        info!("Making WordPress API request: {} {}", method, endpoint);
        match request_builder.send().await {
            Ok(response) => {
                debug!("Response {} for {} {}", response.status(), method, endpoint);
                Ok(response)
            }
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                Err(CoreError::WordPress(WordPressApiError::NetworkError {
                    status: e.status().map(|s| s.as_u16()),
                    body: e.to_string(),
                }))
            }
        }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, CoreError> {
        let params = [("per_page", CATEGORIES_PER_PAGE), ("_fields", "id,name")];
        let response = self
            .make_request(Method::GET, "categories", Some(&params), None)
            .await?;
        let response = ensure_success(response).await?;

        let categories: Vec<Category> = parse_json(response, "categories").await?;
        info!("Retrieved {} categories", categories.len());
        Ok(categories)
    }

    pub async fn find_post_by_slug(&self, slug: &str) -> Result<SlugLookup, CoreError> {
        let params = [("slug", slug), ("_fields", "id")];
        let response = self
            .make_request(Method::GET, "posts", Some(&params), None)
            .await?;
        let response = ensure_success(response).await?;

        let posts: Vec<PostId> = parse_json(response, "posts").await?;
        let lookup = match posts.first() {
            Some(post) => SlugLookup::Found { post_id: post.id },
            None => SlugLookup::NotFound,
        };
        debug!("Slug '{}' lookup: {:?}", slug, lookup);
        Ok(lookup)
    }

    /// POSTs the payload to the collection (create) or to the post resource (update).
    /// Returns the response status, which is always 200 or 201.
    pub async fn submit_post(
        &self,
        target: PublishTarget,
        payload: &PostPayload,
    ) -> Result<u16, CoreError> {
        let endpoint = target.endpoint();
        let response = self
            .make_request(Method::POST, &endpoint, None, Some(payload))
            .await?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            info!("Published '{}' via {}", payload.slug, endpoint);
            return Ok(status.as_u16());
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Publish to {} failed with status {}", endpoint, status);
        Err(CoreError::WordPress(WordPressApiError::PublishFailed {
            status: status.as_u16(),
            body,
        }))
    }

    pub async fn create_post(&self, payload: &PostPayload) -> Result<u16, CoreError> {
        self.submit_post(PublishTarget::Create, payload).await
    }

    pub async fn update_post(&self, post_id: u64, payload: &PostPayload) -> Result<u16, CoreError> {
        self.submit_post(PublishTarget::Update { post_id }, payload)
            .await
    }
}

async fn ensure_success(response: Response) -> Result<Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!("Request failed with status: {}", status);
    Err(CoreError::WordPress(WordPressApiError::NetworkError {
        status: Some(status.as_u16()),
        body,
    }))
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    response: Response,
    what: &str,
) -> Result<T, CoreError> {
    response.json().await.map_err(|e| {
        error!("Failed to parse {}: {}", what, e);
        CoreError::WordPress(WordPressApiError::InvalidResponse {
            details: format!("Failed to parse {}", what),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config() -> EndpointConfig {
        EndpointConfig::new("blog.example.com", "alice", "secret")
    }

    #[test]
    fn test_client_creation() {
        let client = WordPressClient::new(config()).unwrap();
        assert_eq!(
            client.base_url().as_str(),
            "https://blog.example.com/wp-json/wp/v2/"
        );
        assert_eq!(client.config().user, "alice");
    }

    #[test]
    fn test_endpoint_urls() {
        let client = WordPressClient::new(config()).unwrap();
        assert_eq!(
            client.endpoint_url("posts").unwrap().as_str(),
            "https://blog.example.com/wp-json/wp/v2/posts"
        );
        assert_eq!(
            client
                .endpoint_url(&PublishTarget::Update { post_id: 7 }.endpoint())
                .unwrap()
                .as_str(),
            "https://blog.example.com/wp-json/wp/v2/posts/7"
        );
    }

    #[test]
    fn test_with_origin_strips_trailing_slash() {
        let client = WordPressClient::with_origin(config(), "http://127.0.0.1:8080/").unwrap();
        assert_eq!(
            client.base_url().as_str(),
            "http://127.0.0.1:8080/wp-json/wp/v2/"
        );
    }

    #[test]
    fn test_invalid_host_is_config_error() {
        let bad = EndpointConfig::new("blog example com", "alice", "secret");
        let result = WordPressClient::new(bad);
        assert!(matches!(
            result,
            Err(CoreError::Config(ConfigError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn test_payload_serialization() {
        let published_at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap();
        let payload = PostPayload::new("Hello", "hello", "<h1>Hi</h1>", published_at, vec![1]);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "Hello",
                "slug": "hello",
                "status": "publish",
                "content": "<h1>Hi</h1>",
                "date": "2024-03-09T08:05:00",
                "categories": [1]
            })
        );
    }
}
