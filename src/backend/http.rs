//! HTTP chat backend

use super::{BackendError, ChatBackend, ChatReply, ChatRequest};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

const DEFAULT_ORIGIN: &str = "http://localhost";
const DEFAULT_PORT: u16 = 5000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Where and how to reach the chat backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Origin of the hosting page
    pub origin: String,
    /// Backend port used when the page is served from localhost
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
        }
    }
}

impl BackendConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            origin: non_empty("CHAT_BUBBLE_ORIGIN").unwrap_or(defaults.origin),
            port: non_empty("CHAT_BUBBLE_BACKEND_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            username: non_empty("CHAT_BUBBLE_USER"),
            password: non_empty("CHAT_BUBBLE_PASSWORD"),
        }
    }

    /// Local pages talk to the backend port on localhost, anything else to
    /// its own origin.
    pub fn base_url(&self) -> String {
        let is_local = Url::parse(&self.origin)
            .ok()
            .and_then(|url| url.host_str().map(|host| host == "localhost"))
            .unwrap_or(false);
        if is_local {
            format!("http://localhost:{}", self.port)
        } else {
            self.origin.trim_end_matches('/').to_string()
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url())
    }
}

/// Posts `{input}` to `{base}/chat` and expects `{key, content}` back
pub struct HttpChatBackend {
    client: Client,
    endpoint: String,
    credentials: Option<(String, Option<String>)>,
}

impl HttpChatBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.chat_url(),
            credentials: config
                .username
                .clone()
                .map(|user| (user, config.password.clone())),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some((user, password)) = &self.credentials {
            builder = builder.basic_auth(user, password.as_ref());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::network(format!("Request timeout: {e}"))
            } else if e.is_connect() {
                BackendError::network(format!("Connection failed: {e}"))
            } else {
                BackendError::network(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(BackendError::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| BackendError::parse(format!("Failed to parse response: {e} - body: {body}")))
    }
}
