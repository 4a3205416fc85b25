use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of items requested by the bulk retrieval call
pub const DEFAULT_RETRIEVE_COUNT: u32 = 100_000;

/// Suffix appended to the app name to form the token request redirect URI
pub(crate) const REDIRECT_SUFFIX: &str = ":authorizationFinished";

/// Redirect target embedded in the authorization page URL
pub(crate) const BLANK_REDIRECT: &str = "about:blank";

/// Credentials persisted between runs
///
/// `app_name` and `client_key` are supplied by the operator; the token
/// fields start empty and are filled in by the authorization flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Credentials {
    /// Name of the registered Pocket application
    pub app_name: String,
    /// Consumer key issued by Pocket for the application
    pub client_key: String,
    /// Access token obtained from the exchange (empty until authorized)
    #[serde(default)]
    pub access_token: String,
    /// Request token from the most recent token request
    #[serde(default)]
    pub request_token: String,
}

impl Credentials {
    /// Whether an access token is present
    pub fn is_authorized(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Redirect URI sent with the token request
    pub fn redirect_uri(&self) -> String {
        format!("{}{}", self.app_name, REDIRECT_SUFFIX)
    }

    /// Record a completed exchange
    pub fn apply_grant(&mut self, grant: &AccessGrant) {
        self.access_token = grant.access_token.clone();
    }
}

/// A pending authorization attempt
///
/// Holds the request token and the URL the user has to visit to approve it.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Request token identifying this attempt
    pub request_token: String,
    /// The URL the user should visit to authorize the application
    pub authorization_url: String,
}

/// Result of a successful token exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    /// Long-lived access token for data calls
    pub access_token: String,
    /// Pocket username the token belongs to
    pub username: String,
}

/// Endpoints used by the Pocket client
#[derive(Debug, Clone)]
pub struct PocketConfig {
    /// Token request endpoint
    pub request_url: String,
    /// Token exchange endpoint
    pub authorize_url: String,
    /// Bulk retrieval endpoint
    pub retrieve_url: String,
    /// Page the user visits to approve a request token
    pub auth_page_url: String,
    /// Total per-request timeout; `None` waits until Pocket answers or the
    /// connection fails, so a large bulk fetch is never cut off
    pub timeout: Option<Duration>,
}

impl Default for PocketConfig {
    fn default() -> Self {
        Self {
            request_url: "https://getpocket.com/v3/oauth/request".to_string(),
            authorize_url: "https://getpocket.com/v3/oauth/authorize".to_string(),
            retrieve_url: "https://getpocket.com/v3/get".to_string(),
            auth_page_url: "https://getpocket.com/auth/authorize".to_string(),
            timeout: None,
        }
    }
}

impl PocketConfig {
    /// Create a new config builder
    pub fn builder() -> PocketConfigBuilder {
        PocketConfigBuilder::default()
    }
}

/// Builder for PocketConfig
#[derive(Debug, Clone, Default)]
pub struct PocketConfigBuilder {
    request_url: Option<String>,
    authorize_url: Option<String>,
    retrieve_url: Option<String>,
    auth_page_url: Option<String>,
    timeout: Option<Duration>,
}

impl PocketConfigBuilder {
    /// Set the token request endpoint URL
    pub fn request_url(mut self, url: impl Into<String>) -> Self {
        self.request_url = Some(url.into());
        self
    }

    /// Set the token exchange endpoint URL
    pub fn authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = Some(url.into());
        self
    }

    /// Set the bulk retrieval endpoint URL
    pub fn retrieve_url(mut self, url: impl Into<String>) -> Self {
        self.retrieve_url = Some(url.into());
        self
    }

    /// Set the authorization page URL
    pub fn auth_page_url(mut self, url: impl Into<String>) -> Self {
        self.auth_page_url = Some(url.into());
        self
    }

    /// Give up on any single request after `timeout`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Point the three API endpoints at another host, keeping Pocket's paths
    pub fn api_base(self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.request_url(format!("{base}/v3/oauth/request"))
            .authorize_url(format!("{base}/v3/oauth/authorize"))
            .retrieve_url(format!("{base}/v3/get"))
    }

    /// Build the PocketConfig
    pub fn build(self) -> PocketConfig {
        let defaults = PocketConfig::default();
        PocketConfig {
            request_url: self.request_url.unwrap_or(defaults.request_url),
            authorize_url: self.authorize_url.unwrap_or(defaults.authorize_url),
            retrieve_url: self.retrieve_url.unwrap_or(defaults.retrieve_url),
            auth_page_url: self.auth_page_url.unwrap_or(defaults.auth_page_url),
            timeout: self.timeout.or(defaults.timeout),
        }
    }
}
