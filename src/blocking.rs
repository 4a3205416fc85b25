use reqwest::blocking::{Client, Response};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::decode::{decode_access_grant, decode_request_token};
use crate::types::BLANK_REDIRECT;
use crate::{AccessGrant, AuthorizationRequest, Credentials, PocketConfig, PocketError, Result};

/// Header carrying Pocket's numeric error code on rejected requests
pub const ERROR_CODE_HEADER: &str = "X-Error-Code";

/// Header carrying Pocket's human-readable error message
pub const ERROR_MESSAGE_HEADER: &str = "X-Error";

#[derive(Serialize)]
struct TokenRequestBody<'a> {
    consumer_key: &'a str,
    redirect_uri: &'a str,
}

#[derive(Serialize)]
struct ExchangeBody<'a> {
    consumer_key: &'a str,
    code: &'a str,
}

#[derive(Serialize)]
struct RetrieveBody<'a> {
    consumer_key: &'a str,
    access_token: &'a str,
    count: u32,
}

/// Blocking Pocket API client
///
/// Covers the three calls of a run: token request, token exchange and
/// bulk retrieval. Every call is attempted exactly once.
///
/// # Example
///
/// ```no_run
/// use pocket_export::{blocking::PocketClient, Credentials, PocketConfig};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = PocketClient::new(PocketConfig::default())?;
///     let mut creds = Credentials {
///         app_name: "pocketcache".into(),
///         client_key: "1234-abcd1234abcd1234abcd1234".into(),
///         ..Default::default()
///     };
///     let request = client.start_flow(&creds)?;
///
///     println!("Visit: {}", request.authorization_url);
///     // Wait for the user to approve...
///
///     let grant = client.exchange_code(&creds, &request)?;
///     creds.apply_grant(&grant);
///     let body = client.retrieve(&creds, 100_000)?;
///     println!("Got {} bytes", body.len());
///     Ok(())
/// }
/// ```
pub struct PocketClient {
    config: PocketConfig,
    http: Client,
}

impl PocketClient {
    /// Create a new client with the given endpoint configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    pub fn new(config: PocketConfig) -> Result<Self> {
        // reqwest's blocking client defaults to a 30s deadline; override it
        // even when no timeout is configured.
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| PocketError::ClientCreation(e.to_string()))?;
        Ok(Self { config, http })
    }

    /// Endpoints and timeout this client was built with
    pub fn config(&self) -> &PocketConfig {
        &self.config
    }

    /// Obtain a request token and build the authorization URL for it
    ///
    /// # Errors
    ///
    /// Returns [`PocketError::Rejected`] if Pocket answers with a non-200
    /// status, or [`PocketError::MalformedResponse`] if the body carries no
    /// token.
    pub fn start_flow(&self, credentials: &Credentials) -> Result<AuthorizationRequest> {
        let redirect_uri = credentials.redirect_uri();
        let body = TokenRequestBody {
            consumer_key: &credentials.client_key,
            redirect_uri: &redirect_uri,
        };

        let response = self.post_json(&self.config.request_url, &body)?;
        let request_token = decode_request_token(&response.text()?)?;
        debug!("received request token");

        Ok(AuthorizationRequest {
            authorization_url: self.authorization_url(&request_token)?,
            request_token,
        })
    }

    /// URL of the page where the user approves `request_token`
    pub fn authorization_url(&self, request_token: &str) -> Result<String> {
        let mut url = Url::parse(&self.config.auth_page_url)?;
        url.query_pairs_mut()
            .append_pair("request_token", request_token)
            .append_pair("redirect_uri", BLANK_REDIRECT);
        Ok(url.to_string())
    }

    /// Exchange an approved request token for an access token
    ///
    /// # Errors
    ///
    /// Returns [`PocketError::NotAuthorized`] if the response does not hold
    /// both an access token and a username, which is what Pocket sends when
    /// the user never approved the request.
    pub fn exchange_code(
        &self,
        credentials: &Credentials,
        request: &AuthorizationRequest,
    ) -> Result<AccessGrant> {
        let body = ExchangeBody {
            consumer_key: &credentials.client_key,
            code: &request.request_token,
        };

        let response = self.post_json(&self.config.authorize_url, &body)?;
        let grant = decode_access_grant(&response.text()?)?;
        info!(username = %grant.username, "authorization complete");
        Ok(grant)
    }

    /// Fetch up to `count` saved items in one call and return the raw body
    ///
    /// # Errors
    ///
    /// Returns [`PocketError::MissingAccessToken`] without touching the
    /// network if `credentials` has not been authorized yet.
    pub fn retrieve(&self, credentials: &Credentials, count: u32) -> Result<String> {
        if !credentials.is_authorized() {
            return Err(PocketError::MissingAccessToken);
        }

        let body = RetrieveBody {
            consumer_key: &credentials.client_key,
            access_token: &credentials.access_token,
            count,
        };

        let response = self.post_json(&self.config.retrieve_url, &body)?;
        let text = response.text()?;
        info!(bytes = text.len(), count, "retrieved items");
        Ok(text)
    }

    fn post_json<T: Serialize>(&self, url: &str, body: &T) -> Result<Response> {
        debug!(url, "POST");
        let response = self.http.post(url).json(body).send()?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let headers = response.headers();
            let error_code = headers
                .get(ERROR_CODE_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<i32>().ok());
            let message = headers
                .get(ERROR_MESSAGE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            debug!(url, status = status.as_u16(), ?error_code, ?message, "request rejected");
            return Err(PocketError::Rejected {
                status: status.as_u16(),
                error_code,
                message,
            });
        }

        Ok(response)
    }
}

impl Default for PocketClient {
    fn default() -> Self {
        Self::new(PocketConfig::default()).expect("Failed to create Pocket client with defaults")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_embeds_token_and_blank_redirect() {
        let client = PocketClient::default();
        let url = client.authorization_url("abc123").unwrap();

        assert!(url.starts_with("https://getpocket.com/auth/authorize?"));
        assert!(url.contains("request_token=abc123"));
        assert!(url.contains("redirect_uri=about%3Ablank"));
    }

    #[test]
    fn test_default_client_has_no_timeout() {
        let client = PocketClient::default();
        assert_eq!(client.config().timeout, None);
        assert_eq!(client.config().retrieve_url, "https://getpocket.com/v3/get");
    }

    #[test]
    fn test_authorization_url_rejects_bad_page_url() {
        let config = PocketConfig::builder().auth_page_url("not a url").build();
        let client = PocketClient::new(config).unwrap();

        assert!(matches!(
            client.authorization_url("abc123").unwrap_err(),
            PocketError::UrlParse(_)
        ));
    }

    #[test]
    fn test_retrieve_requires_access_token() {
        let config = PocketConfig::builder()
            .api_base("http://127.0.0.1:9")
            .build();
        let client = PocketClient::new(config).unwrap();
        let creds = Credentials {
            app_name: "cache".into(),
            client_key: "key".into(),
            ..Default::default()
        };

        assert!(matches!(
            client.retrieve(&creds, 10).unwrap_err(),
            PocketError::MissingAccessToken
        ));
    }

    #[test]
    fn test_request_bodies_use_pocket_field_names() {
        let body = serde_json::to_value(RetrieveBody {
            consumer_key: "key",
            access_token: "tok",
            count: 100_000,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"consumer_key": "key", "access_token": "tok", "count": 100000})
        );

        let body = serde_json::to_value(TokenRequestBody {
            consumer_key: "key",
            redirect_uri: "cache:authorizationFinished",
        })
        .unwrap();
        assert_eq!(body["redirect_uri"], "cache:authorizationFinished");
    }
}
