//! OAuth token endpoint operations
//!
//! Covers the four token endpoint interactions:
//! 1. Authorization code exchange (completing a user login)
//! 2. Application access token retrieval (`client_credentials`)
//! 3. Access token extension (`fb_exchange_token`, short- to long-lived)
//! 4. Token introspection (`debug_token`)
//!
//! The token endpoint answers a successful exchange with a form-urlencoded
//! body (`access_token=...&expires=...`) and failures with a JSON error
//! object; [`parse_token_response`] handles the split. The Graph base URL
//! is held on the client so tests can point it at a local server.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;
use url::form_urlencoded;

use crate::constants::{DEBUG_TOKEN_PATH, GRAPH_URL, TOKEN_PATH};
use crate::error::{Error, GraphApiError, Result};

/// A user or page access token as returned by the token endpoint.
///
/// `expires` is a delta in seconds from the response time; the platform
/// omits it for tokens that do not expire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    pub expires: Option<u64>,
}

/// Client for the OAuth endpoints of the Graph API.
///
/// Holds the HTTP client and the Graph base URL; application credentials
/// are passed per call and never stored.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    graph_url: String,
}

impl OAuthClient {
    /// Client against the production Graph endpoint.
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            graph_url: GRAPH_URL.to_owned(),
        }
    }

    /// Client against an alternate Graph base URL (test servers).
    pub fn with_graph_url(http: reqwest::Client, graph_url: impl Into<String>) -> Self {
        let mut graph_url = graph_url.into();
        if !graph_url.ends_with('/') {
            graph_url.push('/');
        }
        Self { http, graph_url }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn graph_url(&self) -> &str {
        &self.graph_url
    }

    /// Exchange an authorization code for a user access token.
    ///
    /// `redirect_uri` must match the one used when the code was issued;
    /// codes embedded in login cookies were issued with an empty one.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        app_id: &str,
        app_secret: &str,
    ) -> Result<AccessToken> {
        debug!(app_id, "exchanging authorization code");
        let response = self
            .http
            .get(format!("{}{}", self.graph_url, TOKEN_PATH))
            .query(&[
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", app_id),
                ("client_secret", app_secret),
            ])
            .send()
            .await?;
        parse_token_response(&response.text().await?)
    }

    /// Fetch the application's own access token.
    pub async fn app_access_token(&self, app_id: &str, app_secret: &str) -> Result<String> {
        debug!(app_id, "fetching application access token");
        let response = self
            .http
            .get(format!("{}{}", self.graph_url, TOKEN_PATH))
            .query(&[
                ("grant_type", "client_credentials"),
                ("client_id", app_id),
                ("client_secret", app_secret),
            ])
            .send()
            .await?;
        parse_token_response(&response.text().await?).map(|token| token.access_token)
    }

    /// Trade a short-lived user token for a long-lived one.
    pub async fn extend_access_token(
        &self,
        access_token: &str,
        app_id: &str,
        app_secret: &str,
    ) -> Result<AccessToken> {
        debug!(app_id, "extending access token");
        let response = self
            .http
            .get(format!("{}{}", self.graph_url, TOKEN_PATH))
            .query(&[
                ("grant_type", "fb_exchange_token"),
                ("fb_exchange_token", access_token),
                ("client_id", app_id),
                ("client_secret", app_secret),
            ])
            .send()
            .await?;
        parse_token_response(&response.text().await?)
    }

    /// Introspect a token via `debug_token`, authenticated with the
    /// `app_id|app_secret` application token.
    pub async fn debug_access_token(
        &self,
        input_token: &str,
        app_id: &str,
        app_secret: &str,
    ) -> Result<Value> {
        let app_token = format!("{app_id}|{app_secret}");
        let response = self
            .http
            .get(format!("{}{}", self.graph_url, DEBUG_TOKEN_PATH))
            .query(&[
                ("input_token", input_token),
                ("access_token", app_token.as_str()),
            ])
            .send()
            .await?;
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|_| Error::UnexpectedResponse(text.clone()))?;
        if body.get("error").is_some() {
            return Err(Error::Api(GraphApiError::from_body(body)));
        }
        Ok(body)
    }
}

/// Parse a token endpoint response body.
///
/// A form-urlencoded body carrying `access_token` is the success shape;
/// anything else must be a JSON error object. A body that is neither is
/// reported as unexpected.
fn parse_token_response(body: &str) -> Result<AccessToken> {
    let pairs: HashMap<String, String> =
        form_urlencoded::parse(body.as_bytes()).into_owned().collect();
    if let Some(token) = pairs.get("access_token") {
        return Ok(AccessToken {
            access_token: token.clone(),
            expires: pairs.get("expires").and_then(|e| e.parse().ok()),
        });
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => Err(Error::Api(GraphApiError::from_body(value))),
        Err(_) => Err(Error::UnexpectedResponse(body.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn token_response_with_expiry_parses() {
        let token = parse_token_response("access_token=XYZ&expires=5183999").unwrap();
        assert_eq!(token.access_token, "XYZ");
        assert_eq!(token.expires, Some(5183999));
    }

    #[test]
    fn token_response_without_expiry_parses() {
        let token = parse_token_response("access_token=XYZ").unwrap();
        assert_eq!(token.access_token, "XYZ");
        assert_eq!(token.expires, None);
    }

    #[test]
    fn json_error_body_becomes_api_error() {
        let result =
            parse_token_response(r#"{"error":{"message":"Invalid code","type":"OAuthException"}}"#);
        match result {
            Err(Error::Api(err)) => {
                assert_eq!(err.message, "Invalid code");
                assert_eq!(err.error_type.as_deref(), Some("OAuthException"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn garbage_body_is_unexpected() {
        // Bare words parse as a valueless form key, not a token
        assert!(matches!(
            parse_token_response("<html>moved</html>"),
            Err(Error::UnexpectedResponse(_))
        ));
    }

    #[tokio::test]
    async fn exchange_code_sends_all_four_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/access_token"))
            .and(query_param("code", "ABC"))
            .and(query_param("redirect_uri", ""))
            .and(query_param("client_id", "123"))
            .and(query_param("client_secret", "s3cr3t"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("access_token=XYZ&expires=5183999"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let oauth = OAuthClient::with_graph_url(reqwest::Client::new(), server.uri());
        let token = oauth.exchange_code("ABC", "", "123", "s3cr3t").await.unwrap();
        assert_eq!(token.access_token, "XYZ");
        assert_eq!(token.expires, Some(5183999));
    }

    #[tokio::test]
    async fn exchange_code_surfaces_platform_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/access_token"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error":{"message":"Invalid code","type":"OAuthException","code":100}}"#,
            ))
            .mount(&server)
            .await;

        let oauth = OAuthClient::with_graph_url(reqwest::Client::new(), server.uri());
        let err = oauth
            .exchange_code("expired", "", "123", "s3cr3t")
            .await
            .unwrap_err();
        match err {
            Error::Api(api) => {
                assert_eq!(api.message, "Invalid code");
                assert_eq!(api.code, Some(100));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn app_access_token_uses_client_credentials_grant() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/access_token"))
            .and(query_param("grant_type", "client_credentials"))
            .and(query_param("client_id", "123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("access_token=123|apptoken"))
            .mount(&server)
            .await;

        let oauth = OAuthClient::with_graph_url(reqwest::Client::new(), server.uri());
        let token = oauth.app_access_token("123", "s3cr3t").await.unwrap();
        assert_eq!(token, "123|apptoken");
    }

    #[tokio::test]
    async fn extend_access_token_passes_the_old_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/access_token"))
            .and(query_param("grant_type", "fb_exchange_token"))
            .and(query_param("fb_exchange_token", "short-lived"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("access_token=long-lived&expires=5184000"),
            )
            .mount(&server)
            .await;

        let oauth = OAuthClient::with_graph_url(reqwest::Client::new(), server.uri());
        let token = oauth
            .extend_access_token("short-lived", "123", "s3cr3t")
            .await
            .unwrap();
        assert_eq!(token.access_token, "long-lived");
        assert_eq!(token.expires, Some(5184000));
    }

    #[tokio::test]
    async fn debug_access_token_returns_introspection_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/debug_token"))
            .and(query_param("input_token", "XYZ"))
            .and(query_param("access_token", "123|s3cr3t"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data":{"app_id":"123","is_valid":true,"user_id":"777"}}"#,
            ))
            .mount(&server)
            .await;

        let oauth = OAuthClient::with_graph_url(reqwest::Client::new(), server.uri());
        let data = oauth.debug_access_token("XYZ", "123", "s3cr3t").await.unwrap();
        assert_eq!(data["data"]["is_valid"], true);
        assert_eq!(data["data"]["user_id"], "777");
    }

    #[tokio::test]
    async fn transport_failure_is_not_an_api_error() {
        // Nothing is listening on this port
        let oauth =
            OAuthClient::with_graph_url(reqwest::Client::new(), "http://127.0.0.1:9");
        let err = oauth.exchange_code("ABC", "", "123", "s").await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    }
}
