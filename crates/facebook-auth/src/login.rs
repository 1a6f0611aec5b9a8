//! Cookie-based login orchestration
//!
//! Ties the signed-request verifier to the token endpoint: locate the
//! `fbsr_<app_id>` cookie the JavaScript SDK sets, verify it against the
//! application secret, then exchange the embedded authorization code for
//! a user access token.
//!
//! Every failure along the way — missing cookie, bad signature, rejected
//! code — degrades to `None` ("not logged in") rather than an error. A
//! verified-but-stale code is indistinguishable from a logged-out user as
//! far as callers are concerned; the underlying cause is still logged so
//! endpoint outages remain visible.

use std::collections::HashMap;

use tracing::debug;

use crate::constants::LOGIN_COOKIE_PREFIX;
use crate::signed_request::parse_signed_request;
use crate::token::OAuthClient;

/// A logged-in user recovered from the SDK cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieUser {
    /// The user's Facebook ID, from the verified cookie payload
    pub uid: String,
    /// Token for authenticated Graph API calls on the user's behalf
    pub access_token: String,
    /// Seconds until the token expires, when the platform reports one
    pub expires: Option<u64>,
}

impl OAuthClient {
    /// Recover the logged-in user from the cookies of a request.
    ///
    /// `cookies` maps cookie names to values. Returns `None` when the user
    /// is not logged in, which covers an absent cookie (checked before any
    /// network traffic), a cookie that fails verification, and a code the
    /// token endpoint no longer accepts.
    pub async fn get_user_from_cookie(
        &self,
        cookies: &HashMap<String, String>,
        app_id: &str,
        app_secret: &str,
    ) -> Option<CookieUser> {
        let cookie = cookies.get(&format!("{LOGIN_COOKIE_PREFIX}{app_id}"))?;
        let payload = parse_signed_request(cookie, app_secret)?;
        let code = payload.code?;
        let uid = payload.user_id?;

        match self.exchange_code(&code, "", app_id, app_secret).await {
            Ok(token) => Some(CookieUser {
                uid,
                access_token: token.access_token,
                expires: token.expires,
            }),
            Err(error) => {
                debug!(%error, %uid, "code exchange failed, treating user as logged out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signed_request::{SignedPayload, sign_request};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const APP_ID: &str = "810122";
    const SECRET: &str = "testsecret";

    fn login_cookie() -> String {
        let payload = SignedPayload {
            code: Some("AQDcIt6bxY".to_owned()),
            issued_at: Some(1441515658),
            user_id: Some("10101496553486611".to_owned()),
            ..SignedPayload::new()
        };
        sign_request(&payload, SECRET)
    }

    fn cookie_map(value: String) -> HashMap<String, String> {
        HashMap::from([(format!("fbsr_{APP_ID}"), value)])
    }

    #[tokio::test]
    async fn absent_cookie_means_logged_out_without_network_traffic() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("access_token=never"))
            .expect(0)
            .mount(&server)
            .await;

        let oauth = OAuthClient::with_graph_url(reqwest::Client::new(), server.uri());
        let cookies = HashMap::from([("unrelated".to_owned(), "cookie".to_owned())]);
        assert_eq!(
            oauth.get_user_from_cookie(&cookies, APP_ID, SECRET).await,
            None
        );
        // MockServer verifies expect(0) on drop
    }

    #[tokio::test]
    async fn tampered_cookie_means_logged_out() {
        let server = MockServer::start().await;
        let oauth = OAuthClient::with_graph_url(reqwest::Client::new(), server.uri());
        assert_eq!(
            oauth
                .get_user_from_cookie(&cookie_map(login_cookie()), APP_ID, "wrongsecret")
                .await,
            None
        );
    }

    #[tokio::test]
    async fn verified_cookie_yields_user_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/access_token"))
            .and(query_param("code", "AQDcIt6bxY"))
            .and(query_param("redirect_uri", ""))
            .and(query_param("client_id", APP_ID))
            .and(query_param("client_secret", SECRET))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("access_token=XYZ&expires=5183999"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let oauth = OAuthClient::with_graph_url(reqwest::Client::new(), server.uri());
        let user = oauth
            .get_user_from_cookie(&cookie_map(login_cookie()), APP_ID, SECRET)
            .await
            .unwrap();
        assert_eq!(user.uid, "10101496553486611");
        assert_eq!(user.access_token, "XYZ");
        assert_eq!(user.expires, Some(5183999));
    }

    #[tokio::test]
    async fn rejected_code_degrades_to_logged_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/access_token"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error":{"message":"This authorization code has been used","type":"OAuthException"}}"#,
            ))
            .mount(&server)
            .await;

        let oauth = OAuthClient::with_graph_url(reqwest::Client::new(), server.uri());
        assert_eq!(
            oauth
                .get_user_from_cookie(&cookie_map(login_cookie()), APP_ID, SECRET)
                .await,
            None
        );
    }

    #[tokio::test]
    async fn cookie_without_code_means_logged_out() {
        let payload = SignedPayload {
            issued_at: Some(1441515658),
            user_id: Some("10101496553486611".to_owned()),
            ..SignedPayload::new()
        };
        let server = MockServer::start().await;
        let oauth = OAuthClient::with_graph_url(reqwest::Client::new(), server.uri());
        assert_eq!(
            oauth
                .get_user_from_cookie(&cookie_map(sign_request(&payload, SECRET)), APP_ID, SECRET)
                .await,
            None
        );
    }
}
