//! OAuth dialog URL construction
//!
//! Builds the URL an application redirects users to when asking for
//! permissions, and generates the opaque `state` value used for CSRF
//! protection. The authorization server returns `state` unchanged in the
//! callback; the app must compare it against the value it stored.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use url::form_urlencoded;

use crate::constants::OAUTH_DIALOG_URL;

/// Build the OAuth dialog URL for the given app and redirect target.
///
/// `perms` become the comma-joined `scope` parameter; an empty list omits
/// it. `extra` appends further dialog parameters (`state`, `display`,
/// `response_type`, ...) verbatim.
pub fn auth_url(app_id: &str, redirect_uri: &str, perms: &[&str], extra: &[(&str, &str)]) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("client_id", app_id);
    query.append_pair("redirect_uri", redirect_uri);
    if !perms.is_empty() {
        query.append_pair("scope", &perms.join(","));
    }
    for (name, value) in extra {
        query.append_pair(name, value);
    }
    format!("{}?{}", OAUTH_DIALOG_URL, query.finish())
}

/// Generate a random URL-safe `state` token.
///
/// 32 random bytes encoded as unpadded URL-safe base64, safe to embed in
/// the dialog URL without further escaping.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_contains_required_params() {
        let url = auth_url("810122", "https://example.com/callback", &[], &[]);
        assert!(url.starts_with("https://www.facebook.com/dialog/oauth?"));
        assert!(url.contains("client_id=810122"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fexample.com%2Fcallback"));
        assert!(!url.contains("scope="));
    }

    #[test]
    fn perms_become_a_comma_joined_scope() {
        let url = auth_url(
            "810122",
            "https://example.com/callback",
            &["email", "user_friends"],
            &[],
        );
        assert!(url.contains("scope=email%2Cuser_friends"));
    }

    #[test]
    fn extra_params_are_appended() {
        let url = auth_url(
            "810122",
            "https://example.com/callback",
            &[],
            &[("state", "abc123"), ("display", "popup")],
        );
        assert!(url.contains("state=abc123"));
        assert!(url.contains("display=popup"));
    }

    #[test]
    fn state_is_url_safe() {
        let state = generate_state();
        // 32 bytes → 43 unpadded base64url chars
        assert_eq!(state.len(), 43);
        assert!(
            state
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "state must be URL-safe base64: {state}"
        );
    }

    #[test]
    fn states_do_not_collide() {
        assert_ne!(generate_state(), generate_state());
    }
}
