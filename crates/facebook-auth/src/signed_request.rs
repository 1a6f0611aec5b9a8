//! Signed-request verification
//!
//! The JavaScript SDK conveys an authenticated claim to the server as
//! `base64url(HMAC-SHA256 signature) + "." + base64url(JSON payload)`.
//! Verification is all-or-nothing: a payload is returned only after its
//! signature checks out against the application secret, and any failure —
//! malformed input, undecodable base64, bad JSON, unknown algorithm,
//! signature mismatch — yields `None`. Callers treat `None` as "not
//! logged in", not as an error.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::Sha256;
use tracing::debug;

use crate::constants::SIGNED_REQUEST_ALGORITHM;

type HmacSha256 = Hmac<Sha256>;

/// The claim set carried by a signed request.
///
/// `user_id` and `code` are present once the user has authorized the
/// application; `oauth_token` appears in canvas-page requests instead of
/// `code`. Keys this library doesn't model are kept in `extra` so nothing
/// the SDK sends is lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedPayload {
    pub algorithm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SignedPayload {
    /// A payload declaring the HMAC-SHA256 algorithm and nothing else.
    /// Fields are filled in by the caller before signing.
    pub fn new() -> Self {
        Self {
            algorithm: SIGNED_REQUEST_ALGORITHM.to_owned(),
            user_id: None,
            issued_at: None,
            code: None,
            oauth_token: None,
            extra: Map::new(),
        }
    }
}

impl Default for SignedPayload {
    fn default() -> Self {
        Self::new()
    }
}

/// Verify and decode a signed request.
///
/// Returns the payload when the signature matches the application secret,
/// `None` on any failure. The HMAC is computed over the *encoded* payload
/// segment, not the decoded JSON, so the payload bytes are authenticated
/// exactly as they arrived.
pub fn parse_signed_request(signed_request: &str, app_secret: &str) -> Option<SignedPayload> {
    if signed_request.is_empty() {
        return None;
    }
    let (encoded_sig, payload) = signed_request.split_once('.')?;

    let sig = decode_segment(encoded_sig)?;
    let data = decode_segment(payload)?;

    let parsed: SignedPayload = serde_json::from_slice(&data).ok()?;
    if !parsed.algorithm.eq_ignore_ascii_case(SIGNED_REQUEST_ALGORITHM) {
        debug!(algorithm = %parsed.algorithm, "unknown signed-request algorithm");
        return None;
    }

    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes()).ok()?;
    mac.update(payload.as_bytes());
    // verify_slice compares in constant time
    mac.verify_slice(&sig).ok()?;

    Some(parsed)
}

/// Produce a signed request for the given payload.
///
/// The inverse of [`parse_signed_request`]; the platform normally does the
/// signing, but apps that relay claims between their own services (and this
/// crate's tests) need to mint them too.
pub fn sign_request(payload: &SignedPayload, app_secret: &str) -> String {
    let json = serde_json::to_vec(payload).expect("payload serializes to JSON");
    let body = URL_SAFE_NO_PAD.encode(json);

    let mut mac =
        HmacSha256::new_from_slice(app_secret.as_bytes()).expect("HMAC key must be valid");
    mac.update(body.as_bytes());
    let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{sig}.{body}")
}

/// Decode one base64url segment. The SDK emits unpadded base64url, but
/// padded input is tolerated by stripping the `=` before decoding.
fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')).ok()
}
