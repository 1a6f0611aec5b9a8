//! Facebook platform endpoints and wire-format constants
//!
//! These values identify the public platform endpoints and cookie format.
//! The actual secrets (application secret, access tokens) are supplied by
//! the caller per operation and never stored here.

/// Base URL of the Graph API, trailing slash included
pub const GRAPH_URL: &str = "https://graph.facebook.com/";

/// OAuth dialog shown to users when requesting permissions
pub const OAUTH_DIALOG_URL: &str = "https://www.facebook.com/dialog/oauth";

/// Token endpoint path, relative to the Graph base URL
pub const TOKEN_PATH: &str = "oauth/access_token";

/// Token introspection path, relative to the Graph base URL
pub const DEBUG_TOKEN_PATH: &str = "debug_token";

/// The only signature scheme the JavaScript SDK emits. A signed request
/// declaring any other algorithm is rejected outright.
pub const SIGNED_REQUEST_ALGORITHM: &str = "HMAC-SHA256";

/// Cookie name prefix used by the JavaScript SDK; the full cookie name is
/// this prefix followed by the application ID.
pub const LOGIN_COOKIE_PREFIX: &str = "fbsr_";
