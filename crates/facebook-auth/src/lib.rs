//! Facebook login and OAuth support
//!
//! Implements the server side of "Login with Facebook": verifying the
//! signed-request cookie set by the JavaScript SDK, exchanging the embedded
//! authorization code for a user access token, and the related helpers
//! (application access tokens, token extension, appsecret proofs, and the
//! OAuth dialog URL). This crate is a standalone library with no dependency
//! on the Graph API client — it can be tested and used independently.
//!
//! Login flow:
//! 1. The app sends the user to `dialog::auth_url()` (or embeds the JS SDK)
//! 2. The JS SDK stores a `fbsr_<app_id>` cookie after authorization
//! 3. The server calls `OAuthClient::get_user_from_cookie()` per request
//! 4. Internally the cookie is verified via
//!    `signed_request::parse_signed_request()` and the embedded code is
//!    exchanged via `OAuthClient::exchange_code()`
//! 5. Long-lived tokens come from `OAuthClient::extend_access_token()`

pub mod constants;
pub mod dialog;
pub mod error;
pub mod login;
pub mod proof;
pub mod signed_request;
pub mod token;

pub use constants::*;
pub use dialog::{auth_url, generate_state};
pub use error::{Error, GraphApiError, Result};
pub use login::CookieUser;
pub use proof::appsecret_proof;
pub use signed_request::{SignedPayload, parse_signed_request, sign_request};
pub use token::{AccessToken, OAuthClient};
