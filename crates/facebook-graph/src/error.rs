//! Error types for Graph API client operations

pub use facebook_auth::GraphApiError;

/// Errors from Graph API client operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The platform answered with an error body.
    #[error("Graph API error: {0}")]
    Api(GraphApiError),

    /// Network-level failure before any platform answer arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The requested API version is malformed or unsupported.
    #[error("invalid API version: {0}")]
    InvalidVersion(String),

    /// The call cannot be made as constructed (missing token, bad
    /// search type, ...). Caught before any network traffic.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response body was not JSON, an image, or a token query string.
    #[error("unexpected response body: {0}")]
    UnexpectedResponse(String),
}

/// Result alias for Graph API client operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<facebook_auth::Error> for Error {
    fn from(err: facebook_auth::Error) -> Self {
        match err {
            facebook_auth::Error::Api(api) => Self::Api(api),
            facebook_auth::Error::Transport(transport) => Self::Transport(transport),
            facebook_auth::Error::UnexpectedResponse(body) => Self::UnexpectedResponse(body),
        }
    }
}
