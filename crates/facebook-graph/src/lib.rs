//! Facebook Graph API client
//!
//! The Graph API is made up of objects (people, pages, events, photos) and
//! the connections between them (friends, tags, RSVPs). This crate provides
//! generic access to those primitives given an OAuth access token:
//!
//! 1. Load credentials via `config::AppConfig` (TOML file + environment)
//! 2. Obtain a user token from the login cookie (`facebook-auth`) or the
//!    OAuth dialog
//! 3. Build a `GraphClient` and read/write objects, walk connection pages,
//!    and upload media
//!
//! All state lives in the client value; there are no process-wide defaults
//! or cached sessions.

pub mod client;
pub mod config;
pub mod error;
pub mod version;

pub use client::{
    Binary, GraphClient, GraphConfig, GraphResponse, Page, Paging, VALID_SEARCH_TYPES,
};
pub use config::AppConfig;
pub use error::{Error, GraphApiError, Result};
pub use version::{ApiVersion, DEFAULT_VERSION, VALID_API_VERSIONS};
