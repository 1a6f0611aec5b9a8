//! Graph API client
//!
//! `GraphClient` owns an HTTP client and the per-client settings (access
//! token, pinned API version, optional appsecret proof, request timeout).
//! The request core translates arguments into a query string or form body,
//! injects the token material, and dispatches on the response content type:
//! JSON bodies are checked for the platform's `error` key, `image/*` bodies
//! come back as [`Binary`], and token endpoints answering with a query
//! string become [`facebook_auth::AccessToken`]. Everything else on the
//! client is a thin wrapper over that core, mirroring the Graph's
//! object/connection model.

use std::collections::HashMap;
use std::collections::HashSet;
use std::time::Duration;

use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::form_urlencoded;

use facebook_auth::{AccessToken, GRAPH_URL, OAuthClient, appsecret_proof};

use crate::error::{Error, GraphApiError, Result};
use crate::version::ApiVersion;

/// Search types the platform accepts for `/search`.
pub const VALID_SEARCH_TYPES: &[&str] =
    &["user", "page", "event", "group", "place", "placetopic"];

/// Settings for building a [`GraphClient`].
///
/// Passed by value to `GraphClient::new`; there is no global default
/// client or shared session.
#[derive(Debug, Clone, Default)]
pub struct GraphConfig {
    /// Token for authenticated calls; reads of public objects work without
    pub access_token: Option<String>,
    /// Application secret; when set together with an access token, an
    /// `appsecret_proof` accompanies every request
    pub app_secret: Option<String>,
    /// Pinned API version (`"2.1"`); `None` selects the default
    pub version: Option<String>,
    /// Per-request timeout
    pub timeout: Option<Duration>,
    /// Alternate Graph base URL (test servers)
    pub graph_url: Option<String>,
}

/// A non-JSON response body, e.g. a profile picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    pub data: Vec<u8>,
    pub mime_type: String,
    /// Final URL after redirects
    pub url: String,
}

/// Outcome of a generic Graph request, split by response content type.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphResponse {
    Json(Value),
    Binary(Binary),
    AccessToken(AccessToken),
}

/// One page of a connection listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub data: Vec<Value>,
    pub paging: Option<Paging>,
}

/// Pagination cursors of a connection page. `next`/`previous` are complete
/// URLs including the access token.
#[derive(Debug, Clone, Deserialize)]
pub struct Paging {
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// A client for the Facebook Graph API.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    graph_url: String,
    version: ApiVersion,
    access_token: Option<String>,
    app_secret_proof: Option<String>,
    timeout: Option<Duration>,
}

impl GraphClient {
    /// Build a client from settings. Fails only on an invalid version.
    pub fn new(config: GraphConfig) -> Result<Self> {
        let version = match config.version.as_deref() {
            Some(version) => ApiVersion::parse(version)?,
            None => ApiVersion::default(),
        };

        // Proof requires both halves; a secret without a token has nothing
        // to prove yet.
        let app_secret_proof = match (&config.app_secret, &config.access_token) {
            (Some(secret), Some(token)) => Some(appsecret_proof(secret, token)),
            _ => None,
        };

        let mut graph_url = config.graph_url.unwrap_or_else(|| GRAPH_URL.to_owned());
        if !graph_url.ends_with('/') {
            graph_url.push('/');
        }

        Ok(Self {
            http: reqwest::Client::new(),
            graph_url,
            version,
            access_token: config.access_token,
            app_secret_proof,
            timeout: config.timeout,
        })
    }

    pub fn version(&self) -> &ApiVersion {
        &self.version
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// The `appsecret_proof` sent with requests, when one is configured.
    pub fn app_secret_proof(&self) -> Option<&str> {
        self.app_secret_proof.as_deref()
    }

    /// Fetch the given object from the graph.
    pub async fn get_object(&self, id: &str, args: &[(&str, &str)]) -> Result<Value> {
        self.request_json(Method::GET, id, args, None).await
    }

    /// Fetch all of the given objects in one call. The result maps each ID
    /// to its object; any invalid ID fails the whole call.
    pub async fn get_objects(&self, ids: &[&str], args: &[(&str, &str)]) -> Result<Value> {
        let ids = ids.join(",");
        let mut args: Vec<(&str, &str)> = args.to_vec();
        args.push(("ids", ids.as_str()));
        self.request_json(Method::GET, "", &args, None).await
    }

    /// Fetch one page of the named connection of an object.
    pub async fn get_connections(
        &self,
        id: &str,
        connection_name: &str,
        args: &[(&str, &str)],
    ) -> Result<Page> {
        let value = self
            .request_json(Method::GET, &format!("{id}/{connection_name}"), args, None)
            .await?;
        page_from_value(value)
    }

    /// Fetch the page after the given one, or `None` on the last page.
    ///
    /// The `paging.next` URL is complete (cursor, token, proof), so it is
    /// requested as-is.
    pub async fn next_page(&self, page: &Page) -> Result<Option<Page>> {
        let Some(next) = page.paging.as_ref().and_then(|paging| paging.next.as_deref()) else {
            return Ok(None);
        };
        let mut request = self.http.get(next);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        match self.interpret(request.send().await?).await? {
            GraphResponse::Json(value) => page_from_value(value).map(Some),
            _ => Err(Error::UnexpectedResponse(
                "connection page was not JSON".to_owned(),
            )),
        }
    }

    /// Write an object to the graph, connected to the given parent.
    ///
    /// `graph.put_object("me", "feed", &[("message", "Hello, world")])`
    /// posts to the active user's wall. Write operations require an access
    /// token with the appropriate permission.
    pub async fn put_object(
        &self,
        parent_object: &str,
        connection_name: &str,
        data: &[(&str, &str)],
    ) -> Result<Value> {
        self.require_token("write operations")?;
        self.request_json(
            Method::POST,
            &format!("{parent_object}/{connection_name}"),
            &[],
            Some(data),
        )
        .await
    }

    /// Post a message (with optional structured attachment fields) to a
    /// profile's wall.
    pub async fn put_wall_post(
        &self,
        profile_id: &str,
        message: &str,
        attachment: &[(&str, &str)],
    ) -> Result<Value> {
        let mut data: Vec<(&str, &str)> = vec![("message", message)];
        data.extend_from_slice(attachment);
        self.put_object(profile_id, "feed", &data).await
    }

    /// Comment on the given object.
    pub async fn put_comment(&self, object_id: &str, message: &str) -> Result<Value> {
        self.put_object(object_id, "comments", &[("message", message)])
            .await
    }

    /// Like the given object.
    pub async fn put_like(&self, object_id: &str) -> Result<Value> {
        self.put_object(object_id, "likes", &[]).await
    }

    /// Delete the object with the given ID from the graph.
    pub async fn delete_object(&self, id: &str) -> Result<Value> {
        self.request_json(Method::DELETE, id, &[], None).await
    }

    /// Delete an app request for the given user.
    pub async fn delete_request(&self, user_id: &str, request_id: &str) -> Result<Value> {
        self.delete_object(&format!("{request_id}_{user_id}")).await
    }

    /// Upload an image via multipart/form-data.
    ///
    /// Posts to `<album_id>/photos`, or `me/photos` when no album is given
    /// (the platform then uses or creates the app's album).
    pub async fn put_photo(
        &self,
        image: Vec<u8>,
        filename: &str,
        message: Option<&str>,
        album_id: Option<&str>,
    ) -> Result<Value> {
        let target = album_id.unwrap_or("me");
        let fields = message
            .map(|m| vec![("message".to_owned(), m.to_owned())])
            .unwrap_or_default();
        self.put_media(&format!("{target}/photos"), image, filename, fields)
            .await
    }

    /// Upload a video via multipart/form-data to `<profile_id>/videos`.
    pub async fn put_video(
        &self,
        video: Vec<u8>,
        filename: &str,
        description: Option<&str>,
        profile_id: Option<&str>,
    ) -> Result<Value> {
        let target = profile_id.unwrap_or("me");
        let fields = description
            .map(|d| vec![("description".to_owned(), d.to_owned())])
            .unwrap_or_default();
        self.put_media(&format!("{target}/videos"), video, filename, fields)
            .await
    }

    /// Search the graph. `search_type` must be one of
    /// [`VALID_SEARCH_TYPES`]; the gate runs before any network traffic.
    pub async fn search(
        &self,
        q: &str,
        search_type: &str,
        args: &[(&str, &str)],
    ) -> Result<Page> {
        if !VALID_SEARCH_TYPES.contains(&search_type) {
            return Err(Error::InvalidRequest(format!(
                "valid search types are {}",
                VALID_SEARCH_TYPES.join(", ")
            )));
        }
        let mut args: Vec<(&str, &str)> = args.to_vec();
        args.push(("q", q));
        args.push(("type", search_type));
        let value = self.request_json(Method::GET, "search", &args, None).await?;
        page_from_value(value)
    }

    /// Permissions the given user granted the app.
    pub async fn get_permissions(&self, user_id: &str) -> Result<HashSet<String>> {
        let page = self.get_connections(user_id, "permissions", &[]).await?;
        Ok(page
            .data
            .iter()
            .filter(|entry| entry.get("status").and_then(Value::as_str) == Some("granted"))
            .filter_map(|entry| entry.get("permission").and_then(Value::as_str))
            .map(str::to_owned)
            .collect())
    }

    /// The API version the platform actually served, from the
    /// `facebook-api-version` response header.
    pub async fn get_version(&self) -> Result<String> {
        let mut request = self
            .http
            .get(format!("{}{}/me", self.graph_url, self.version));
        if let Some(token) = &self.access_token {
            request = request.query(&[("access_token", token)]);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;
        response
            .headers()
            .get("facebook-api-version")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim_start_matches('v').to_owned())
            .ok_or_else(|| {
                Error::UnexpectedResponse("API version header not available".to_owned())
            })
    }

    /// Trade this client's token for a long-lived one.
    pub async fn extend_access_token(
        &self,
        app_id: &str,
        app_secret: &str,
    ) -> Result<AccessToken> {
        self.require_token("token extension")?;
        let oauth = OAuthClient::with_graph_url(self.http.clone(), self.graph_url.clone());
        let token = self.access_token.as_deref().unwrap_or_default();
        Ok(oauth.extend_access_token(token, app_id, app_secret).await?)
    }

    /// Perform a Graph request with full response dispatch. The typed
    /// wrappers above cover the common cases; this is the escape hatch for
    /// paths that may answer with an image or a token query string.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        args: &[(&str, &str)],
        post_args: Option<&[(&str, &str)]>,
    ) -> Result<GraphResponse> {
        self.send(method, path, args, post_args).await
    }

    async fn request_json(
        &self,
        method: Method,
        path: &str,
        args: &[(&str, &str)],
        post_args: Option<&[(&str, &str)]>,
    ) -> Result<Value> {
        match self.send(method, path, args, post_args).await? {
            GraphResponse::Json(value) => Ok(value),
            GraphResponse::Binary(binary) => Err(Error::UnexpectedResponse(format!(
                "expected JSON, got {} data",
                binary.mime_type
            ))),
            GraphResponse::AccessToken(_) => Err(Error::UnexpectedResponse(
                "expected JSON, got a token response".to_owned(),
            )),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        args: &[(&str, &str)],
        post_args: Option<&[(&str, &str)]>,
    ) -> Result<GraphResponse> {
        let mut query: Vec<(String, String)> = args
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        let mut form: Option<Vec<(String, String)>> = post_args.map(|fields| {
            fields
                .iter()
                .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
                .collect()
        });

        // The token (and proof) ride in the form body for writes and in
        // the query string otherwise.
        if let Some(token) = &self.access_token {
            let target = match form.as_mut() {
                Some(fields) => fields,
                None => &mut query,
            };
            target.push(("access_token".to_owned(), token.clone()));
            if let Some(proof) = &self.app_secret_proof {
                target.push(("appsecret_proof".to_owned(), proof.clone()));
            }
        }

        let url = format!("{}{}/{}", self.graph_url, self.version, path);
        debug!(%method, path, "graph request");

        let mut request = self.http.request(method, &url).query(&query);
        if let Some(fields) = &form {
            request = request.form(fields);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        self.interpret(request.send().await?).await
    }

    async fn put_media(
        &self,
        path: &str,
        bytes: Vec<u8>,
        filename: &str,
        fields: Vec<(String, String)>,
    ) -> Result<Value> {
        let token = self.require_token("media uploads")?;

        let mut form = reqwest::multipart::Form::new().part(
            "source",
            reqwest::multipart::Part::bytes(bytes).file_name(filename.to_owned()),
        );
        for (name, value) in fields {
            form = form.text(name, value);
        }
        form = form.text("access_token", token.to_owned());
        if let Some(proof) = &self.app_secret_proof {
            form = form.text("appsecret_proof", proof.clone());
        }

        let url = format!("{}{}/{}", self.graph_url, self.version, path);
        debug!(path, filename, "media upload");

        let mut request = self.http.post(&url).multipart(form);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        match self.interpret(request.send().await?).await? {
            GraphResponse::Json(value) => Ok(value),
            _ => Err(Error::UnexpectedResponse(
                "upload response was not JSON".to_owned(),
            )),
        }
    }

    /// Dispatch a response on its content type.
    async fn interpret(&self, response: reqwest::Response) -> Result<GraphResponse> {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let url = response.url().to_string();

        if content_type.contains("json") {
            let bytes = response.bytes().await?;
            let value: Value = serde_json::from_slice(&bytes).map_err(|_| {
                Error::UnexpectedResponse(String::from_utf8_lossy(&bytes).into_owned())
            })?;
            if value.get("error").is_some() {
                return Err(Error::Api(GraphApiError::from_body(value)));
            }
            return Ok(GraphResponse::Json(value));
        }

        if content_type.starts_with("image/") {
            return Ok(GraphResponse::Binary(Binary {
                data: response.bytes().await?.to_vec(),
                mime_type: content_type,
                url,
            }));
        }

        let text = response.text().await?;
        let pairs: HashMap<String, String> =
            form_urlencoded::parse(text.as_bytes()).into_owned().collect();
        if let Some(token) = pairs.get("access_token") {
            return Ok(GraphResponse::AccessToken(AccessToken {
                access_token: token.clone(),
                expires: pairs.get("expires").and_then(|e| e.parse().ok()),
            }));
        }

        Err(Error::UnexpectedResponse(format!(
            "response was not JSON, an image, or a query string (content-type {content_type:?})"
        )))
    }

    fn require_token(&self, operation: &str) -> Result<&str> {
        self.access_token
            .as_deref()
            .ok_or_else(|| Error::InvalidRequest(format!("{operation} require an access token")))
    }
}

fn page_from_value(value: Value) -> Result<Page> {
    serde_json::from_value(value)
        .map_err(|e| Error::UnexpectedResponse(format!("malformed connection page: {e}")))
}
