//! Authenticated HTTP exchange with the clientd daemon.
//!
//! One request in, raw body bytes out. Decoding is left to the bindings.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::error::{Error, Result};

/// Versioned path prefix appended to every base URL.
pub const API_VERSION_PREFIX: &str = "/v2";

/// Bearer-authenticated HTTP transport bound to one daemon.
#[derive(Clone, Debug)]
pub struct Transport {
    http: reqwest::Client,
    base_url: String,
    credential: String,
}

impl Transport {
    /// Build a transport for `base_url`. `timeout` of `None` keeps the HTTP
    /// stack's default behaviour.
    pub fn new(base_url: &str, credential: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: versioned_base_url(base_url),
            credential: credential.to_string(),
        })
    }

    /// Full base URL including the version prefix, e.g. `http://127.0.0.1:3333/v2`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request and return the body of a `200 OK` response.
    ///
    /// Any other status becomes [`Error::HttpStatus`] carrying the raw body text.
    pub async fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(AUTHORIZATION, format!("Bearer {}", self.credential))
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(Error::Transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(Error::Io)?;
        debug!(%method, path, status = status.as_u16(), len = bytes.len(), "clientd exchange");

        if status != StatusCode::OK {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(bytes.to_vec())
    }
}

/// Normalise a user-supplied base URL: default to `http://`, drop trailing
/// slashes, and append [`API_VERSION_PREFIX`] exactly once.
fn versioned_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    if with_scheme.ends_with(API_VERSION_PREFIX) {
        with_scheme
    } else {
        format!("{with_scheme}{API_VERSION_PREFIX}")
    }
}
