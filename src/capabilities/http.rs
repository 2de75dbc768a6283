//! HTTP capability handed to rules.
//!
//! Rules never talk to a transport directly. They call [`Requests`], which is
//! bound to a snapshot of `Config::http_headers` taken when the rule asked
//! for it, and to the rule's deadline.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Header map used for requests: name → value.
pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully merged request as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    /// Lowercased header names.
    pub headers: Headers,
    pub body: Option<String>,
    pub timeout: Duration,
}

/// HTTP response returned to rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub url: String,
    pub status: u16,
    /// Lowercased header names, every value kept.
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: String,
}

impl Response {
    /// First value of a header, case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Body as text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Fails on 4xx and 5xx statuses.
    ///
    /// # Errors
    ///
    /// Returns `Error::HttpStatus` for status codes of 400 and above.
    pub fn raise_for_status(&self) -> Result<()> {
        if self.status >= 400 {
            return Err(Error::HttpStatus {
                status: self.status,
                url: self.url.clone(),
            });
        }
        Ok(())
    }
}

/// Sends requests on behalf of rules.
///
/// The crate ships [`UreqTransport`] (feature `http`); tests and embedders
/// plug their own.
pub trait Transport: Send + Sync {
    /// Performs one request.
    ///
    /// # Errors
    ///
    /// Transport failures map to `Error::Http` or `Error::Timeout`. Non-2xx
    /// statuses are returned as responses, not errors.
    fn send(&self, request: &Request) -> Result<Response>;
}

/// Blocking transport over `ureq`.
#[cfg(feature = "http")]
pub struct UreqTransport {
    agent: ureq::Agent,
    max_response_bytes: u64,
}

#[cfg(feature = "http")]
impl UreqTransport {
    #[must_use]
    pub fn new(user_agent: &str, max_response_bytes: u64) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::Agent::config_builder()
                .user_agent(user_agent)
                .http_status_as_error(false)
                .build(),
        );
        Self {
            agent,
            max_response_bytes,
        }
    }

    fn read(&self, url: &str, mut resp: ureq::http::Response<ureq::Body>) -> Result<Response> {
        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in resp.headers() {
            if let Ok(value) = value.to_str() {
                headers
                    .entry(name.as_str().to_ascii_lowercase())
                    .or_default()
                    .push(value.to_string());
            }
        }
        let status = resp.status().as_u16();
        let body = resp
            .body_mut()
            .with_config()
            .limit(self.max_response_bytes)
            .read_to_string()
            .map_err(map_ureq_error)?;

        Ok(Response {
            url: url.to_string(),
            status,
            headers,
            body,
        })
    }
}

#[cfg(feature = "http")]
impl Transport for UreqTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        let resp = match request.method {
            Method::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder
                    .config()
                    .timeout_global(Some(request.timeout))
                    .build()
                    .call()
            }
            Method::Post => {
                let mut builder = self.agent.post(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder
                    .config()
                    .timeout_global(Some(request.timeout))
                    .build()
                    .send(request.body.as_deref().unwrap_or_default())
            }
        }
        .map_err(map_ureq_error)?;

        self.read(&request.url, resp)
    }
}

#[cfg(feature = "http")]
fn map_ureq_error(err: ureq::Error) -> Error {
    Error::Http(err.to_string())
}

/// Transport used when the crate is built without the `http` feature.
pub struct DisabledTransport;

impl Transport for DisabledTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        Err(Error::Http(format!(
            "HTTP support is disabled, cannot fetch {}",
            request.url
        )))
    }
}

/// Process-wide HTTP client shared by all resolutions.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl HttpClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Binds the client to a header snapshot and a deadline.
    #[must_use]
    pub fn bind(&self, headers: &Headers, deadline: Instant, budget: Duration) -> Requests<'_> {
        Requests {
            client: self,
            headers: lowercase_keys(headers),
            deadline,
            budget,
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// HTTP calls available to one rule execution.
///
/// Headers passed to `get`/`post` are merged over the configuration headers
/// captured by [`HttpClient::bind`]; later edits to the configuration do not
/// affect an existing `Requests`.
#[derive(Debug)]
pub struct Requests<'a> {
    client: &'a HttpClient,
    headers: Headers,
    deadline: Instant,
    budget: Duration,
}

impl Requests<'_> {
    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// Returns `Error::Timeout` once the rule deadline passed, otherwise any
    /// transport error.
    pub fn get(&self, url: impl AsRef<str>, headers: Option<&Headers>) -> Result<Response> {
        self.send(Method::Get, url.as_ref(), None, headers)
    }

    /// Sends a POST request with a text body.
    ///
    /// # Errors
    ///
    /// Same as [`Requests::get`].
    pub fn post(
        &self,
        url: impl AsRef<str>,
        body: impl Into<String>,
        headers: Option<&Headers>,
    ) -> Result<Response> {
        self.send(Method::Post, url.as_ref(), Some(body.into()), headers)
    }

    /// Headers every request from this binding starts with.
    #[must_use]
    pub fn base_headers(&self) -> &Headers {
        &self.headers
    }

    fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
        extra: Option<&Headers>,
    ) -> Result<Response> {
        let remaining = self
            .deadline
            .checked_duration_since(Instant::now())
            .filter(|left| !left.is_zero())
            .ok_or(Error::Timeout(self.budget))?;

        let mut headers = self.headers.clone();
        if let Some(extra) = extra {
            headers.extend(lowercase_keys(extra));
        }

        let request = Request {
            method,
            url: url.to_string(),
            headers,
            body,
            timeout: self.client.timeout.min(remaining),
        };
        tracing::debug!(method = ?request.method, url = %request.url, "rule http request");
        self.client.transport.send(&request)
    }
}

fn lowercase_keys(headers: &Headers) -> Headers {
    headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
        .collect()
}
