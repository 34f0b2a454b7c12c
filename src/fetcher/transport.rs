//! HTTP transport abstraction.
//!
//! The fetcher and the resolver's optional probe talk to the network only
//! through [`Transport`], so tests can substitute a scripted implementation and
//! count requests. The trait is object-safe and returns boxed futures so a
//! shared `Arc<dyn Transport>` can be moved into detached refresh tasks.

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use std::fmt;

use crate::core::MdxeError;
use crate::utils::DomainAllowList;

/// Maximum redirects followed before a request is abandoned.
const MAX_REDIRECTS: usize = 10;

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Numeric status code
    pub status: u16,
    /// Reason phrase (`Not Found`), empty when unknown
    pub status_text: String,
    /// Response body decoded as text
    pub body: String,
}

impl HttpResponse {
    /// Successful response with a body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            status_text: "OK".to_string(),
            body: body.into(),
        }
    }

    /// Response with the given status and an empty body.
    pub fn status(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: String::new(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `HTTP 404 Not Found` style description for diagnostics.
    pub fn status_line(&self) -> String {
        if self.status_text.is_empty() {
            format!("HTTP {}", self.status)
        } else {
            format!("HTTP {} {}", self.status, self.status_text)
        }
    }
}

/// Minimal HTTP client interface.
pub trait Transport: Send + Sync + fmt::Debug {
    /// Issue a GET request and read the full body.
    ///
    /// Transport-level failures (DNS, TLS, connection reset, rejected
    /// redirects) are errors; any HTTP status is a successful exchange.
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<HttpResponse>>;

    /// Check reachability of `url`, returning the status code.
    fn head<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<u16>> {
        Box::pin(async move { Ok(self.get(url).await?.status) })
    }
}

/// Decode a response body exactly as received; no charset sniffing, no BOM stripping.
fn decode_body(url: &str, bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).with_context(|| format!("Body of {url} is not valid UTF-8"))
}

/// Production transport backed by `reqwest`.
///
/// Redirects are followed only while every hop stays on the allow-list, so a
/// trusted registry cannot bounce a request to an untrusted host.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client whose redirect policy enforces `allow_list`.
    ///
    /// # Errors
    ///
    /// Fails if the underlying TLS backend cannot be initialized.
    pub fn new(allow_list: DomainAllowList) -> Result<Self> {
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                return attempt.error(format!("too many redirects (more than {MAX_REDIRECTS})"));
            }
            let host = attempt.url().host_str().unwrap_or_default().to_string();
            if allow_list.is_allowed(&host) {
                attempt.follow()
            } else {
                attempt.error(MdxeError::DomainNotAllowed {
                    host,
                })
            }
        });

        let client = reqwest::Client::builder()
            .user_agent(concat!("mdxe/", env!("CARGO_PKG_VERSION")))
            .redirect(policy)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
        })
    }
}

impl Transport for ReqwestTransport {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<HttpResponse>> {
        Box::pin(async move {
            let response = self.client.get(url).send().await.with_context(|| format!("GET {url}"))?;
            let status = response.status();
            let bytes = response.bytes().await.with_context(|| format!("Failed to read body of {url}"))?;
            let body = decode_body(url, &bytes)?;

            Ok(HttpResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            })
        })
    }

    fn head<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<u16>> {
        Box::pin(async move {
            let response = self.client.head(url).send().await.with_context(|| format!("HEAD {url}"))?;
            Ok(response.status().as_u16())
        })
    }
}
