//! Scripted in-memory transport.

use anyhow::{Result, anyhow};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::fetcher::{HttpResponse, Transport};

#[derive(Debug, Clone)]
enum Reply {
    Respond(HttpResponse),
    Fail(String),
}

/// A [`Transport`] that serves canned replies and counts requests per URL.
///
/// Unknown URLs get `404 Not Found`.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, Reply>>,
    requests: Mutex<HashMap<String, usize>>,
    delay: Mutex<Option<Duration>>,
}

impl MockTransport {
    /// Empty transport; every URL is a 404 until scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` for every subsequent request to `url`.
    pub fn respond(&self, url: &str, response: HttpResponse) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), Reply::Respond(response));
    }

    /// Fail every subsequent request to `url` at the transport level.
    pub fn fail(&self, url: &str, message: &str) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), Reply::Fail(message.to_string()));
    }

    /// Delay every reply, to keep background work observable.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap_or_else(PoisonError::into_inner) = Some(delay);
    }

    /// Number of requests issued for `url`.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    /// Number of requests issued for any URL.
    pub fn total_requests(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).values().sum()
    }

    /// Poll until `url` has seen at least `count` requests or `timeout` elapses.
    pub async fn wait_for_requests(&self, url: &str, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.request_count(url) >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.request_count(url) >= count
    }
}

impl Transport for MockTransport {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<HttpResponse>> {
        Box::pin(async move {
            *self
                .requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(url.to_string())
                .or_insert(0) += 1;

            let delay = *self.delay.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let reply = self.replies.lock().unwrap_or_else(PoisonError::into_inner).get(url).cloned();
            match reply {
                Some(Reply::Respond(response)) => Ok(response),
                Some(Reply::Fail(message)) => Err(anyhow!(message)),
                None => Ok(HttpResponse::status(404, "Not Found")),
            }
        })
    }
}
