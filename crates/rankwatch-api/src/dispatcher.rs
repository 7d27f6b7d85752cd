//! Serialised, rate-limited request execution.

use std::time::Duration;

use reqwest::{Client, Request, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use crate::rate_limiter::RateLimiter;

/// Default interval between capacity polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default cool-down before the single retry after an HTTP 429.
const DEFAULT_RETRY_COOLDOWN: Duration = Duration::from_secs(20);

/// Failure of one dispatched request.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum DispatchError {
    /// HTTP 404; a valid negative answer rather than a failure.
    #[error("resource not found")]
    NotFound,
    /// HTTP 429 on the original attempt and on the retry.
    #[error("rate limited by the server after one retry")]
    RateLimited,
    /// Any other non-success status.
    #[error("unexpected HTTP status {status}: {body}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Response body, best effort.
        body: String,
    },
    /// Connection, TLS, timeout or body-read failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Body was not the expected JSON.
    #[error("failed to decode JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DispatchError {
    /// Returns `true` for [`DispatchError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Single funnel for every outbound call to one external service.
///
/// Requests are executed one at a time: the queue lock is held from the
/// capacity wait until the response status is classified, so the two
/// limiters are never raced by concurrent callers. A request proceeds only
/// when both the short-window and the long-window limiter have capacity.
#[derive(Debug)]
pub struct Dispatcher {
    /// HTTP client.
    http_client: Client,
    /// Fast budget (e.g. per second).
    short_window: RateLimiter,
    /// Sustained budget (e.g. per two minutes).
    long_window: RateLimiter,
    /// Sleep between capacity polls.
    poll_interval: Duration,
    /// Sleep before retrying a 429.
    retry_cooldown: Duration,
    /// Serialisation point.
    queue: Mutex<()>,
}

impl Dispatcher {
    /// Creates a dispatcher gated by two limiters.
    #[must_use]
    pub fn new(http_client: Client, short_window: RateLimiter, long_window: RateLimiter) -> Self {
        Self {
            http_client,
            short_window,
            long_window,
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry_cooldown: DEFAULT_RETRY_COOLDOWN,
            queue: Mutex::new(()),
        }
    }

    /// Sets the capacity poll interval (default: 50ms).
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the 429 cool-down (default: 20s).
    #[must_use]
    pub const fn retry_cooldown(mut self, cooldown: Duration) -> Self {
        self.retry_cooldown = cooldown;
        self
    }

    /// Starts a GET request on the underlying client.
    pub fn get(&self, url: Url) -> RequestBuilder {
        self.http_client.get(url)
    }

    /// Starts a POST request on the underlying client.
    pub fn post(&self, url: Url) -> RequestBuilder {
        self.http_client.post(url)
    }

    /// Executes a request once both limiters grant capacity.
    ///
    /// HTTP 404 becomes [`DispatchError::NotFound`]. HTTP 429 is retried
    /// exactly once after the cool-down; a second 429 is
    /// [`DispatchError::RateLimited`]. Other non-success statuses are
    /// [`DispatchError::Status`].
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] as described above, or
    /// [`DispatchError::Transport`] when the request cannot be sent.
    #[instrument(skip_all, fields(url = %request.url()))]
    pub async fn execute(&self, request: Request) -> Result<Response, DispatchError> {
        let _turn = self.queue.lock().await;
        let retry = request.try_clone();

        self.wait_for_capacity().await;
        tracing::debug!("dispatching request");
        let response = self.http_client.execute(request).await?;
        if response.status() != StatusCode::TOO_MANY_REQUESTS {
            return classify(response).await;
        }

        let Some(retry) = retry else {
            return Err(DispatchError::RateLimited);
        };
        tracing::warn!(
            cooldown_ms = u64::try_from(self.retry_cooldown.as_millis()).unwrap_or(u64::MAX),
            "Rate limited (429). Retrying once after cool-down..."
        );
        tokio::time::sleep(self.retry_cooldown).await;
        self.wait_for_capacity().await;

        let response = self.http_client.execute(retry).await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Rate limited (429) again; giving up");
            return Err(DispatchError::RateLimited);
        }
        classify(response).await
    }

    /// Executes a request and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Returns any [`DispatchError`] from [`Dispatcher::execute`], or
    /// [`DispatchError::Decode`] when the body does not match `T`.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        request: Request,
    ) -> Result<T, DispatchError> {
        let response = self.execute(request).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Polls both limiters until each grants a permit.
    async fn wait_for_capacity(&self) {
        loop {
            if self.short_window.check() && self.long_window.check() {
                let short = self.short_window.allow();
                let long = self.long_window.allow();
                if short && long {
                    return;
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Maps a non-429 response onto success, not-found or a status error.
async fn classify(response: Response) -> Result<Response, DispatchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(DispatchError::NotFound);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("<failed to read body>"));
    Err(DispatchError::Status { status, body })
}
