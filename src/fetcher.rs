//! Timeout-bounded HTTP fetching
//!
//! Every provider call goes through [`TimeoutFetcher`], which races the request
//! against a deadline. The HTTP stack itself sits behind [`HttpTransport`] so
//! adapters can be driven by scripted responses in tests.

use crate::{
    constants::{REQUEST_HEADERS, REQUEST_TIMEOUT_MS, USER_AGENT},
    error::ProviderError,
};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Status line and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl RawResponse {
    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal HTTP GET capability
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issues a GET and reads the full body
    ///
    /// Dropping the returned future must abort the request.
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<RawResponse, ProviderError>;
}

/// Production transport backed by `reqwest`
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a new transport
    ///
    /// No client-level timeout is configured; deadlines are enforced by
    /// [`TimeoutFetcher`].
    pub fn new() -> Result<Self, ProviderError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<RawResponse, ProviderError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

/// Wraps a transport with a hard per-request deadline
#[derive(Clone)]
pub struct TimeoutFetcher {
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl TimeoutFetcher {
    /// Creates a fetcher with the default 10 second deadline
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
        }
    }

    /// Overrides the default deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The deadline applied by [`fetch`](Self::fetch)
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches `url` under the configured deadline
    pub async fn fetch(&self, url: &str) -> Result<RawResponse, ProviderError> {
        self.fetch_with_timeout(url, self.timeout).await
    }

    /// Fetches `url`, failing with [`ProviderError::Timeout`] once `timeout` elapses
    ///
    /// On timeout the in-flight request future is dropped, which cancels it.
    /// The deadline timer belongs to the `tokio::time::timeout` future and is
    /// released on every exit path.
    pub async fn fetch_with_timeout(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<RawResponse, ProviderError> {
        tracing::trace!(url, timeout_ms = timeout.as_millis() as u64, "GET");

        match tokio::time::timeout(timeout, self.transport.get(url, REQUEST_HEADERS)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Scripted reply for [`MockTransport`]
    #[derive(Debug, Clone)]
    pub enum MockReply {
        Respond { status: u16, body: String },
        Fail(String),
        Hang,
    }

    /// Records requests and replays a scripted reply
    pub struct MockTransport {
        reply: MockReply,
        requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
        cancelled: Arc<AtomicBool>,
    }

    impl MockTransport {
        pub fn new(reply: MockReply) -> Self {
            Self {
                reply,
                requests: Mutex::new(Vec::new()),
                cancelled: Arc::new(AtomicBool::new(false)),
            }
        }

        pub fn json(status: u16, body: &str) -> Self {
            Self::new(MockReply::Respond {
                status,
                body: body.to_string(),
            })
        }

        pub fn hanging() -> Self {
            Self::new(MockReply::Hang)
        }

        pub fn urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|(url, _)| url.clone())
                .collect()
        }

        pub fn headers(&self, index: usize) -> Vec<(String, String)> {
            self.requests.lock().unwrap()[index].1.clone()
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        /// True when a hanging request was dropped before completing
        pub fn was_cancelled(&self) -> bool {
            self.cancelled.load(Ordering::SeqCst)
        }
    }

    struct CancelFlag(Arc<AtomicBool>);

    impl Drop for CancelFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn get(
            &self,
            url: &str,
            headers: &[(&str, &str)],
        ) -> Result<RawResponse, ProviderError> {
            self.requests.lock().unwrap().push((
                url.to_string(),
                headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ));

            match self.reply.clone() {
                MockReply::Respond { status, body } => Ok(RawResponse {
                    status,
                    status_text: reqwest::StatusCode::from_u16(status)
                        .ok()
                        .and_then(|s| s.canonical_reason())
                        .unwrap_or_default()
                        .to_string(),
                    body,
                }),
                MockReply::Fail(msg) => Err(ProviderError::network(std::io::Error::other(msg))),
                MockReply::Hang => {
                    let _flag = CancelFlag(self.cancelled.clone());
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }
}
