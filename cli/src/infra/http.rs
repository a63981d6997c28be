//! Infrastructure implementation of the `HttpTransport` port using `ureq`.

use std::time::Duration;

use crate::application::ports::{HttpResponse, HttpTransport};
use crate::domain::error::FetchError;

/// Connect timeout for release downloads. Reads are not capped so large
/// artifacts on slow links still complete.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Production HTTP client. Redirects are followed (GitHub release assets
/// redirect to object storage).
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    #[must_use]
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .redirects(10)
            .user_agent(concat!("otelcol-installer/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for UreqTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        log::debug!("GET {url}");
        let response = match self.agent.get(url).call() {
            Ok(r) => r,
            Err(ureq::Error::Status(_, r)) => r,
            Err(ureq::Error::Transport(t)) => {
                return Err(FetchError::Transport {
                    url: url.to_string(),
                    reason: transport_reason(&t),
                });
            }
        };
        let status = response.status();
        let content_length = response
            .header("Content-Length")
            .and_then(|v| v.parse::<u64>().ok());
        log::debug!("GET {url} -> {status}");
        Ok(HttpResponse {
            status,
            content_length,
            body: Box::new(response.into_reader()),
        })
    }
}

/// Kind, message and cause of a ureq transport error. ureq's own `Display`
/// repeats the URL, which [`FetchError::Transport`] already carries.
fn transport_reason(t: &ureq::Transport) -> String {
    let mut reason = t.kind().to_string();
    if let Some(message) = t.message() {
        reason.push_str(": ");
        reason.push_str(message);
    }
    if let Some(cause) = std::error::Error::source(t) {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
    }
    reason
}
