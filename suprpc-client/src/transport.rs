//! Blocking request/response transport.

use std::time::Duration;
use thiserror::Error;

/// Failures below the XML-RPC layer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),
}

/// Sends one request body and returns the full response body.
///
/// Implementations block the calling thread for the whole exchange.
pub trait Transport: Send + Sync {
    fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: String,
    ) -> Result<String, TransportError>;
}

/// HTTP transport backed by a blocking `reqwest` client.
///
/// Connection reuse is whatever `reqwest` does by default; there is no retry.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Creates a transport. `None` keeps `reqwest`'s default timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Transport for HttpTransport {
    fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: String,
    ) -> Result<String, TransportError> {
        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "non-success HTTP status");
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(response.text()?)
    }
}
