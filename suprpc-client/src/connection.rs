//! Endpoint configuration and the call executor.

use crate::error::ClientError;
use crate::transport::{HttpTransport, Transport};
use base64::Engine;
use std::time::Duration;
use suprpc_protocol::{
    Decoder, Encoder, MethodCall, Response, CONTENT_TYPE, DEFAULT_HOST, DEFAULT_PORT, RPC_PATH,
};

/// Endpoint configuration.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Daemon host name or address. Not validated.
    pub host: String,
    /// Daemon HTTP port.
    pub port: u16,
    /// Basic auth user name (optional).
    pub username: Option<String>,
    /// Basic auth password (optional).
    pub password: Option<String>,
    /// Whole-request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl EndpointConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
            timeout: None,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fixes the URL and header set.
    pub fn build(&self) -> Endpoint {
        Endpoint {
            url: format!("http://{}:{}{}", self.host, self.port, RPC_PATH),
            headers: assemble_headers(self.username.as_deref(), self.password.as_deref()),
        }
    }
}

/// Assembles every header sent with a call. A Basic auth header is added
/// only when both halves of the credential are non-empty; a lone user name
/// or password is ignored.
fn assemble_headers(username: Option<&str>, password: Option<&str>) -> Vec<(String, String)> {
    let mut headers = vec![("Content-Type".to_string(), CONTENT_TYPE.to_string())];

    if let (Some(user), Some(pass)) = (username, password) {
        if !user.is_empty() && !pass.is_empty() {
            let token = base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", user, pass));
            headers.push(("Authorization".to_string(), format!("Basic {}", token)));
        }
    }

    headers
}

/// A resolved endpoint: target URL and the exact headers sent with every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    headers: Vec<(String, String)>,
}

impl Endpoint {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Looks up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_auth(&self) -> bool {
        self.header("Authorization").is_some()
    }
}

/// Executes XML-RPC calls against one endpoint.
///
/// Holds no mutable state, so one connection can serve calls from several
/// threads; each call is an independent exchange.
pub struct Connection {
    endpoint: Endpoint,
    transport: Box<dyn Transport>,
}

impl Connection {
    /// Creates a connection over HTTP.
    pub fn new(config: &EndpointConfig) -> Result<Self, ClientError> {
        let endpoint = config.build();
        let transport = HttpTransport::new(config.timeout)
            .map_err(|e| ClientError::transport(endpoint.url(), e))?;
        Ok(Self::with_transport(endpoint, transport))
    }

    /// Creates a connection over a caller-supplied transport.
    pub fn with_transport(endpoint: Endpoint, transport: impl Transport + 'static) -> Self {
        Self {
            endpoint,
            transport: Box::new(transport),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Sends one call and decodes the reply.
    ///
    /// Failures to reach the daemon and replies that are empty or not
    /// XML-RPC are reported as `ClientError::Transport`. A decoded fault is
    /// returned as `Ok(Response::Fault(..))`; classifying it is the caller's job.
    pub fn call(&self, call: &MethodCall) -> Result<Response, ClientError> {
        let body = Encoder::encode_request(call).map_err(ClientError::Encoding)?;
        let url = self.endpoint.url();

        tracing::debug!(method = %call.method_name, %url, "calling");
        tracing::trace!(bytes = body.len(), "request encoded");

        let text = self
            .transport
            .post(url, self.endpoint.headers(), body)
            .map_err(|e| ClientError::transport(url, e))?;

        tracing::trace!(bytes = text.len(), "response received");

        Decoder::decode_response(text.trim()).map_err(|e| ClientError::transport(url, e))
    }
}
