//! Client error types.

use suprpc_protocol::{Fault, FaultCode, ProtocolError};
use thiserror::Error;

/// Client errors.
///
/// Every failed call yields exactly one of these. Nothing is retried.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP exchange failed, or its body was empty or not an XML-RPC response.
    #[error("invalid response from {url}: {reason}")]
    Transport { url: String, reason: String },

    /// The daemon answered with a fault.
    #[error("remote fault {code}: {message}")]
    Fault { code: i32, message: String },

    /// A parameter cannot be represented on the wire. This is a bug at the
    /// call site, not a runtime condition.
    #[error("encoding error: {0}")]
    Encoding(#[source] ProtocolError),

    /// A result did not have the shape a typed view expected.
    #[error("unexpected result shape: expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: String,
    },
}

impl ClientError {
    pub(crate) fn transport(url: impl Into<String>, reason: impl ToString) -> Self {
        ClientError::Transport {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns whether the daemon could not be reached or did not answer with XML-RPC.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }

    /// Returns whether the daemon rejected the call.
    pub fn is_fault(&self) -> bool {
        matches!(self, ClientError::Fault { .. })
    }

    /// Returns the known supervisord fault for a `Fault` error.
    pub fn fault_code(&self) -> Option<FaultCode> {
        match self {
            ClientError::Fault { code, .. } => FaultCode::from_code(*code),
            _ => None,
        }
    }
}

impl From<Fault> for ClientError {
    fn from(fault: Fault) -> Self {
        ClientError::Fault {
            code: fault.code,
            message: fault.message,
        }
    }
}
