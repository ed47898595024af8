//! Protocol error types and supervisord fault codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Protocol-level errors that can occur while encoding or decoding XML-RPC documents.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A value cannot be represented in the XML-RPC wire format.
    #[error("cannot encode value: {0}")]
    Encoding(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("empty document")]
    EmptyDocument,

    #[error("missing required element: <{0}>")]
    MissingElement(&'static str),

    #[error("invalid integer: {0:?}")]
    InvalidInt(String),

    #[error("invalid double: {0:?}")]
    InvalidDouble(String),

    #[error("invalid boolean: {0:?}")]
    InvalidBoolean(String),

    #[error("invalid base64 payload")]
    InvalidBase64,

    #[error("invalid UTF-8 in document")]
    InvalidUtf8,
}

impl ProtocolError {
    /// Returns whether this error was raised while encoding a local value.
    pub fn is_encoding(&self) -> bool {
        matches!(self, ProtocolError::Encoding(_))
    }
}

/// Fault codes returned by supervisord's `supervisor` and `system` namespaces.
///
/// The daemon may return codes outside this table (for example from
/// third-party RPC interface extensions), so callers always receive the raw
/// integer as well; this enum is a lookup over the known values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultCode {
    UnknownMethod,
    IncorrectParameters,
    BadArguments,
    SignatureUnsupported,
    ShutdownState,
    BadName,
    BadSignal,
    NoFile,
    NotExecutable,
    Failed,
    AbnormalTermination,
    SpawnError,
    AlreadyStarted,
    NotRunning,
    Success,
    AlreadyAdded,
    StillRunning,
    CantReread,
}

impl FaultCode {
    /// Looks up a known fault code by its numeric value.
    pub fn from_code(code: i32) -> Option<Self> {
        let fault = match code {
            1 => FaultCode::UnknownMethod,
            2 => FaultCode::IncorrectParameters,
            3 => FaultCode::BadArguments,
            4 => FaultCode::SignatureUnsupported,
            6 => FaultCode::ShutdownState,
            10 => FaultCode::BadName,
            11 => FaultCode::BadSignal,
            20 => FaultCode::NoFile,
            21 => FaultCode::NotExecutable,
            30 => FaultCode::Failed,
            40 => FaultCode::AbnormalTermination,
            50 => FaultCode::SpawnError,
            60 => FaultCode::AlreadyStarted,
            70 => FaultCode::NotRunning,
            80 => FaultCode::Success,
            90 => FaultCode::AlreadyAdded,
            91 => FaultCode::StillRunning,
            92 => FaultCode::CantReread,
            _ => return None,
        };
        Some(fault)
    }

    /// Returns the numeric value sent on the wire.
    pub fn code(&self) -> i32 {
        match self {
            FaultCode::UnknownMethod => 1,
            FaultCode::IncorrectParameters => 2,
            FaultCode::BadArguments => 3,
            FaultCode::SignatureUnsupported => 4,
            FaultCode::ShutdownState => 6,
            FaultCode::BadName => 10,
            FaultCode::BadSignal => 11,
            FaultCode::NoFile => 20,
            FaultCode::NotExecutable => 21,
            FaultCode::Failed => 30,
            FaultCode::AbnormalTermination => 40,
            FaultCode::SpawnError => 50,
            FaultCode::AlreadyStarted => 60,
            FaultCode::NotRunning => 70,
            FaultCode::Success => 80,
            FaultCode::AlreadyAdded => 90,
            FaultCode::StillRunning => 91,
            FaultCode::CantReread => 92,
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultCode::UnknownMethod => write!(f, "UNKNOWN_METHOD"),
            FaultCode::IncorrectParameters => write!(f, "INCORRECT_PARAMETERS"),
            FaultCode::BadArguments => write!(f, "BAD_ARGUMENTS"),
            FaultCode::SignatureUnsupported => write!(f, "SIGNATURE_UNSUPPORTED"),
            FaultCode::ShutdownState => write!(f, "SHUTDOWN_STATE"),
            FaultCode::BadName => write!(f, "BAD_NAME"),
            FaultCode::BadSignal => write!(f, "BAD_SIGNAL"),
            FaultCode::NoFile => write!(f, "NO_FILE"),
            FaultCode::NotExecutable => write!(f, "NOT_EXECUTABLE"),
            FaultCode::Failed => write!(f, "FAILED"),
            FaultCode::AbnormalTermination => write!(f, "ABNORMAL_TERMINATION"),
            FaultCode::SpawnError => write!(f, "SPAWN_ERROR"),
            FaultCode::AlreadyStarted => write!(f, "ALREADY_STARTED"),
            FaultCode::NotRunning => write!(f, "NOT_RUNNING"),
            FaultCode::Success => write!(f, "SUCCESS"),
            FaultCode::AlreadyAdded => write!(f, "ALREADY_ADDED"),
            FaultCode::StillRunning => write!(f, "STILL_RUNNING"),
            FaultCode::CantReread => write!(f, "CANT_REREAD"),
        }
    }
}
