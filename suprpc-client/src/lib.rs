//! # suprpc-client
//!
//! Client library for supervisord's XML-RPC interface.
//!
//! This crate provides:
//! - Endpoint configuration (URL and header assembly, including Basic auth)
//! - A pluggable blocking transport with an HTTP implementation
//! - The call executor that separates remote faults from transport failures
//! - The `supervisor.*` and `system.*` method catalog

pub mod client;
pub mod connection;
pub mod error;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::Client;
pub use connection::{Connection, Endpoint, EndpointConfig};
pub use error::ClientError;
pub use transport::{HttpTransport, Transport, TransportError};
pub use types::{ProcessInfo, ProcessState, SupervisorState, WaitOptions};

pub use suprpc_protocol::{Fault, FaultCode, MethodCall, Value};
