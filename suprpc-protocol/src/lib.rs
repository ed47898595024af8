//! # suprpc-protocol
//!
//! XML-RPC wire protocol for the supervisord remote control interface.
//!
//! This crate provides:
//! - The XML-RPC value model (`Value`) with conversions from Rust primitives
//! - `methodCall` encoding and `methodResponse` decoding
//! - Fault envelopes and the supervisord fault code table
//!
//! It performs no I/O; transports live in `suprpc-client`.

pub mod codec;
pub mod error;
pub mod message;
pub mod value;

pub use codec::{Decoder, Encoder};
pub use error::{FaultCode, ProtocolError};
pub use message::{Fault, MethodCall, Response};
pub use value::Value;

/// Path of the XML-RPC handler on a supervisord HTTP server.
pub const RPC_PATH: &str = "/RPC2";

/// Default supervisord inet_http_server port.
pub const DEFAULT_PORT: u16 = 9001;

/// Default supervisord host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Content type of every XML-RPC request body.
pub const CONTENT_TYPE: &str = "text/xml";
