//! In-memory transport for unit tests.

use crate::transport::{Transport, TransportError};
use crate::types::ProcessState;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use suprpc_protocol::{Decoder, Encoder, MethodCall, Response, Value};

/// A request captured by `MockTransport`.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl SentRequest {
    /// Decodes the captured body back into a method call.
    pub fn call(&self) -> MethodCall {
        Decoder::decode_request(&self.body).expect("captured body is a methodCall")
    }
}

enum Reply {
    Body(String),
    Status(u16),
}

#[derive(Default)]
struct State {
    replies: VecDeque<Reply>,
    requests: Vec<SentRequest>,
}

/// Replays scripted replies and records every request.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_body(&self, body: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .replies
            .push_back(Reply::Body(body.into()));
    }

    pub fn push_value(&self, value: impl Into<Value>) {
        self.push_response(&Response::ok(value));
    }

    pub fn push_fault(&self, code: i32, message: &str) {
        self.push_response(&Response::fault(code, message));
    }

    pub fn push_response(&self, response: &Response) {
        self.push_body(Encoder::encode_response(response).unwrap());
    }

    pub fn push_status(&self, status: u16) {
        self.state
            .lock()
            .unwrap()
            .replies
            .push_back(Reply::Status(status));
    }

    pub fn requests(&self) -> Vec<SentRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Returns the single call sent so far.
    pub fn only_call(&self) -> MethodCall {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests[0].call()
    }
}

impl Transport for MockTransport {
    fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: String,
    ) -> Result<String, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(SentRequest {
            url: url.to_string(),
            headers: headers.to_vec(),
            body,
        });
        match state.replies.pop_front().expect("no scripted reply") {
            Reply::Body(body) => Ok(body),
            Reply::Status(status) => Err(TransportError::Status(status)),
        }
    }
}

/// A `getProcessInfo` struct as supervisord returns it.
pub fn process_value(name: &str, state: i32, pid: i32) -> Value {
    Value::structure([
        ("name", Value::from(name)),
        ("group", Value::from(name)),
        ("description", Value::from("pid 4242, uptime 0:01:00")),
        ("start", Value::Int(1_700_000_000)),
        ("stop", Value::Int(0)),
        ("now", Value::Int(1_700_000_060)),
        ("state", Value::Int(state)),
        ("statename", Value::from(ProcessState::from_code(state).to_string())),
        ("spawnerr", Value::from("")),
        ("exitstatus", Value::Int(0)),
        ("logfile", Value::from("/var/log/web.log")),
        ("stdout_logfile", Value::from("/var/log/web.log")),
        ("stderr_logfile", Value::from("")),
        ("pid", Value::Int(pid)),
    ])
}
