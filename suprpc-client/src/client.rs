//! High-level client API.
//!
//! Every catalog method is a direct pass-through to [`Client::execute`] with
//! a fixed remote method name and parameter order. Results are returned as
//! the daemon sent them.

use crate::connection::{Connection, Endpoint, EndpointConfig};
use crate::error::ClientError;
use crate::transport::Transport;
use crate::types::WaitOptions;
use std::sync::Arc;
use suprpc_protocol::{MethodCall, Value};

/// Blocking client for supervisord's XML-RPC interface.
#[derive(Clone)]
pub struct Client {
    conn: Arc<Connection>,
}

impl Client {
    /// Creates a client that talks HTTP to the configured endpoint.
    pub fn new(config: EndpointConfig) -> Result<Self, ClientError> {
        Ok(Self {
            conn: Arc::new(Connection::new(&config)?),
        })
    }

    /// Creates a client over a caller-supplied transport.
    pub fn with_transport(config: &EndpointConfig, transport: impl Transport + 'static) -> Self {
        Self {
            conn: Arc::new(Connection::with_transport(config.build(), transport)),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.conn.endpoint()
    }

    /// Returns the underlying connection.
    pub fn connection(&self) -> Arc<Connection> {
        self.conn.clone()
    }

    /// Calls `method_name` with positional `params`.
    ///
    /// Returns the decoded result, `ClientError::Fault` when the daemon
    /// rejects the call, or `ClientError::Transport` when no usable reply
    /// was received.
    pub fn execute(&self, method_name: &str, params: Vec<Value>) -> Result<Value, ClientError> {
        let call = MethodCall::new(method_name).with_params(params);
        let value = self.conn.call(&call)?.into_result()?;
        Ok(value)
    }

    // =========================================================================
    // Status and control
    // =========================================================================

    /// Version of the RPC API in use by supervisord.
    pub fn get_api_version(&self) -> Result<Value, ClientError> {
        self.execute("supervisor.getAPIVersion", vec![])
    }

    /// Version of the supervisor package in use by supervisord.
    pub fn get_supervisor_version(&self) -> Result<Value, ClientError> {
        self.execute("supervisor.getSupervisorVersion", vec![])
    }

    /// Identifying string of this supervisord instance.
    pub fn get_identification(&self) -> Result<Value, ClientError> {
        self.execute("supervisor.getIdentification", vec![])
    }

    /// Current daemon state as `{statecode, statename}`.
    ///
    /// See [`SupervisorState::from_value`](crate::SupervisorState::from_value)
    /// for a typed view.
    pub fn get_state(&self) -> Result<Value, ClientError> {
        self.execute("supervisor.getState", vec![])
    }

    /// PID of supervisord.
    pub fn get_pid(&self) -> Result<Value, ClientError> {
        self.execute("supervisor.getPID", vec![])
    }

    /// Reads `length` bytes from the main log starting at `offset`.
    pub fn read_log(&self, offset: i32, length: i32) -> Result<Value, ClientError> {
        self.execute("supervisor.readLog", vec![offset.into(), length.into()])
    }

    /// Clears the main log.
    pub fn clear_log(&self) -> Result<Value, ClientError> {
        self.execute("supervisor.clearLog", vec![])
    }

    /// Shuts down the supervisor process.
    pub fn shutdown(&self) -> Result<Value, ClientError> {
        self.execute("supervisor.shutdown", vec![])
    }

    /// Restarts the supervisor process.
    pub fn restart(&self) -> Result<Value, ClientError> {
        self.execute("supervisor.restart", vec![])
    }

    // =========================================================================
    // Process control
    // =========================================================================

    /// Info about one process. `name` may be `group:name`.
    pub fn get_process_info(&self, name: &str) -> Result<Value, ClientError> {
        self.execute("supervisor.getProcessInfo", vec![name.into()])
    }

    pub fn get_all_process_info(&self) -> Result<Value, ClientError> {
        self.execute("supervisor.getAllProcessInfo", vec![])
    }

    /// Starts a process. `name` may be `group:name` or `group:*`.
    pub fn start_process(&self, name: &str, opts: WaitOptions) -> Result<Value, ClientError> {
        self.execute("supervisor.startProcess", vec![name.into(), opts.wait.into()])
    }

    pub fn start_all_processes(&self, opts: WaitOptions) -> Result<Value, ClientError> {
        self.execute("supervisor.startAllProcesses", vec![opts.wait.into()])
    }

    pub fn start_process_group(&self, name: &str, opts: WaitOptions) -> Result<Value, ClientError> {
        self.execute(
            "supervisor.startProcessGroup",
            vec![name.into(), opts.wait.into()],
        )
    }

    /// Stops a process. `name` may be `group:name` or `group:*`.
    pub fn stop_process(&self, name: &str, opts: WaitOptions) -> Result<Value, ClientError> {
        self.execute("supervisor.stopProcess", vec![name.into(), opts.wait.into()])
    }

    pub fn stop_all_processes(&self, opts: WaitOptions) -> Result<Value, ClientError> {
        self.execute("supervisor.stopAllProcesses", vec![opts.wait.into()])
    }

    pub fn stop_process_group(&self, name: &str, opts: WaitOptions) -> Result<Value, ClientError> {
        self.execute(
            "supervisor.stopProcessGroup",
            vec![name.into(), opts.wait.into()],
        )
    }

    /// Writes `chars` to the stdin of process `name`.
    pub fn send_process_stdin(&self, name: &str, chars: &str) -> Result<Value, ClientError> {
        self.execute("supervisor.sendProcessStdin", vec![name.into(), chars.into()])
    }

    /// Sends a RemoteCommunicationEvent to event listeners.
    pub fn send_remote_comm_event(&self, event_type: &str, data: &str) -> Result<Value, ClientError> {
        self.execute(
            "supervisor.sendRemoteCommEvent",
            vec![event_type.into(), data.into()],
        )
    }

    /// Activates a process group from the configuration file.
    pub fn add_process_group(&self, name: &str) -> Result<Value, ClientError> {
        self.execute("supervisor.addProcessGroup", vec![name.into()])
    }

    /// Removes a stopped process group from the active configuration.
    pub fn remove_process_group(&self, name: &str) -> Result<Value, ClientError> {
        self.execute("supervisor.removeProcessGroup", vec![name.into()])
    }

    // =========================================================================
    // Process logging
    // =========================================================================

    pub fn read_process_stdout_log(
        &self,
        name: &str,
        offset: i32,
        length: i32,
    ) -> Result<Value, ClientError> {
        self.execute(
            "supervisor.readProcessStdoutLog",
            vec![name.into(), offset.into(), length.into()],
        )
    }

    pub fn read_process_stderr_log(
        &self,
        name: &str,
        offset: i32,
        length: i32,
    ) -> Result<Value, ClientError> {
        self.execute(
            "supervisor.readProcessStderrLog",
            vec![name.into(), offset.into(), length.into()],
        )
    }

    /// Tails the stdout log. The result is `[bytes, offset, overflow]`.
    pub fn tail_process_stdout_log(
        &self,
        name: &str,
        offset: i32,
        length: i32,
    ) -> Result<Value, ClientError> {
        self.execute(
            "supervisor.tailProcessStdoutLog",
            vec![name.into(), offset.into(), length.into()],
        )
    }

    /// Tails the stderr log. The result is `[bytes, offset, overflow]`.
    pub fn tail_process_stderr_log(
        &self,
        name: &str,
        offset: i32,
        length: i32,
    ) -> Result<Value, ClientError> {
        self.execute(
            "supervisor.tailProcessStderrLog",
            vec![name.into(), offset.into(), length.into()],
        )
    }

    /// Clears and reopens the stdout and stderr logs of process `name`.
    pub fn clear_process_logs(&self, name: &str) -> Result<Value, ClientError> {
        self.execute("supervisor.clearProcessLogs", vec![name.into()])
    }

    pub fn clear_all_process_logs(&self) -> Result<Value, ClientError> {
        self.execute("supervisor.clearAllProcessLogs", vec![])
    }

    // =========================================================================
    // System methods
    // =========================================================================

    pub fn list_methods(&self) -> Result<Value, ClientError> {
        self.execute("system.listMethods", vec![])
    }

    /// Documentation for `supervisor.<name>`.
    pub fn method_help(&self, name: &str) -> Result<Value, ClientError> {
        self.execute("system.methodHelp", vec![format!("supervisor.{}", name).into()])
    }

    /// Signature of `supervisor.<name>` as `[rtype, ptype, ...]`.
    pub fn method_signature(&self, name: &str) -> Result<Value, ClientError> {
        self.execute(
            "system.methodSignature",
            vec![format!("supervisor.{}", name).into()],
        )
    }
}
