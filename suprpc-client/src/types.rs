//! Per-call options and typed views over catalog results.
//!
//! The catalog returns results unchanged as `Value`s; these views are
//! opt-in conversions for callers that want named fields.

use crate::error::ClientError;
use serde::Serialize;
use std::fmt;
use suprpc_protocol::Value;

/// Options for calls that start or stop processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Block until the daemon confirms the state transition completed.
    pub wait: bool,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self { wait: true }
    }
}

impl WaitOptions {
    /// Wait for the transition (the default).
    pub fn blocking() -> Self {
        Self { wait: true }
    }

    /// Return as soon as the transition has been requested.
    pub fn no_wait() -> Self {
        Self { wait: false }
    }
}

fn shape_error(expected: &'static str, found: &Value) -> ClientError {
    ClientError::UnexpectedShape {
        expected,
        found: found.type_name().to_string(),
    }
}

/// State of the supervisord process itself, from `supervisor.getState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupervisorState {
    Fatal,
    Running,
    Restarting,
    Shutdown,
}

impl SupervisorState {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            2 => Some(SupervisorState::Fatal),
            1 => Some(SupervisorState::Running),
            0 => Some(SupervisorState::Restarting),
            -1 => Some(SupervisorState::Shutdown),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            SupervisorState::Fatal => 2,
            SupervisorState::Running => 1,
            SupervisorState::Restarting => 0,
            SupervisorState::Shutdown => -1,
        }
    }

    /// Reads the `statecode` member of a `getState` result.
    pub fn from_value(value: &Value) -> Result<Self, ClientError> {
        let code = value
            .get("statecode")
            .and_then(Value::as_i32)
            .ok_or_else(|| shape_error("struct with integer statecode", value))?;
        Self::from_code(code).ok_or(ClientError::UnexpectedShape {
            expected: "statecode in {2, 1, 0, -1}",
            found: code.to_string(),
        })
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorState::Fatal => write!(f, "FATAL"),
            SupervisorState::Running => write!(f, "RUNNING"),
            SupervisorState::Restarting => write!(f, "RESTARTING"),
            SupervisorState::Shutdown => write!(f, "SHUTDOWN"),
        }
    }
}

/// State of a supervised child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessState {
    Stopped,
    Starting,
    Running,
    Backoff,
    Stopping,
    Exited,
    Fatal,
    Unknown,
}

impl ProcessState {
    /// Maps a numeric state; codes supervisord does not define map to `Unknown`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ProcessState::Stopped,
            10 => ProcessState::Starting,
            20 => ProcessState::Running,
            30 => ProcessState::Backoff,
            40 => ProcessState::Stopping,
            100 => ProcessState::Exited,
            200 => ProcessState::Fatal,
            _ => ProcessState::Unknown,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ProcessState::Stopped => 0,
            ProcessState::Starting => 10,
            ProcessState::Running => 20,
            ProcessState::Backoff => 30,
            ProcessState::Stopping => 40,
            ProcessState::Exited => 100,
            ProcessState::Fatal => 200,
            ProcessState::Unknown => 1000,
        }
    }

    /// STOPPED, EXITED, FATAL and UNKNOWN are not running states.
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            ProcessState::Starting
                | ProcessState::Running
                | ProcessState::Backoff
                | ProcessState::Stopping
        )
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Stopped => write!(f, "STOPPED"),
            ProcessState::Starting => write!(f, "STARTING"),
            ProcessState::Running => write!(f, "RUNNING"),
            ProcessState::Backoff => write!(f, "BACKOFF"),
            ProcessState::Stopping => write!(f, "STOPPING"),
            ProcessState::Exited => write!(f, "EXITED"),
            ProcessState::Fatal => write!(f, "FATAL"),
            ProcessState::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// One entry of `getProcessInfo` / `getAllProcessInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessInfo {
    pub name: String,
    pub group: String,
    pub description: String,
    /// UNIX timestamp of the last start, 0 if never started.
    pub start: i64,
    /// UNIX timestamp of the last stop, 0 if never stopped.
    pub stop: i64,
    /// Daemon clock when the info was taken.
    pub now: i64,
    pub state: ProcessState,
    pub statename: String,
    pub spawnerr: String,
    pub exitstatus: i32,
    pub logfile: String,
    pub stdout_logfile: String,
    pub stderr_logfile: String,
    /// 0 when the process is not running.
    pub pid: i32,
}

impl ProcessInfo {
    pub fn from_value(value: &Value) -> Result<Self, ClientError> {
        if value.as_struct().is_none() {
            return Err(shape_error("process info struct", value));
        }

        let required_str = |key: &'static str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or(ClientError::UnexpectedShape {
                    expected: "string member",
                    found: format!("missing or non-string {}", key),
                })
        };
        let required_int = |key: &'static str| {
            value
                .get(key)
                .and_then(Value::as_i32)
                .ok_or(ClientError::UnexpectedShape {
                    expected: "integer member",
                    found: format!("missing or non-integer {}", key),
                })
        };
        let optional_str = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_default()
        };
        let optional_int = |key: &str| value.get(key).and_then(Value::as_i64).unwrap_or_default();

        Ok(Self {
            name: required_str("name")?,
            group: required_str("group")?,
            description: optional_str("description"),
            start: optional_int("start"),
            stop: optional_int("stop"),
            now: optional_int("now"),
            state: ProcessState::from_code(required_int("state")?),
            statename: required_str("statename")?,
            spawnerr: optional_str("spawnerr"),
            exitstatus: value
                .get("exitstatus")
                .and_then(Value::as_i32)
                .unwrap_or_default(),
            logfile: optional_str("logfile"),
            stdout_logfile: optional_str("stdout_logfile"),
            stderr_logfile: optional_str("stderr_logfile"),
            pid: required_int("pid")?,
        })
    }

    /// Parses a `getAllProcessInfo` array.
    pub fn list_from_value(value: &Value) -> Result<Vec<Self>, ClientError> {
        value
            .as_array()
            .ok_or_else(|| shape_error("array of process info structs", value))?
            .iter()
            .map(Self::from_value)
            .collect()
    }

    /// `group:name`, the form supervisord accepts wherever a process name is expected.
    pub fn full_name(&self) -> String {
        format!("{}:{}", self.group, self.name)
    }
}
