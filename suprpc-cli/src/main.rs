//! suprpc - Command-line interface for supervisord
//!
//! Provides both a REPL and one-shot command execution.

mod commands;
mod repl;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::time::Duration;
use suprpc_client::{Client, EndpointConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "suprpc")]
#[command(about = "Command-line interface for supervisord's XML-RPC API")]
#[command(version)]
struct Cli {
    /// Daemon host
    #[arg(long, env = "SUPERVISOR_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Daemon HTTP port
    #[arg(short, long, env = "SUPERVISOR_PORT", default_value_t = 9001)]
    port: u16,

    /// Basic auth user name
    #[arg(short, long, env = "SUPERVISOR_USERNAME")]
    username: Option<String>,

    /// Basic auth password
    #[arg(long, env = "SUPERVISOR_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "SUPERVISOR_TIMEOUT")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    fn endpoint_config(&self) -> EndpointConfig {
        let mut config = EndpointConfig::new(self.host.clone(), self.port);
        if let Some(ref username) = self.username {
            config = config.with_username(username);
        }
        if let Some(ref password) = self.password {
            config = config.with_password(password);
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

#[derive(Subcommand, Debug, PartialEq)]
pub(crate) enum Commands {
    /// Start interactive REPL
    Repl,

    // ===== Status and control =====
    /// Version of the RPC API
    GetApiVersion,

    /// Version of the supervisor package
    GetSupervisorVersion,

    /// Identifying string of this supervisord
    GetIdentification,

    /// Current daemon state
    GetState,

    /// PID of supervisord
    GetPid,

    /// Read the main log
    ReadLog {
        /// Byte offset; negative counts from the end
        #[arg(allow_negative_numbers = true)]
        offset: i32,

        /// Bytes to read; 0 reads to the end
        #[arg(default_value_t = 0)]
        length: i32,
    },

    /// Clear the main log
    ClearLog,

    /// Shut supervisord down
    Shutdown,

    /// Restart supervisord
    Restart,

    // ===== Process control =====
    /// Info about one process
    GetProcessInfo {
        /// Process name, optionally as group:name
        name: String,
    },

    /// Info about all processes
    GetAllProcessInfo,

    /// Start a process
    StartProcess {
        /// Process name (group:name or group:*)
        name: String,

        /// Return without waiting for the process to be RUNNING
        #[arg(long)]
        no_wait: bool,
    },

    /// Start all processes
    StartAllProcesses {
        #[arg(long)]
        no_wait: bool,
    },

    /// Start every process in a group
    StartProcessGroup {
        /// Group name
        name: String,

        #[arg(long)]
        no_wait: bool,
    },

    /// Stop a process
    StopProcess {
        /// Process name (group:name or group:*)
        name: String,

        /// Return without waiting for the process to stop
        #[arg(long)]
        no_wait: bool,
    },

    /// Stop all processes
    StopAllProcesses {
        #[arg(long)]
        no_wait: bool,
    },

    /// Stop every process in a group
    StopProcessGroup {
        /// Group name
        name: String,

        #[arg(long)]
        no_wait: bool,
    },

    /// Write characters to a process's stdin
    SendProcessStdin {
        /// Process name
        name: String,

        /// Characters to send
        chars: String,
    },

    /// Emit a RemoteCommunicationEvent
    SendRemoteCommEvent {
        /// Event type
        event_type: String,

        /// Event data
        data: String,
    },

    /// Activate a configured process group
    AddProcessGroup {
        /// Group name
        name: String,
    },

    /// Remove a stopped process group
    RemoveProcessGroup {
        /// Group name
        name: String,
    },

    // ===== Process logging =====
    /// Read a process's stdout log
    ReadProcessStdoutLog {
        name: String,
        #[arg(allow_negative_numbers = true)]
        offset: i32,
        length: i32,
    },

    /// Read a process's stderr log
    ReadProcessStderrLog {
        name: String,
        #[arg(allow_negative_numbers = true)]
        offset: i32,
        length: i32,
    },

    /// Tail a process's stdout log
    TailProcessStdoutLog {
        name: String,
        #[arg(default_value_t = 0)]
        offset: i32,
        #[arg(default_value_t = 1600)]
        length: i32,
    },

    /// Tail a process's stderr log
    TailProcessStderrLog {
        name: String,
        #[arg(default_value_t = 0)]
        offset: i32,
        #[arg(default_value_t = 1600)]
        length: i32,
    },

    /// Clear a process's stdout and stderr logs
    ClearProcessLogs {
        name: String,
    },

    /// Clear every process's logs
    ClearAllProcessLogs,

    // ===== System methods =====
    /// List methods the daemon supports
    ListMethods,

    /// Documentation for supervisor.<name>
    MethodHelp {
        /// Method name without the supervisor. prefix
        name: String,
    },

    /// Signature of supervisor.<name>
    MethodSignature {
        /// Method name without the supervisor. prefix
        name: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.endpoint_config();
    tracing::debug!(url = %config.build().url(), "endpoint configured");

    let client = Client::new(config).map_err(|e| {
        eprintln!("{}: {}", "Client setup failed".red(), e);
        e
    })?;

    match cli.command {
        Some(Commands::Repl) | None => {
            repl::run(client)?;
        }
        Some(cmd) => match commands::execute(&client, cmd) {
            Ok(output) => {
                println!("{}", output);
            }
            Err(e) => {
                eprintln!("{}: {}", "Error".red(), e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
