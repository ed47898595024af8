//! Command execution.

use crate::Commands;
use colored::Colorize;
use suprpc_client::{
    Client, ProcessInfo, ProcessState, SupervisorState, Value, WaitOptions,
};

fn wait_options(no_wait: bool) -> WaitOptions {
    if no_wait {
        WaitOptions::no_wait()
    } else {
        WaitOptions::default()
    }
}

/// Executes a command and returns the formatted output.
pub fn execute(client: &Client, cmd: Commands) -> Result<String, Box<dyn std::error::Error>> {
    match cmd {
        Commands::Repl => Err("repl cannot be nested".into()),

        Commands::GetState => {
            let result = client.get_state()?;
            let state = SupervisorState::from_value(&result)?;
            Ok(format!("{} ({})", color_supervisor_state(state), state.code()))
        }

        Commands::GetProcessInfo { name } => {
            let result = client.get_process_info(&name)?;
            let info = ProcessInfo::from_value(&result)?;
            Ok(format_process_line(&info))
        }

        Commands::GetAllProcessInfo => {
            let result = client.get_all_process_info()?;
            let infos = ProcessInfo::list_from_value(&result)?;
            if infos.is_empty() {
                return Ok("No processes configured".yellow().to_string());
            }
            Ok(infos
                .iter()
                .map(format_process_line)
                .collect::<Vec<_>>()
                .join("\n"))
        }

        other => Ok(format_value(&call_catalog(client, other)?)),
    }
}

/// Runs a command as a plain catalog call and returns the raw result.
pub fn call_catalog(client: &Client, cmd: Commands) -> Result<Value, Box<dyn std::error::Error>> {
    let result = match cmd {
        Commands::Repl => return Err("repl is not a remote method".into()),
        Commands::GetApiVersion => client.get_api_version(),
        Commands::GetSupervisorVersion => client.get_supervisor_version(),
        Commands::GetIdentification => client.get_identification(),
        Commands::GetState => client.get_state(),
        Commands::GetPid => client.get_pid(),
        Commands::ReadLog { offset, length } => client.read_log(offset, length),
        Commands::ClearLog => client.clear_log(),
        Commands::Shutdown => client.shutdown(),
        Commands::Restart => client.restart(),

        Commands::GetProcessInfo { name } => client.get_process_info(&name),
        Commands::GetAllProcessInfo => client.get_all_process_info(),
        Commands::StartProcess { name, no_wait } => {
            client.start_process(&name, wait_options(no_wait))
        }
        Commands::StartAllProcesses { no_wait } => {
            client.start_all_processes(wait_options(no_wait))
        }
        Commands::StartProcessGroup { name, no_wait } => {
            client.start_process_group(&name, wait_options(no_wait))
        }
        Commands::StopProcess { name, no_wait } => {
            client.stop_process(&name, wait_options(no_wait))
        }
        Commands::StopAllProcesses { no_wait } => client.stop_all_processes(wait_options(no_wait)),
        Commands::StopProcessGroup { name, no_wait } => {
            client.stop_process_group(&name, wait_options(no_wait))
        }
        Commands::SendProcessStdin { name, chars } => client.send_process_stdin(&name, &chars),
        Commands::SendRemoteCommEvent { event_type, data } => {
            client.send_remote_comm_event(&event_type, &data)
        }
        Commands::AddProcessGroup { name } => client.add_process_group(&name),
        Commands::RemoveProcessGroup { name } => client.remove_process_group(&name),

        Commands::ReadProcessStdoutLog {
            name,
            offset,
            length,
        } => client.read_process_stdout_log(&name, offset, length),
        Commands::ReadProcessStderrLog {
            name,
            offset,
            length,
        } => client.read_process_stderr_log(&name, offset, length),
        Commands::TailProcessStdoutLog {
            name,
            offset,
            length,
        } => client.tail_process_stdout_log(&name, offset, length),
        Commands::TailProcessStderrLog {
            name,
            offset,
            length,
        } => client.tail_process_stderr_log(&name, offset, length),
        Commands::ClearProcessLogs { name } => client.clear_process_logs(&name),
        Commands::ClearAllProcessLogs => client.clear_all_process_logs(),

        Commands::ListMethods => client.list_methods(),
        Commands::MethodHelp { name } => client.method_help(&name),
        Commands::MethodSignature { name } => client.method_signature(&name),
    };
    Ok(result?)
}

fn color_supervisor_state(state: SupervisorState) -> colored::ColoredString {
    let text = state.to_string();
    match state {
        SupervisorState::Running => text.green(),
        SupervisorState::Fatal => text.red(),
        SupervisorState::Restarting | SupervisorState::Shutdown => text.yellow(),
    }
}

/// One `group:name  STATE  description` line.
pub(crate) fn format_process_line(info: &ProcessInfo) -> String {
    let state = format!("{:<10}", info.statename);
    let state = match info.state {
        ProcessState::Running => state.green(),
        ProcessState::Fatal | ProcessState::Backoff | ProcessState::Unknown => state.red(),
        _ => state.yellow(),
    };
    format!(
        "{} {} {}",
        format!("{:<32}", info.full_name()).cyan(),
        state,
        info.description
    )
}

/// Formats a result for display. Strings (log reads, help text) print as-is.
pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| format!("{:?}", other)),
    }
}
