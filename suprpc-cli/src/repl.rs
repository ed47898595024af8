//! Interactive REPL.

use crate::commands;
use crate::Commands;
use clap::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use suprpc_client::Client;

const HELP_TEXT: &str = r#"
Available commands (same names and arguments as the one-shot CLI):
  help                                Show this help
  get-state                           Daemon state
  get-pid | get-api-version | get-supervisor-version | get-identification
  read-log <offset> [length]          Read the main log
  clear-log | shutdown | restart

  get-process-info <name>             One process
  get-all-process-info                All processes
  start-process <name> [--no-wait]    Start a process (also start-all-processes,
  stop-process <name> [--no-wait]       start-process-group, stop-all-processes,
                                        stop-process-group)
  send-process-stdin <name> "<chars>"
  send-remote-comm-event <type> "<data>"
  add-process-group <name> | remove-process-group <name>

  read-process-stdout-log <name> <offset> <length>
  tail-process-stderr-log <name> [offset] [length]
  clear-process-logs <name> | clear-all-process-logs

  list-methods | method-help <name> | method-signature <name>

  <command> --help                    Arguments of one command
  quit, exit                          Exit the REPL
"#;

/// A REPL line parsed with the same subcommand definitions as the CLI.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ReplLine {
    #[command(subcommand)]
    command: Commands,
}

pub fn run(client: Client) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "suprpc".bold().cyan());
    println!("Endpoint: {}", client.endpoint().url());

    // Create readline editor
    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(config)?;

    // Load history
    let history_path = std::env::var("HOME")
        .map(|h| std::path::PathBuf::from(h).join(".suprpc_history"))
        .unwrap_or_else(|_| ".suprpc_history".into());
    let _ = rl.load_history(&history_path);

    println!("Type 'help' for available commands.\n");

    loop {
        let prompt = format!("{} ", "supervisor>".cyan());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match execute_repl_command(&client, line) {
                    Ok(Some(output)) => println!("{}\n", output),
                    Ok(None) => break, // Exit command
                    Err(e) => println!("{}: {}\n", "Error".red(), e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("{}: {:?}", "Error".red(), err);
                break;
            }
        }
    }

    // Save history
    let _ = rl.save_history(&history_path);

    Ok(())
}

fn execute_repl_command(
    client: &Client,
    line: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    match parse_line(line)? {
        ReplAction::Help => Ok(Some(HELP_TEXT.to_string())),
        ReplAction::Quit => Ok(None),
        ReplAction::Usage(text) => Ok(Some(text)),
        ReplAction::Run(Commands::Repl) => Ok(Some("Already in the REPL".yellow().to_string())),
        ReplAction::Run(cmd) => commands::execute(client, cmd).map(Some),
    }
}

#[derive(Debug, PartialEq)]
enum ReplAction {
    Help,
    Quit,
    /// Usage or argument error rendered by clap.
    Usage(String),
    Run(Commands),
}

fn parse_line(line: &str) -> Result<ReplAction, Box<dyn std::error::Error>> {
    let args = split_args(line)?;
    let Some(first) = args.first() else {
        return Ok(ReplAction::Usage(String::new()));
    };

    match first.to_lowercase().as_str() {
        "help" | "?" if args.len() == 1 => return Ok(ReplAction::Help),
        "quit" | "exit" | "q" => return Ok(ReplAction::Quit),
        _ => {}
    }

    match ReplLine::try_parse_from(&args) {
        Ok(parsed) => Ok(ReplAction::Run(parsed.command)),
        Err(e) => Ok(ReplAction::Usage(e.to_string().trim_end().to_string())),
    }
}

/// Splits a line on whitespace, keeping double-quoted runs together.
/// `\"` and `\\` escape inside quotes.
fn split_args(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            '\\' if in_quotes => match chars.next() {
                Some(escaped @ ('"' | '\\')) => current.push(escaped),
                Some('n') => current.push('\n'),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if in_token {
        args.push(current);
    }
    Ok(args)
}
