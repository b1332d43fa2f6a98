use anyhow::Result;
use ata_terminal::{RegistryEvent, SessionId, SessionRegistry, TerminalSize};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::App;

/// Built-in commands, entered with a leading `:`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    New,
    Close(Option<SessionId>),
    Use(SessionId),
    List,
    Resize(TerminalSize),
    Prev,
    Next,
    History,
    Clear,
    Screen,
    Help,
    Quit,
}

/// One line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Empty,
    Command(String),
    Meta(MetaCommand),
}

const HELP: &str = "\
Commands:
  :new                 open a new session
  :close [id]          close a session (default: the active one)
  :use <id>            switch to a session
  :list                list sessions
  :resize <rows> <cols> resize the active session
  :prev / :next        recall the previous / next command
  :history             show the command history
  :clear               clear the active session's output
  :screen              show the active session's visible screen
  :help                show this help
  :quit                close all sessions and exit
Anything else is sent to the active session.";

/// Parse a prompt line. Lines starting with `:` are meta commands; `::` sends
/// a literal leading colon.
pub fn parse_input(line: &str) -> std::result::Result<ReplInput, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(ReplInput::Empty);
    }
    if let Some(rest) = trimmed.strip_prefix("::") {
        return Ok(ReplInput::Command(format!(":{}", rest)));
    }
    let Some(meta) = trimmed.strip_prefix(':') else {
        return Ok(ReplInput::Command(line.trim_end_matches(['\r', '\n']).to_string()));
    };

    let mut parts = meta.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let command = match (name, args.as_slice()) {
        ("new", []) => MetaCommand::New,
        ("close", []) => MetaCommand::Close(None),
        ("close", [id]) => MetaCommand::Close(Some(SessionId::from(*id))),
        ("use", [id]) => MetaCommand::Use(SessionId::from(*id)),
        ("use", _) => return Err("usage: :use <id>".to_string()),
        ("list" | "ls", []) => MetaCommand::List,
        ("resize", [rows, cols]) => {
            let rows: u16 = rows
                .parse()
                .map_err(|_| format!("invalid row count '{}'", rows))?;
            let cols: u16 = cols
                .parse()
                .map_err(|_| format!("invalid column count '{}'", cols))?;
            if rows == 0 || cols == 0 {
                return Err("rows and columns must be positive".to_string());
            }
            MetaCommand::Resize(TerminalSize::new(rows, cols))
        }
        ("resize", _) => return Err("usage: :resize <rows> <cols>".to_string()),
        ("prev", []) => MetaCommand::Prev,
        ("next", []) => MetaCommand::Next,
        ("history", []) => MetaCommand::History,
        ("clear", []) => MetaCommand::Clear,
        ("screen", []) => MetaCommand::Screen,
        ("help" | "h" | "?", []) => MetaCommand::Help,
        ("quit" | "q" | "exit", []) => MetaCommand::Quit,
        (name, _) => return Err(format!("unknown command ':{}' (try :help)", name)),
    };
    Ok(ReplInput::Meta(command))
}

enum Flow {
    Continue,
    /// Pre-fill the next prompt with a recalled command
    Prefill(String),
    Quit,
}

fn notice(message: impl std::fmt::Display) {
    eprintln!("{} {}", "!".bright_yellow().bold(), message.to_string().yellow());
}

/// Print output of the active session as it arrives
fn spawn_output_printer(registry: Arc<SessionRegistry>) -> JoinHandle<()> {
    let mut events = registry.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(RegistryEvent::OutputAppended { id, data }) => {
                    if registry.active_id().as_ref() == Some(&id) {
                        let mut stdout = std::io::stdout();
                        let _ = stdout.write_all(data.as_bytes());
                        let _ = stdout.flush();
                    }
                }
                Ok(RegistryEvent::ConnectionChanged { connected: false }) => {
                    notice("lost connection to the execution service");
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "output printer fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn print_sessions(registry: &SessionRegistry) {
    let sessions = registry.sessions();
    if sessions.is_empty() {
        println!("{}", "No open sessions. Use :new to open one.".bright_black());
        return;
    }
    let active = registry.active_id();
    for session in sessions {
        let marker = if active.as_ref() == Some(&session.id) { "*" } else { " " };
        println!(
            "{} {:<8} {:<12} {}x{}  {} bytes  opened {}",
            marker.bright_green().bold(),
            session.id.to_string().bright_cyan(),
            session.title,
            session.rows,
            session.cols,
            session.buffer.len(),
            session.created_at.format("%H:%M:%S")
        );
    }
}

fn prompt(registry: &SessionRegistry) -> String {
    match registry.active_session() {
        Some(session) => format!(
            "{} {} ",
            format!("[{}]", session.title).bright_magenta(),
            "$".bright_green().bold()
        ),
        None => format!("{} {} ", "[no session]".bright_black(), "$".bright_green().bold()),
    }
}

async fn handle_meta(app: &App, command: MetaCommand) -> Flow {
    let registry = &app.registry;
    match command {
        MetaCommand::New => match registry.create_session().await {
            Ok(id) => println!("{} opened session {}", "✓".green(), id.to_string().bright_cyan()),
            Err(e) => notice(e),
        },
        MetaCommand::Close(target) => {
            let Some(id) = target.or_else(|| registry.active_id()) else {
                notice("no active session");
                return Flow::Continue;
            };
            match registry.close_session(&id).await {
                Ok(()) => match registry.active_id() {
                    Some(active) => println!("{} closed {}, now on {}", "✓".green(), id, active),
                    None => println!("{} closed {}", "✓".green(), id),
                },
                Err(e) => notice(e),
            }
        }
        MetaCommand::Use(id) => {
            if !registry.set_active_session(&id) {
                notice(format!("no session with id '{}'", id));
            }
        }
        MetaCommand::List => print_sessions(registry),
        MetaCommand::Resize(size) => match registry.active_id() {
            Some(id) => {
                registry.resize(&id, size);
            }
            None => notice("no active session"),
        },
        MetaCommand::Prev => {
            let recalled = registry.previous_command();
            if !recalled.is_empty() {
                return Flow::Prefill(recalled);
            }
        }
        MetaCommand::Next => {
            let recalled = registry.next_command();
            if !recalled.is_empty() {
                return Flow::Prefill(recalled);
            }
        }
        MetaCommand::History => {
            for (index, entry) in registry.history().iter().enumerate() {
                println!("{:>4}  {}", (index + 1).to_string().bright_black(), entry);
            }
        }
        MetaCommand::Clear => match registry.active_id() {
            Some(id) => {
                registry.clear_buffer(&id);
                print!("\x1b[2J\x1b[H");
                let _ = std::io::stdout().flush();
            }
            None => notice("no active session"),
        },
        MetaCommand::Screen => match registry.active_id().and_then(|id| registry.screen(&id)) {
            Some(screen) => {
                let width = registry
                    .active_session()
                    .map(|s| s.cols as usize)
                    .unwrap_or(80);
                println!("┌{}┐", "─".repeat(width));
                println!("{}", screen);
                println!("└{}┘", "─".repeat(width));
            }
            None => notice("no active session"),
        },
        MetaCommand::Help => println!("{}", HELP),
        MetaCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}

/// Run interactive REPL mode
pub async fn run_repl_mode(app: App) -> Result<()> {
    println!("{}", "ata terminal client".bright_cyan().bold());
    println!("{}", format!("Service: {}", app.gateway.base_url()).bright_black());

    if app.registry.check_connection().await {
        println!("{}", "Connected.".green());
        if let Err(e) = app.settings.load(app.gateway.as_ref()).await {
            notice(format!("using local settings: {}", e));
        }
    } else {
        notice("execution service is not reachable; commands will fail until it is");
    }
    println!("{}", "Type :help for commands, :quit to exit.\n".bright_black());

    if app.registry.is_connected() {
        if let Err(e) = app.registry.create_session().await {
            notice(e);
        }
    }

    let printer = spawn_output_printer(app.registry.clone());
    let mut rl = DefaultEditor::new()?;
    let mut prefill: Option<String> = None;

    loop {
        let prompt = prompt(&app.registry);
        let readline = match prefill.take() {
            Some(initial) => rl.readline_with_initial(&prompt, (initial.as_str(), "")),
            None => rl.readline(&prompt),
        };

        match readline {
            Ok(line) => {
                let input = match parse_input(&line) {
                    Ok(input) => input,
                    Err(message) => {
                        notice(message);
                        continue;
                    }
                };

                match input {
                    ReplInput::Empty => continue,
                    ReplInput::Command(command) => {
                        let _ = rl.add_history_entry(command.as_str());
                        if let Err(e) = app.registry.send_command(&command).await {
                            notice(e);
                        }
                    }
                    ReplInput::Meta(meta) => match handle_meta(&app, meta).await {
                        Flow::Continue => {}
                        Flow::Prefill(command) => prefill = Some(command),
                        Flow::Quit => break,
                    },
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C (use :quit to exit)".bright_black());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                notice(format!("input error: {}", e));
                break;
            }
        }
    }

    printer.abort();
    println!("{}", "Closing sessions...".bright_black());
    app.shutdown().await;
    println!("{}", "Goodbye!".bright_cyan());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(line: &str) -> MetaCommand {
        match parse_input(line) {
            Ok(ReplInput::Meta(command)) => command,
            other => panic!("expected meta command for {:?}, got {:?}", line, other),
        }
    }

    #[test]
    fn test_plain_lines_are_commands() {
        assert_eq!(
            parse_input("ls -la").unwrap(),
            ReplInput::Command("ls -la".to_string())
        );
        assert_eq!(
            parse_input("  echo  spaced  ").unwrap(),
            ReplInput::Command("  echo  spaced  ".to_string())
        );
        assert_eq!(parse_input("   ").unwrap(), ReplInput::Empty);
    }

    #[test]
    fn test_double_colon_escapes() {
        assert_eq!(
            parse_input("::set paste").unwrap(),
            ReplInput::Command(":set paste".to_string())
        );
    }

    #[test]
    fn test_meta_commands() {
        assert_eq!(meta(":new"), MetaCommand::New);
        assert_eq!(meta(":close"), MetaCommand::Close(None));
        assert_eq!(meta(":close 3"), MetaCommand::Close(Some(SessionId::from("3"))));
        assert_eq!(meta(":use abc"), MetaCommand::Use(SessionId::from("abc")));
        assert_eq!(meta(":list"), MetaCommand::List);
        assert_eq!(meta(":resize 40 120"), MetaCommand::Resize(TerminalSize::new(40, 120)));
        assert_eq!(meta(":prev"), MetaCommand::Prev);
        assert_eq!(meta(":next"), MetaCommand::Next);
        assert_eq!(meta(":history"), MetaCommand::History);
        assert_eq!(meta(":clear"), MetaCommand::Clear);
        assert_eq!(meta(":screen"), MetaCommand::Screen);
        assert_eq!(meta(":help"), MetaCommand::Help);
        assert_eq!(meta(":q"), MetaCommand::Quit);
    }

    #[test]
    fn test_invalid_meta_commands() {
        assert!(parse_input(":resize 40").is_err());
        assert!(parse_input(":resize forty 80").is_err());
        assert!(parse_input(":resize 0 80").is_err());
        assert!(parse_input(":use").is_err());
        assert!(parse_input(":frobnicate").is_err());
        assert!(parse_input(":new now").is_err());
    }
}
