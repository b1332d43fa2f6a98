use anyhow::{Context, Result};
use ata::app::{run_exec, run_monitor, run_repl_mode, run_settings, run_status};
use ata::gateway::HttpGateway;
use ata::terminal::TerminalSize;
use ata::{logging, App, Cli, ClientConfig, Commands};
use clap::{CommandFactory, Parser};
use colored::Colorize;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.selected_command();

    if let Commands::Completions { shell } = command {
        clap_complete::generate(shell, &mut Cli::command(), "ata", &mut std::io::stdout());
        return Ok(());
    }

    let config = ClientConfig::load(&cli)?;

    let log_file = config.log_file();
    if let Err(e) = logging::init(&config.logging.level, &log_file) {
        eprintln!("{} {:#}", "Logging disabled:".yellow(), e);
    }

    match command {
        Commands::Repl => {
            let app = App::connect(&config)?;
            run_repl_mode(app).await
        }
        Commands::Exec {
            command,
            rows,
            cols,
            wait_ms,
        } => {
            let app = App::connect(&config)?;
            let size = match (rows, cols) {
                (None, None) => None,
                (rows, cols) => {
                    let default = config.registry_options().default_size;
                    Some(TerminalSize::new(
                        rows.unwrap_or(default.rows),
                        cols.unwrap_or(default.cols),
                    ))
                }
            };
            let line = command.join(" ");
            let result = run_exec(
                &app,
                &line,
                size,
                Duration::from_millis(wait_ms),
                &mut std::io::stdout(),
            )
            .await;
            app.shutdown().await;
            result
        }
        Commands::Status => {
            let gateway =
                HttpGateway::new(config.gateway.clone()).context("Failed to create gateway client")?;
            run_status(&gateway, &mut std::io::stdout()).await
        }
        Commands::Settings { pretty } => {
            let app = App::connect(&config)?;
            run_settings(&app, pretty, &mut std::io::stdout()).await
        }
        Commands::Monitor { interval, count } => {
            let app = App::connect(&config)?;
            let interval = interval.map(Duration::from_secs);
            run_monitor(&app, interval, count, &mut std::io::stdout()).await
        }
        Commands::Completions { .. } => Ok(()),
    }
}
