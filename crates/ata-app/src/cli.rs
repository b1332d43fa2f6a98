use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// CLI arguments for the ata terminal client
#[derive(Parser, Debug)]
#[command(name = "ata")]
#[command(about = "Terminal client for the ata execution service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the config file (default: ~/.ata/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the execution service API (e.g., http://localhost:5000/api)
    #[arg(long, value_name = "URL", env = "ATA_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, value_name = "TOKEN", env = "ATA_API_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Interactive session shell (default)
    Repl,
    /// Run one command in a fresh session and print its output
    Exec {
        /// Command line to run
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
        /// Terminal rows
        #[arg(long)]
        rows: Option<u16>,
        /// Terminal columns
        #[arg(long)]
        cols: Option<u16>,
        /// How long to keep collecting output after the command is sent
        #[arg(long, value_name = "MS", default_value = "500")]
        wait_ms: u64,
    },
    /// Check that the execution service is reachable
    Status,
    /// Load settings from the service and print them as JSON
    Settings {
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Poll the service's host metrics and print one line per sample
    Monitor {
        /// Seconds between samples (default: the service's updateInterval setting)
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
        /// Stop after this many samples
        #[arg(long, short = 'n')]
        count: Option<usize>,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Subcommand to run, `repl` when none was given
    pub fn selected_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Repl)
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::Parser;

    // Helper function to parse CLI args from a string slice
    fn parse_cli_from_args(args: &[&str]) -> Result<Cli, clap::Error> {
        let mut cli_args = vec!["ata"];
        cli_args.extend(args);

        Cli::try_parse_from(cli_args)
    }

    #[test]
    fn test_default_cli_parsing() -> Result<(), Box<dyn std::error::Error>> {
        let cli = parse_cli_from_args(&[])?;

        assert!(cli.command.is_none());
        assert_eq!(cli.selected_command(), Commands::Repl);
        assert!(cli.config.is_none());
        assert!(!cli.verbose);

        Ok(())
    }

    #[test]
    fn test_verbose_flag() -> Result<(), Box<dyn std::error::Error>> {
        let cli = parse_cli_from_args(&["-v"])?;
        assert!(cli.verbose);

        let cli = parse_cli_from_args(&["status", "--verbose"])?;
        assert!(cli.verbose);

        Ok(())
    }

    #[test]
    fn test_api_url_and_token() -> Result<(), Box<dyn std::error::Error>> {
        let cli = parse_cli_from_args(&[
            "--api-url",
            "http://10.0.0.2:5000/api",
            "--token",
            "abc",
            "status",
        ])?;

        assert_eq!(cli.api_url.as_deref(), Some("http://10.0.0.2:5000/api"));
        assert_eq!(cli.token.as_deref(), Some("abc"));
        assert_eq!(cli.selected_command(), Commands::Status);

        Ok(())
    }

    #[test]
    fn test_exec_collects_trailing_words() -> Result<(), Box<dyn std::error::Error>> {
        let cli = parse_cli_from_args(&["exec", "--rows", "40", "ls", "-la", "/tmp"])?;

        match cli.selected_command() {
            Commands::Exec {
                command,
                rows,
                cols,
                wait_ms,
            } => {
                assert_eq!(command, vec!["ls", "-la", "/tmp"]);
                assert_eq!(rows, Some(40));
                assert_eq!(cols, None);
                assert_eq!(wait_ms, 500);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn test_exec_requires_command() {
        assert!(parse_cli_from_args(&["exec"]).is_err());
    }

    #[test]
    fn test_settings_pretty() -> Result<(), Box<dyn std::error::Error>> {
        let cli = parse_cli_from_args(&["settings", "--pretty"])?;
        assert_eq!(cli.selected_command(), Commands::Settings { pretty: true });
        Ok(())
    }

    #[test]
    fn test_config_path() -> Result<(), Box<dyn std::error::Error>> {
        let cli = parse_cli_from_args(&["--config", "/etc/ata.toml", "repl"])?;
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/etc/ata.toml")));
        Ok(())
    }

    #[test]
    fn test_monitor_options() -> Result<(), Box<dyn std::error::Error>> {
        let cli = parse_cli_from_args(&["monitor", "--interval", "2", "-n", "10"])?;
        assert_eq!(
            cli.selected_command(),
            Commands::Monitor {
                interval: Some(2),
                count: Some(10),
            }
        );

        let cli = parse_cli_from_args(&["monitor"])?;
        assert_eq!(
            cli.selected_command(),
            Commands::Monitor {
                interval: None,
                count: None,
            }
        );
        Ok(())
    }

    #[test]
    fn test_completions_shell() -> Result<(), Box<dyn std::error::Error>> {
        let cli = parse_cli_from_args(&["completions", "bash"])?;
        assert!(matches!(cli.selected_command(), Commands::Completions { .. }));
        Ok(())
    }

    #[test]
    fn test_unknown_subcommand_fails() {
        assert!(parse_cli_from_args(&["frobnicate"]).is_err());
    }
}
