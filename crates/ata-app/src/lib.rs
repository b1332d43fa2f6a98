//! ata terminal client
//!
//! Command-line front end for the ata execution service: configuration,
//! logging setup, the interactive session shell and one-shot commands.

pub use ata_gateway as gateway;
pub use ata_settings as settings;
pub use ata_terminal as terminal;

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;

pub use app::App;
pub use cli::{Cli, Commands};
pub use config::ClientConfig;
