// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tradeshell - local-first trading assistant backend.
//!
//! This is the binary entry point for the Tradeshell daemon.

use clap::{Parser, Subcommand};

mod serve;
mod status;

/// Tradeshell - local-first trading assistant backend.
#[derive(Parser, Debug)]
#[command(name = "tradeshell", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Tradeshell daemon: database, ledger, and HTTP gateway.
    Serve,
    /// Query a running daemon's health endpoint.
    Status {
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match tradeshell_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            tradeshell_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Status { json }) => status::run_status(&config, json).await,
        None => {
            println!("tradeshell: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("tradeshell: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        // Defaults must be valid without any config file present.
        let config = tradeshell_config::load_and_validate_str("").unwrap();
        assert_eq!(config.app.name, "tradeshell");
    }
}
