//! Artifact CLI - Command-line interface for the Artifact Manager service.
//!
//! Provides commands for minting development tokens, evaluating the
//! authorization policy offline, inspecting the rule table, and checking
//! server health.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check, health, rules, token};
use output::OutputFormat;

/// Artifact Manager CLI
#[derive(Parser)]
#[command(
    name = "artifact",
    version = "0.1.0",
    about = "Artifact Manager - role-gated artifact management",
    long_about = "CLI tool for the Artifact Manager service: dev-token minting, \
offline policy evaluation, and health checks.",
    propagate_version = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    /// API server URL
    #[arg(long, global = true, env = "ARTIFACT_API_URL")]
    api_url: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint a development token (HS256)
    Token(token::TokenArgs),

    /// Evaluate the authorization policy offline
    Check(check::CheckArgs),

    /// Print the static route-rule table
    Rules,

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let format = cli.output;

    let result = match cli.command {
        Commands::Token(args) => token::execute(args, format),
        Commands::Check(args) => check::execute(args, format),
        Commands::Rules => rules::execute(format),
        Commands::Health => {
            let api_url = cli
                .api_url
                .clone()
                .unwrap_or_else(|| "http://localhost:8080".to_string());
            let client = client::ApiClient::new(&api_url)?;
            health::execute(&client, format).await
        }
    };

    if let Err(e) = result {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
