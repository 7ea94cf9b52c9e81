mod cmd;
mod output;
mod prompt;
mod root;

use anyhow::Context;
use azops_core::config::Config;
use clap::{Parser, Subcommand};
use cmd::{
    automation::AutomationSubcommand, config::ConfigSubcommand, keyvault::KeyvaultSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "azops",
    about = "Azure resource-management commands with confirmation and what-if support",
    version,
    propagate_version = true
)]
struct Cli {
    /// azops home directory (default: nearest .azops/ above the cwd, then ~/.azops)
    #[arg(long, global = true, env = "AZOPS_HOME")]
    home: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Describe what mutating commands would do without doing it
    #[arg(long, global = true, env = "AZOPS_WHAT_IF")]
    what_if: bool,

    /// Prompt before every mutating action, whatever its impact
    #[arg(long, global = true)]
    confirm: bool,

    /// Subscription ID (overrides subscription_id in config)
    #[arg(long, global = true, env = "AZOPS_SUBSCRIPTION_ID")]
    subscription: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Key Vault operations
    Keyvault {
        #[command(subcommand)]
        subcommand: KeyvaultSubcommand,
    },

    /// Automation account operations
    Automation {
        #[command(subcommand)]
        subcommand: AutomationSubcommand,
    },

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let home = root::resolve_home(cli.home.as_deref())?;
    tracing::debug!(home = %home.display(), "resolved azops home");

    match cli.command {
        Commands::Config { subcommand } => cmd::config::run(&home, subcommand, cli.json),
        Commands::Keyvault { subcommand } => {
            let config = Config::load_or_default(&home).context("failed to load config")?;
            let mut confirmer = cmd::confirmer(&config, cli.what_if, cli.confirm);
            cmd::keyvault::run(&config, &mut confirmer, subcommand, cli.json)
        }
        Commands::Automation { subcommand } => {
            let config = Config::load_or_default(&home).context("failed to load config")?;
            let mut confirmer = cmd::confirmer(&config, cli.what_if, cli.confirm);
            cmd::automation::run(
                &config,
                &mut confirmer,
                cli.subscription.as_deref(),
                subcommand,
                cli.json,
            )
        }
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
