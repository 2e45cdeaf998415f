//! systune - Linux system diagnostic and tuning assistant.
//!
//! Collects host diagnostics, asks an advisory backend for tuning
//! suggestions, and walks the operator through an interactive fix
//! session.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::io;
use std::time::Duration;
use systune_common::{
    logs, snapshot, AdvisoryClient, AdvisoryContext, Catalog, RemediationSession, ShellRunner,
    SystuneConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "systune")]
#[command(about = "Linux system diagnostic and tuning assistant", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect diagnostics, request suggestions, offer fixes
    Run {
        /// Advisory model override
        #[arg(long)]
        model: Option<String>,
    },

    /// Print the collected diagnostic snapshot and exit
    Snapshot {
        /// Emit the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the fix action catalog
    Actions,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Run { model: None }) {
        Commands::Run { model } => run(model).await,
        Commands::Snapshot { json } => print_snapshot(json),
        Commands::Actions => list_actions(),
    }
}

async fn run(model_override: Option<String>) -> Result<()> {
    let mut config = SystuneConfig::load().context("Failed to load configuration")?;
    if let Some(model) = model_override {
        config.advisory.model = model;
    }

    let runner = ShellRunner;

    println!("{} Gathering system diagnostics...", "[*]".cyan());
    let snapshot = snapshot::collect(&runner);

    println!("{} Collecting logs...", "[*]".cyan());
    let log_text = logs::collect_logs(&runner);

    let context = AdvisoryContext::build(&snapshot, &log_text);

    let client = AdvisoryClient::new(config.advisory);
    let spinner = thinking_spinner();
    let suggestions = client
        .request_suggestions(&context, snapshot.system_model(), snapshot.is_apple_hardware())
        .await;
    spinner.finish_and_clear();

    let suggestions =
        suggestions.context("Advisory request failed; no remediation will be offered")?;

    let catalog = Catalog::new();
    let stdin = io::stdin();
    let mut session =
        RemediationSession::new(stdin.lock(), io::stdout(), &runner, &catalog);
    session.run(&suggestions)?;

    Ok(())
}

fn print_snapshot(json: bool) -> Result<()> {
    let runner = ShellRunner;
    let snapshot = snapshot::collect(&runner);

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    if !snapshot.system_model().is_empty() {
        println!("{} {}", "System model:".bold(), snapshot.system_model());
        println!();
    }
    for field in snapshot.fields() {
        println!("{}", format!("===== {} =====", field.label).cyan());
        println!("{}", field.value);
        println!();
    }

    Ok(())
}

fn list_actions() -> Result<()> {
    let catalog = Catalog::new();
    println!("Available fix actions:");
    for action in catalog.actions() {
        println!(
            "  {} {} - {}",
            format!("[{}]", action.key).cyan(),
            action.title.bold(),
            action.summary
        );
    }
    Ok(())
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.magenta} {msg}")
            .unwrap(),
    );
    spinner.set_message("Querying advisory service...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
