//! Lexecon Governance Core — Demo CLI
//!
//! Runs the reference scenarios, or evaluates a single request against a
//! policy file and prints the recorded decision.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- customer-service
//!   cargo run -p demo -- decide --policy crates/lexecon-ref-governance/policies/customer_data.toml \
//!       --actor ai_agent:customer_service --action access_customer_data \
//!       --context '{"purpose":"support_ticket"}'

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use lexecon_contracts::{
    context::Context,
    error::{LexeconError, LexeconResult},
};
use lexecon_core::DecisionPipeline;
use lexecon_ledger::InMemoryLedger;
use lexecon_policy::PolicyEngine;
use lexecon_ref_governance::scenarios::{
    concurrent_load, customer_service, policy_reload, tamper_detection,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Lexecon — policy decisions with a tamper-evident ledger.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Lexecon governance core reference demo",
    long_about = "Runs reference scenarios showing fail-closed policy evaluation,\n\
                  policy reloads, concurrent decision recording, and ledger tamper detection."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all four scenarios in sequence.
    RunAll,
    /// Scenario 1: allowed support-ticket access and fail-closed marketing access.
    CustomerService,
    /// Scenario 2: atomic policy reload with an overriding rule.
    PolicyReload,
    /// Scenario 3: many workers deciding at once.
    ConcurrentLoad,
    /// Scenario 4: edited ledger copies are caught at the edited entry.
    TamperDetection,
    /// Evaluate one request against a policy file and print the decision.
    Decide {
        /// Path to a TOML policy document.
        #[arg(long)]
        policy: PathBuf,
        /// Actor identifier, e.g. "ai_agent:customer_service".
        #[arg(long)]
        actor: String,
        /// Action identifier, e.g. "access_customer_data".
        #[arg(long)]
        action: String,
        /// Context as a JSON object.
        #[arg(long, default_value = "{}")]
        context: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => {
            print_banner();
            run_all()
        }
        Command::CustomerService => customer_service::run_scenario(),
        Command::PolicyReload => policy_reload::run_scenario(),
        Command::ConcurrentLoad => concurrent_load::run_scenario(),
        Command::TamperDetection => tamper_detection::run_scenario(),
        Command::Decide {
            policy,
            actor,
            action,
            context,
        } => decide_once(&policy, actor, action, &context),
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(if e.is_client_error() { 2 } else { 1 });
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run_all() -> LexeconResult<()> {
    customer_service::run_scenario()?;
    policy_reload::run_scenario()?;
    concurrent_load::run_scenario()?;
    tamper_detection::run_scenario()?;
    println!("All scenarios completed successfully.");
    Ok(())
}

fn decide_once(
    policy: &std::path::Path,
    actor: String,
    action: String,
    context: &str,
) -> LexeconResult<()> {
    let context: Context = serde_json::from_str(context).map_err(|e| {
        LexeconError::InvalidRequest {
            reason: format!("context must be a JSON object: {}", e),
        }
    })?;

    let engine = Arc::new(PolicyEngine::from_file(policy)?);
    debug!(version = %engine.current().version(), "policy loaded");

    let ledger = Arc::new(InMemoryLedger::new());
    let pipeline = DecisionPipeline::new(engine, ledger);

    let decision = pipeline.decide_with(actor, action, context)?;
    let report = pipeline.verify_ledger();

    println!("{}", to_pretty(&decision)?);
    println!("{}", to_pretty(&report)?);
    Ok(())
}

fn to_pretty<T: serde::Serialize>(value: &T) -> LexeconResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| LexeconError::ConfigError {
        reason: format!("failed to render output: {}", e),
    })
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("LEXECON — Governance Control Plane Core");
    println!("=======================================");
    println!();
    println!("Per decision:");
    println!("  [1] Request shape validated (actor, action, finite context values)");
    println!("  [2] Policy graph walked in precedence order; first applicable rule decides");
    println!("  [3] No applicable rule → deny (fail-closed)");
    println!("  [4] Decision appended to the SHA-256 hash-chained ledger");
    println!("  [5] Decision returned with its ledger sequence number");
    println!();
}
