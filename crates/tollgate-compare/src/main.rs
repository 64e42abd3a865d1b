//! Tollgate comparison CLI
//!
//! Evaluates a comparison policy file against a set of variable bindings.
//!
//! Usage:
//!   tollgate-compare --policy policy.yaml --vars request.json [--json]

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use tollgate_compare::config::{load_bindings, PolicyFile};
use tollgate_compare::variables::VariableBindings;
use tollgate_compare::{ComparisonAssertion, Outcome};

/// Tollgate comparison assertion evaluator
#[derive(Parser, Debug)]
#[command(name = "tollgate-compare")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Policy file (YAML, or JSON with a .json extension)
    #[arg(short, long)]
    policy: PathBuf,

    /// JSON object of variable bindings
    #[arg(long)]
    vars: Option<PathBuf>,

    /// Print the verdict as JSON
    #[arg(long)]
    json: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, env = "TOLLGATE_LOG", default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = init_logging(&args.log_level) {
        eprintln!("{e:#}");
        std::process::exit(2);
    }

    match run(&args) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}

/// Evaluate and print; `Ok(true)` when the comparison passed.
fn run(args: &Args) -> Result<bool> {
    let file = PolicyFile::from_file(&args.policy)
        .with_context(|| format!("Failed to load policy {}", args.policy.display()))?;
    let bindings = match &args.vars {
        Some(path) => load_bindings(path)
            .with_context(|| format!("Failed to load bindings {}", path.display()))?,
        None => VariableBindings::new(),
    };

    let assertion = ComparisonAssertion::new(file.policy, file.options)?;
    let verdict = assertion.check_policy(&bindings)?;

    if args.json {
        let (outcome, index, predicate) = match &verdict.outcome {
            Outcome::Pass => ("pass", None, None),
            Outcome::Fail { index, predicate } => ("fail", Some(*index), Some(predicate.to_string())),
            Outcome::NullLeftValue => ("nullLeftValue", None, None),
        };
        let report = json!({
            "outcome": outcome,
            "failedIndex": index,
            "failedPredicate": predicate,
            "evaluated": verdict.evaluated,
            "value": verdict.value.as_ref().map(|v| v.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", verdict.outcome);
    }

    Ok(verdict.outcome.is_pass())
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
