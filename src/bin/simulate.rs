//! Rules simulator
//!
//! Evaluates one simulated operation against a rule document and prints the
//! decision as JSON. Exit status: 0 allowed, 2 denied, 1 on error (including
//! bad arguments).

use anyhow::{Context, Result};
use clap::Parser;
use pathguard::{load_rules, AuthContext, CachedMatcher, Operation};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pathguard-simulate")]
#[command(about = "Evaluate a single operation against a path rule document")]
struct Args {
    /// Path to the rule document (.toml or .json)
    #[arg(short = 'r', long)]
    rules: PathBuf,

    /// Operation to simulate (read, write)
    #[arg(short = 'o', long)]
    operation: Operation,

    /// Resource path, e.g. /users/alice
    #[arg(short = 'p', long)]
    path: String,

    /// Caller user ID (implies an authenticated caller)
    #[arg(short = 'u', long)]
    uid: Option<String>,

    /// Treat the caller as authenticated without a user ID
    #[arg(short = 'a', long)]
    authenticated: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    operation: Operation,
    path: &'a str,
    auth: &'a AuthContext,
    allowed: bool,
    matched_rule: Option<usize>,
    rule: Option<String>,
}

fn run(args: &Args) -> Result<bool> {
    let doc = load_rules(&args.rules)
        .with_context(|| format!("failed to load rules: {}", args.rules.display()))?;
    let matcher = doc.into_matcher().context("failed to compile rules")?;
    info!("Loaded {} rules from {:?}", matcher.rules().len(), args.rules);

    let auth = match &args.uid {
        Some(uid) => AuthContext::user(uid.clone()),
        None if args.authenticated => AuthContext::authenticated(),
        None => AuthContext::anonymous(),
    };

    let cached = CachedMatcher::from_config(matcher);
    let decision = cached
        .evaluate(args.operation, &args.path, &auth)
        .with_context(|| format!("failed to evaluate {} {}", args.operation, args.path))?;

    let report = Report {
        operation: args.operation,
        path: &args.path,
        auth: &auth,
        allowed: decision.allowed,
        matched_rule: decision.matched_rule.map(|id| id.0),
        rule: decision
            .matched_rule
            .and_then(|id| cached.matcher().rule(id))
            .map(|rule| rule.label()),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(decision.allowed)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // clap exits with 2 on bad arguments, which would read as a denial
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
