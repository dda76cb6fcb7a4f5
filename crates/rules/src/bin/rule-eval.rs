//! rule-eval — evaluate rule documents from the command line.
//!
//! Loads every document under the rules directory, evaluates it for the
//! given node attributes, resource and operation, and prints the outcome.
//! With `--follow` it keeps running: it sleeps until the earliest time any
//! date expression reported its result will change (or a rule file is
//! edited) and evaluates again.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::{debug, info, warn};

use crm_core::config::{load_dotenv, Config};
use crm_core::interval::parse_interval_ms;
use crm_core::iso8601::{format_datetime, parse_datetime};
use crm_rules::evaluator::{Evaluation, RuleEvaluator, RuleInput};
use crm_rules::loader::{LoadStatus, RuleLoader};
use crm_rules::outcome::NextChange;
use crm_rules::schema::RuleDocument;

// ── CLI ─────────────────────────────────────────────────────────────

/// Evaluate cluster rule documents against a node and resource.
#[derive(Parser, Debug)]
#[command(name = "rule-eval", version, about)]
struct Cli {
    /// Directory containing rule YAML files (overrides the configured one).
    #[arg(long, env = "RULES_DIR")]
    rules_dir: Option<PathBuf>,

    /// Only evaluate the document with this id.
    #[arg(long)]
    rule: Option<String>,

    /// Evaluation time (ISO 8601); defaults to now.
    #[arg(long, value_parser = parse_now, conflicts_with = "follow")]
    now: Option<DateTime<Utc>>,

    /// Node attribute, repeatable (`--attr '#uname=node1'`).
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    attrs: Vec<(String, String)>,

    /// Resource instance parameter, repeatable.
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    params: Vec<(String, String)>,

    /// Resource meta-attribute, repeatable.
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    meta: Vec<(String, String)>,

    /// Resource id to match location constraints against.
    #[arg(long)]
    rsc_id: Option<String>,

    /// Resource agent class (e.g. `ocf`).
    #[arg(long)]
    rsc_class: Option<String>,

    /// Resource agent provider (e.g. `heartbeat`).
    #[arg(long)]
    rsc_provider: Option<String>,

    /// Resource agent type (e.g. `IPaddr2`).
    #[arg(long)]
    rsc_type: Option<String>,

    /// Operation name (e.g. `monitor`).
    #[arg(long)]
    op_name: Option<String>,

    /// Operation interval (e.g. `10s`, `PT1M`).
    #[arg(long, value_parser = parse_interval, requires = "op_name")]
    op_interval: Option<u64>,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    /// Keep re-evaluating whenever a result may change.
    #[arg(long)]
    follow: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_now(s: &str) -> Result<DateTime<Utc>, String> {
    parse_datetime(s).map_err(|e| e.to_string())
}

fn parse_interval(s: &str) -> Result<u64, String> {
    parse_interval_ms(s).map_err(|e| e.to_string())
}

impl Cli {
    fn input(&self, now: DateTime<Utc>) -> RuleInput {
        let mut input = RuleInput::new(now);
        input.node_attrs.extend(self.attrs.iter().cloned());
        input.rsc_params.extend(self.params.iter().cloned());
        input.rsc_meta.extend(self.meta.iter().cloned());
        input.rsc_standard = self.rsc_class.clone();
        input.rsc_provider = self.rsc_provider.clone();
        input.rsc_agent = self.rsc_type.clone();
        input.op_name = self.op_name.clone();
        // An operation without an explicit interval is a one-shot (0ms)
        input.op_interval_ms = self.op_name.as_ref().map(|_| self.op_interval.unwrap_or(0));
        input.rsc_id = self.rsc_id.clone();
        input
    }
}

// ── Evaluation ──────────────────────────────────────────────────────

fn selected_documents(loader: &RuleLoader, only: Option<&str>) -> anyhow::Result<Vec<RuleDocument>> {
    match only {
        Some(id) => match loader.get(id) {
            Some(doc) => Ok(vec![doc]),
            None => bail!("no rule document with id '{id}' in {}", loader.rules_dir().display()),
        },
        None => Ok(loader.snapshot()),
    }
}

fn evaluate_all(
    docs: &[RuleDocument],
    input: &RuleInput,
    next_change: &mut NextChange,
) -> Vec<Evaluation> {
    let mut evaluations = Vec::new();
    for doc in docs {
        match RuleEvaluator::evaluate(doc, input, Some(next_change)) {
            Ok(Some(evaluation)) => evaluations.push(evaluation),
            Ok(None) => {}
            Err(e) => warn!(doc_id = %doc.metadata().id, error = %e, "evaluation failed"),
        }
    }
    evaluations
}

fn print_results(
    now: &DateTime<Utc>,
    evaluations: &[Evaluation],
    next_change: &NextChange,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let out = serde_json::json!({
            "now": format_datetime(now),
            "results": evaluations,
            "next_change": next_change.get().map(|t| format_datetime(&t)),
        });
        println!("{}", serde_json::to_string(&out)?);
        return Ok(());
    }

    println!("Evaluated at {}", format_datetime(now));
    for evaluation in evaluations {
        let mut line = format!(
            "  {:<32} {:<18} {}",
            evaluation.id,
            evaluation.kind.to_string(),
            if evaluation.passed() { "pass" } else { "fail" },
        );
        line.push_str(&format!(" ({})", evaluation.outcome));
        if let Some(rsc_id) = &evaluation.rsc_id {
            line.push_str(&format!(" rsc={rsc_id}"));
        }
        if let Some(score) = evaluation.score {
            line.push_str(&format!(" score={score}"));
        }
        println!("{line}");
    }
    match next_change.get() {
        Some(at) => println!("Next change: {}", format_datetime(&at)),
        None => println!("Next change: none"),
    }
    Ok(())
}

/// Sleep until `deadline` (capped at `max_sleep`) or until the loader
/// reports a reload, whichever comes first.
fn wait_for_change(loader: &RuleLoader, deadline: Option<DateTime<Utc>>, max_sleep: Duration) {
    let generation = loader.generation();
    let wait = deadline
        .map(|at| (at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
        .map_or(max_sleep, |until| until.min(max_sleep));
    debug!(wait_ms = wait.as_millis() as u64, "sleeping until next change");

    let tick = Duration::from_millis(250);
    let mut slept = Duration::ZERO;
    while slept < wait {
        let step = tick.min(wait - slept);
        thread::sleep(step);
        slept += step;
        if loader.generation() != generation {
            info!("rule documents changed, re-evaluating");
            return;
        }
    }
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    load_dotenv();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    config.log_summary();

    let rules_dir = cli.rules_dir.clone().unwrap_or_else(|| config.rules.rules_dir.clone());
    let mut loader = RuleLoader::new(rules_dir);
    let results = loader
        .load_all()
        .with_context(|| format!("failed to scan {}", loader.rules_dir().display()))?;
    let failed = results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Failed { .. }))
        .count();
    info!(
        loaded = results.iter().filter(|r| r.is_loaded()).count(),
        failed,
        "rule documents loaded"
    );

    if cli.follow && config.rules.watch {
        loader.watch().context("failed to watch rules directory")?;
    }

    let max_sleep = Duration::from_secs(config.rules.follow_max_sleep_secs.max(1));
    loop {
        let now = cli.now.unwrap_or_else(Utc::now);
        let docs = selected_documents(&loader, cli.rule.as_deref())?;
        let input = cli.input(now);
        let mut next_change = NextChange::new();

        let evaluations = evaluate_all(&docs, &input, &mut next_change);
        print_results(&now, &evaluations, &next_change, cli.json)?;

        if !cli.follow {
            return Ok(());
        }
        wait_for_change(&loader, next_change.get(), max_sleep);
    }
}
