//! Integration tests that load every example document in
//! `data/rules/examples/` and evaluate it end to end.

use chrono::{DateTime, Utc};
use crm_core::iso8601::parse_datetime;
use crm_rules::evaluator::INFINITY;
use crm_rules::loader::{parse_document, RuleLoader};
use crm_rules::schema::{RuleDocument, RuleKind, RuleExpression};
use crm_rules::{NextChange, RuleEvaluator, RuleInput, RuleOutcome};

/// Resolve the examples directory relative to the workspace root.
/// Integration tests run from the crate directory, so we go up two levels.
fn examples_dir() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data/rules/examples")
}

fn load_doc(filename: &str) -> RuleDocument {
    let path = examples_dir().join(filename);
    let yaml = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    parse_document(&yaml).unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
}

fn at(text: &str) -> DateTime<Utc> {
    parse_datetime(text).unwrap()
}

fn outcome_of(doc: &RuleDocument, input: &RuleInput, next: Option<&mut NextChange>) -> RuleOutcome {
    RuleEvaluator::evaluate(doc, input, next)
        .unwrap()
        .expect("document should be evaluated")
        .outcome
}

// ── loader ──────────────────────────────────────────────────

#[test]
fn loader_loads_every_example() {
    let loader = RuleLoader::new(examples_dir());
    let results = loader.load_all().unwrap();
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r.is_loaded()), "{results:?}");

    let ids: Vec<String> = loader.snapshot().iter().map(|d| d.metadata().id.clone()).collect();
    assert_eq!(
        ids,
        vec!["business-hours", "ip-prefers-fast-nodes", "maintenance-window", "monitor-op"]
    );
}

// ── business-hours.yml ──────────────────────────────────────

#[test]
fn business_hours_example() {
    let doc = load_doc("business-hours.yml");
    assert_eq!(doc.kind(), RuleKind::Rule);
    let rule = &doc.as_rule().unwrap().rule;
    assert!(matches!(rule.expressions[0], RuleExpression::DateExpression(_)));

    // Wednesday morning
    let input = RuleInput::new(at("2024-06-05T10:30:00Z"));
    assert!(outcome_of(&doc, &input, None).passed());

    // Wednesday evening
    let input = RuleInput::new(at("2024-06-05T18:00:00Z"));
    assert!(!outcome_of(&doc, &input, None).passed());

    // Saturday morning
    let input = RuleInput::new(at("2024-06-08T10:30:00Z"));
    assert!(!outcome_of(&doc, &input, None).passed());

    // Node in standby
    let input = RuleInput::new(at("2024-06-05T10:30:00Z")).with_node_attr("standby", "on");
    assert_eq!(outcome_of(&doc, &input, None), RuleOutcome::OpUnsatisfied);
}

// ── maintenance-window.yml ──────────────────────────────────

#[test]
fn maintenance_window_example() {
    let doc = load_doc("maintenance-window.yml");

    let mut next = NextChange::new();
    let input = RuleInput::new(at("2024-06-01T00:00:00Z"));
    assert_eq!(outcome_of(&doc, &input, Some(&mut next)), RuleOutcome::BeforeRange);
    assert_eq!(next.get(), Some(at("2024-06-01T02:00:00Z")));

    let mut next = NextChange::new();
    let input = RuleInput::new(at("2024-06-01T05:00:00Z"));
    assert_eq!(outcome_of(&doc, &input, Some(&mut next)), RuleOutcome::WithinRange);
    assert_eq!(next.get(), Some(at("2024-06-01T08:00:01Z")));

    let mut next = NextChange::new();
    let input = RuleInput::new(at("2024-06-01T08:00:01Z"));
    assert_eq!(outcome_of(&doc, &input, Some(&mut next)), RuleOutcome::AfterRange);
    assert!(!next.is_set());
}

// ── ip-prefers-fast-nodes.yml ───────────────────────────────

#[test]
fn ip_prefers_fast_nodes_example() {
    let doc = load_doc("ip-prefers-fast-nodes.yml");
    assert_eq!(doc.kind(), RuleKind::LocationConstraint);

    let now = at("2024-06-05T10:30:00Z");

    // Weight found through the %1 submatch of the resource id
    let input = RuleInput::new(now)
        .with_node_attr("#uname", "node2")
        .with_node_attr("10.0.0.1-weight", "20");
    let input = RuleInput { rsc_id: Some("ip-10.0.0.1".into()), ..input };
    let evaluation = RuleEvaluator::evaluate(&doc, &input, None).unwrap().unwrap();
    assert!(evaluation.passed());
    assert_eq!(evaluation.rsc_id.as_deref(), Some("ip-10.0.0.1"));
    assert_eq!(evaluation.score, Some(INFINITY));

    // Low weight on a node other than node1
    let input = RuleInput::new(now)
        .with_node_attr("#uname", "node2")
        .with_node_attr("10.0.0.1-weight", "5");
    let input = RuleInput { rsc_id: Some("ip-10.0.0.1".into()), ..input };
    assert!(!outcome_of(&doc, &input, None).passed());

    // Resource not selected by the pattern
    let input = RuleInput::new(now).with_node_attr("#uname", "node1");
    let input = RuleInput { rsc_id: Some("db-main".into()), ..input };
    assert_eq!(outcome_of(&doc, &input, None), RuleOutcome::OpUnsatisfied);

    // No resource to match against
    let input = RuleInput::new(now);
    assert!(RuleEvaluator::evaluate(&doc, &input, None).unwrap().is_none());
}

// ── monitor-op.yml ──────────────────────────────────────────

#[test]
fn monitor_op_example() {
    let doc = load_doc("monitor-op.yml");
    let now = at("2024-06-05T10:30:00Z");

    let input = RuleInput::new(now)
        .with_resource("ocf", Some("heartbeat"), "IPaddr2")
        .with_operation("monitor", 10_000)
        .with_param("min-cores", "4")
        .with_node_attr("cpu-cores", "8");
    assert_eq!(outcome_of(&doc, &input, None), RuleOutcome::Ok);

    // Different interval
    let input = RuleInput::new(now)
        .with_resource("ocf", Some("heartbeat"), "IPaddr2")
        .with_operation("monitor", 20_000)
        .with_param("min-cores", "4")
        .with_node_attr("cpu-cores", "8");
    assert_eq!(outcome_of(&doc, &input, None), RuleOutcome::OpUnsatisfied);

    // Different agent
    let input = RuleInput::new(now)
        .with_resource("ocf", Some("pacemaker"), "Dummy")
        .with_operation("monitor", 10_000)
        .with_param("min-cores", "4")
        .with_node_attr("cpu-cores", "8");
    assert_eq!(outcome_of(&doc, &input, None), RuleOutcome::OpUnsatisfied);

    // Too few cores for the resource's requirement
    let input = RuleInput::new(now)
        .with_resource("ocf", Some("heartbeat"), "IPaddr2")
        .with_operation("monitor", 10_000)
        .with_param("min-cores", "16")
        .with_node_attr("cpu-cores", "8");
    assert_eq!(outcome_of(&doc, &input, None), RuleOutcome::OpUnsatisfied);
}
