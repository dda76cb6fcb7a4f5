//! Tests for schema types.

use super::*;
use crate::expression_type::ExpressionType;

const BUSINESS_HOURS_YAML: &str = r##"
apiVersion: v1
kind: Rule
metadata:
  id: business-hours
  name: Business Hours
  description: Weekdays between 09:00 and 17:59
  tags: [time, schedule]
rule:
  id: business-hours-rule
  boolean_op: and
  expressions:
    - date_expression:
        id: weekdays
        operation: date_spec
        date_spec:
          hours: 9-17
          weekdays: 1-5
    - expression:
        id: not-standby
        attribute: standby
        operation: ne
        value: "on"
"##;

const LOCATION_YAML: &str = r##"
apiVersion: v1
kind: LocationConstraint
metadata:
  id: ip-prefers-fast-nodes
  name: IP addresses prefer fast nodes
rsc_pattern: "^ip-(.*)$"
score: INFINITY
rules:
  - boolean_op: or
    expressions:
      - expression:
          attribute: "%1-weight"
          operation: gte
          value: 10
      - rule:
          expressions:
            - expression:
                attribute: "#uname"
                operation: eq
                value: node1
"##;

#[test]
fn parse_rule_definition() {
    let doc: RuleDefinition = serde_yaml::from_str(BUSINESS_HOURS_YAML).unwrap();
    assert_eq!(doc.api_version, "v1");
    assert_eq!(doc.metadata.id, "business-hours");
    assert!(doc.metadata.enabled);
    assert_eq!(doc.rule.id.as_deref(), Some("business-hours-rule"));
    assert_eq!(doc.rule.expressions.len(), 2);

    match &doc.rule.expressions[0] {
        RuleExpression::DateExpression(expr) => {
            assert_eq!(expr.operation.as_deref(), Some("date_spec"));
            let spec = expr.date_spec.as_ref().unwrap();
            assert_eq!(spec.hours.as_deref(), Some("9-17"));
            assert_eq!(spec.weekdays.as_deref(), Some("1-5"));
            assert!(spec.moon.is_none());
        }
        other => panic!("expected date_expression, got {other:?}"),
    }
    assert_eq!(doc.rule.expressions[1].element_name(), "expression");
    assert_eq!(doc.rule.expressions[1].id(), Some("not-standby"));
}

#[test]
fn parse_location_constraint() {
    let doc: LocationConstraint = serde_yaml::from_str(LOCATION_YAML).unwrap();
    assert!(doc.rsc.is_none());
    assert_eq!(doc.rsc_pattern.as_deref(), Some("^ip-(.*)$"));
    assert_eq!(doc.score.as_deref(), Some("INFINITY"));
    assert_eq!(doc.rules.len(), 1);

    let rule = &doc.rules[0];
    assert_eq!(BooleanOp::parse(rule.boolean_op.as_deref()), BooleanOp::Or);
    match &rule.expressions[0] {
        RuleExpression::Expression(expr) => {
            // Unquoted integers are kept as text
            assert_eq!(expr.value.as_deref(), Some("10"));
            assert_eq!(expr.attribute.as_deref(), Some("%1-weight"));
        }
        other => panic!("expected expression, got {other:?}"),
    }
    assert_eq!(rule.expressions[1].expression_type(), ExpressionType::Rule);
}

#[test]
fn unquoted_scalars_become_text() {
    let yaml = r##"
operation: in_range
start: 2024-01-01
duration:
  months: 1
  days: -2
  hours: "1.50"
"##;
    let expr: DateExpression = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(expr.start.as_deref(), Some("2024-01-01"));
    let duration = expr.duration.unwrap();
    assert_eq!(duration.months.as_deref(), Some("1"));
    assert_eq!(duration.days.as_deref(), Some("-2"));
    assert_eq!(duration.hours.as_deref(), Some("1.50"));
    assert!(duration.years.is_none());
}

#[test]
fn quoted_floats_keep_their_text() {
    let yaml = "attribute: kernel\noperation: gt\ntype: version\nvalue: \"6.10\"\n";
    let expr: AttributeExpression = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(expr.value.as_deref(), Some("6.10"));
}

#[test]
fn unquoted_floats_are_rejected() {
    // 6.10 would otherwise be read back as "6.1"
    let yaml = "attribute: kernel\noperation: gt\ntype: version\nvalue: 6.10\n";
    let err = serde_yaml::from_str::<AttributeExpression>(yaml).unwrap_err();
    assert!(err.to_string().contains("must be quoted"), "{err}");

    let yaml = "months: 1\nhours: 1.50\n";
    assert!(serde_yaml::from_str::<DurationSpec>(yaml).is_err());
}

#[test]
fn large_unsigned_integers_keep_their_text() {
    let yaml = "attribute: bytes\noperation: gt\nvalue: 18446744073709551615\n";
    let expr: AttributeExpression = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(expr.value.as_deref(), Some("18446744073709551615"));
}

#[test]
fn rule_reads_single_key_expression_maps() {
    let yaml = "id: r\nexpressions:\n  - expression:\n      attribute: cpu\n      operation: defined\n";
    let rule: Rule = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(rule.expressions.len(), 1);
    assert_eq!(rule.expressions[0].element_name(), "expression");
}

#[test]
fn nested_rules_read_and_write_single_key_maps() {
    let yaml = r##"
boolean_op: or
expressions:
  - rule:
      expressions:
        - date_expression:
            operation: gt
            start: 2024-01-01
  - op_expression:
      name: start
"##;
    let rule: Rule = serde_yaml::from_str(yaml).unwrap();
    match &rule.expressions[0] {
        RuleExpression::Rule(nested) => {
            assert!(matches!(nested.expressions[0], RuleExpression::DateExpression(_)));
        }
        other => panic!("expected rule, got {other:?}"),
    }

    let written = serde_yaml::to_string(&rule).unwrap();
    assert!(written.contains("- rule:"), "{written}");
    assert!(written.contains("- date_expression:"), "{written}");
    assert!(!written.contains('!'), "{written}");
    assert_eq!(serde_yaml::from_str::<Rule>(&written).unwrap(), rule);
}

#[test]
fn resource_and_op_expressions_use_element_field_names() {
    let yaml = r##"
expressions:
  - rsc_expression:
      class: ocf
      provider: heartbeat
      type: IPaddr2
  - op_expression:
      name: monitor
      interval: 10s
"##;
    let exprs = serde_yaml::from_str::<Rule>(yaml).unwrap().expressions;
    match &exprs[0] {
        RuleExpression::RscExpression(rsc) => {
            assert_eq!(rsc.standard.as_deref(), Some("ocf"));
            assert_eq!(rsc.provider.as_deref(), Some("heartbeat"));
            assert_eq!(rsc.agent.as_deref(), Some("IPaddr2"));
        }
        other => panic!("expected rsc_expression, got {other:?}"),
    }
    match &exprs[1] {
        RuleExpression::OpExpression(op) => {
            assert_eq!(op.name.as_deref(), Some("monitor"));
            assert_eq!(op.interval.as_deref(), Some("10s"));
        }
        other => panic!("expected op_expression, got {other:?}"),
    }
}

#[test]
fn boolean_op_parsing() {
    assert_eq!(BooleanOp::parse(None), BooleanOp::And);
    assert_eq!(BooleanOp::parse(Some("AND")), BooleanOp::And);
    assert_eq!(BooleanOp::parse(Some("Or")), BooleanOp::Or);
    assert_eq!(BooleanOp::parse(Some("xor")), BooleanOp::Unknown);
}

#[test]
fn round_trip() {
    let doc: LocationConstraint = serde_yaml::from_str(LOCATION_YAML).unwrap();
    let yaml = serde_yaml::to_string(&doc).unwrap();
    let doc2: LocationConstraint = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(doc, doc2);
}

#[test]
fn malformed_yaml_errors() {
    // Missing required field
    let missing_meta = r##"
apiVersion: v1
kind: Rule
rule:
  expressions: []
"##;
    assert!(serde_yaml::from_str::<RuleDefinition>(missing_meta).is_err());

    // Unknown expression element
    let bad_element = r##"
apiVersion: v1
kind: Rule
metadata:
  id: test
  name: Test
rule:
  expressions:
    - time_expression:
        operation: gt
"##;
    assert!(serde_yaml::from_str::<RuleDefinition>(bad_element).is_err());

    // Unknown field in strict struct
    let unknown_field = r##"
apiVersion: v1
kind: Rule
metadata:
  id: test
  name: Test
rule:
  expressions:
    - date_expression:
        operation: gt
        bogus_field: oops
"##;
    assert!(serde_yaml::from_str::<RuleDefinition>(unknown_field).is_err());
}

// ── RuleKind / RuleEnvelope / RuleDocument tests ────────────────

#[test]
fn rule_kind_from_str() {
    assert_eq!("Rule".parse::<RuleKind>().unwrap(), RuleKind::Rule);
    assert_eq!(
        "LocationConstraint".parse::<RuleKind>().unwrap(),
        RuleKind::LocationConstraint
    );
    assert!("AnomalyRule".parse::<RuleKind>().is_err());
}

#[test]
fn rule_kind_display() {
    assert_eq!(RuleKind::Rule.to_string(), "Rule");
    assert_eq!(RuleKind::LocationConstraint.to_string(), "LocationConstraint");
}

#[test]
fn rule_envelope_unknown_kind_errors() {
    let yaml = r##"
apiVersion: v1
kind: UnknownKind
metadata:
  id: test
  name: Test
"##;
    let envelope: RuleEnvelope = serde_yaml::from_str(yaml).unwrap();
    assert!(envelope.rule_kind().is_err());
    assert!(envelope.parse_full().is_err());
}

#[test]
fn rule_envelope_parse_full() {
    let envelope: RuleEnvelope = serde_yaml::from_str(LOCATION_YAML).unwrap();
    assert_eq!(envelope.kind, "LocationConstraint");
    let doc = envelope.parse_full().unwrap();
    assert_eq!(doc.kind(), RuleKind::LocationConstraint);
    assert_eq!(doc.metadata().id, "ip-prefers-fast-nodes");
    assert!(doc.as_rule().is_none());
    assert_eq!(doc.as_location().unwrap().rules.len(), 1);

    let envelope: RuleEnvelope = serde_yaml::from_str(BUSINESS_HOURS_YAML).unwrap();
    let doc = envelope.parse_full().unwrap();
    assert_eq!(doc.kind(), RuleKind::Rule);
    assert_eq!(doc.as_rule().unwrap().rule.expressions.len(), 2);
}

#[test]
fn rule_document_serializes_with_header() {
    let doc: RuleDefinition = serde_yaml::from_str(BUSINESS_HOURS_YAML).unwrap();
    let yaml = RuleDocument::Rule(doc.clone()).to_yaml().unwrap();
    assert!(yaml.contains("apiVersion: v1"), "{yaml}");
    assert!(yaml.contains("kind: Rule"), "{yaml}");
    assert_eq!(serde_yaml::from_str::<RuleDefinition>(&yaml).unwrap(), doc);
}
