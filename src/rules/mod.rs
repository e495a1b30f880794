// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Prometheus recording and alerting rules
//!
//! A [`RulesFile`] renders to the `{groups: [...]}` YAML loaded through
//! `rule_files`. Rules are a closed union distinguished on the wire by the
//! presence of `alert` or `record`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::duration::Duration;
use crate::error::Result;
use crate::output::{self, is_zero_u32, WireFormat};

/// Label key written by [`AlertingRule::critical`] and friends
pub const SEVERITY_LABEL: &str = "severity";
pub const SUMMARY_ANNOTATION: &str = "summary";
pub const DESCRIPTION_ANNOTATION: &str = "description";
pub const RUNBOOK_ANNOTATION: &str = "runbook_url";

/// A rules file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesFile {
    pub groups: Vec<RuleGroup>,
}

impl RulesFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups(mut self, groups: Vec<RuleGroup>) -> Self {
        self.groups = groups;
        self
    }

    pub fn add_group(mut self, group: RuleGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn group(&self, name: &str) -> Option<&RuleGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Every rule across all groups, in file order
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.groups.iter().flat_map(|g| g.rules.iter())
    }

    pub fn alerting_rules(&self) -> impl Iterator<Item = &AlertingRule> {
        self.rules().filter_map(|r| match r {
            Rule::Alerting(a) => Some(a),
            Rule::Recording(_) => None,
        })
    }

    pub fn recording_rules(&self) -> impl Iterator<Item = &RecordingRule> {
        self.rules().filter_map(|r| match r {
            Rule::Recording(rec) => Some(rec),
            Rule::Alerting(_) => None,
        })
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        output::to_yaml(self)
    }

    pub fn serialize_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        output::write_atomic(path.as_ref(), &self.serialize()?)
    }
}

impl WireFormat for RulesFile {
    fn default_file_name(&self) -> String {
        "rules.yml".to_string()
    }

    fn to_wire(&self) -> Result<Vec<u8>> {
        self.serialize()
    }
}

/// A named group evaluated together at one interval
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleGroup {
    pub name: String,
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub interval: Duration,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub limit: u32,
    pub rules: Vec<Rule>,
}

impl RuleGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn add_rule(mut self, rule: impl Into<Rule>) -> Self {
        self.rules.push(rule.into());
        self
    }
}

/// Either kind of rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rule {
    Alerting(AlertingRule),
    Recording(RecordingRule),
}

impl Rule {
    /// Alert name or recorded series name
    pub fn name(&self) -> &str {
        match self {
            Rule::Alerting(a) => &a.alert,
            Rule::Recording(r) => &r.record,
        }
    }

    pub fn expr(&self) -> &str {
        match self {
            Rule::Alerting(a) => &a.expr,
            Rule::Recording(r) => &r.expr,
        }
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        match self {
            Rule::Alerting(a) => &a.labels,
            Rule::Recording(r) => &r.labels,
        }
    }
}

impl From<AlertingRule> for Rule {
    fn from(rule: AlertingRule) -> Self {
        Rule::Alerting(rule)
    }
}

impl From<RecordingRule> for Rule {
    fn from(rule: RecordingRule) -> Self {
        Rule::Recording(rule)
    }
}

/// An alert fired while `expr` has results for at least `for`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertingRule {
    pub alert: String,
    pub expr: String,
    #[serde(default, skip_serializing_if = "Duration::is_zero")]
    pub r#for: Duration,
    #[serde(default, skip_serializing_if = "Duration::is_zero")]
    pub keep_firing_for: Duration,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl AlertingRule {
    pub fn new(alert: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            alert: alert.into(),
            expr: expr.into(),
            ..Self::default()
        }
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = expr.into();
        self
    }

    pub fn with_for(mut self, duration: Duration) -> Self {
        self.r#for = duration;
        self
    }

    pub fn with_keep_firing_for(mut self, duration: Duration) -> Self {
        self.keep_firing_for = duration;
        self
    }

    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn add_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(name.into(), value.into());
        self
    }

    pub fn with_annotations(mut self, annotations: BTreeMap<String, String>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn add_annotation(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(name.into(), value.into());
        self
    }

    /// `severity: critical`
    pub fn critical(self) -> Self {
        self.add_label(SEVERITY_LABEL, "critical")
    }

    /// `severity: warning`
    pub fn warning(self) -> Self {
        self.add_label(SEVERITY_LABEL, "warning")
    }

    /// `severity: info`
    pub fn info(self) -> Self {
        self.add_label(SEVERITY_LABEL, "info")
    }

    pub fn with_summary(self, summary: impl Into<String>) -> Self {
        self.add_annotation(SUMMARY_ANNOTATION, summary)
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        self.add_annotation(DESCRIPTION_ANNOTATION, description)
    }

    pub fn with_runbook(self, url: impl Into<String>) -> Self {
        self.add_annotation(RUNBOOK_ANNOTATION, url)
    }

    pub fn severity(&self) -> Option<&str> {
        self.labels.get(SEVERITY_LABEL).map(String::as_str)
    }
}

/// Precomputes `expr` into the series `record`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingRule {
    pub record: String,
    pub expr: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl RecordingRule {
    pub fn new(record: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            record: record.into(),
            expr: expr.into(),
            labels: BTreeMap::new(),
        }
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = expr.into();
        self
    }

    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn add_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RulesFile {
        RulesFile::new().add_group(
            RuleGroup::new("api")
                .with_interval(Duration::seconds(30))
                .add_rule(RecordingRule::new(
                    "job:http_requests:rate5m",
                    "sum by (job) (rate(http_requests_total[5m]))",
                ))
                .add_rule(
                    AlertingRule::new("HighErrorRate", "job:http_errors:ratio5m > 0.05")
                        .with_for(Duration::minutes(10))
                        .critical()
                        .with_summary("High error rate on {{ $labels.job }}"),
                ),
        )
    }

    #[test]
    fn test_rules_yaml_shape() {
        let yaml = String::from_utf8(sample().serialize().unwrap()).unwrap();
        assert!(yaml.starts_with("groups:\n- name: api\n  interval: 30s\n  rules:\n"));
        assert!(yaml.contains("  - record: job:http_requests:rate5m\n"));
        assert!(yaml.contains("  - alert: HighErrorRate\n"));
        assert!(yaml.contains("    for: 10m\n"));
        assert!(yaml.contains("      severity: critical\n"));
    }

    #[test]
    fn test_untagged_round_trip() {
        let file = sample();
        let bytes = file.serialize().unwrap();
        let parsed: RulesFile = serde_yaml::from_slice(&bytes).unwrap();
        assert_eq!(parsed, file);
        assert!(matches!(parsed.groups[0].rules[0], Rule::Recording(_)));
        assert!(matches!(parsed.groups[0].rules[1], Rule::Alerting(_)));
    }

    #[test]
    fn test_fluent_severity_and_annotations() {
        let rule = AlertingRule::new("Down", "up == 0")
            .warning()
            .with_description("target down")
            .with_runbook("https://runbooks/down")
            .info();
        assert_eq!(rule.severity(), Some("info"));
        assert_eq!(rule.annotations["description"], "target down");
        assert_eq!(rule.annotations["runbook_url"], "https://runbooks/down");
    }

    #[test]
    fn test_rule_accessors() {
        let file = sample();
        assert_eq!(file.rules().count(), 2);
        assert_eq!(file.alerting_rules().next().unwrap().alert, "HighErrorRate");
        assert_eq!(file.recording_rules().next().unwrap().record, "job:http_requests:rate5m");
        let names: Vec<&str> = file.rules().map(Rule::name).collect();
        assert_eq!(names, vec!["job:http_requests:rate5m", "HighErrorRate"]);
    }

    #[test]
    fn test_zero_for_omitted() {
        let yaml = serde_yaml::to_string(&AlertingRule::new("A", "vector(1)")).unwrap();
        assert_eq!(yaml, "alert: A\nexpr: vector(1)\n");
    }
}
