// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Rules over loaded configuration values
//!
//! These see the whole tree after construction, so they catch what a
//! builder expression hides (values computed in helper functions, lists
//! assembled in loops). Issues carry no source location.

use std::collections::BTreeSet;

use super::source::is_recording_name;
use super::{promql, Finding, LintIssue};
use crate::alertmanager::{AlertmanagerConfig, HttpConfig};
use crate::duration::Duration;
use crate::grafana::{Dashboard, GridPos};
use crate::prometheus::{PrometheusConfig, ScrapeConfig, TlsConfig};
use crate::rules::{Rule, RulesFile};

const PROMETHEUS_DEFAULT_INTERVAL: Duration = Duration::minutes(1);
const PROMETHEUS_DEFAULT_TIMEOUT: Duration = Duration::seconds(10);

fn issues(findings: Vec<Finding>) -> Vec<LintIssue> {
    findings.into_iter().map(|f| LintIssue::from_finding(f, "")).collect()
}

fn tls(config: Option<&TlsConfig>, what: &str, out: &mut Vec<Finding>) {
    if config.is_some_and(|t| t.insecure_skip_verify) {
        out.push(Finding::new(
            "WOB201",
            format!("{}: TLS certificate verification is disabled", what),
            0,
        ));
    }
}

fn plain_http(url: &str, what: &str, out: &mut Vec<Finding>) {
    if url.starts_with("http://") {
        out.push(Finding::new(
            "WOB202",
            format!("{} endpoint {} uses plain http://", what, url),
            0,
        ));
    }
}

fn effective(value: Duration, global: Option<Duration>, default: Duration) -> Duration {
    if !value.is_zero() {
        value
    } else {
        global.filter(|d| !d.is_zero()).unwrap_or(default)
    }
}

fn scrape(job: &ScrapeConfig, config: &PrometheusConfig, out: &mut Vec<Finding>) {
    if job.job_name.is_empty() {
        out.push(Finding::new("WOB020", "scrape config job name is empty", 0));
    }

    let global = config.global.as_ref();
    let interval = effective(
        job.scrape_interval,
        global.map(|g| g.scrape_interval),
        PROMETHEUS_DEFAULT_INTERVAL,
    );
    let timeout = effective(
        job.scrape_timeout,
        global.map(|g| g.scrape_timeout),
        PROMETHEUS_DEFAULT_TIMEOUT,
    );
    if timeout > interval {
        out.push(Finding::new(
            "WOB021",
            format!(
                "job '{}': scrape timeout {} exceeds scrape interval {}",
                job.job_name, timeout, interval
            ),
            0,
        ));
    }

    if !job.has_targets() {
        out.push(Finding::new(
            "WOB022",
            format!("job '{}' has no static targets and no service discovery", job.job_name),
            0,
        ));
    }

    let what = format!("job '{}'", job.job_name);
    tls(job.tls_config.as_ref(), &what, out);
    for sd in &job.kubernetes_sd_configs {
        tls(sd.tls_config.as_ref(), &what, out);
    }
}

/// Invariants of one `prometheus.yml`
pub fn lint_prometheus(config: &PrometheusConfig) -> Vec<LintIssue> {
    let mut out = Vec::new();
    let mut seen = BTreeSet::new();
    for job in &config.scrape_configs {
        if !seen.insert(job.job_name.as_str()) && !job.job_name.is_empty() {
            out.push(Finding::new(
                "WOB023",
                format!("scrape job '{}' is defined more than once", job.job_name),
                0,
            ));
        }
        scrape(job, config, &mut out);
    }
    for remote in &config.remote_write {
        plain_http(&remote.url, "remote write", &mut out);
        tls(remote.tls_config.as_ref(), "remote write", &mut out);
    }
    for remote in &config.remote_read {
        tls(remote.tls_config.as_ref(), "remote read", &mut out);
    }
    if let Some(alerting) = &config.alerting {
        for endpoint in &alerting.alertmanagers {
            tls(endpoint.tls_config.as_ref(), "alertmanager endpoint", &mut out);
        }
    }
    issues(out)
}

fn http_config(config: Option<&HttpConfig>, what: &str, out: &mut Vec<Finding>) {
    tls(config.and_then(|c| c.tls_config.as_ref()), what, out);
}

/// Invariants of one `alertmanager.yml`, including the route tree
pub fn lint_alertmanager(config: &AlertmanagerConfig) -> Vec<LintIssue> {
    let mut out = Vec::new();

    if config.receivers.is_empty() {
        out.push(Finding::new("WOB050", "Alertmanager config has no receivers", 0));
    } else {
        for name in config.unresolved_receivers() {
            out.push(Finding::new(
                "WOB051",
                format!("route references receiver '{}' which is not defined", name),
                0,
            ));
        }
    }

    for receiver in &config.receivers {
        if receiver.integration_count() == 0 {
            out.push(Finding::new(
                "WOB052",
                format!("receiver '{}' has no notification integrations", receiver.name),
                0,
            ));
        }
        for webhook in &receiver.webhook_configs {
            plain_http(&webhook.url, "webhook", &mut out);
            http_config(webhook.http_config.as_ref(), "webhook", &mut out);
        }
    }

    // children inherit timing from their parent
    let mut pending = vec![(&config.route, Duration::ZERO, Duration::ZERO)];
    while let Some((route, group, repeat)) = pending.pop() {
        let group = if route.group_interval.is_zero() { group } else { route.group_interval };
        let repeat = if route.repeat_interval.is_zero() { repeat } else { route.repeat_interval };
        if !group.is_zero() && !repeat.is_zero() && repeat < group {
            out.push(Finding::new(
                "WOB053",
                format!(
                    "route to '{}': repeat interval {} is shorter than group interval {}",
                    route.receiver, repeat, group
                ),
                0,
            ));
        }
        pending.extend(route.routes.iter().rev().map(|child| (child, group, repeat)));
    }

    issues(out)
}

fn expression(name: &str, expr: &str, out: &mut Vec<Finding>) {
    if expr.trim().is_empty() {
        out.push(Finding::new("WOB083", format!("rule '{}' has an empty expression", name), 0));
        return;
    }
    for (rule, message) in promql::check(expr) {
        out.push(Finding::new(rule, format!("rule '{}': {}", name, message), 0));
    }
}

/// Invariants of one rules file
pub fn lint_rules(file: &RulesFile) -> Vec<LintIssue> {
    let mut out = Vec::new();
    for group in &file.groups {
        if group.rules.is_empty() {
            out.push(Finding::new(
                "WOB085",
                format!("rule group '{}' has no rules", group.name),
                0,
            ));
        }
        for rule in &group.rules {
            expression(rule.name(), rule.expr(), &mut out);
            match rule {
                Rule::Alerting(alert) => {
                    if alert.r#for.is_zero() {
                        out.push(Finding::new(
                            "WOB080",
                            format!("alert '{}' has no `for` duration", alert.alert),
                            0,
                        ));
                    }
                    if alert.severity().is_none() {
                        out.push(Finding::new(
                            "WOB081",
                            format!("alert '{}' has no severity label", alert.alert),
                            0,
                        ));
                    }
                    if !alert.annotations.contains_key("summary") {
                        out.push(Finding::new(
                            "WOB082",
                            format!("alert '{}' has no summary annotation", alert.alert),
                            0,
                        ));
                    }
                }
                Rule::Recording(recording) => {
                    if !is_recording_name(&recording.record) {
                        out.push(Finding::new(
                            "WOB084",
                            format!(
                                "recording rule '{}' does not follow level:metric:operations",
                                recording.record
                            ),
                            0,
                        ));
                    }
                }
            }
        }
    }
    issues(out)
}

/// Invariants of one dashboard, checked against its final layout
pub fn lint_dashboard(dashboard: &Dashboard) -> Vec<LintIssue> {
    let mut out = Vec::new();

    if dashboard.title.is_empty() {
        out.push(Finding::new("WOB120", "dashboard title is empty", 0));
    }
    if dashboard.tags.is_empty() {
        out.push(Finding::new("WOB121", "dashboard has no tags", 0));
    }
    if dashboard.uid.is_empty() {
        out.push(Finding::new("WOB122", "dashboard UID is empty", 0));
    } else if dashboard.uid.chars().count() > 40 {
        out.push(Finding::new(
            "WOB123",
            format!("dashboard UID is {} characters long (max 40)", dashboard.uid.chars().count()),
            0,
        ));
    }
    if dashboard.panel_count() == 0 {
        out.push(Finding::new("WOB124", "dashboard has no panels", 0));
    }

    let mut ids = BTreeSet::new();
    for panel in dashboard.panels() {
        if panel.title.is_empty() {
            out.push(Finding::new("WOB150", "panel title is empty", 0));
        }
        if panel.kind().shows_data() && panel.targets.is_empty() {
            out.push(Finding::new(
                "WOB151",
                format!("{} panel '{}' has no targets", panel.kind().as_str(), panel.title),
                0,
            ));
        }
        if let Some(id) = panel.id {
            if !ids.insert(id) {
                out.push(Finding::new("WOB153", format!("panel ID {} is used more than once", id), 0));
            }
        }
        if let Some(x) = panel.grid_pos.x {
            let w = panel.grid_pos.width();
            if x + w > GridPos::COLUMNS {
                out.push(Finding::new(
                    "WOB152",
                    format!("panel '{}' spans columns {}..{}, past the 24-column grid", panel.title, x, x + w),
                    0,
                ));
            }
        }
    }

    issues(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alertmanager::{Receiver, Route, WebhookConfig};
    use crate::grafana::{Panel, PrometheusTarget, Row};
    use crate::prometheus::{RemoteWrite, StaticConfig};
    use crate::rules::{AlertingRule, RecordingRule, RuleGroup};

    fn ids(issues: &[LintIssue]) -> Vec<&str> {
        let mut ids: Vec<&str> = issues.iter().map(|i| i.rule_id.as_str()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_prometheus_model() {
        let node = ScrapeConfig::new("node").add_static_config(StaticConfig::new(["a:9100"]));
        let config = PrometheusConfig::new()
            .add_scrape_config(node.clone())
            .add_scrape_config(node.with_scrape_interval(Duration::seconds(5)))
            .add_remote_write(RemoteWrite::new("http://cortex/push"));
        assert_eq!(ids(&lint_prometheus(&config)), vec!["WOB021", "WOB023", "WOB202"]);
    }

    #[test]
    fn test_alertmanager_model() {
        let config = AlertmanagerConfig::new()
            .with_route(
                Route::new("default")
                    .with_group_interval(Duration::minutes(10))
                    .add_route(Route::new("ghost").with_repeat_interval(Duration::minutes(5))),
            )
            .add_receiver(
                Receiver::new("default").add_webhook_config(WebhookConfig::new("https://hooks.example")),
            )
            .add_receiver(Receiver::new("empty"));
        let found = lint_alertmanager(&config);
        assert_eq!(ids(&found), vec!["WOB051", "WOB052", "WOB053"]);
        let unresolved = found.iter().find(|i| i.rule_id == "WOB051").unwrap();
        assert!(unresolved.message.contains("ghost"));
        assert_eq!(unresolved.line, 0);
    }

    #[test]
    fn test_rules_model() {
        let file = RulesFile::new()
            .add_group(
                RuleGroup::new("api")
                    .add_rule(AlertingRule::new("Down", "up == 0"))
                    .add_rule(RecordingRule::new("rate5m", "rate(free_bytes[5m])")),
            )
            .add_group(RuleGroup::new("empty"));
        assert_eq!(
            ids(&lint_rules(&file)),
            vec!["WOB080", "WOB081", "WOB082", "WOB084", "WOB085", "WOB100"]
        );
    }

    #[test]
    fn test_dashboard_model() {
        let dashboard = Dashboard::new("svc", "Service").with_tags(["svc"]).add_row(
            Row::new("Traffic")
                .add_panel(
                    Panel::timeseries("Requests")
                        .with_id(3)
                        .add_target(PrometheusTarget::new("sum(rate(requests_total[5m]))")),
                )
                .add_panel(Panel::stat("").with_id(3).with_position(18, 0).with_width(12)),
        );
        assert_eq!(
            ids(&lint_dashboard(&dashboard)),
            vec!["WOB150", "WOB151", "WOB152", "WOB153"]
        );

        let empty = Dashboard::new("", "");
        assert_eq!(
            ids(&lint_dashboard(&empty)),
            vec!["WOB120", "WOB121", "WOB122", "WOB124"]
        );
    }
}
