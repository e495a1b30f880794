// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Example: a complete monitoring stack
//!
//! Builds a Prometheus config, Alertmanager routing, an alerting rule file and
//! a Grafana dashboard, writes them under `build/` and lints the result.
//!
//! Run with:
//! ```sh
//! cargo run --example build_stack
//! ```

use std::error::Error;
use std::path::Path;

use wetwire_obs::alertmanager::{AlertmanagerConfig, Matcher, Receiver, Route, SlackConfig};
use wetwire_obs::grafana::{Dashboard, Panel, PrometheusTarget, Row};
use wetwire_obs::lint::lint_alertmanager;
use wetwire_obs::output::WireFormat;
use wetwire_obs::prometheus::{
    AlertmanagerEndpoint, GlobalConfig, PrometheusConfig, ScrapeConfig, StaticConfig,
};
use wetwire_obs::rules::{AlertingRule, RecordingRule, RuleGroup, RulesFile};
use wetwire_obs::Duration;

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== Wetwire Observability Stack ===\n");
    let out = Path::new("build");

    let prometheus = PrometheusConfig::new()
        .with_global(
            GlobalConfig::new()
                .with_scrape_interval(Duration::seconds(15))
                .with_evaluation_interval(Duration::seconds(30))
                .add_external_label("cluster", "demo"),
        )
        .add_scrape_config(
            ScrapeConfig::new("api")
                .with_metrics_path("/internal/metrics")
                .add_static_config(StaticConfig::new(["api-1:8080", "api-2:8080"]).add_label("tier", "web")),
        )
        .add_scrape_config(ScrapeConfig::new("node").add_static_config(StaticConfig::new(["node-1:9100"])))
        .add_rule_file("rules/*.yml")
        .add_alertmanager(AlertmanagerEndpoint::new(["alertmanager:9093"]));

    let rules = RulesFile::new().add_group(
        RuleGroup::new("api")
            .with_interval(Duration::seconds(30))
            .add_rule(RecordingRule::new(
                "job:http_errors:rate5m",
                "sum by (job) (rate(http_requests_total{code=~\"5..\"}[5m]))",
            ))
            .add_rule(
                AlertingRule::new("HighErrorRate", "job:http_errors:rate5m > 0.05")
                    .with_for(Duration::minutes(5))
                    .critical()
                    .with_summary("High 5xx rate on {{ $labels.job }}"),
            ),
    );

    let alertmanager = AlertmanagerConfig::new()
        .with_route(
            Route::new("slack")
                .with_group_by(["alertname", "job"])
                .with_group_wait(Duration::seconds(30))
                .add_route(Route::new("pager").add_matcher(Matcher::equal("severity", "critical"))),
        )
        .add_receiver(Receiver::new("slack").add_slack_config(SlackConfig::new("#alerts")))
        .add_receiver(Receiver::new("pager"));

    let dashboard = Dashboard::new("api-overview", "API Overview")
        .add_tag("api")
        .add_row(
            Row::new("Traffic")
                .add_panel(
                    Panel::timeseries("Requests")
                        .with_unit("reqps")
                        .add_target(PrometheusTarget::new("sum by (job) (rate(http_requests_total[5m]))")),
                )
                .add_panel(
                    Panel::stat("Error ratio")
                        .with_unit("percentunit")
                        .add_target(PrometheusTarget::new("job:http_errors:rate5m")),
                ),
        );

    prometheus.write_wire(&out.join(prometheus.default_file_name()))?;
    rules.write_wire(&out.join("rules").join("api.yml"))?;
    alertmanager.write_wire(&out.join(alertmanager.default_file_name()))?;
    dashboard.write_wire(&out.join("dashboards").join(dashboard.default_file_name()))?;

    println!("Wrote to {}:", out.display());
    for job in prometheus.job_names() {
        println!("  scrape job   {}", job);
    }
    println!("  rule groups  {}", rules.groups.len());
    println!("  receivers    {}", alertmanager.receiver_names().len());
    println!("  panels       {}", dashboard.panel_count());

    println!("\nAlertmanager lint:");
    let issues = lint_alertmanager(&alertmanager);
    if issues.is_empty() {
        println!("  clean");
    }
    for issue in issues {
        println!("  {} {}: {}", issue.severity, issue.rule_id, issue.message);
    }

    Ok(())
}
