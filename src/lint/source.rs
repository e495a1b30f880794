// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Rules over the field maps of discovered bindings

use std::collections::{BTreeMap, BTreeSet};

use super::fields::{FieldMap, Node};
use super::{promql, Finding};

const SEVERITY_MARKERS: [&str; 3] = ["critical", "warning", "info"];
const DATA_PANELS: [&str; 8] = [
    "timeseries",
    "stat",
    "table",
    "gauge",
    "bar_gauge",
    "pie_chart",
    "logs",
    "heatmap",
];

/// All source-rule findings for one binding
pub(crate) fn check_binding(name: &str, map: &FieldMap) -> Vec<Finding> {
    let mut out = Vec::new();
    if map.is_bare() {
        out.push(Finding::new(
            "WOB001",
            format!("{} is initialised with no fields", name),
            map.line,
        ));
    }
    walk(map, &mut out);
    out
}

fn walk(map: &FieldMap, out: &mut Vec<Finding>) {
    match map.type_name.as_str() {
        "PrometheusConfig" => prometheus(map, out),
        "ScrapeConfig" => scrape(map, out),
        "RemoteWrite" => http_endpoint(map, "remote write", out),
        "WebhookConfig" => http_endpoint(map, "webhook", out),
        "TlsConfig" => tls(map, out),
        "BasicAuth" => secret(map, "password", out),
        "HttpConfig" => secret(map, "bearer_token", out),
        "EmailConfig" => {
            auth_pair(map, "auth", out);
            secret(map, "auth_password", out);
        }
        "SlackConfig" => secret(map, "api_url", out),
        "Global" => {
            auth_pair(map, "smtp_auth", out);
            secret(map, "smtp_auth_password", out);
            secret(map, "opsgenie_api_key", out);
        }
        "PagerdutyConfig" => {
            secret(map, "routing_key", out);
            secret(map, "service_key", out);
        }
        "OpsgenieConfig" => secret(map, "api_key", out),
        "AlertmanagerConfig" => alertmanager(map, out),
        "Receiver" => receiver(map, out),
        "Route" => route(map, out),
        "AlertingRule" => alerting_rule(map, out),
        "RecordingRule" => recording_rule(map, out),
        "RuleGroup" => rule_group(map, out),
        "Dashboard" => dashboard(map, out),
        "Panel" => panel(map, out),
        "PrometheusTarget" => expression(map, out),
        _ => {}
    }
    for child in map.children() {
        walk(child, out);
    }
}

fn line_of(map: &FieldMap, name: &str) -> usize {
    map.fields
        .iter()
        .rev()
        .find(|f| f.name == name)
        .map(|f| f.line)
        .unwrap_or(map.line)
}

/// A required string is empty, or missing from a complete struct literal
fn is_blank(map: &FieldMap, name: &str) -> bool {
    match map.get(name) {
        Some(Node::Str(s)) => s.is_empty(),
        Some(_) => false,
        None => !map.opaque && !map.has(name),
    }
}

fn prometheus(map: &FieldMap, out: &mut Vec<Finding>) {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for job in map.list("scrape_configs").into_iter().filter_map(Node::as_object) {
        if let Some(name) = job.get("job_name").and_then(Node::as_str) {
            let count = seen.entry(name).or_default();
            *count += 1;
            if *count == 2 {
                out.push(Finding::new(
                    "WOB023",
                    format!("scrape job '{}' is defined more than once", name),
                    job.line,
                ));
            }
        }
    }
}

fn scrape(map: &FieldMap, out: &mut Vec<Finding>) {
    if is_blank(map, "job_name") {
        out.push(Finding::new("WOB020", "scrape config job name is empty", line_of(map, "job_name")));
    }

    let interval = map.get("scrape_interval").and_then(Node::as_duration);
    let timeout = map.get("scrape_timeout").and_then(Node::as_duration);
    if let (Some(interval), Some(timeout)) = (interval, timeout) {
        if timeout > interval {
            out.push(Finding::new(
                "WOB021",
                format!("scrape timeout {} exceeds scrape interval {}", timeout, interval),
                line_of(map, "scrape_timeout"),
            ));
        }
    }

    let sources = ["static_configs", "file_sd_configs", "kubernetes_sd_configs"];
    if !map.opaque && sources.iter().all(|s| map.list(s).is_empty()) {
        let job = map.get("job_name").and_then(Node::as_str).unwrap_or_default();
        out.push(Finding::new(
            "WOB022",
            format!("scrape config '{}' has no static targets and no service discovery", job),
            map.line,
        ));
    }
}

fn http_endpoint(map: &FieldMap, what: &str, out: &mut Vec<Finding>) {
    if let Some(url) = map.get("url").and_then(Node::as_str) {
        if url.starts_with("http://") {
            out.push(Finding::new(
                "WOB202",
                format!("{} endpoint {} uses plain http://", what, url),
                line_of(map, "url"),
            ));
        }
    }
}

fn tls(map: &FieldMap, out: &mut Vec<Finding>) {
    if map.get("insecure_skip_verify") == Some(&Node::Bool(true)) {
        out.push(Finding::new(
            "WOB201",
            "TLS certificate verification is disabled",
            line_of(map, "insecure_skip_verify"),
        ));
    }
}

fn secret(map: &FieldMap, name: &str, out: &mut Vec<Finding>) {
    if map.get(name).and_then(Node::as_str).is_some_and(|s| !s.is_empty()) {
        out.push(Finding::new(
            "WOB200",
            format!("{}.{} is a hard-coded literal", map.type_name, name),
            line_of(map, name),
        ));
    }
}

/// `with_auth(user, password)` style setters; the password is the second argument
fn auth_pair(map: &FieldMap, name: &str, out: &mut Vec<Finding>) {
    let literal = map
        .fields
        .iter()
        .rev()
        .find(|f| f.name == name)
        .and_then(|f| f.args.get(1))
        .and_then(Node::as_str)
        .is_some_and(|s| !s.is_empty());
    if literal {
        out.push(Finding::new(
            "WOB200",
            format!("{} password is a hard-coded literal", map.type_name),
            line_of(map, name),
        ));
    }
}

fn alertmanager(map: &FieldMap, out: &mut Vec<Finding>) {
    let receivers = map.list("receivers");
    if !map.opaque && receivers.is_empty() {
        out.push(Finding::new("WOB050", "Alertmanager config has no receivers", map.line));
        return;
    }
    if map.opaque {
        return;
    }

    let names: Option<BTreeSet<&str>> = receivers
        .iter()
        .map(|r| r.as_object().and_then(|r| r.get("name")).and_then(Node::as_str))
        .collect();
    let (Some(names), Some(root)) = (names, map.get("route").and_then(Node::as_object)) else {
        return;
    };

    let mut pending = vec![root];
    while let Some(route) = pending.pop() {
        if let Some(receiver) = route.get("receiver").and_then(Node::as_str) {
            if !receiver.is_empty() && !names.contains(receiver) {
                out.push(Finding::new(
                    "WOB051",
                    format!("route references receiver '{}' which is not defined", receiver),
                    line_of(route, "receiver"),
                ));
            }
        }
        pending.extend(route.list("routes").into_iter().filter_map(Node::as_object));
    }
}

fn receiver(map: &FieldMap, out: &mut Vec<Finding>) {
    let integrations = [
        "email_configs",
        "slack_configs",
        "pagerduty_configs",
        "opsgenie_configs",
        "webhook_configs",
    ];
    if !map.opaque && integrations.iter().all(|i| map.list(i).is_empty()) {
        let name = map.get("name").and_then(Node::as_str).unwrap_or_default();
        out.push(Finding::new(
            "WOB052",
            format!("receiver '{}' has no notification integrations", name),
            map.line,
        ));
    }
}

fn route(map: &FieldMap, out: &mut Vec<Finding>) {
    let group = map.get("group_interval").and_then(Node::as_duration);
    let repeat = map.get("repeat_interval").and_then(Node::as_duration);
    if let (Some(group), Some(repeat)) = (group, repeat) {
        if repeat < group {
            out.push(Finding::new(
                "WOB053",
                format!("repeat interval {} is shorter than group interval {}", repeat, group),
                line_of(map, "repeat_interval"),
            ));
        }
    }
}

fn expression(map: &FieldMap, out: &mut Vec<Finding>) {
    let Some(expr) = map.get("expr").and_then(Node::as_str) else {
        return;
    };
    let line = line_of(map, "expr");
    if expr.trim().is_empty() {
        out.push(Finding::new("WOB083", "expression is empty", line));
        return;
    }
    for (rule, message) in promql::check(expr) {
        out.push(Finding::new(rule, message, line));
    }
}

fn alerting_rule(map: &FieldMap, out: &mut Vec<Finding>) {
    expression(map, out);
    if map.opaque {
        return;
    }
    let alert = map.get("alert").and_then(Node::as_str).unwrap_or_default();

    if !map.has("for") {
        out.push(Finding::new(
            "WOB080",
            format!("alert '{}' has no `for` duration and fires on the first evaluation", alert),
            map.line,
        ));
    }
    let has_severity = SEVERITY_MARKERS.iter().any(|m| map.called(m))
        || map.keys("labels").iter().any(|k| k == "severity");
    if !has_severity {
        out.push(Finding::new(
            "WOB081",
            format!("alert '{}' has no severity label", alert),
            map.line,
        ));
    }
    let has_summary = map.has("summary") || map.keys("annotations").iter().any(|k| k == "summary");
    if !has_summary {
        out.push(Finding::new(
            "WOB082",
            format!("alert '{}' has no summary annotation", alert),
            map.line,
        ));
    }
}

/// `level:metric:operations`
pub(crate) fn is_recording_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split(':').collect();
    parts.len() >= 3 && parts.iter().all(|p| !p.is_empty())
}

fn recording_rule(map: &FieldMap, out: &mut Vec<Finding>) {
    expression(map, out);
    if let Some(record) = map.get("record").and_then(Node::as_str) {
        if !is_recording_name(record) {
            out.push(Finding::new(
                "WOB084",
                format!("recording rule '{}' does not follow level:metric:operations", record),
                line_of(map, "record"),
            ));
        }
    }
}

fn rule_group(map: &FieldMap, out: &mut Vec<Finding>) {
    if !map.opaque && map.list("rules").is_empty() {
        let name = map.get("name").and_then(Node::as_str).unwrap_or_default();
        out.push(Finding::new(
            "WOB085",
            format!("rule group '{}' has no rules", name),
            map.line,
        ));
    }
}

fn dashboard(map: &FieldMap, out: &mut Vec<Finding>) {
    if is_blank(map, "title") {
        out.push(Finding::new("WOB120", "dashboard title is empty", line_of(map, "title")));
    }
    if !map.opaque && map.list("tags").is_empty() {
        out.push(Finding::new("WOB121", "dashboard has no tags", map.line));
    }
    if is_blank(map, "uid") {
        out.push(Finding::new("WOB122", "dashboard UID is empty", line_of(map, "uid")));
    }
    if let Some(uid) = map.get("uid").and_then(Node::as_str) {
        if uid.chars().count() > 40 {
            out.push(Finding::new(
                "WOB123",
                format!("dashboard UID is {} characters long (max 40)", uid.chars().count()),
                line_of(map, "uid"),
            ));
        }
    }

    let rows = map.list("rows");
    let rows_known = rows.iter().all(|r| r.as_object().is_some_and(|r| !r.opaque));
    let panels: Vec<&FieldMap> = rows
        .iter()
        .filter_map(|r| r.as_object())
        .flat_map(|r| r.list("panels"))
        .filter_map(Node::as_object)
        .collect();
    let panels_known = rows
        .iter()
        .filter_map(|r| r.as_object())
        .all(|r| r.list_is_known("panels"));
    if !map.opaque && rows_known && panels_known && panels.is_empty() {
        out.push(Finding::new("WOB124", "dashboard has no panels", map.line));
    }

    let mut ids = BTreeSet::new();
    for panel in panels {
        if let Some(id) = panel.get("id").and_then(Node::as_num) {
            if !ids.insert(id as u64) {
                out.push(Finding::new(
                    "WOB153",
                    format!("panel ID {} is used more than once", id),
                    line_of(panel, "id"),
                ));
            }
        }
    }
}

fn panel(map: &FieldMap, out: &mut Vec<Finding>) {
    if let Some(Node::Str(title)) = map.get("title") {
        if title.is_empty() {
            out.push(Finding::new("WOB150", "panel title is empty", line_of(map, "title")));
        }
    }

    if !map.opaque
        && DATA_PANELS.contains(&map.constructor.as_str())
        && map.list("targets").is_empty()
    {
        let title = map.get("title").and_then(Node::as_str).unwrap_or_default();
        out.push(Finding::new(
            "WOB151",
            format!("{} panel '{}' has no targets", map.constructor, title),
            map.line,
        ));
    }

    let (x, w) = grid_x_w(map);
    if let (Some(x), Some(w)) = (x, w) {
        if x + w > 24.0 {
            out.push(Finding::new(
                "WOB152",
                format!("panel spans columns {}..{}, past the 24-column grid", x, x + w),
                map.line,
            ));
        }
    }
}

/// Horizontal placement from `with_grid_pos`, `with_position`, `with_size` and `with_width`
fn grid_x_w(map: &FieldMap) -> (Option<f64>, Option<f64>) {
    let mut x = None;
    let mut w = None;
    for field in &map.fields {
        match field.name.as_str() {
            "grid_pos" => {
                if let Some(pos) = field.args.first().and_then(Node::as_object) {
                    x = pos.get("x").and_then(Node::as_num);
                    w = pos.get("w").and_then(Node::as_num);
                }
            }
            "position" => x = field.args.first().and_then(Node::as_num),
            "size" | "width" => w = field.args.first().and_then(Node::as_num),
            _ => {}
        }
    }
    (x, w.or(x.map(|_| 12.0)))
}
