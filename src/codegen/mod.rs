// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Code generation
//!
//! Turns an imported configuration tree back into Rust source built from
//! this crate's builders. Every receiver, child route, scrape job, remote
//! write, rule group, row, panel and template variable becomes its own
//! `pub static` binding; the top-level binding (`CONFIG`, `RULES` or
//! `DASHBOARD`) references them by name.
//!
//! Output is deterministic and formatted with `prettyplease`.
//!
//! # Example
//!
//! ```no_run
//! use wetwire_obs::codegen::generate_source;
//! use wetwire_obs::importer::import_file;
//!
//! let imported = import_file("prometheus.yml")?;
//! let source = generate_source(&imported.config, "monitoring")?;
//! std::fs::write("monitoring.rs", source)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod expr;
pub mod ident;

pub use expr::ToExpr;

use proc_macro2::{Ident, TokenStream, TokenTree};
use quote::{format_ident, quote};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::alertmanager::{AlertmanagerConfig, Receiver, Route};
use crate::error::Error;
use crate::grafana::{Dashboard, Panel, PanelKind, PanelOptions, Row, Target, Variable};
use crate::importer::ImportedConfig;
use crate::output;
use crate::prometheus::{PrometheusConfig, RemoteWrite, ScrapeConfig};
use crate::rules::{AlertingRule, RecordingRule, Rule, RuleGroup, RulesFile};
use expr::str_lit;
use ident::{pascal_case, role_ident, screaming_snake, NameTable};

/// Codegen errors
#[derive(Error, Debug)]
pub enum CodegenError {
    /// The emitted tokens did not parse as a Rust file; `unformatted` holds them
    #[error("generated source failed to format: {message}")]
    Format { message: String, unformatted: Vec<u8> },

    #[error("invalid package name '{0}'")]
    PackageName(String),

    #[error(transparent)]
    Source(#[from] Error),
}

pub type CodegenResult<T> = std::result::Result<T, CodegenError>;

/// Top-level binding names
pub const CONFIG_BINDING: &str = "CONFIG";
pub const RULES_BINDING: &str = "RULES";
pub const DASHBOARD_BINDING: &str = "DASHBOARD";

/// Emits Rust source for one configuration tree
pub fn generate_source(config: &ImportedConfig, package: &str) -> CodegenResult<Vec<u8>> {
    let mut emitter = Generator::default();
    let (module, format) = match config {
        ImportedConfig::Prometheus(c) => {
            emitter.names.reserve(CONFIG_BINDING);
            let chain = emitter.prometheus(c);
            emitter.push_static(CONFIG_BINDING, quote!(PrometheusConfig), chain);
            (quote!(prometheus), "Prometheus")
        }
        ImportedConfig::Alertmanager(c) => {
            emitter.names.reserve(CONFIG_BINDING);
            let chain = emitter.alertmanager(c);
            emitter.push_static(CONFIG_BINDING, quote!(AlertmanagerConfig), chain);
            (quote!(alertmanager), "Alertmanager")
        }
        ImportedConfig::Rules(c) => {
            emitter.names.reserve(RULES_BINDING);
            let chain = emitter.rules(c);
            emitter.push_static(RULES_BINDING, quote!(RulesFile), chain);
            (quote!(rules), "Prometheus rules")
        }
        ImportedConfig::Dashboard(c) => {
            emitter.names.reserve(DASHBOARD_BINDING);
            let chain = emitter.dashboard(c);
            emitter.push_static(DASHBOARD_BINDING, quote!(Dashboard), chain);
            (quote!(grafana), "Grafana dashboard")
        }
    };

    let statics = emitter.statics;
    let body = quote!(#(#statics)*);

    let mut imports = vec![quote!(use std::sync::LazyLock;), quote!(use wetwire_obs::#module::*;)];
    if matches!(config, ImportedConfig::Alertmanager(_)) {
        let shared: Vec<Ident> = ["BasicAuth", "TlsConfig"]
            .iter()
            .filter(|name| mentions(&body, name))
            .map(|name| format_ident!("{}", name))
            .collect();
        if !shared.is_empty() {
            imports.push(quote!(use wetwire_obs::prometheus::{#(#shared),*};));
        }
    }
    if mentions(&body, "Duration") {
        imports.push(quote!(use wetwire_obs::Duration;));
    }

    let doc = format!(
        " {} configuration for the `{}` package, generated by wetwire-obs import.",
        format, package
    );
    let tokens = quote! {
        #![doc = #doc]
        #(#imports)*
        #body
    };
    format_tokens(tokens)
}

/// Write a fresh Cargo package (`Cargo.toml` + `src/lib.rs`) around the generated source
///
/// `library` points the dependency on this crate at a local checkout;
/// without it the published version is used.
pub fn generate_package(
    config: &ImportedConfig,
    package: &str,
    dir: impl AsRef<Path>,
    library: Option<&Path>,
) -> CodegenResult<Vec<PathBuf>> {
    if !is_package_name(package) {
        return Err(CodegenError::PackageName(package.to_string()));
    }
    let dir = dir.as_ref();
    let source = generate_source(config, package)?;

    let dependency = match library {
        Some(path) => format!("{{ path = {:?} }}", path.display().to_string()),
        None => format!("\"{}\"", crate::VERSION),
    };
    let manifest = format!(
        "[package]\nname = \"{}\"\nversion = \"0.1.0\"\nedition = \"2021\"\n\n\
         [dependencies]\nwetwire-observability = {}\nserde_json = \"1.0\"\n",
        package, dependency
    );

    let manifest_path = dir.join("Cargo.toml");
    let lib_path = dir.join("src").join("lib.rs");
    output::write_atomic(&manifest_path, manifest.as_bytes())?;
    output::write_atomic(&lib_path, &source)?;
    Ok(vec![manifest_path, lib_path])
}

fn is_package_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn format_tokens(tokens: TokenStream) -> CodegenResult<Vec<u8>> {
    match syn::parse2::<syn::File>(tokens.clone()) {
        Ok(file) => Ok(prettyplease::unparse(&file).into_bytes()),
        Err(e) => Err(CodegenError::Format {
            message: e.to_string(),
            unformatted: tokens.to_string().into_bytes(),
        }),
    }
}

/// Whether `name` appears as an identifier anywhere in `tokens`
fn mentions(tokens: &TokenStream, name: &str) -> bool {
    tokens.clone().into_iter().any(|tt| match tt {
        TokenTree::Ident(ident) => ident == name,
        TokenTree::Group(group) => mentions(&group.stream(), name),
        _ => false,
    })
}

/// Appends `.method(args)` calls to a builder chain
struct Chain(TokenStream);

impl Chain {
    fn new(head: TokenStream) -> Self {
        Chain(head)
    }

    fn call(&mut self, method: &str, args: TokenStream) {
        let method = format_ident!("{}", method);
        self.0.extend(quote!(.#method(#args)));
    }

    fn call_if(&mut self, cond: bool, method: &str, args: TokenStream) {
        if cond {
            self.call(method, args);
        }
    }

    fn into_tokens(self) -> TokenStream {
        self.0
    }
}

#[derive(Default)]
struct Generator {
    names: NameTable,
    statics: Vec<TokenStream>,
}

impl Generator {
    fn push_static(&mut self, name: &str, ty: TokenStream, chain: TokenStream) {
        let name = format_ident!("{}", name);
        self.statics.push(quote! {
            pub static #name: LazyLock<#ty> = LazyLock::new(|| #chain);
        });
    }

    /// Claim a static name for `ident` and emit it; returns `NAME.clone()`
    fn bind(&mut self, ident: &str, ty: TokenStream, chain: TokenStream) -> TokenStream {
        let name = self.names.claim(&screaming_snake(ident));
        self.push_static(&name, ty, chain);
        let name = format_ident!("{}", name);
        quote!(#name.clone())
    }

    // ---- Prometheus ----

    fn prometheus(&mut self, config: &PrometheusConfig) -> TokenStream {
        let PrometheusConfig {
            global,
            scrape_configs,
            rule_files,
            alerting,
            remote_write,
            remote_read,
        } = config;

        let mut chain = Chain::new(quote!(PrometheusConfig::new()));
        if let Some(global) = global {
            chain.call("with_global", global.to_expr());
        }
        for job in scrape_configs {
            let job = self.scrape_config(job);
            chain.call("add_scrape_config", job);
        }
        for file in rule_files {
            chain.call("add_rule_file", str_lit(file));
        }
        if let Some(alerting) = alerting {
            chain.call("with_alerting", alerting.to_expr());
        }
        for rw in remote_write {
            let rw = self.remote_write(rw);
            chain.call("add_remote_write", rw);
        }
        for rr in remote_read {
            chain.call("add_remote_read", rr.to_expr());
        }
        chain.into_tokens()
    }

    fn scrape_config(&mut self, job: &ScrapeConfig) -> TokenStream {
        let ScrapeConfig {
            job_name,
            honor_labels,
            honor_timestamps,
            scrape_interval,
            scrape_timeout,
            metrics_path,
            scheme,
            params,
            basic_auth,
            bearer_token_file,
            tls_config,
            static_configs,
            file_sd_configs,
            kubernetes_sd_configs,
            relabel_configs,
            metric_relabel_configs,
            sample_limit,
        } = job;

        let name = str_lit(job_name);
        let mut chain = Chain::new(quote!(ScrapeConfig::new(#name)));
        chain.call_if(*honor_labels, "with_honor_labels", quote!(true));
        if let Some(honor) = honor_timestamps {
            chain.call("with_honor_timestamps", quote!(#honor));
        }
        chain.call_if(!scrape_interval.is_zero(), "with_scrape_interval", scrape_interval.to_expr());
        chain.call_if(!scrape_timeout.is_zero(), "with_scrape_timeout", scrape_timeout.to_expr());
        chain.call_if(!metrics_path.is_empty(), "with_metrics_path", str_lit(metrics_path));
        chain.call_if(!scheme.is_empty(), "with_scheme", str_lit(scheme));
        for (param, values) in params {
            for value in values {
                let (k, v) = (str_lit(param), str_lit(value));
                chain.call("add_param", quote!(#k, #v));
            }
        }
        if let Some(auth) = basic_auth {
            chain.call("with_basic_auth", auth.to_expr());
        }
        chain.call_if(
            !bearer_token_file.is_empty(),
            "with_bearer_token_file",
            str_lit(bearer_token_file),
        );
        if let Some(tls) = tls_config {
            chain.call("with_tls_config", tls.to_expr());
        }
        for sc in static_configs {
            chain.call("add_static_config", sc.to_expr());
        }
        for sd in file_sd_configs {
            chain.call("add_file_sd_config", sd.to_expr());
        }
        for sd in kubernetes_sd_configs {
            chain.call("add_kubernetes_sd_config", sd.to_expr());
        }
        for rc in relabel_configs {
            chain.call("add_relabel_config", rc.to_expr());
        }
        for rc in metric_relabel_configs {
            chain.call("add_metric_relabel_config", rc.to_expr());
        }
        chain.call_if(*sample_limit != 0, "with_sample_limit", sample_limit.to_expr());

        let ident = role_ident(job_name, "Scrape", "Config");
        self.bind(&ident, quote!(ScrapeConfig), chain.into_tokens())
    }

    fn remote_write(&mut self, rw: &RemoteWrite) -> TokenStream {
        let RemoteWrite {
            url,
            name,
            remote_timeout,
            headers,
            write_relabel_configs,
            basic_auth,
            bearer_token_file,
            tls_config,
            queue_config,
        } = rw;

        let target = str_lit(url);
        let mut chain = Chain::new(quote!(RemoteWrite::new(#target)));
        chain.call_if(!name.is_empty(), "with_name", str_lit(name));
        chain.call_if(!remote_timeout.is_zero(), "with_remote_timeout", remote_timeout.to_expr());
        for (header, value) in headers {
            let (k, v) = (str_lit(header), str_lit(value));
            chain.call("add_header", quote!(#k, #v));
        }
        for rc in write_relabel_configs {
            chain.call("add_write_relabel_config", rc.to_expr());
        }
        if let Some(auth) = basic_auth {
            chain.call("with_basic_auth", auth.to_expr());
        }
        chain.call_if(
            !bearer_token_file.is_empty(),
            "with_bearer_token_file",
            str_lit(bearer_token_file),
        );
        if let Some(tls) = tls_config {
            chain.call("with_tls_config", tls.to_expr());
        }
        if let Some(queue) = queue_config {
            chain.call("with_queue_config", queue.to_expr());
        }

        let label = if name.is_empty() { host_of(url) } else { name.as_str() };
        let ident = role_ident(label, "RemoteWrite", "Config");
        self.bind(&ident, quote!(RemoteWrite), chain.into_tokens())
    }

    // ---- Alertmanager ----

    fn alertmanager(&mut self, config: &AlertmanagerConfig) -> TokenStream {
        let AlertmanagerConfig {
            global,
            route,
            receivers,
            inhibit_rules,
            mute_time_intervals,
            templates,
        } = config;

        let mut chain = Chain::new(quote!(AlertmanagerConfig::new()));
        if let Some(global) = global {
            chain.call("with_global", global.to_expr());
        }
        let root = self.route_chain(route);
        chain.call("with_route", root);
        for receiver in receivers {
            let receiver = self.receiver(receiver);
            chain.call("add_receiver", receiver);
        }
        for rule in inhibit_rules {
            chain.call("add_inhibit_rule", rule.to_expr());
        }
        for interval in mute_time_intervals {
            chain.call("add_mute_time_interval", interval.to_expr());
        }
        for template in templates {
            chain.call("add_template", str_lit(template));
        }
        chain.into_tokens()
    }

    /// Builder chain for one route; child routes become statics
    fn route_chain(&mut self, route: &Route) -> TokenStream {
        let Route {
            receiver,
            group_by,
            r#continue,
            matchers,
            group_wait,
            group_interval,
            repeat_interval,
            mute_time_intervals,
            active_time_intervals,
            routes,
        } = route;

        let name = str_lit(receiver);
        let mut chain = Chain::new(quote!(Route::new(#name)));
        if !group_by.is_empty() {
            let labels = group_by.iter().map(|l| str_lit(l));
            chain.call("with_group_by", quote!([#(#labels),*]));
        }
        chain.call_if(*r#continue, "with_continue", quote!(true));
        for matcher in matchers {
            chain.call("add_matcher", matcher.to_expr());
        }
        chain.call_if(!group_wait.is_zero(), "with_group_wait", group_wait.to_expr());
        chain.call_if(!group_interval.is_zero(), "with_group_interval", group_interval.to_expr());
        chain.call_if(!repeat_interval.is_zero(), "with_repeat_interval", repeat_interval.to_expr());
        for interval in mute_time_intervals {
            chain.call("add_mute_time_interval", str_lit(interval));
        }
        for interval in active_time_intervals {
            chain.call("add_active_time_interval", str_lit(interval));
        }
        for child in routes {
            let tokens = self.route_chain(child);
            let ident = role_ident(&child.receiver, "Route", "Config");
            let child = self.bind(&ident, quote!(Route), tokens);
            chain.call("add_route", child);
        }
        chain.into_tokens()
    }

    fn receiver(&mut self, receiver: &Receiver) -> TokenStream {
        let Receiver {
            name,
            email_configs,
            slack_configs,
            pagerduty_configs,
            opsgenie_configs,
            webhook_configs,
        } = receiver;

        let label = str_lit(name);
        let mut chain = Chain::new(quote!(Receiver::new(#label)));
        for c in email_configs {
            chain.call("add_email_config", c.to_expr());
        }
        for c in slack_configs {
            chain.call("add_slack_config", c.to_expr());
        }
        for c in pagerduty_configs {
            chain.call("add_pagerduty_config", c.to_expr());
        }
        for c in opsgenie_configs {
            chain.call("add_opsgenie_config", c.to_expr());
        }
        for c in webhook_configs {
            chain.call("add_webhook_config", c.to_expr());
        }

        let ident = role_ident(name, "Receiver", "Config");
        self.bind(&ident, quote!(Receiver), chain.into_tokens())
    }

    // ---- Rules ----

    fn rules(&mut self, file: &RulesFile) -> TokenStream {
        let RulesFile { groups } = file;
        let mut chain = Chain::new(quote!(RulesFile::new()));
        for group in groups {
            let group = self.rule_group(group);
            chain.call("add_group", group);
        }
        chain.into_tokens()
    }

    fn rule_group(&mut self, group: &RuleGroup) -> TokenStream {
        let RuleGroup {
            name,
            interval,
            limit,
            rules,
        } = group;

        let label = str_lit(name);
        let mut chain = Chain::new(quote!(RuleGroup::new(#label)));
        chain.call_if(!interval.is_zero(), "with_interval", interval.to_expr());
        chain.call_if(*limit != 0, "with_limit", limit.to_expr());
        for rule in rules {
            let rule = match rule {
                Rule::Alerting(a) => alerting_rule(a),
                Rule::Recording(r) => recording_rule(r),
            };
            chain.call("add_rule", rule);
        }

        let ident = role_ident(name, "Group", "Rules");
        self.bind(&ident, quote!(RuleGroup), chain.into_tokens())
    }

    // ---- Grafana ----

    fn dashboard(&mut self, dashboard: &Dashboard) -> TokenStream {
        let Dashboard {
            uid,
            title,
            description,
            tags,
            timezone,
            editable,
            graph_tooltip,
            time,
            refresh,
            schema_version,
            rows,
            variables,
            annotations,
            links,
        } = dashboard;
        let defaults = Dashboard::default();

        let (uid_lit, title_lit) = (str_lit(uid), str_lit(title));
        let mut chain = Chain::new(quote!(Dashboard::new(#uid_lit, #title_lit)));
        chain.call_if(!description.is_empty(), "with_description", str_lit(description));
        if !tags.is_empty() {
            let tags = tags.iter().map(|t| str_lit(t));
            chain.call("with_tags", quote!([#(#tags),*]));
        }
        chain.call_if(!timezone.is_empty(), "with_timezone", str_lit(timezone));
        chain.call_if(*editable != defaults.editable, "with_editable", quote!(#editable));
        chain.call_if(*graph_tooltip != 0, "with_graph_tooltip", graph_tooltip.to_expr());
        if *time != defaults.time {
            let (from, to) = (str_lit(&time.from), str_lit(&time.to));
            chain.call("with_time", quote!(#from, #to));
        }
        chain.call_if(!refresh.is_empty(), "with_refresh", str_lit(refresh));
        chain.call_if(
            *schema_version != defaults.schema_version,
            "with_schema_version",
            schema_version.to_expr(),
        );
        for row in rows {
            let row = self.row(row, title);
            chain.call("add_row", row);
        }
        for variable in variables {
            let variable = self.variable(variable);
            chain.call("add_variable", variable);
        }
        for annotation in annotations {
            chain.call("add_annotation", annotation.to_expr());
        }
        for link in links {
            chain.call("add_link", link.to_expr());
        }
        chain.into_tokens()
    }

    fn row(&mut self, row: &Row, dashboard_title: &str) -> TokenStream {
        let Row {
            title,
            collapsed,
            panels,
        } = row;

        let label = str_lit(title);
        let mut chain = Chain::new(quote!(Row::new(#label)));
        chain.call_if(*collapsed, "with_collapsed", quote!(true));
        for panel in panels {
            let panel = self.panel(panel);
            chain.call("add_panel", panel);
        }

        let base = if title.is_empty() { dashboard_title } else { title.as_str() };
        let ident = role_ident(base, "Row", "Dashboard");
        self.bind(&ident, quote!(Row), chain.into_tokens())
    }

    fn panel(&mut self, panel: &Panel) -> TokenStream {
        let Panel {
            id,
            title,
            description,
            datasource,
            grid_pos,
            targets,
            field_config,
            transparent,
            options,
        } = panel;

        let label = str_lit(title);
        let kind = options.kind();
        let head = if *options == PanelOptions::default_for(kind) {
            let ctor = format_ident!("{}", panel_constructor(kind));
            quote!(Panel::#ctor(#label))
        } else {
            let options = options.to_expr();
            quote!(Panel::new(#label, #options))
        };
        let mut chain = Chain::new(head);
        if let Some(id) = id {
            chain.call("with_id", id.to_expr());
        }
        chain.call_if(!description.is_empty(), "with_description", str_lit(description));
        if let Some(ds) = datasource {
            chain.call("with_datasource", ds.to_expr());
        }
        chain.call_if(*grid_pos != Default::default(), "with_grid_pos", grid_pos.to_expr());
        for target in targets {
            let inner = match target {
                Target::Prometheus(t) => t.to_expr(),
                Target::Loki(t) => t.to_expr(),
            };
            chain.call("add_target", inner);
        }
        chain.call_if(
            *field_config != Default::default(),
            "with_field_config",
            field_config.to_expr(),
        );
        chain.call_if(*transparent, "with_transparent", quote!(true));

        let ident = role_ident(title, "Panel", &pascal_case(kind.as_str()));
        self.bind(&ident, quote!(Panel), chain.into_tokens())
    }

    fn variable(&mut self, variable: &Variable) -> TokenStream {
        let Variable {
            name,
            kind,
            label,
            datasource,
            query,
            regex,
            refresh,
            sort,
            multi,
            include_all,
            hide,
        } = variable;

        let (var_name, var_kind) = (str_lit(name), kind.to_expr());
        let mut chain = Chain::new(quote!(Variable::new(#var_name, #var_kind)));
        chain.call_if(!label.is_empty(), "with_label", str_lit(label));
        if let Some(ds) = datasource {
            chain.call("with_datasource", ds.to_expr());
        }
        chain.call_if(!query.is_empty(), "with_query", str_lit(query));
        chain.call_if(!regex.is_empty(), "with_regex", str_lit(regex));
        if let Some(refresh) = refresh {
            chain.call("with_refresh", refresh.to_expr());
        }
        if let Some(sort) = sort {
            chain.call("with_sort", sort.to_expr());
        }
        chain.call_if(*multi, "with_multi", quote!(true));
        chain.call_if(*include_all, "with_include_all", quote!(true));
        if let Some(hide) = hide {
            chain.call("with_hide", hide.to_expr());
        }

        let ident = role_ident(name, "Var", "Dashboard");
        self.bind(&ident, quote!(Variable), chain.into_tokens())
    }
}

fn alerting_rule(rule: &AlertingRule) -> TokenStream {
    let AlertingRule {
        alert,
        expr,
        r#for,
        keep_firing_for,
        labels,
        annotations,
    } = rule;

    let (name, query) = (str_lit(alert), str_lit(expr));
    let mut chain = Chain::new(quote!(AlertingRule::new(#name, #query)));
    chain.call_if(!r#for.is_zero(), "with_for", r#for.to_expr());
    chain.call_if(!keep_firing_for.is_zero(), "with_keep_firing_for", keep_firing_for.to_expr());
    for (key, value) in labels {
        match (key.as_str(), value.as_str()) {
            ("severity", level @ ("critical" | "warning" | "info")) => chain.call(level, quote!()),
            _ => {
                let (k, v) = (str_lit(key), str_lit(value));
                chain.call("add_label", quote!(#k, #v));
            }
        }
    }
    for (key, value) in annotations {
        let text = str_lit(value);
        match key.as_str() {
            "summary" => chain.call("with_summary", text),
            "description" => chain.call("with_description", text),
            "runbook_url" => chain.call("with_runbook", text),
            _ => {
                let k = str_lit(key);
                chain.call("add_annotation", quote!(#k, #text));
            }
        }
    }
    chain.into_tokens()
}

fn recording_rule(rule: &RecordingRule) -> TokenStream {
    let RecordingRule { record, expr, labels } = rule;
    let (name, query) = (str_lit(record), str_lit(expr));
    let mut chain = Chain::new(quote!(RecordingRule::new(#name, #query)));
    for (key, value) in labels {
        let (k, v) = (str_lit(key), str_lit(value));
        chain.call("add_label", quote!(#k, #v));
    }
    chain.into_tokens()
}

fn panel_constructor(kind: PanelKind) -> &'static str {
    match kind {
        PanelKind::Timeseries => "timeseries",
        PanelKind::Stat => "stat",
        PanelKind::Table => "table",
        PanelKind::Gauge => "gauge",
        PanelKind::BarGauge => "bar_gauge",
        PanelKind::PieChart => "pie_chart",
        PanelKind::Text => "text",
        PanelKind::Logs => "logs",
        PanelKind::Heatmap => "heatmap",
    }
}

/// `https://cortex.example.com:9009/api/v1/push` → `cortex.example.com`
fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    let host = rest.split(['/', ':', '?']).next().unwrap_or(rest);
    host.split('.').next().unwrap_or(host)
}
