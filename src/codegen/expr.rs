// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Rust expression emission for model values
//!
//! Leaf records become struct literals naming only the fields that differ
//! from `Default`, closed with `..Default::default()`. The destructuring
//! pattern in each impl lists every field, so adding a field to a model
//! type without teaching it here is a compile error.

use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};
use std::collections::BTreeMap;

use crate::alertmanager::{
    EmailConfig, Global, HttpConfig, InhibitRule, MatchOp, Matcher, MuteTimeInterval,
    OpsgenieConfig, PagerdutyConfig, SlackConfig, TimeInterval, TimeRange, WebhookConfig,
};
use crate::duration::Duration;
use crate::grafana::{
    Annotation, BarGaugeOptions, DashboardLink, DashboardTime, DataSourceRef, FieldColor,
    FieldConfig, FieldDefaults, GaugeOptions, GridPos, HeatmapColor, HeatmapOptions,
    LegendOptions, LogsOptions, LokiTarget, PanelOptions, PieChartOptions, PrometheusTarget,
    ReduceOptions, StatOptions, TableOptions, Target, TextOptions, ThresholdStep, Thresholds,
    TimeseriesOptions, TooltipOptions, VariableKind,
};
use crate::prometheus::{
    AlertingConfig, AlertmanagerEndpoint, BasicAuth, FileSdConfig, GlobalConfig, KubernetesRole,
    KubernetesSdConfig, KubernetesSelector, NamespaceDiscovery, QueueConfig, RelabelAction,
    RelabelConfig, RemoteRead, StaticConfig, TlsConfig,
};

/// A value that can be written back as a Rust expression
pub trait ToExpr {
    fn to_expr(&self) -> TokenStream;
}

/// String literal for builder arguments taking `impl Into<String>`
pub fn str_lit(value: &str) -> TokenStream {
    let lit = Literal::string(value);
    quote!(#lit)
}

impl ToExpr for String {
    fn to_expr(&self) -> TokenStream {
        let lit = Literal::string(self);
        quote!(#lit.to_string())
    }
}

impl ToExpr for bool {
    fn to_expr(&self) -> TokenStream {
        quote!(#self)
    }
}

impl ToExpr for u8 {
    fn to_expr(&self) -> TokenStream {
        let lit = Literal::u8_unsuffixed(*self);
        quote!(#lit)
    }
}

impl ToExpr for u32 {
    fn to_expr(&self) -> TokenStream {
        let lit = Literal::u32_unsuffixed(*self);
        quote!(#lit)
    }
}

impl ToExpr for u64 {
    fn to_expr(&self) -> TokenStream {
        let lit = Literal::u64_unsuffixed(*self);
        quote!(#lit)
    }
}

impl ToExpr for f64 {
    fn to_expr(&self) -> TokenStream {
        if self.is_nan() {
            return quote!(f64::NAN);
        }
        if self.is_infinite() {
            return if *self > 0.0 {
                quote!(f64::INFINITY)
            } else {
                quote!(f64::NEG_INFINITY)
            };
        }
        let lit = Literal::f64_unsuffixed(self.abs());
        if self.is_sign_negative() && *self != 0.0 {
            quote!(-#lit)
        } else {
            quote!(#lit)
        }
    }
}

impl<T: ToExpr> ToExpr for Option<T> {
    fn to_expr(&self) -> TokenStream {
        match self {
            Some(value) => {
                let inner = value.to_expr();
                quote!(Some(#inner))
            }
            None => quote!(None),
        }
    }
}

impl<T: ToExpr> ToExpr for Vec<T> {
    fn to_expr(&self) -> TokenStream {
        let items = self.iter().map(ToExpr::to_expr);
        quote!(vec![#(#items),*])
    }
}

impl<V: ToExpr> ToExpr for BTreeMap<String, V> {
    fn to_expr(&self) -> TokenStream {
        if self.is_empty() {
            return quote!(std::collections::BTreeMap::new());
        }
        let entries = self.iter().map(|(k, v)| {
            let key = k.to_expr();
            let value = v.to_expr();
            quote!((#key, #value))
        });
        quote!(std::collections::BTreeMap::from([#(#entries),*]))
    }
}

impl ToExpr for Duration {
    /// Largest constructor that represents the value exactly
    fn to_expr(&self) -> TokenStream {
        const NANOS_PER_MILLI: u64 = 1_000_000;
        let nanos = self.as_nanos();
        if nanos == 0 {
            return quote!(Duration::ZERO);
        }
        if nanos % NANOS_PER_MILLI != 0 {
            let lit = Literal::u64_unsuffixed(nanos);
            return quote!(Duration::from_nanos(#lit));
        }
        let millis = nanos / NANOS_PER_MILLI;
        let units: [(&str, u64); 4] = [
            ("days", 86_400_000),
            ("hours", 3_600_000),
            ("minutes", 60_000),
            ("seconds", 1_000),
        ];
        let (ctor, size) = units
            .into_iter()
            .find(|(_, size)| millis % size == 0)
            .unwrap_or(("millis", 1));
        let ctor = format_ident!("{}", ctor);
        let lit = Literal::u64_unsuffixed(millis / size);
        quote!(Duration::#ctor(#lit))
    }
}

impl ToExpr for serde_json::Value {
    fn to_expr(&self) -> TokenStream {
        let body = json_tokens(self);
        quote!(serde_json::json!(#body))
    }
}

/// `json!` body; strings go through `Literal::string` so escapes stay valid Rust
fn json_tokens(value: &serde_json::Value) -> TokenStream {
    use serde_json::Value;
    match value {
        Value::Null => quote!(null),
        Value::Bool(b) => quote!(#b),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                let lit = Literal::u64_unsuffixed(u);
                quote!(#lit)
            } else if let Some(i) = n.as_i64() {
                let lit = Literal::u64_unsuffixed(i.unsigned_abs());
                quote!(-#lit)
            } else {
                n.as_f64().unwrap_or_default().to_expr()
            }
        }
        Value::String(s) => str_lit(s),
        Value::Array(items) => {
            let items = items.iter().map(json_tokens);
            quote!([#(#items),*])
        }
        Value::Object(map) => {
            let entries = map.iter().map(|(k, v)| {
                let key = Literal::string(k);
                let value = json_tokens(v);
                quote!(#key: #value)
            });
            quote!({ #(#entries),* })
        }
    }
}

impl ToExpr for Matcher {
    fn to_expr(&self) -> TokenStream {
        let name = str_lit(&self.name);
        let value = str_lit(&self.value);
        let ctor = match self.op {
            MatchOp::Equal => quote!(equal),
            MatchOp::NotEqual => quote!(not_equal),
            MatchOp::Regex => quote!(regex),
            MatchOp::NotRegex => quote!(not_regex),
        };
        quote!(Matcher::#ctor(#name, #value))
    }
}

impl ToExpr for Target {
    fn to_expr(&self) -> TokenStream {
        match self {
            Target::Prometheus(t) => {
                let inner = t.to_expr();
                quote!(Target::Prometheus(#inner))
            }
            Target::Loki(t) => {
                let inner = t.to_expr();
                quote!(Target::Loki(#inner))
            }
        }
    }
}

impl ToExpr for PanelOptions {
    fn to_expr(&self) -> TokenStream {
        let (variant, inner) = match self {
            PanelOptions::Timeseries(o) => (quote!(Timeseries), o.to_expr()),
            PanelOptions::Stat(o) => (quote!(Stat), o.to_expr()),
            PanelOptions::Table(o) => (quote!(Table), o.to_expr()),
            PanelOptions::Gauge(o) => (quote!(Gauge), o.to_expr()),
            PanelOptions::BarGauge(o) => (quote!(BarGauge), o.to_expr()),
            PanelOptions::PieChart(o) => (quote!(PieChart), o.to_expr()),
            PanelOptions::Text(o) => (quote!(Text), o.to_expr()),
            PanelOptions::Logs(o) => (quote!(Logs), o.to_expr()),
            PanelOptions::Heatmap(o) => (quote!(Heatmap), o.to_expr()),
        };
        quote!(PanelOptions::#variant(#inner))
    }
}

/// Unit enums render through their `Debug` variant name
macro_rules! unit_enum {
    ($($ty:ident),* $(,)?) => {
        $(
            impl ToExpr for $ty {
                fn to_expr(&self) -> TokenStream {
                    let variant = format_ident!("{}", format!("{:?}", self));
                    quote!($ty::#variant)
                }
            }
        )*
    };
}

unit_enum!(RelabelAction, KubernetesRole, MatchOp, VariableKind);

/// `T { changed, ..Default::default() }`, or `T::default()` when nothing changed
macro_rules! struct_literal {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl ToExpr for $ty {
            fn to_expr(&self) -> TokenStream {
                let $ty { $($field),* } = self;
                let defaults = $ty::default();
                let mut fields: Vec<TokenStream> = Vec::new();
                $(
                    if *$field != defaults.$field {
                        let name = format_ident!("{}", stringify!($field));
                        let value = $field.to_expr();
                        fields.push(quote!(#name: #value));
                    }
                )*
                if fields.is_empty() {
                    quote!($ty::default())
                } else {
                    quote!($ty { #(#fields,)* ..Default::default() })
                }
            }
        }
    };
}

struct_literal!(GlobalConfig { scrape_interval, scrape_timeout, evaluation_interval, external_labels, query_log_file });
struct_literal!(AlertingConfig { alert_relabel_configs, alertmanagers });
struct_literal!(AlertmanagerEndpoint { timeout, api_version, path_prefix, scheme, basic_auth, tls_config, static_configs });
struct_literal!(BasicAuth { username, password, password_file });
struct_literal!(TlsConfig { ca_file, cert_file, key_file, server_name, insecure_skip_verify });
struct_literal!(StaticConfig { targets, labels });
struct_literal!(FileSdConfig { files, refresh_interval });
struct_literal!(NamespaceDiscovery { own_namespace, names });
struct_literal!(KubernetesSelector { role, label, field });
struct_literal!(KubernetesSdConfig { api_server, role, namespaces, selectors, bearer_token_file, tls_config });
struct_literal!(RelabelConfig { source_labels, separator, target_label, regex, modulus, replacement, action });
struct_literal!(QueueConfig { capacity, max_shards, min_shards, max_samples_per_send, batch_send_deadline, min_backoff, max_backoff });
struct_literal!(RemoteRead { url, name, remote_timeout, read_recent, required_matchers, basic_auth, bearer_token_file, tls_config });

struct_literal!(Global {
    resolve_timeout, smtp_from, smtp_smarthost, smtp_hello, smtp_auth_username, smtp_auth_password,
    smtp_require_tls, slack_api_url, pagerduty_url, opsgenie_api_url, opsgenie_api_key,
});
struct_literal!(EmailConfig { send_resolved, to, from, smarthost, auth_username, auth_password, headers, html, text });
struct_literal!(SlackConfig { send_resolved, api_url, channel, username, color, title, text, icon_emoji });
struct_literal!(PagerdutyConfig { send_resolved, routing_key, service_key, url, severity, description });
struct_literal!(OpsgenieConfig { send_resolved, api_key, api_url, message, description, priority, tags });
struct_literal!(WebhookConfig { send_resolved, url, http_config, max_alerts });
struct_literal!(HttpConfig { basic_auth, bearer_token, tls_config, proxy_url });
struct_literal!(InhibitRule { source_matchers, target_matchers, equal });
struct_literal!(MuteTimeInterval { name, time_intervals });
struct_literal!(TimeInterval { times, weekdays, days_of_month, months, years, location });
struct_literal!(TimeRange { start_time, end_time });

struct_literal!(DashboardTime { from, to });
struct_literal!(Annotation { name, datasource, enable, hide, icon_color, expr, built_in });
struct_literal!(DashboardLink { title, kind, url, tags, as_dropdown, target_blank, icon });
struct_literal!(DataSourceRef { kind, uid });
struct_literal!(GridPos { x, y, w, h });
struct_literal!(ReduceOptions { calcs, fields, values });
struct_literal!(LegendOptions { display_mode, placement, show_legend, calcs });
struct_literal!(TooltipOptions { mode, sort });
struct_literal!(TimeseriesOptions { legend, tooltip });
struct_literal!(StatOptions { reduce_options, color_mode, graph_mode, text_mode, justify_mode, orientation });
struct_literal!(TableOptions { show_header, cell_height });
struct_literal!(GaugeOptions { reduce_options, orientation, show_threshold_labels, show_threshold_markers });
struct_literal!(BarGaugeOptions { reduce_options, orientation, display_mode, show_unfilled });
struct_literal!(PieChartOptions { reduce_options, pie_type, legend, display_labels });
struct_literal!(TextOptions { mode, content });
struct_literal!(LogsOptions { show_time, wrap_log_message, enable_log_details, sort_order, dedup_strategy });
struct_literal!(HeatmapColor { mode, scheme });
struct_literal!(HeatmapOptions { calculate, cell_gap, color });
struct_literal!(FieldConfig { defaults, overrides });
struct_literal!(FieldDefaults { unit, decimals, min, max, color, thresholds });
struct_literal!(FieldColor { mode, fixed_color });
struct_literal!(Thresholds { mode, steps });
struct_literal!(ThresholdStep { color, value });
struct_literal!(PrometheusTarget { datasource, ref_id, expr, legend_format, interval, format, instant, range, hide });
struct_literal!(LokiTarget { datasource, ref_id, expr, legend_format, query_type, max_lines, hide });

#[cfg(test)]
mod tests {
    use super::*;

    fn render(tokens: TokenStream) -> String {
        tokens.to_string()
    }

    #[test]
    fn test_duration_picks_largest_unit() {
        assert_eq!(render(Duration::seconds(15).to_expr()), "Duration :: seconds (15)");
        assert_eq!(render(Duration::hours(24).to_expr()), "Duration :: days (1)");
        assert_eq!(render(Duration::seconds(90).to_expr()), "Duration :: seconds (90)");
        assert_eq!(render(Duration::millis(1500).to_expr()), "Duration :: millis (1500)");
        assert_eq!(render(Duration::from_nanos(7).to_expr()), "Duration :: from_nanos (7)");
        assert_eq!(render(Duration::ZERO.to_expr()), "Duration :: ZERO");
    }

    #[test]
    fn test_struct_literal_names_changed_fields() {
        let tls = TlsConfig {
            ca_file: "/etc/ca.pem".to_string(),
            insecure_skip_verify: true,
            ..Default::default()
        };
        let out = render(tls.to_expr());
        assert!(out.starts_with("TlsConfig {"));
        assert!(out.contains("ca_file : \"/etc/ca.pem\" . to_string ()"));
        assert!(out.contains("insecure_skip_verify : true"));
        assert!(!out.contains("cert_file"));
        assert!(out.ends_with(".. Default :: default () }"));

        assert_eq!(render(TlsConfig::default().to_expr()), "TlsConfig :: default ()");
    }

    #[test]
    fn test_floats_and_enums() {
        assert_eq!(render((-2.5f64).to_expr()), "- 2.5");
        assert_eq!(render(80.0f64.to_expr()), "80.0");
        assert_eq!(render(f64::NAN.to_expr()), "f64 :: NAN");
        assert_eq!(render(RelabelAction::LabelDrop.to_expr()), "RelabelAction :: LabelDrop");
        assert_eq!(
            render(Matcher::regex("service", "api|web").to_expr()),
            "Matcher :: regex (\"service\" , \"api|web\")"
        );
    }

    #[test]
    fn test_unit_enums_render_as_paths() {
        let cases = [
            (RelabelAction::Keep.to_expr(), "RelabelAction :: Keep"),
            (KubernetesRole::EndpointSlice.to_expr(), "KubernetesRole :: EndpointSlice"),
            (MatchOp::NotRegex.to_expr(), "MatchOp :: NotRegex"),
            (VariableKind::Custom.to_expr(), "VariableKind :: Custom"),
        ];
        for (tokens, expected) in cases {
            let path: syn::ExprPath = syn::parse2(tokens.clone()).unwrap();
            assert_eq!(path.path.segments.len(), 2);
            assert_eq!(render(tokens), expected);
        }
    }

    #[test]
    fn test_json_escapes_stay_valid() {
        let value = serde_json::json!({"matcher": {"id": "byName", "options": "a\u{1}b"}, "n": -3});
        let tokens = value.to_expr();
        let expr: syn::Expr = syn::parse2(tokens).unwrap();
        assert!(matches!(expr, syn::Expr::Macro(_)));
    }

    #[test]
    fn test_map_literal() {
        let mut labels = BTreeMap::new();
        labels.insert("env".to_string(), "prod".to_string());
        let out = render(labels.to_expr());
        assert!(out.starts_with("std :: collections :: BTreeMap :: from"));
        assert!(out.contains("\"env\" . to_string ()"));
    }
}
