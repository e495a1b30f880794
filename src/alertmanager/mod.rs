// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Alertmanager configuration
//!
//! Typed model of `alertmanager.yml`: a rooted routing tree, the receivers it
//! points at, inhibition rules and named mute windows.
//!
//! # Examples
//!
//! ```
//! use wetwire_obs::alertmanager::{AlertmanagerConfig, Receiver, Route, SlackConfig};
//! use wetwire_obs::Duration;
//!
//! let config = AlertmanagerConfig::new()
//!     .with_route(
//!         Route::new("team")
//!             .with_group_by(["alertname"])
//!             .with_group_interval(Duration::minutes(5)),
//!     )
//!     .add_receiver(Receiver::new("team").add_slack_config(SlackConfig::new("#alerts")));
//!
//! assert!(config.unresolved_receivers().is_empty());
//! ```

mod inhibit;
mod receiver;
mod route;

pub use inhibit::{InhibitRule, MuteTimeInterval, TimeInterval, TimeRange};
pub use receiver::{
    EmailConfig, HttpConfig, OpsgenieConfig, PagerdutyConfig, Receiver, SlackConfig,
    WebhookConfig,
};
pub use route::{MatchOp, Matcher, Route};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::duration::Duration;
use crate::error::Result;
use crate::output::{self, WireFormat};

/// Top-level `alertmanager.yml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertmanagerConfig {
    #[serde(skip_serializing_if = "global_unset")]
    pub global: Option<Global>,
    pub route: Route,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub receivers: Vec<Receiver>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inhibit_rules: Vec<InhibitRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mute_time_intervals: Vec<MuteTimeInterval>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<String>,
}

fn global_unset(global: &Option<Global>) -> bool {
    global.as_ref().map_or(true, Global::is_empty)
}

impl AlertmanagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global(mut self, global: Global) -> Self {
        self.global = Some(global);
        self
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.route = route;
        self
    }

    pub fn with_receivers(mut self, receivers: Vec<Receiver>) -> Self {
        self.receivers = receivers;
        self
    }

    pub fn add_receiver(mut self, receiver: Receiver) -> Self {
        self.receivers.push(receiver);
        self
    }

    pub fn with_inhibit_rules(mut self, rules: Vec<InhibitRule>) -> Self {
        self.inhibit_rules = rules;
        self
    }

    pub fn add_inhibit_rule(mut self, rule: InhibitRule) -> Self {
        self.inhibit_rules.push(rule);
        self
    }

    pub fn with_mute_time_intervals(mut self, intervals: Vec<MuteTimeInterval>) -> Self {
        self.mute_time_intervals = intervals;
        self
    }

    pub fn add_mute_time_interval(mut self, interval: MuteTimeInterval) -> Self {
        self.mute_time_intervals.push(interval);
        self
    }

    pub fn with_templates<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.templates = templates.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_template(mut self, template: impl Into<String>) -> Self {
        self.templates.push(template.into());
        self
    }

    pub fn receiver(&self, name: &str) -> Option<&Receiver> {
        self.receivers.iter().find(|r| r.name == name)
    }

    pub fn receiver_names(&self) -> BTreeSet<&str> {
        self.receivers.iter().map(|r| r.name.as_str()).collect()
    }

    /// Route receivers that no receiver defines, in tree order without repeats
    pub fn unresolved_receivers(&self) -> Vec<String> {
        let known = self.receiver_names();
        let mut seen = BTreeSet::new();
        self.route
            .referenced_receivers()
            .into_iter()
            .filter(|name| !known.contains(name) && seen.insert(*name))
            .map(str::to_string)
            .collect()
    }

    /// Render as `alertmanager.yml` YAML
    pub fn serialize(&self) -> Result<Vec<u8>> {
        output::to_yaml(self)
    }

    /// Render and write to `path`, creating parent directories
    pub fn serialize_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        output::write_atomic(path.as_ref(), &self.serialize()?)
    }
}

impl WireFormat for AlertmanagerConfig {
    fn default_file_name(&self) -> String {
        "alertmanager.yml".to_string()
    }

    fn to_wire(&self) -> Result<Vec<u8>> {
        self.serialize()
    }
}

/// The `global` block: defaults shared by every receiver integration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Global {
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub resolve_timeout: Duration,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub smtp_from: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub smtp_smarthost: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub smtp_hello: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub smtp_auth_username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub smtp_auth_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_require_tls: Option<bool>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub slack_api_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pagerduty_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub opsgenie_api_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub opsgenie_api_key: String,
}

impl Global {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    pub fn with_smtp_from(mut self, from: impl Into<String>) -> Self {
        self.smtp_from = from.into();
        self
    }

    pub fn with_smtp_smarthost(mut self, host: impl Into<String>) -> Self {
        self.smtp_smarthost = host.into();
        self
    }

    pub fn with_smtp_hello(mut self, hello: impl Into<String>) -> Self {
        self.smtp_hello = hello.into();
        self
    }

    pub fn with_smtp_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.smtp_auth_username = username.into();
        self.smtp_auth_password = password.into();
        self
    }

    pub fn with_smtp_require_tls(mut self, require: bool) -> Self {
        self.smtp_require_tls = Some(require);
        self
    }

    pub fn with_slack_api_url(mut self, url: impl Into<String>) -> Self {
        self.slack_api_url = url.into();
        self
    }

    pub fn with_pagerduty_url(mut self, url: impl Into<String>) -> Self {
        self.pagerduty_url = url.into();
        self
    }

    pub fn with_opsgenie_api_url(mut self, url: impl Into<String>) -> Self {
        self.opsgenie_api_url = url.into();
        self
    }

    pub fn with_opsgenie_api_key(mut self, key: impl Into<String>) -> Self {
        self.opsgenie_api_key = key.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(config: &AlertmanagerConfig) -> String {
        String::from_utf8(config.serialize().unwrap()).unwrap()
    }

    #[test]
    fn test_group_interval_single_unit() {
        let config = AlertmanagerConfig::new()
            .with_route(Route::new("default").with_group_interval(Duration::minutes(5)))
            .add_receiver(Receiver::new("default"));
        assert!(render(&config).contains("group_interval: 5m"));
    }

    #[test]
    fn test_top_level_key_order() {
        let config = AlertmanagerConfig::new()
            .add_template("/etc/am/*.tmpl")
            .add_mute_time_interval(MuteTimeInterval::new("night"))
            .add_inhibit_rule(InhibitRule::new().with_equal(["alertname"]))
            .add_receiver(Receiver::new("default"))
            .with_route(Route::new("default"))
            .with_global(Global::new().with_resolve_timeout(Duration::minutes(5)));
        let yaml = render(&config);

        let keys = [
            "global:",
            "route:",
            "receivers:",
            "inhibit_rules:",
            "mute_time_intervals:",
            "templates:",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| yaml.find(k).unwrap()).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_route_always_emitted() {
        let yaml = render(&AlertmanagerConfig::new());
        assert_eq!(yaml, "route: {}\n");
    }

    #[test]
    fn test_unresolved_receivers() {
        let config = AlertmanagerConfig::new()
            .with_route(
                Route::new("ghost")
                    .add_route(Route::new("default"))
                    .add_route(Route::new("ghost")),
            )
            .add_receiver(Receiver::new("default"));
        assert_eq!(config.unresolved_receivers(), vec!["ghost".to_string()]);
    }

    #[test]
    fn test_child_route_order_preserved() {
        let config = AlertmanagerConfig::new().with_route(
            Route::new("root")
                .add_route(Route::new("zeta"))
                .add_route(Route::new("alpha")),
        );
        let yaml = render(&config);
        assert!(yaml.find("zeta").unwrap() < yaml.find("alpha").unwrap());
    }

    #[test]
    fn test_parse_back() {
        let config = AlertmanagerConfig::new()
            .with_route(
                Route::new("default")
                    .with_group_by(["alertname", "cluster"])
                    .with_group_wait(Duration::seconds(30))
                    .add_route(
                        Route::new("pager")
                            .add_matcher(Matcher::equal("severity", "critical"))
                            .with_continue(true),
                    ),
            )
            .add_receiver(Receiver::new("default"))
            .add_receiver(Receiver::new("pager").add_pagerduty_config(PagerdutyConfig::new("key")));
        let bytes = config.serialize().unwrap();
        let parsed: AlertmanagerConfig = serde_yaml::from_slice(&bytes).unwrap();
        assert_eq!(parsed, config);
    }
}
