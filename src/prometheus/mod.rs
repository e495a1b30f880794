// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Prometheus server configuration
//!
//! Typed model of `prometheus.yml`. Fields are declared in Prometheus's
//! documented key order so serde emits them canonically, and every optional
//! field with zero-value semantics is skipped on output.
//!
//! # Examples
//!
//! ```
//! use wetwire_obs::prometheus::{GlobalConfig, PrometheusConfig, ScrapeConfig, StaticConfig};
//! use wetwire_obs::Duration;
//!
//! let config = PrometheusConfig::new()
//!     .with_global(GlobalConfig::new().with_scrape_interval(Duration::seconds(15)))
//!     .add_scrape_config(
//!         ScrapeConfig::new("node")
//!             .add_static_config(StaticConfig::new(["localhost:9100"])),
//!     );
//!
//! let yaml = String::from_utf8(config.serialize().unwrap()).unwrap();
//! assert!(yaml.contains("scrape_interval: 15s"));
//! ```

mod relabel;
mod remote;
mod scrape;

pub use relabel::{RelabelAction, RelabelConfig};
pub use remote::{QueueConfig, RemoteRead, RemoteWrite};
pub use scrape::{
    FileSdConfig, KubernetesRole, KubernetesSdConfig, KubernetesSelector, NamespaceDiscovery,
    ScrapeConfig, StaticConfig,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::duration::Duration;
use crate::error::Result;
use crate::output::{self, is_false, WireFormat};

/// Top-level `prometheus.yml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrometheusConfig {
    #[serde(skip_serializing_if = "global_unset")]
    pub global: Option<GlobalConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scrape_configs: Vec<ScrapeConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rule_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alerting: Option<AlertingConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remote_write: Vec<RemoteWrite>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remote_read: Vec<RemoteRead>,
}

fn global_unset(global: &Option<GlobalConfig>) -> bool {
    global.as_ref().map_or(true, GlobalConfig::is_empty)
}

impl PrometheusConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global(mut self, global: GlobalConfig) -> Self {
        self.global = Some(global);
        self
    }

    pub fn with_scrape_configs(mut self, scrape_configs: Vec<ScrapeConfig>) -> Self {
        self.scrape_configs = scrape_configs;
        self
    }

    pub fn add_scrape_config(mut self, scrape_config: ScrapeConfig) -> Self {
        self.scrape_configs.push(scrape_config);
        self
    }

    pub fn with_rule_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule_files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_rule_file(mut self, file: impl Into<String>) -> Self {
        self.rule_files.push(file.into());
        self
    }

    pub fn with_alerting(mut self, alerting: AlertingConfig) -> Self {
        self.alerting = Some(alerting);
        self
    }

    /// Point Prometheus at a statically addressed Alertmanager
    pub fn add_alertmanager(mut self, endpoint: AlertmanagerEndpoint) -> Self {
        self.alerting
            .get_or_insert_with(AlertingConfig::default)
            .alertmanagers
            .push(endpoint);
        self
    }

    pub fn with_remote_write(mut self, remote_write: Vec<RemoteWrite>) -> Self {
        self.remote_write = remote_write;
        self
    }

    pub fn add_remote_write(mut self, remote_write: RemoteWrite) -> Self {
        self.remote_write.push(remote_write);
        self
    }

    pub fn with_remote_read(mut self, remote_read: Vec<RemoteRead>) -> Self {
        self.remote_read = remote_read;
        self
    }

    pub fn add_remote_read(mut self, remote_read: RemoteRead) -> Self {
        self.remote_read.push(remote_read);
        self
    }

    /// Look up a scrape config by job name
    pub fn scrape_config(&self, job_name: &str) -> Option<&ScrapeConfig> {
        self.scrape_configs.iter().find(|s| s.job_name == job_name)
    }

    /// Job names in declaration order
    pub fn job_names(&self) -> impl Iterator<Item = &str> {
        self.scrape_configs.iter().map(|s| s.job_name.as_str())
    }

    /// Render as `prometheus.yml` YAML
    pub fn serialize(&self) -> Result<Vec<u8>> {
        output::to_yaml(self)
    }

    /// Render and write to `path`, creating parent directories
    pub fn serialize_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        output::write_atomic(path.as_ref(), &self.serialize()?)
    }
}

impl WireFormat for PrometheusConfig {
    fn default_file_name(&self) -> String {
        "prometheus.yml".to_string()
    }

    fn to_wire(&self) -> Result<Vec<u8>> {
        self.serialize()
    }
}

/// The `global` block: defaults inherited by every scrape config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub scrape_interval: Duration,
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub scrape_timeout: Duration,
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub evaluation_interval: Duration,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub external_labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub query_log_file: String,
}

impl GlobalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scrape_interval(mut self, interval: Duration) -> Self {
        self.scrape_interval = interval;
        self
    }

    pub fn with_scrape_timeout(mut self, timeout: Duration) -> Self {
        self.scrape_timeout = timeout;
        self
    }

    pub fn with_evaluation_interval(mut self, interval: Duration) -> Self {
        self.evaluation_interval = interval;
        self
    }

    pub fn with_external_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.external_labels = labels;
        self
    }

    pub fn add_external_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.external_labels.insert(name.into(), value.into());
        self
    }

    pub fn with_query_log_file(mut self, path: impl Into<String>) -> Self {
        self.query_log_file = path.into();
        self
    }

    /// True when every field holds its zero value
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// The `alerting` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertingConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alert_relabel_configs: Vec<RelabelConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alertmanagers: Vec<AlertmanagerEndpoint>,
}

impl AlertingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alertmanagers(mut self, alertmanagers: Vec<AlertmanagerEndpoint>) -> Self {
        self.alertmanagers = alertmanagers;
        self
    }

    pub fn add_alertmanager(mut self, endpoint: AlertmanagerEndpoint) -> Self {
        self.alertmanagers.push(endpoint);
        self
    }

    pub fn with_alert_relabel_configs(mut self, configs: Vec<RelabelConfig>) -> Self {
        self.alert_relabel_configs = configs;
        self
    }

    pub fn add_alert_relabel_config(mut self, config: RelabelConfig) -> Self {
        self.alert_relabel_configs.push(config);
        self
    }
}

/// One entry of `alerting.alertmanagers`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertmanagerEndpoint {
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub timeout: Duration,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path_prefix: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scheme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_config: Option<TlsConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub static_configs: Vec<StaticConfig>,
}

impl AlertmanagerEndpoint {
    /// Endpoint reaching the given `host:port` targets
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            static_configs: vec![StaticConfig::new(targets)],
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_basic_auth(mut self, auth: BasicAuth) -> Self {
        self.basic_auth = Some(auth);
        self
    }

    pub fn with_tls_config(mut self, tls: TlsConfig) -> Self {
        self.tls_config = Some(tls);
        self
    }

    pub fn with_static_configs(mut self, configs: Vec<StaticConfig>) -> Self {
        self.static_configs = configs;
        self
    }

    pub fn add_static_config(mut self, config: StaticConfig) -> Self {
        self.static_configs.push(config);
        self
    }
}

/// HTTP basic authentication
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicAuth {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password_file: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_password_file(mut self, path: impl Into<String>) -> Self {
        self.password_file = path.into();
        self
    }
}

/// Client TLS settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ca_file: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cert_file: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key_file: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub server_name: String,
    #[serde(skip_serializing_if = "is_false")]
    pub insecure_skip_verify: bool,
}

impl TlsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ca_file(mut self, path: impl Into<String>) -> Self {
        self.ca_file = path.into();
        self
    }

    pub fn with_cert_file(mut self, path: impl Into<String>) -> Self {
        self.cert_file = path.into();
        self
    }

    pub fn with_key_file(mut self, path: impl Into<String>) -> Self {
        self.key_file = path.into();
        self
    }

    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    pub fn with_insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(config: &PrometheusConfig) -> String {
        String::from_utf8(config.serialize().unwrap()).unwrap()
    }

    #[test]
    fn test_scrape_interval_single_unit() {
        let config = PrometheusConfig::new().add_scrape_config(
            ScrapeConfig::new("api").with_scrape_interval(Duration::seconds(15)),
        );
        let yaml = render(&config);
        assert!(yaml.contains("scrape_interval: 15s"));
        assert!(!yaml.contains("15000ms"));
        assert!(!yaml.contains("0m15s"));
    }

    #[test]
    fn test_top_level_key_order() {
        let config = PrometheusConfig::new()
            .add_remote_read(RemoteRead::new("http://read"))
            .add_remote_write(RemoteWrite::new("https://write"))
            .add_alertmanager(AlertmanagerEndpoint::new(["am:9093"]))
            .add_rule_file("rules/*.yml")
            .add_scrape_config(ScrapeConfig::new("node"))
            .with_global(GlobalConfig::new().with_evaluation_interval(Duration::seconds(30)));
        let yaml = render(&config);

        let keys = [
            "global:",
            "scrape_configs:",
            "rule_files:",
            "alerting:",
            "remote_write:",
            "remote_read:",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| yaml.find(k).unwrap()).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_empty_fields_omitted() {
        let config = PrometheusConfig::new()
            .with_global(GlobalConfig::new())
            .add_scrape_config(ScrapeConfig::new("node"));
        let yaml = render(&config);
        assert_eq!(yaml, "scrape_configs:\n- job_name: node\n");
    }

    #[test]
    fn test_with_replaces_add_appends() {
        let config = PrometheusConfig::new()
            .add_rule_file("a.yml")
            .add_rule_file("b.yml");
        assert_eq!(config.rule_files, vec!["a.yml", "b.yml"]);

        let config = config.with_rule_files(["c.yml"]);
        assert_eq!(config.rule_files, vec!["c.yml"]);
    }

    #[test]
    fn test_parse_back() {
        let config = PrometheusConfig::new()
            .with_global(
                GlobalConfig::new()
                    .with_scrape_interval(Duration::seconds(15))
                    .add_external_label("cluster", "prod"),
            )
            .add_scrape_config(
                ScrapeConfig::new("node")
                    .with_metrics_path("/metrics")
                    .add_static_config(StaticConfig::new(["a:9100", "b:9100"])),
            );
        let bytes = config.serialize().unwrap();
        let parsed: PrometheusConfig = serde_yaml::from_slice(&bytes).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.serialize().unwrap(), bytes);
    }

    #[test]
    fn test_job_lookup() {
        let config = PrometheusConfig::new()
            .add_scrape_config(ScrapeConfig::new("a"))
            .add_scrape_config(ScrapeConfig::new("b"));
        assert!(config.scrape_config("b").is_some());
        assert!(config.scrape_config("c").is_none());
        assert_eq!(config.job_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_serialize_to_file_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/prometheus.yml");
        PrometheusConfig::new()
            .add_scrape_config(ScrapeConfig::new("x"))
            .serialize_to_file(&path)
            .unwrap();
        assert!(path.exists());
    }
}
