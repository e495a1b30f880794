// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Scrape jobs and target discovery

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{BasicAuth, RelabelConfig, TlsConfig};
use crate::duration::Duration;
use crate::output::{is_false, is_zero_u32};

/// One `scrape_configs` entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub job_name: String,
    #[serde(skip_serializing_if = "is_false")]
    pub honor_labels: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honor_timestamps: Option<bool>,
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub scrape_interval: Duration,
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub scrape_timeout: Duration,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub metrics_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scheme: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuth>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bearer_token_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_config: Option<TlsConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub static_configs: Vec<StaticConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_sd_configs: Vec<FileSdConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub kubernetes_sd_configs: Vec<KubernetesSdConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relabel_configs: Vec<RelabelConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metric_relabel_configs: Vec<RelabelConfig>,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub sample_limit: u32,
}

impl ScrapeConfig {
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            ..Self::default()
        }
    }

    pub fn with_honor_labels(mut self, honor: bool) -> Self {
        self.honor_labels = honor;
        self
    }

    pub fn with_honor_timestamps(mut self, honor: bool) -> Self {
        self.honor_timestamps = Some(honor);
        self
    }

    pub fn with_scrape_interval(mut self, interval: Duration) -> Self {
        self.scrape_interval = interval;
        self
    }

    pub fn with_scrape_timeout(mut self, timeout: Duration) -> Self {
        self.scrape_timeout = timeout;
        self
    }

    pub fn with_metrics_path(mut self, path: impl Into<String>) -> Self {
        self.metrics_path = path.into();
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Append a value to a URL query parameter
    pub fn add_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn with_basic_auth(mut self, auth: BasicAuth) -> Self {
        self.basic_auth = Some(auth);
        self
    }

    pub fn with_bearer_token_file(mut self, path: impl Into<String>) -> Self {
        self.bearer_token_file = path.into();
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

    pub fn with_file_sd_configs(mut self, configs: Vec<FileSdConfig>) -> Self {
        self.file_sd_configs = configs;
        self
    }

    pub fn add_file_sd_config(mut self, config: FileSdConfig) -> Self {
        self.file_sd_configs.push(config);
        self
    }

    pub fn with_kubernetes_sd_configs(mut self, configs: Vec<KubernetesSdConfig>) -> Self {
        self.kubernetes_sd_configs = configs;
        self
    }

    pub fn add_kubernetes_sd_config(mut self, config: KubernetesSdConfig) -> Self {
        self.kubernetes_sd_configs.push(config);
        self
    }

    pub fn with_relabel_configs(mut self, configs: Vec<RelabelConfig>) -> Self {
        self.relabel_configs = configs;
        self
    }

    pub fn add_relabel_config(mut self, config: RelabelConfig) -> Self {
        self.relabel_configs.push(config);
        self
    }

    pub fn with_metric_relabel_configs(mut self, configs: Vec<RelabelConfig>) -> Self {
        self.metric_relabel_configs = configs;
        self
    }

    pub fn add_metric_relabel_config(mut self, config: RelabelConfig) -> Self {
        self.metric_relabel_configs.push(config);
        self
    }

    pub fn with_sample_limit(mut self, limit: u32) -> Self {
        self.sample_limit = limit;
        self
    }

    /// True if the job has at least one way of finding targets
    pub fn has_targets(&self) -> bool {
        self.static_configs.iter().any(|s| !s.targets.is_empty())
            || !self.file_sd_configs.is_empty()
            || !self.kubernetes_sd_configs.is_empty()
    }
}

/// A fixed list of targets sharing a label set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl StaticConfig {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            labels: BTreeMap::new(),
        }
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_target(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
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

/// File-based service discovery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSdConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub refresh_interval: Duration,
}

impl FileSdConfig {
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            refresh_interval: Duration::ZERO,
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }
}

/// Kubernetes object kind a discovery entry watches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KubernetesRole {
    #[default]
    Pod,
    Node,
    Service,
    Endpoints,
    #[serde(rename = "endpointslice")]
    EndpointSlice,
    Ingress,
}

impl KubernetesRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pod => "pod",
            Self::Node => "node",
            Self::Service => "service",
            Self::Endpoints => "endpoints",
            Self::EndpointSlice => "endpointslice",
            Self::Ingress => "ingress",
        }
    }
}

impl std::fmt::Display for KubernetesRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restrict discovery to some namespaces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceDiscovery {
    #[serde(skip_serializing_if = "is_false")]
    pub own_namespace: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
}

/// Label/field selector applied to one role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesSelector {
    pub role: KubernetesRole,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub field: String,
}

impl KubernetesSelector {
    pub fn new(role: KubernetesRole) -> Self {
        Self {
            role,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, selector: impl Into<String>) -> Self {
        self.label = selector.into();
        self
    }

    pub fn with_field(mut self, selector: impl Into<String>) -> Self {
        self.field = selector.into();
        self
    }
}

/// One `kubernetes_sd_configs` entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesSdConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_server: String,
    pub role: KubernetesRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<NamespaceDiscovery>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selectors: Vec<KubernetesSelector>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bearer_token_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_config: Option<TlsConfig>,
}

impl KubernetesSdConfig {
    pub fn new(role: KubernetesRole) -> Self {
        Self {
            role,
            ..Self::default()
        }
    }

    pub fn with_api_server(mut self, url: impl Into<String>) -> Self {
        self.api_server = url.into();
        self
    }

    pub fn with_namespaces<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ns = self.namespaces.get_or_insert_with(NamespaceDiscovery::default);
        ns.names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_own_namespace(mut self, own: bool) -> Self {
        self.namespaces
            .get_or_insert_with(NamespaceDiscovery::default)
            .own_namespace = own;
        self
    }

    pub fn with_selectors(mut self, selectors: Vec<KubernetesSelector>) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn add_selector(mut self, selector: KubernetesSelector) -> Self {
        self.selectors.push(selector);
        self
    }

    pub fn with_bearer_token_file(mut self, path: impl Into<String>) -> Self {
        self.bearer_token_file = path.into();
        self
    }

    pub fn with_tls_config(mut self, tls: TlsConfig) -> Self {
        self.tls_config = Some(tls);
        self
    }
}
