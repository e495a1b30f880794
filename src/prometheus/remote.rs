// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Remote write and remote read endpoints

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{BasicAuth, RelabelConfig, TlsConfig};
use crate::duration::Duration;
use crate::output::{is_false, is_zero_u32};

/// One `remote_write` endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteWrite {
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub remote_timeout: Duration,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub write_relabel_configs: Vec<RelabelConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuth>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bearer_token_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_config: Option<TlsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_config: Option<QueueConfig>,
}

impl RemoteWrite {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_write_relabel_configs(mut self, configs: Vec<RelabelConfig>) -> Self {
        self.write_relabel_configs = configs;
        self
    }

    pub fn add_write_relabel_config(mut self, config: RelabelConfig) -> Self {
        self.write_relabel_configs.push(config);
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

    pub fn with_queue_config(mut self, queue: QueueConfig) -> Self {
        self.queue_config = Some(queue);
        self
    }
}

/// Sharding and batching for a remote write queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub capacity: u32,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_shards: u32,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub min_shards: u32,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_samples_per_send: u32,
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub batch_send_deadline: Duration,
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub min_backoff: Duration,
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub max_backoff: Duration,
}

impl QueueConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_shards(mut self, min: u32, max: u32) -> Self {
        self.min_shards = min;
        self.max_shards = max;
        self
    }

    pub fn with_max_samples_per_send(mut self, n: u32) -> Self {
        self.max_samples_per_send = n;
        self
    }

    pub fn with_batch_send_deadline(mut self, deadline: Duration) -> Self {
        self.batch_send_deadline = deadline;
        self
    }

    pub fn with_backoff(mut self, min: Duration, max: Duration) -> Self {
        self.min_backoff = min;
        self.max_backoff = max;
        self
    }
}

/// One `remote_read` endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteRead {
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub remote_timeout: Duration,
    #[serde(skip_serializing_if = "is_false")]
    pub read_recent: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub required_matchers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuth>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bearer_token_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_config: Option<TlsConfig>,
}

impl RemoteRead {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn with_read_recent(mut self, read_recent: bool) -> Self {
        self.read_recent = read_recent;
        self
    }

    pub fn add_required_matcher(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.required_matchers.insert(name.into(), value.into());
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_write_url_first() {
        let rw = RemoteWrite::new("https://mimir/api/v1/push")
            .with_name("mimir")
            .with_remote_timeout(Duration::seconds(30))
            .with_queue_config(QueueConfig::new().with_shards(1, 50));
        let out = serde_yaml::to_string(&rw).unwrap();
        assert!(out.starts_with("url: https://mimir/api/v1/push\n"));
        assert!(out.contains("remote_timeout: 30s"));
        assert!(out.contains("queue_config:\n  max_shards: 50\n  min_shards: 1\n"));
    }

    #[test]
    fn test_remote_read_flags() {
        let rr = RemoteRead::new("http://thanos/read").with_read_recent(true);
        let out = serde_yaml::to_string(&rr).unwrap();
        assert_eq!(out, "url: http://thanos/read\nread_recent: true\n");
    }
}
