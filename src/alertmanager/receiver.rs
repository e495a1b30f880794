// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Receivers and their notification integrations

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::output::is_zero_u32;
use crate::prometheus::{BasicAuth, TlsConfig};

/// A named notification target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Receiver {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub email_configs: Vec<EmailConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub slack_configs: Vec<SlackConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pagerduty_configs: Vec<PagerdutyConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub opsgenie_configs: Vec<OpsgenieConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub webhook_configs: Vec<WebhookConfig>,
}

impl Receiver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_email_configs(mut self, configs: Vec<EmailConfig>) -> Self {
        self.email_configs = configs;
        self
    }

    pub fn add_email_config(mut self, config: EmailConfig) -> Self {
        self.email_configs.push(config);
        self
    }

    pub fn with_slack_configs(mut self, configs: Vec<SlackConfig>) -> Self {
        self.slack_configs = configs;
        self
    }

    pub fn add_slack_config(mut self, config: SlackConfig) -> Self {
        self.slack_configs.push(config);
        self
    }

    pub fn with_pagerduty_configs(mut self, configs: Vec<PagerdutyConfig>) -> Self {
        self.pagerduty_configs = configs;
        self
    }

    pub fn add_pagerduty_config(mut self, config: PagerdutyConfig) -> Self {
        self.pagerduty_configs.push(config);
        self
    }

    pub fn with_opsgenie_configs(mut self, configs: Vec<OpsgenieConfig>) -> Self {
        self.opsgenie_configs = configs;
        self
    }

    pub fn add_opsgenie_config(mut self, config: OpsgenieConfig) -> Self {
        self.opsgenie_configs.push(config);
        self
    }

    pub fn with_webhook_configs(mut self, configs: Vec<WebhookConfig>) -> Self {
        self.webhook_configs = configs;
        self
    }

    pub fn add_webhook_config(mut self, config: WebhookConfig) -> Self {
        self.webhook_configs.push(config);
        self
    }

    /// Number of configured integrations across all kinds
    pub fn integration_count(&self) -> usize {
        self.email_configs.len()
            + self.slack_configs.len()
            + self.pagerduty_configs.len()
            + self.opsgenie_configs.len()
            + self.webhook_configs.len()
    }
}

/// Email notifications
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_resolved: Option<bool>,
    pub to: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub from: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub smarthost: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth_username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth_password: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub html: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
}

impl EmailConfig {
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            ..Self::default()
        }
    }

    pub fn with_send_resolved(mut self, send: bool) -> Self {
        self.send_resolved = Some(send);
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    pub fn with_smarthost(mut self, host: impl Into<String>) -> Self {
        self.smarthost = host.into();
        self
    }

    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth_username = username.into();
        self.auth_password = password.into();
        self
    }

    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// Slack notifications
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_resolved: Option<bool>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_url: String,
    pub channel: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon_emoji: String,
}

impl SlackConfig {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            ..Self::default()
        }
    }

    pub fn with_send_resolved(mut self, send: bool) -> Self {
        self.send_resolved = Some(send);
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_icon_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.icon_emoji = emoji.into();
        self
    }
}

/// PagerDuty notifications (Events API v2 routing key or legacy service key)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerdutyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_resolved: Option<bool>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub routing_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub severity: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl PagerdutyConfig {
    pub fn new(routing_key: impl Into<String>) -> Self {
        Self {
            routing_key: routing_key.into(),
            ..Self::default()
        }
    }

    pub fn with_send_resolved(mut self, send: bool) -> Self {
        self.send_resolved = Some(send);
        self
    }

    pub fn with_service_key(mut self, key: impl Into<String>) -> Self {
        self.service_key = key.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = severity.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Opsgenie notifications
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsgenieConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_resolved: Option<bool>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub priority: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tags: String,
}

impl OpsgenieConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_send_resolved(mut self, send: bool) -> Self {
        self.send_resolved = Some(send);
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }
}

/// Generic webhook notifications
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_resolved: Option<bool>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_config: Option<HttpConfig>,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_alerts: u32,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_send_resolved(mut self, send: bool) -> Self {
        self.send_resolved = Some(send);
        self
    }

    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http_config = Some(http);
        self
    }

    pub fn with_max_alerts(mut self, max: u32) -> Self {
        self.max_alerts = max;
        self
    }
}

/// Client settings for outbound notification requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuth>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bearer_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_config: Option<TlsConfig>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub proxy_url: String,
}

impl HttpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basic_auth(mut self, auth: BasicAuth) -> Self {
        self.basic_auth = Some(auth);
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = token.into();
        self
    }

    pub fn with_tls_config(mut self, tls: TlsConfig) -> Self {
        self.tls_config = Some(tls);
        self
    }

    pub fn with_proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receiver_name_only() {
        let out = serde_yaml::to_string(&Receiver::new("default")).unwrap();
        assert_eq!(out, "name: default\n");
    }

    #[test]
    fn test_send_resolved_false_is_emitted() {
        let cfg = SlackConfig::new("#alerts").with_send_resolved(false);
        let out = serde_yaml::to_string(&cfg).unwrap();
        assert!(out.starts_with("send_resolved: false\n"));
    }

    #[test]
    fn test_integration_count() {
        let r = Receiver::new("team")
            .add_slack_config(SlackConfig::new("#a"))
            .add_webhook_config(WebhookConfig::new("https://hook"))
            .add_webhook_config(WebhookConfig::new("https://hook2"));
        assert_eq!(r.integration_count(), 3);
        assert_eq!(Receiver::new("empty").integration_count(), 0);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let r = Receiver::new("team")
            .add_webhook_config(WebhookConfig::new("https://b"))
            .add_webhook_config(WebhookConfig::new("https://a"));
        assert_eq!(r.webhook_configs[0].url, "https://b");
    }
}
