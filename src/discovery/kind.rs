// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Recognized observability types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Closed set of type names the scanner reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    PrometheusConfig,
    ScrapeConfig,
    GlobalConfig,
    StaticConfig,
    AlertmanagerConfig,
    RulesFile,
    RuleGroup,
    AlertingRule,
    RecordingRule,
    Dashboard,
}

impl ResourceKind {
    /// Every kind, in listing order
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::PrometheusConfig,
        ResourceKind::ScrapeConfig,
        ResourceKind::GlobalConfig,
        ResourceKind::StaticConfig,
        ResourceKind::AlertmanagerConfig,
        ResourceKind::RulesFile,
        ResourceKind::RuleGroup,
        ResourceKind::AlertingRule,
        ResourceKind::RecordingRule,
        ResourceKind::Dashboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrometheusConfig => "PrometheusConfig",
            Self::ScrapeConfig => "ScrapeConfig",
            Self::GlobalConfig => "GlobalConfig",
            Self::StaticConfig => "StaticConfig",
            Self::AlertmanagerConfig => "AlertmanagerConfig",
            Self::RulesFile => "RulesFile",
            Self::RuleGroup => "RuleGroup",
            Self::AlertingRule => "AlertingRule",
            Self::RecordingRule => "RecordingRule",
            Self::Dashboard => "Dashboard",
        }
    }

    /// Match a bare type identifier
    pub fn from_ident(ident: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == ident)
    }

    /// Path of the model type below the library root
    pub fn type_path(&self) -> &'static str {
        match self {
            Self::PrometheusConfig => "prometheus::PrometheusConfig",
            Self::ScrapeConfig => "prometheus::ScrapeConfig",
            Self::GlobalConfig => "prometheus::GlobalConfig",
            Self::StaticConfig => "prometheus::StaticConfig",
            Self::AlertmanagerConfig => "alertmanager::AlertmanagerConfig",
            Self::RulesFile => "rules::RulesFile",
            Self::RuleGroup => "rules::RuleGroup",
            Self::AlertingRule => "rules::AlertingRule",
            Self::RecordingRule => "rules::RecordingRule",
            Self::Dashboard => "grafana::Dashboard",
        }
    }

    /// Kinds that are written to their own output file by `build`
    pub fn is_top_level(&self) -> bool {
        matches!(
            self,
            Self::PrometheusConfig | Self::AlertmanagerConfig | Self::RulesFile | Self::Dashboard
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    /// Accepts the type name or its snake_case form (`scrape_config`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(kind) = Self::from_ident(s) {
            return Ok(kind);
        }
        let folded: String = s.chars().filter(|c| *c != '_' && *c != '-').collect();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(&folded))
            .ok_or_else(|| Error::InvalidInput(format!("unknown resource type: {}", s)))
    }
}
