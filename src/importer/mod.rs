// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Importer
//!
//! Reads existing wire-format files back into the typed model. Parse
//! failures are errors; suspicious but valid content becomes warnings.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::alertmanager::AlertmanagerConfig;
use crate::error::{Error, Result};
use crate::grafana::Dashboard;
use crate::output::WireFormat;
use crate::prometheus::PrometheusConfig;
use crate::rules::{Rule, RulesFile};

/// The wire formats the importer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    Prometheus,
    Alertmanager,
    Rules,
    Grafana,
}

impl ImportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportFormat::Prometheus => "prometheus",
            ImportFormat::Alertmanager => "alertmanager",
            ImportFormat::Rules => "rules",
            ImportFormat::Grafana => "grafana",
        }
    }

    /// Guess the format from content
    ///
    /// JSON objects with `panels` or `title` are Grafana dashboards; YAML
    /// with `route` or `receivers` is Alertmanager, with `groups` it is a
    /// rules file, and anything else is treated as Prometheus.
    pub fn detect(bytes: &[u8]) -> Self {
        if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(bytes) {
            if map.contains_key("panels") || map.contains_key("title") {
                return ImportFormat::Grafana;
            }
        }
        let keys: BTreeSet<String> = match serde_yaml::from_slice::<serde_yaml::Value>(bytes) {
            Ok(serde_yaml::Value::Mapping(map)) => map
                .keys()
                .filter_map(|k| k.as_str().map(str::to_string))
                .collect(),
            _ => BTreeSet::new(),
        };
        if keys.contains("route") || keys.contains("receivers") {
            ImportFormat::Alertmanager
        } else if keys.contains("groups") {
            ImportFormat::Rules
        } else {
            ImportFormat::Prometheus
        }
    }
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "prometheus" => Ok(ImportFormat::Prometheus),
            "alertmanager" => Ok(ImportFormat::Alertmanager),
            "rules" => Ok(ImportFormat::Rules),
            "grafana" | "dashboard" => Ok(ImportFormat::Grafana),
            other => Err(Error::InvalidInput(format!("unknown import format: {}", other))),
        }
    }
}

/// One imported configuration tree
#[derive(Debug, Clone, PartialEq)]
pub enum ImportedConfig {
    Prometheus(PrometheusConfig),
    Alertmanager(AlertmanagerConfig),
    Rules(RulesFile),
    Dashboard(Dashboard),
}

impl ImportedConfig {
    pub fn format(&self) -> ImportFormat {
        match self {
            ImportedConfig::Prometheus(_) => ImportFormat::Prometheus,
            ImportedConfig::Alertmanager(_) => ImportFormat::Alertmanager,
            ImportedConfig::Rules(_) => ImportFormat::Rules,
            ImportedConfig::Dashboard(_) => ImportFormat::Grafana,
        }
    }

    /// Re-render the wire bytes
    pub fn serialize(&self) -> Result<Vec<u8>> {
        match self {
            ImportedConfig::Prometheus(c) => c.to_wire(),
            ImportedConfig::Alertmanager(c) => c.to_wire(),
            ImportedConfig::Rules(c) => c.to_wire(),
            ImportedConfig::Dashboard(c) => c.to_wire(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportResult {
    pub config: ImportedConfig,
    pub warnings: Vec<String>,
}

pub fn parse_prometheus(bytes: &[u8]) -> Result<PrometheusConfig> {
    Ok(serde_yaml::from_slice(bytes)?)
}

pub fn parse_alertmanager(bytes: &[u8]) -> Result<AlertmanagerConfig> {
    Ok(serde_yaml::from_slice(bytes)?)
}

pub fn parse_rules(bytes: &[u8]) -> Result<RulesFile> {
    Ok(serde_yaml::from_slice(bytes)?)
}

/// Parse dashboard JSON; unsupported panels are dropped with a warning
pub fn parse_dashboard(bytes: &[u8]) -> Result<(Dashboard, Vec<String>)> {
    Dashboard::from_json(bytes)
}

pub fn prometheus_warnings(config: &PrometheusConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    if config.scrape_configs.is_empty() {
        warnings.push("no scrape configs".to_string());
    }
    let mut seen = BTreeSet::new();
    for job in &config.scrape_configs {
        if !seen.insert(job.job_name.as_str()) {
            warnings.push(format!("scrape job '{}' is defined more than once", job.job_name));
        }
    }
    warnings
}

pub fn alertmanager_warnings(config: &AlertmanagerConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    if config.receivers.is_empty() {
        warnings.push("receivers list is empty".to_string());
    }
    for name in config.unresolved_receivers() {
        warnings.push(format!("route receiver '{}' is not in the receivers list", name));
    }
    warnings
}

pub fn rules_warnings(file: &RulesFile) -> Vec<String> {
    let mut warnings = Vec::new();
    for group in &file.groups {
        for rule in &group.rules {
            let Rule::Alerting(alert) = rule else { continue };
            if alert.r#for.is_zero() {
                warnings.push(format!(
                    "group '{}': alert '{}' has no `for` duration",
                    group.name, alert.alert
                ));
            }
            if alert.severity().is_none() {
                warnings.push(format!(
                    "group '{}': alert '{}' has no severity label",
                    group.name, alert.alert
                ));
            }
        }
    }
    warnings
}

/// Attach the source path (and line, when known) to a parse failure
fn at_path(path: &Path, err: Error) -> Error {
    match err {
        Error::Yaml(e) => {
            let line = e.location().map(|l| l.line());
            Error::parse(path, line, e.to_string())
        }
        Error::Json(e) => Error::parse(path, Some(e.line()).filter(|l| *l > 0), e.to_string()),
        other => other,
    }
}

/// Parse `bytes` as `format` and collect warnings
pub fn import_bytes(bytes: &[u8], format: ImportFormat) -> Result<ImportResult> {
    let (config, warnings) = match format {
        ImportFormat::Prometheus => {
            let c = parse_prometheus(bytes)?;
            let w = prometheus_warnings(&c);
            (ImportedConfig::Prometheus(c), w)
        }
        ImportFormat::Alertmanager => {
            let c = parse_alertmanager(bytes)?;
            let w = alertmanager_warnings(&c);
            (ImportedConfig::Alertmanager(c), w)
        }
        ImportFormat::Rules => {
            let c = parse_rules(bytes)?;
            let w = rules_warnings(&c);
            (ImportedConfig::Rules(c), w)
        }
        ImportFormat::Grafana => {
            let (c, w) = parse_dashboard(bytes)?;
            (ImportedConfig::Dashboard(c), w)
        }
    };
    Ok(ImportResult { config, warnings })
}

/// Read and parse a file, detecting its format from content
pub fn import_file(path: impl AsRef<Path>) -> Result<ImportResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::io_at(path, e))?;
    let format = ImportFormat::detect(&bytes);
    log::debug!("{}: detected {} format", path.display(), format);
    import_bytes(&bytes, format).map_err(|e| at_path(path, e))
}

/// Read and parse a file as a known format
pub fn import_file_as(path: impl AsRef<Path>, format: ImportFormat) -> Result<ImportResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::io_at(path, e))?;
    import_bytes(&bytes, format).map_err(|e| at_path(path, e))
}
