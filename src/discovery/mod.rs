// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Resource discovery
//!
//! Walks a source tree and reports every exported module-level binding whose
//! type is one of the recognized observability types. Imports are not
//! resolved: a local `struct Dashboard` matches the same way the library's
//! `grafana::Dashboard` does.

mod kind;
mod manifest;
mod scan;

pub use kind::ResourceKind;
pub use manifest::CrateManifest;
pub use scan::{constructed_kind, declared_kind, find_binding, parse_source, scan_file, Binding};
pub(crate) use scan::tail_expr;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};

/// One discovered binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub package: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub file: PathBuf,
    pub line: usize,
}

/// Everything found under one root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub prometheus_configs: Vec<ResourceRef>,
    pub scrape_configs: Vec<ResourceRef>,
    pub global_configs: Vec<ResourceRef>,
    pub static_configs: Vec<ResourceRef>,
    pub alertmanager_configs: Vec<ResourceRef>,
    pub rules_files: Vec<ResourceRef>,
    pub rule_groups: Vec<ResourceRef>,
    pub alerting_rules: Vec<ResourceRef>,
    pub recording_rules: Vec<ResourceRef>,
    pub dashboards: Vec<ResourceRef>,
    /// Per-file parse failures, `path:line: message`
    pub errors: Vec<String>,
    #[serde(default)]
    pub files_scanned: usize,
}

impl DiscoveryResult {
    pub fn by_kind(&self, kind: ResourceKind) -> &[ResourceRef] {
        match kind {
            ResourceKind::PrometheusConfig => &self.prometheus_configs,
            ResourceKind::ScrapeConfig => &self.scrape_configs,
            ResourceKind::GlobalConfig => &self.global_configs,
            ResourceKind::StaticConfig => &self.static_configs,
            ResourceKind::AlertmanagerConfig => &self.alertmanager_configs,
            ResourceKind::RulesFile => &self.rules_files,
            ResourceKind::RuleGroup => &self.rule_groups,
            ResourceKind::AlertingRule => &self.alerting_rules,
            ResourceKind::RecordingRule => &self.recording_rules,
            ResourceKind::Dashboard => &self.dashboards,
        }
    }

    fn list_mut(&mut self, kind: ResourceKind) -> &mut Vec<ResourceRef> {
        match kind {
            ResourceKind::PrometheusConfig => &mut self.prometheus_configs,
            ResourceKind::ScrapeConfig => &mut self.scrape_configs,
            ResourceKind::GlobalConfig => &mut self.global_configs,
            ResourceKind::StaticConfig => &mut self.static_configs,
            ResourceKind::AlertmanagerConfig => &mut self.alertmanager_configs,
            ResourceKind::RulesFile => &mut self.rules_files,
            ResourceKind::RuleGroup => &mut self.rule_groups,
            ResourceKind::AlertingRule => &mut self.alerting_rules,
            ResourceKind::RecordingRule => &mut self.recording_rules,
            ResourceKind::Dashboard => &mut self.dashboards,
        }
    }

    pub fn push(&mut self, resource: ResourceRef) {
        self.list_mut(resource.kind).push(resource);
    }

    pub fn total_count(&self) -> usize {
        ResourceKind::ALL.iter().map(|k| self.by_kind(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    /// Every resource, grouped by kind in listing order
    pub fn all(&self) -> Vec<&ResourceRef> {
        ResourceKind::ALL
            .iter()
            .flat_map(|k| self.by_kind(*k).iter())
            .collect()
    }

    /// First resource with this binding name
    pub fn find(&self, name: &str) -> Option<&ResourceRef> {
        self.all().into_iter().find(|r| r.name == name)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Aligned `TYPE NAME PACKAGE LOCATION` table
    pub fn render_table(&self) -> String {
        let rows: Vec<[String; 4]> = self
            .all()
            .into_iter()
            .map(|r| {
                [
                    r.kind.to_string(),
                    r.name.clone(),
                    r.package.clone(),
                    format!("{}:{}", r.file.display(), r.line),
                ]
            })
            .collect();

        let headers = ["TYPE", "NAME", "PACKAGE", "LOCATION"];
        let mut widths = headers.map(str::len);
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.len());
            }
        }

        let mut out = String::new();
        let line = |out: &mut String, cells: [&str; 4]| {
            let _ = writeln!(
                out,
                "{:<w0$}  {:<w1$}  {:<w2$}  {}",
                cells[0],
                cells[1],
                cells[2],
                cells[3],
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2],
            );
        };
        line(&mut out, headers);
        for row in &rows {
            line(&mut out, [&row[0], &row[1], &row[2], &row[3]]);
        }
        out
    }
}

/// Directories never descended into
pub(crate) fn is_excluded_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "vendor" || name == "target"
}

pub(crate) fn is_source_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "rs")
        && !path
            .file_stem()
            .is_some_and(|s| s.to_string_lossy().ends_with("_test"))
}

/// Scan every non-test `.rs` file below `root`
///
/// Fails only when `root` itself cannot be read; per-file problems land in
/// [`DiscoveryResult::errors`].
pub fn discover(root: impl AsRef<Path>) -> Result<DiscoveryResult> {
    let root = root.as_ref();
    std::fs::metadata(root).map_err(|e| Error::io_at(root, e))?;

    let mut result = DiscoveryResult::default();
    let mut manifests: HashMap<PathBuf, Option<CrateManifest>> = HashMap::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                if e.depth() == 0 {
                    return Err(Error::Other(format!("cannot read {}: {}", root.display(), e)));
                }
                log::warn!("skipping unreadable entry: {}", e);
                result.errors.push(e.to_string());
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !is_source_file(path) {
            continue;
        }

        result.files_scanned += 1;
        let file = match parse_source(path) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("{}", e);
                result.errors.push(e.to_string());
                continue;
            }
        };

        let bindings: Vec<_> = scan_file(&file).into_iter().filter(|b| b.exported).collect();
        if bindings.is_empty() {
            continue;
        }

        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let manifest = manifests
            .entry(dir)
            .or_insert_with(|| CrateManifest::locate(path));
        let package = match manifest {
            Some(m) => m.package_path(path),
            None => manifest::directory_package(path),
        };

        for binding in bindings {
            log::debug!("{}:{} {} {}", path.display(), binding.line, binding.kind, binding.name);
            result.push(ResourceRef {
                package: package.clone(),
                name: binding.name,
                kind: binding.kind,
                file: path.to_path_buf(),
                line: binding.line,
            });
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_discover_orders_and_groups() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "b.rs",
            "pub static GRAFANA: Dashboard = Dashboard::new(\"g\", \"G\");\npub static SECOND: PrometheusConfig = PrometheusConfig::new();\n",
        );
        write(
            dir.path(),
            "a.rs",
            "pub static FIRST: PrometheusConfig = PrometheusConfig::new();\n",
        );

        let result = discover(dir.path()).unwrap();
        let names: Vec<_> = result.prometheus_configs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["FIRST", "SECOND"]);
        assert_eq!(result.dashboards.len(), 1);
        assert_eq!(result.total_count(), 3);
        assert_eq!(result.all()[2].name, "GRAFANA");
        assert_eq!(result.files_scanned, 2);
    }

    #[test]
    fn test_parse_errors_do_not_abort() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.rs", "pub static X: = ;\n");
        write(dir.path(), "ok.rs", "pub static OK: RulesFile = RulesFile::new();\n");

        let result = discover(dir.path()).unwrap();
        assert_eq!(result.rules_files.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("broken.rs"));
    }

    #[test]
    fn test_excluded_directories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".hidden/x.rs", "pub static H: Dashboard = Dashboard::new(\"h\", \"h\");\n");
        write(dir.path(), "target/x.rs", "pub static T: Dashboard = Dashboard::new(\"t\", \"t\");\n");
        write(dir.path(), "src/x.rs", "pub static S: Dashboard = Dashboard::new(\"s\", \"s\");\n");

        let result = discover(dir.path()).unwrap();
        assert_eq!(result.dashboards.len(), 1);
        assert_eq!(result.dashboards[0].name, "S");
    }

    #[test]
    fn test_missing_root_fails() {
        assert!(discover("/definitely/not/here").is_err());
    }

    #[test]
    fn test_find_and_table() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "rules.rs", "pub static HIGH_CPU: AlertingRule = AlertingRule::new(\"HighCpu\", \"x > 1\");\n");

        let result = discover(dir.path()).unwrap();
        let found = result.find("HIGH_CPU").unwrap();
        assert_eq!(found.kind, ResourceKind::AlertingRule);
        assert_eq!(found.line, 1);

        let table = result.render_table();
        assert!(table.starts_with("TYPE"));
        assert!(table.contains("AlertingRule"));
        assert!(result.to_json().unwrap().contains("\"type\": \"AlertingRule\""));
    }
}
