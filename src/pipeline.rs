// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Build pipeline: discover, load, write wire files

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::codegen::ident::snake_case;
use crate::discovery::{self, ResourceKind};
use crate::error::{Error, Result};
use crate::importer::ImportedConfig;
use crate::loader::{Loaded, LoaderOptions, ValueLoader};
use crate::output::WireFormat;

/// What `build` emits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Plain config files for each tool
    #[default]
    Standalone,
    /// Kubernetes operator custom resources
    Operator,
    Both,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Standalone => "standalone",
            BuildMode::Operator => "operator",
            BuildMode::Both => "both",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standalone" => Ok(BuildMode::Standalone),
            "operator" => Ok(BuildMode::Operator),
            "both" => Ok(BuildMode::Both),
            other => Err(Error::InvalidInput(format!("unknown build mode: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub output: PathBuf,
    pub mode: BuildMode,
    pub loader: LoaderOptions,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from("build"),
            mode: BuildMode::Standalone,
            loader: LoaderOptions::default(),
        }
    }
}

impl BuildOptions {
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_loader(mut self, loader: LoaderOptions) -> Self {
        self.loader = loader;
        self
    }
}

/// What a build wrote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub files: Vec<PathBuf>,
    /// Bindings written from a synthesized default
    pub fallbacks: Vec<String>,
    /// Per-file discovery failures
    pub errors: Vec<String>,
}

impl BuildReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Discover every top-level config under `root` and write it below `options.output`
pub fn build(root: impl AsRef<Path>, options: &BuildOptions) -> Result<BuildReport> {
    if options.mode != BuildMode::Standalone {
        return Err(Error::Unsupported(format!(
            "build mode '{}': only standalone output is implemented",
            options.mode
        )));
    }

    let root = root.as_ref();
    let discovered = discovery::discover(root)?;
    let refs: Vec<_> = discovered
        .all()
        .into_iter()
        .filter(|r| r.kind.is_top_level())
        .cloned()
        .collect();
    log::debug!("{}: {} top-level resource(s)", root.display(), refs.len());

    let loaded = ValueLoader::new(options.loader.clone()).load_all(&refs);
    let mut report = write_outputs(&loaded, &options.output)?;
    report.errors = discovered.errors;
    Ok(report)
}

/// Output path of each loaded value, relative to the output directory
///
/// A single Prometheus or Alertmanager config gets the conventional file
/// name; several are told apart by binding name. Rules files always go
/// under `rules/` and dashboards under `dashboards/`.
pub fn output_paths(loaded: &[Loaded]) -> Vec<PathBuf> {
    let mut per_kind: BTreeMap<ResourceKind, usize> = BTreeMap::new();
    for l in loaded {
        *per_kind.entry(l.resource.kind).or_default() += 1;
    }

    loaded
        .iter()
        .map(|l| {
            let name = snake_case(&l.resource.name);
            let shared = per_kind.get(&l.resource.kind).copied().unwrap_or(0) > 1;
            match &l.value {
                ImportedConfig::Prometheus(_) if shared => PathBuf::from(format!("prometheus-{}.yml", name)),
                ImportedConfig::Prometheus(c) => PathBuf::from(c.default_file_name()),
                ImportedConfig::Alertmanager(_) if shared => {
                    PathBuf::from(format!("alertmanager-{}.yml", name))
                }
                ImportedConfig::Alertmanager(c) => PathBuf::from(c.default_file_name()),
                ImportedConfig::Rules(_) => Path::new("rules").join(format!("{}.yml", name)),
                ImportedConfig::Dashboard(d) if d.uid.is_empty() => {
                    Path::new("dashboards").join(format!("{}.json", name))
                }
                ImportedConfig::Dashboard(d) => Path::new("dashboards").join(d.default_file_name()),
            }
        })
        .collect()
}

/// Serialize loaded values into `output`
pub fn write_outputs(loaded: &[Loaded], output: &Path) -> Result<BuildReport> {
    let mut report = BuildReport::default();
    let mut taken: BTreeMap<PathBuf, String> = BTreeMap::new();

    for (l, rel) in loaded.iter().zip(output_paths(loaded)) {
        if let Some(previous) = taken.insert(rel.clone(), l.resource.name.clone()) {
            return Err(Error::Configuration(format!(
                "{} and {} both write {}",
                previous,
                l.resource.name,
                rel.display()
            )));
        }
        let path = output.join(&rel);
        crate::output::write_atomic(&path, &l.value.serialize()?)?;
        if l.fallback {
            report.fallbacks.push(l.resource.name.clone());
        }
        report.files.push(path);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alertmanager::AlertmanagerConfig;
    use crate::discovery::ResourceRef;
    use crate::grafana::Dashboard;
    use crate::prometheus::PrometheusConfig;
    use crate::rules::RulesFile;

    fn loaded(name: &str, kind: ResourceKind, value: ImportedConfig) -> Loaded {
        Loaded {
            resource: ResourceRef {
                package: "ops".to_string(),
                name: name.to_string(),
                kind,
                file: PathBuf::from("src/lib.rs"),
                line: 1,
            },
            value,
            fallback: false,
        }
    }

    #[test]
    fn test_operator_mode_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let options = BuildOptions::default().with_mode(BuildMode::Operator);
        assert!(matches!(build(dir.path(), &options), Err(Error::Unsupported(_))));
        assert_eq!("both".parse::<BuildMode>().unwrap(), BuildMode::Both);
    }

    #[test]
    fn test_output_paths() {
        let values = vec![
            loaded("CONFIG", ResourceKind::PrometheusConfig, ImportedConfig::Prometheus(PrometheusConfig::new())),
            loaded("ALERTS", ResourceKind::AlertmanagerConfig, ImportedConfig::Alertmanager(AlertmanagerConfig::new())),
            loaded("API_RULES", ResourceKind::RulesFile, ImportedConfig::Rules(RulesFile::new())),
            loaded("OVERVIEW", ResourceKind::Dashboard, ImportedConfig::Dashboard(Dashboard::new("svc", "Service"))),
            loaded("DRAFT", ResourceKind::Dashboard, ImportedConfig::Dashboard(Dashboard::new("", "Draft"))),
        ];
        let paths = output_paths(&values);
        assert_eq!(paths[0], PathBuf::from("prometheus.yml"));
        assert_eq!(paths[1], PathBuf::from("alertmanager.yml"));
        assert_eq!(paths[2], Path::new("rules").join("api_rules.yml"));
        assert_eq!(paths[3], Path::new("dashboards").join("svc.json"));
        assert_eq!(paths[4], Path::new("dashboards").join("draft.json"));
    }

    #[test]
    fn test_several_prometheus_configs_use_binding_names() {
        let values = vec![
            loaded("EDGE", ResourceKind::PrometheusConfig, ImportedConfig::Prometheus(PrometheusConfig::new())),
            loaded("CORE", ResourceKind::PrometheusConfig, ImportedConfig::Prometheus(PrometheusConfig::new())),
        ];
        let paths = output_paths(&values);
        assert_eq!(paths[0], PathBuf::from("prometheus-edge.yml"));
        assert_eq!(paths[1], PathBuf::from("prometheus-core.yml"));
    }

    #[test]
    fn test_write_outputs_reports_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let mut stale = loaded("OVERVIEW", ResourceKind::Dashboard, ImportedConfig::Dashboard(Dashboard::new("overview", "OVERVIEW")));
        stale.fallback = true;
        let values = vec![
            loaded("CONFIG", ResourceKind::PrometheusConfig, ImportedConfig::Prometheus(PrometheusConfig::new())),
            stale,
        ];
        let report = write_outputs(&values, dir.path()).unwrap();
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.fallbacks, vec!["OVERVIEW"]);
        assert!(dir.path().join("dashboards/overview.json").is_file());
        assert!(dir.path().join("prometheus.yml").is_file());
    }

    #[test]
    fn test_write_outputs_rejects_clashing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let values = vec![
            loaded("A", ResourceKind::Dashboard, ImportedConfig::Dashboard(Dashboard::new("same", "A"))),
            loaded("B", ResourceKind::Dashboard, ImportedConfig::Dashboard(Dashboard::new("same", "B"))),
        ];
        assert!(matches!(write_outputs(&values, dir.path()), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_build_empty_tree_writes_nothing() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let report = build(src.path(), &BuildOptions::default().with_output(out.path())).unwrap();
        assert!(report.files.is_empty());
    }
}
