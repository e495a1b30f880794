// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Value loader
//!
//! Evaluates discovered bindings by compiling a throwaway helper crate that
//! depends on the user's crate and prints the values as JSON. All bindings of
//! one crate share a single helper build. A crate whose helper fails is
//! retried one binding at a time, and anything that still cannot be loaded
//! is replaced by [`Fallback::fallback`] so one stale package never stops a
//! build.

use proc_macro2::TokenStream;
use quote::quote;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::alertmanager::{AlertmanagerConfig, Receiver, Route};
use crate::discovery::{find_binding, parse_source, CrateManifest, ResourceKind, ResourceRef};
use crate::error::{Error, Result};
use crate::grafana::Dashboard;
use crate::importer::ImportedConfig;
use crate::prometheus::PrometheusConfig;
use crate::rules::RulesFile;

/// Package name of this library as user crates depend on it
pub const LIBRARY_PACKAGE: &str = "wetwire-observability";

const HELPER_PACKAGE: &str = "wetwire-loader-helper";

/// Receiver used by synthesized Alertmanager configs
pub const NULL_RECEIVER: &str = "null";

/// Minimal value substituted when a binding cannot be loaded
pub trait Fallback {
    fn fallback(name: &str) -> Self;
}

impl Fallback for PrometheusConfig {
    fn fallback(_name: &str) -> Self {
        PrometheusConfig::default()
    }
}

impl Fallback for AlertmanagerConfig {
    /// Route everything to a receiver without integrations
    fn fallback(_name: &str) -> Self {
        AlertmanagerConfig::new()
            .with_route(Route::new(NULL_RECEIVER))
            .add_receiver(Receiver::new(NULL_RECEIVER))
    }
}

impl Fallback for RulesFile {
    fn fallback(_name: &str) -> Self {
        RulesFile::default()
    }
}

impl Fallback for Dashboard {
    /// `SERVICE_OVERVIEW` → uid `service-overview`
    fn fallback(name: &str) -> Self {
        let uid = name.to_ascii_lowercase().replace('_', "-");
        Dashboard::new(uid, name)
    }
}

/// Fallback for a top-level kind; `None` for kinds that are not loaded
pub fn fallback_for(kind: ResourceKind, name: &str) -> Option<ImportedConfig> {
    match kind {
        ResourceKind::PrometheusConfig => Some(ImportedConfig::Prometheus(Fallback::fallback(name))),
        ResourceKind::AlertmanagerConfig => {
            Some(ImportedConfig::Alertmanager(Fallback::fallback(name)))
        }
        ResourceKind::RulesFile => Some(ImportedConfig::Rules(Fallback::fallback(name))),
        ResourceKind::Dashboard => Some(ImportedConfig::Dashboard(Fallback::fallback(name))),
        _ => None,
    }
}

/// Rebuild a model value from the JSON the helper printed
pub fn hydrate(kind: ResourceKind, value: Value) -> Result<ImportedConfig> {
    Ok(match kind {
        ResourceKind::PrometheusConfig => ImportedConfig::Prometheus(serde_json::from_value(value)?),
        ResourceKind::AlertmanagerConfig => {
            ImportedConfig::Alertmanager(serde_json::from_value(value)?)
        }
        ResourceKind::RulesFile => ImportedConfig::Rules(serde_json::from_value(value)?),
        ResourceKind::Dashboard => ImportedConfig::Dashboard(serde_json::from_value(value)?),
        other => return Err(Error::Unsupported(format!("loading {} values", other))),
    })
}

/// How the helper crate is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Cargo executable
    pub cargo: String,
    /// Shared target directory so repeated loads reuse compiled dependencies
    pub target_dir: Option<PathBuf>,
    pub offline: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            cargo: "cargo".to_string(),
            target_dir: None,
            offline: false,
        }
    }
}

/// One loaded binding
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub resource: ResourceRef,
    pub value: ImportedConfig,
    /// The value is a fallback, not the binding's real value
    pub fallback: bool,
}

/// A binding as the helper refers to it
#[derive(Debug, Clone)]
struct Target {
    resource: ResourceRef,
    /// `crate::module::NAME`
    path: String,
    /// Declared type wraps the value (`LazyLock<T>`, `&'static T`)
    deref: bool,
}

pub struct ValueLoader {
    options: LoaderOptions,
}

impl ValueLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Load one binding, falling back on any failure
    pub fn load(&self, resource: &ResourceRef) -> Option<Loaded> {
        self.load_all(std::slice::from_ref(resource)).into_iter().next()
    }

    /// Load every top-level binding in `refs`, one helper build per crate
    ///
    /// Results keep the order of `refs`; kinds without an output file are skipped.
    pub fn load_all(&self, refs: &[ResourceRef]) -> Vec<Loaded> {
        let mut by_crate: BTreeMap<PathBuf, Vec<&ResourceRef>> = BTreeMap::new();
        let mut no_crate = Vec::new();
        for resource in refs.iter().filter(|r| r.kind.is_top_level()) {
            match CrateManifest::locate(&resource.file) {
                Some(manifest) => by_crate.entry(manifest.dir).or_default().push(resource),
                None => no_crate.push(resource),
            }
        }

        let mut loaded: BTreeMap<(PathBuf, String), Loaded> = BTreeMap::new();
        for resource in no_crate {
            log::warn!(
                "{}: no Cargo package owns {}, using a fallback",
                resource.name,
                resource.file.display()
            );
            if let Some(l) = fallback(resource) {
                loaded.insert(key(resource), l);
            }
        }
        for (dir, group) in by_crate {
            for l in self.load_crate(&dir, &group) {
                loaded.insert(key(&l.resource), l);
            }
        }

        refs.iter().filter_map(|r| loaded.remove(&key(r))).collect()
    }

    fn load_crate(&self, dir: &Path, group: &[&ResourceRef]) -> Vec<Loaded> {
        let manifest = match CrateManifest::read(dir) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("{}", e);
                return group.iter().filter_map(|r| fallback(r)).collect();
            }
        };
        if !manifest.has_lib() {
            log::warn!("{} has no library target to load values from", manifest.package);
            return group.iter().filter_map(|r| fallback(r)).collect();
        }

        let targets: Vec<Target> = group.iter().map(|r| target(r)).collect();
        match self.run_helper(&manifest, &targets) {
            Ok(values) => return collect(&targets, values),
            Err(e) if targets.len() > 1 => {
                log::warn!("batch load for {} failed, retrying one at a time: {}", manifest.package, e);
            }
            Err(e) => log::warn!("{}: {}", targets[0].resource.name, e),
        }

        if targets.len() == 1 {
            return group.iter().filter_map(|r| fallback(r)).collect();
        }
        targets
            .iter()
            .flat_map(|t| {
                let single = std::slice::from_ref(t);
                match self.run_helper(&manifest, single) {
                    Ok(values) => collect(single, values),
                    Err(e) => {
                        log::warn!("{}: {}", t.resource.name, e);
                        fallback(&t.resource).into_iter().collect()
                    }
                }
            })
            .collect()
    }

    /// Build and run a helper printing `{path: value}` for each target
    fn run_helper(&self, manifest: &CrateManifest, targets: &[Target]) -> Result<BTreeMap<String, Value>> {
        let tmp = tempfile::tempdir()?;
        let helper = tmp.path();
        std::fs::create_dir_all(helper.join("src")).map_err(|e| Error::io_at(helper, e))?;

        let cargo_toml = helper_manifest(manifest)?;
        let main_rs = helper_main(targets)?;
        write(&helper.join("Cargo.toml"), cargo_toml.as_bytes())?;
        write(&helper.join("src").join("main.rs"), main_rs.as_bytes())?;

        let mut cmd = Command::new(&self.options.cargo);
        cmd.arg("run").arg("--quiet").arg("--manifest-path").arg(helper.join("Cargo.toml"));
        if self.options.offline {
            cmd.arg("--offline");
        }
        if let Some(dir) = &self.options.target_dir {
            cmd.env("CARGO_TARGET_DIR", dir);
        }
        log::debug!("loading {} value(s) from {}", targets.len(), manifest.package);

        let output = cmd
            .output()
            .map_err(|e| Error::CommandFailed(format!("{}: {}", self.options.cargo, e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
            return Err(Error::CommandFailed(format!(
                "helper for {} exited with {}: {}",
                manifest.package, output.status, last
            )));
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

impl Default for ValueLoader {
    fn default() -> Self {
        Self::new(LoaderOptions::default())
    }
}

fn key(resource: &ResourceRef) -> (PathBuf, String) {
    (resource.file.clone(), resource.name.clone())
}

fn fallback(resource: &ResourceRef) -> Option<Loaded> {
    log::warn!("{}: using a synthesized {}", resource.name, resource.kind);
    fallback_for(resource.kind, &resource.name).map(|value| Loaded {
        resource: resource.clone(),
        value,
        fallback: true,
    })
}

fn target(resource: &ResourceRef) -> Target {
    let deref = parse_source(&resource.file)
        .ok()
        .and_then(|file| find_binding(&file, &resource.name).map(|b| wraps_value(b.ty)))
        .unwrap_or(true);
    Target {
        path: format!("{}::{}", resource.package, resource.name),
        resource: resource.clone(),
        deref,
    }
}

/// `LazyLock<T>`, `Lazy<T>`, `Box<T>`, `&'static T` need `&*` to reach the value
fn wraps_value(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::Reference(_) => true,
        syn::Type::Path(p) => p
            .path
            .segments
            .last()
            .is_some_and(|s| !matches!(s.arguments, syn::PathArguments::None)),
        _ => false,
    }
}

fn collect(targets: &[Target], mut values: BTreeMap<String, Value>) -> Vec<Loaded> {
    targets
        .iter()
        .filter_map(|t| {
            let hydrated = values
                .remove(&t.path)
                .ok_or_else(|| Error::NotFound(t.path.clone()))
                .and_then(|v| hydrate(t.resource.kind, v));
            match hydrated {
                Ok(value) => Some(Loaded {
                    resource: t.resource.clone(),
                    value,
                    fallback: false,
                }),
                Err(e) => {
                    log::warn!("{}: {}", t.resource.name, e);
                    fallback(&t.resource)
                }
            }
        })
        .collect()
}

/// Helper `Cargo.toml`: the user crate by path, this library as the user crate names it
fn helper_manifest(manifest: &CrateManifest) -> Result<String> {
    let (_, library) = manifest.dependency(LIBRARY_PACKAGE).ok_or_else(|| {
        Error::Configuration(format!("{} does not depend on {}", manifest.package, LIBRARY_PACKAGE))
    })?;

    let mut table = match library {
        toml::Value::Table(t) => t.clone(),
        toml::Value::String(version) => {
            let mut t = toml::Table::new();
            t.insert("version".into(), toml::Value::String(version.clone()));
            t
        }
        _ => {
            return Err(Error::Configuration(format!(
                "{}: unsupported {} dependency entry",
                manifest.package, LIBRARY_PACKAGE
            )))
        }
    };
    let dir = std::path::absolute(&manifest.dir).map_err(|e| Error::io_at(&manifest.dir, e))?;
    if let Some(path) = table.get("path").and_then(toml::Value::as_str) {
        let absolute = dir.join(path);
        table.insert("path".into(), toml::Value::String(absolute.display().to_string()));
    }
    table.insert("package".into(), toml::Value::String(LIBRARY_PACKAGE.to_string()));
    let library = toml::Value::Table(table);

    let mut user = toml::Table::new();
    user.insert("package".into(), toml::Value::String(manifest.package.clone()));
    user.insert("path".into(), toml::Value::String(dir.display().to_string()));

    let mut deps = toml::Table::new();
    deps.insert(manifest.lib_ident.clone(), toml::Value::Table(user));
    deps.insert("wetwire_obs_lib".into(), library);
    deps.insert("serde_json".into(), toml::Value::String("1.0".into()));

    let mut package = toml::Table::new();
    package.insert("name".into(), toml::Value::String(HELPER_PACKAGE.into()));
    package.insert("version".into(), toml::Value::String("0.0.0".into()));
    package.insert("edition".into(), toml::Value::String("2021".into()));
    package.insert("publish".into(), toml::Value::Boolean(false));

    let mut root = toml::Table::new();
    root.insert("package".into(), toml::Value::Table(package));
    root.insert("workspace".into(), toml::Value::Table(toml::Table::new()));
    root.insert("dependencies".into(), toml::Value::Table(deps));
    toml::to_string(&root).map_err(|e| Error::Other(e.to_string()))
}

/// Helper `main.rs` printing one JSON object keyed by binding path
fn helper_main(targets: &[Target]) -> Result<String> {
    let inserts: Vec<TokenStream> = targets
        .iter()
        .map(|t| {
            let path: syn::Path = syn::parse_str(&t.path)
                .map_err(|e| Error::InvalidInput(format!("{}: {}", t.path, e)))?;
            let key = &t.path;
            let value = if t.deref { quote!(&*#path) } else { quote!(&#path) };
            Ok(quote! {
                out.insert(#key.to_string(), serde_json::to_value(#value).unwrap_or_else(|e| fail(#key, e)));
            })
        })
        .collect::<Result<_>>()?;

    let tokens = quote! {
        fn fail(name: &str, err: serde_json::Error) -> serde_json::Value {
            eprintln!("{}: {}", name, err);
            std::process::exit(1)
        }

        fn main() {
            let mut out = serde_json::Map::new();
            #(#inserts)*
            println!("{}", serde_json::Value::Object(out));
        }
    };
    let file: syn::File = syn::parse2(tokens).map_err(|e| Error::Other(e.to_string()))?;
    Ok(prettyplease::unparse(&file))
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|e| Error::io_at(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn resource(package: &str, name: &str, kind: ResourceKind, file: &Path) -> ResourceRef {
        ResourceRef {
            package: package.to_string(),
            name: name.to_string(),
            kind,
            file: file.to_path_buf(),
            line: 1,
        }
    }

    fn user_crate(dir: &Path) -> CrateManifest {
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::write(
            dir.join("Cargo.toml"),
            "[package]\nname = \"my-monitoring\"\nversion = \"0.1.0\"\n\n\
             [dependencies]\nwetwire-observability = { path = \"../wetwire\" }\n",
        )
        .unwrap();
        fs::write(
            dir.join("src/lib.rs"),
            "use std::sync::LazyLock;\nuse wetwire_obs::prometheus::PrometheusConfig;\n\
             pub static CONFIG: LazyLock<PrometheusConfig> = LazyLock::new(PrometheusConfig::new);\n",
        )
        .unwrap();
        CrateManifest::read(dir).unwrap()
    }

    #[test]
    fn test_fallbacks() {
        let am = AlertmanagerConfig::fallback("MAIN");
        assert_eq!(am.route.receiver, NULL_RECEIVER);
        assert!(am.unresolved_receivers().is_empty());

        let dash = Dashboard::fallback("SERVICE_OVERVIEW");
        assert_eq!(dash.uid, "service-overview");
        assert_eq!(dash.title, "SERVICE_OVERVIEW");

        assert!(fallback_for(ResourceKind::ScrapeConfig, "X").is_none());
    }

    #[test]
    fn test_hydrate() {
        let value = serde_json::json!({
            "scrape_configs": [{"job_name": "node", "scrape_interval": "15s"}]
        });
        let ImportedConfig::Prometheus(config) = hydrate(ResourceKind::PrometheusConfig, value).unwrap()
        else {
            panic!("expected a Prometheus config");
        };
        assert_eq!(config.scrape_configs[0].job_name, "node");
        assert!(hydrate(ResourceKind::ScrapeConfig, Value::Null).is_err());
    }

    #[test]
    fn test_helper_manifest_absolutises_library_path() {
        let root = tempfile::tempdir().unwrap();
        let manifest = user_crate(&root.path().join("user"));
        let text = helper_manifest(&manifest).unwrap();
        let table: toml::Table = toml::from_str(&text).unwrap();

        assert!(table.contains_key("workspace"));
        let deps = table["dependencies"].as_table().unwrap();
        let user = deps["my_monitoring"].as_table().unwrap();
        assert_eq!(user["package"].as_str(), Some("my-monitoring"));
        let library = deps["wetwire_obs_lib"].as_table().unwrap();
        let path = PathBuf::from(library["path"].as_str().unwrap());
        assert!(path.is_absolute());
        assert!(path.ends_with("user/../wetwire"));
    }

    #[test]
    fn test_helper_manifest_requires_library() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path();
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::write(dir.join("Cargo.toml"), "[package]\nname = \"bare\"\nversion = \"0.1.0\"\n").unwrap();
        let manifest = CrateManifest::read(dir).unwrap();
        assert!(matches!(helper_manifest(&manifest), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_helper_main_derefs_wrapped_values() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("user");
        user_crate(&dir);
        let file = dir.join("src/lib.rs");
        let t = target(&resource("my_monitoring", "CONFIG", ResourceKind::PrometheusConfig, &file));
        assert!(t.deref);

        let main = helper_main(&[t]).unwrap();
        assert!(main.contains("serde_json::to_value(&*my_monitoring::CONFIG)"));
        assert!(main.contains("\"my_monitoring::CONFIG\".to_string()"));
    }

    #[test]
    fn test_failed_build_falls_back() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("user");
        user_crate(&dir);
        let file = dir.join("src/lib.rs");
        let refs = vec![
            resource("my_monitoring", "CONFIG", ResourceKind::PrometheusConfig, &file),
            resource("my_monitoring", "NODE", ResourceKind::ScrapeConfig, &file),
        ];
        let loader = ValueLoader::new(LoaderOptions {
            cargo: "wetwire-no-such-cargo".to_string(),
            ..LoaderOptions::default()
        });
        let loaded = loader.load_all(&refs);
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].fallback);
        assert_eq!(loaded[0].value, ImportedConfig::Prometheus(PrometheusConfig::default()));
    }
}
