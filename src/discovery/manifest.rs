// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Locating the Cargo package that owns a source file

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// The `[package]` of the nearest ancestor `Cargo.toml`
#[derive(Debug, Clone)]
pub struct CrateManifest {
    /// Directory holding `Cargo.toml`
    pub dir: PathBuf,
    /// `[package].name`
    pub package: String,
    /// Name used in `use` paths (`[lib].name`, or the package name with `-` → `_`)
    pub lib_ident: String,
    pub table: toml::Table,
}

impl CrateManifest {
    /// Parse `dir/Cargo.toml`; manifests without `[package]` (virtual workspaces) are rejected
    pub fn read(dir: &Path) -> Result<Self> {
        let path = dir.join("Cargo.toml");
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io_at(&path, e))?;
        let table: toml::Table =
            toml::from_str(&content).map_err(|e| Error::parse(&path, None, e.to_string()))?;

        let package = table
            .get("package")
            .and_then(|p| p.get("name"))
            .and_then(toml::Value::as_str)
            .ok_or_else(|| Error::parse(&path, None, "no [package].name"))?
            .to_string();
        let lib_ident = table
            .get("lib")
            .and_then(|l| l.get("name"))
            .and_then(toml::Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| package.replace('-', "_"));

        Ok(Self {
            dir: dir.to_path_buf(),
            package,
            lib_ident,
            table,
        })
    }

    /// Walk up from `file` to the first directory with a readable package manifest
    pub fn locate(file: &Path) -> Option<Self> {
        let mut dir = file.parent();
        while let Some(d) = dir {
            if d.join("Cargo.toml").is_file() {
                match Self::read(d) {
                    Ok(manifest) => return Some(manifest),
                    Err(e) => log::debug!("skipping manifest in {}: {}", d.display(), e),
                }
            }
            dir = d.parent();
        }
        None
    }

    /// Whether the package builds a library other crates can depend on
    pub fn has_lib(&self) -> bool {
        self.table.contains_key("lib") || self.dir.join("src").join("lib.rs").is_file()
    }

    /// `crate::module` path of `file` inside this package
    pub fn package_path(&self, file: &Path) -> String {
        let src = self.dir.join("src");
        let module = match file.strip_prefix(&src) {
            Ok(rel) => module_path(rel),
            Err(_) => file
                .strip_prefix(&self.dir)
                .map(module_path)
                .unwrap_or_default(),
        };
        if module.is_empty() {
            self.lib_ident.clone()
        } else {
            format!("{}::{}", self.lib_ident, module)
        }
    }

    /// Dependency entry naming `package`, either directly or through `package = "…"`
    pub fn dependency(&self, package: &str) -> Option<(&str, &toml::Value)> {
        let deps = self.table.get("dependencies")?.as_table()?;
        deps.iter()
            .find(|(key, value)| {
                key.as_str() == package
                    || value.get("package").and_then(toml::Value::as_str) == Some(package)
            })
            .map(|(key, value)| (key.as_str(), value))
    }
}

/// `a/b.rs` → `a::b`, `a/mod.rs` → `a`, `lib.rs`/`main.rs` → ``
fn module_path(rel: &Path) -> String {
    let mut parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if let Some(last) = parts.pop() {
        let stem = Path::new(&last)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(last);
        let is_root = parts.is_empty() && (stem == "lib" || stem == "main");
        if stem != "mod" && !is_root {
            parts.push(stem);
        }
    }
    parts
        .iter()
        .map(|p| p.replace('-', "_"))
        .collect::<Vec<_>>()
        .join("::")
}

/// Package name for a file outside any Cargo package: its directory's name
pub fn directory_package(file: &Path) -> String {
    file.parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().replace('-', "_"))
        .unwrap_or_else(|| "main".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_module_path() {
        assert_eq!(module_path(Path::new("lib.rs")), "");
        assert_eq!(module_path(Path::new("alerts.rs")), "alerts");
        assert_eq!(module_path(Path::new("stack/mod.rs")), "stack");
        assert_eq!(module_path(Path::new("stack/node-exporter.rs")), "stack::node_exporter");
    }

    #[test]
    fn test_locate_and_package_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"my-monitoring\"\nversion = \"0.1.0\"\n\n[dependencies]\nobs = { package = \"wetwire-observability\", path = \"../obs\" }\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("src/stack")).unwrap();
        let file = dir.path().join("src/stack/alerts.rs");
        fs::write(&file, "").unwrap();

        let manifest = CrateManifest::locate(&file).unwrap();
        assert_eq!(manifest.package, "my-monitoring");
        assert_eq!(manifest.package_path(&file), "my_monitoring::stack::alerts");
        assert!(!manifest.has_lib());

        let (key, _) = manifest.dependency("wetwire-observability").unwrap();
        assert_eq!(key, "obs");
    }
}
