// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Project configuration (`wetwire.toml`)
//!
//! Every section is optional. Command-line flags override whatever is set
//! here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::differ::DiffOptions;
use crate::error::{Error, Result};
use crate::lint::LintOptions;
use crate::loader::LoaderOptions;
use crate::pipeline::{BuildMode, BuildOptions};
use crate::validate::ValidateOptions;

/// File name searched for in the project directory and its ancestors
pub const CONFIG_FILE: &str = "wetwire.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintSection {
    pub disabled_rules: Vec<String>,
    pub fix: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    pub output: PathBuf,
    pub mode: BuildMode,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            output: PathBuf::from("build"),
            mode: BuildMode::Standalone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffSection {
    pub ignore_order: bool,
    pub color: bool,
}

impl Default for DiffSection {
    fn default() -> Self {
        Self {
            ignore_order: true,
            color: false,
        }
    }
}

/// Parsed `wetwire.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub lint: LintSection,
    pub build: BuildSection,
    pub diff: DiffSection,
    pub loader: LoaderOptions,
    pub validate: ValidateOptions,
}

impl ProjectConfig {
    /// Load from TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_at(path, e))?;
        Self::from_toml(&content).map_err(|e| match e {
            Error::Toml(inner) => Error::parse(path, None, inner.to_string()),
            other => other,
        })
    }

    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Nearest `wetwire.toml` at or above `dir`
    pub fn locate(dir: &Path) -> Option<PathBuf> {
        dir.ancestors()
            .map(|d| d.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Config for a project directory; defaults when no file is found
    pub fn discover(dir: &Path) -> Result<Self> {
        match Self::locate(dir) {
            Some(path) => {
                log::debug!("using {}", path.display());
                let mut config = Self::from_toml_file(&path)?;
                config.anchor(path.parent().unwrap_or(dir));
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Resolve relative paths against the directory holding the config file
    fn anchor(&mut self, base: &Path) {
        if self.build.output.is_relative() {
            self.build.output = base.join(&self.build.output);
        }
        if let Some(dir) = self.loader.target_dir.as_mut() {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }

    pub fn lint_options(&self) -> LintOptions {
        LintOptions::default()
            .with_disabled(self.lint.disabled_rules.iter().cloned())
            .with_fix(self.lint.fix)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions::default()
            .with_output(self.build.output.clone())
            .with_mode(self.build.mode)
            .with_loader(self.loader.clone())
    }

    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            ignore_order: self.diff.ignore_order,
        }
    }

    /// Generate sample config
    pub fn sample_toml() -> String {
        r#"# Wetwire Observability project configuration
# Searched for in the project directory, then its parents.

[lint]
# disabled_rules = ["WOB121", "WOB084"]
fix = false

[build]
output = "build"
mode = "standalone"

[diff]
ignore_order = true
color = false

[loader]
cargo = "cargo"
# target_dir = "target/wetwire-loader"
offline = false

[validate]
skip_promtool = false
skip_amtool = false
skip_kubeconform = false
"#
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_parses_to_defaults() {
        let config = ProjectConfig::from_toml(&ProjectConfig::sample_toml()).unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = ProjectConfig::from_toml(
            "[lint]\ndisabled_rules = [\"WOB121\"]\n[loader]\noffline = true\n",
        )
        .unwrap();
        assert!(!config.lint_options().is_enabled("WOB121"));
        assert!(config.lint_options().is_enabled("WOB120"));
        assert!(config.loader.offline);
        assert_eq!(config.loader.cargo, "cargo");
        assert!(config.diff_options().ignore_order);
    }

    #[test]
    fn test_bad_mode_is_an_error() {
        assert!(ProjectConfig::from_toml("[build]\nmode = \"helm\"\n").is_err());
    }

    #[test]
    fn test_discover_searches_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[build]\noutput = \"out\"\n[loader]\ntarget_dir = \"cache\"\n",
        )
        .unwrap();
        let nested = dir.path().join("src/alerts");
        std::fs::create_dir_all(&nested).unwrap();

        let config = ProjectConfig::discover(&nested).unwrap();
        assert_eq!(config.build.output, dir.path().join("out"));
        assert_eq!(config.loader.target_dir, Some(dir.path().join("cache")));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[lint\n").unwrap();
        let err = ProjectConfig::from_toml_file(&path).unwrap_err();
        assert!(err.to_string().starts_with(&path.display().to_string()));
    }
}
