// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Linter
//!
//! Two rule layers share one catalogue ([`rules::CATALOGUE`]):
//!
//! - source rules read each discovered binding's initialiser without running
//!   it, and report issues at the line of the offending field;
//! - model rules ([`lint_prometheus`], [`lint_alertmanager`], [`lint_rules`],
//!   [`lint_dashboard`]) check constructed values.
//!
//! # Example
//!
//! ```no_run
//! use wetwire_obs::lint::{lint_all, LintOptions};
//!
//! let result = lint_all("monitoring", &LintOptions::default())?;
//! for issue in &result.issues {
//!     println!("{}", issue);
//! }
//! # Ok::<(), wetwire_obs::Error>(())
//! ```

mod fields;
mod model;
mod promql;
pub mod rules;
mod source;

pub use fields::{Field, FieldMap, Node, Reader};
pub use model::{lint_alertmanager, lint_dashboard, lint_prometheus, lint_rules};
pub use promql::check as check_promql;
pub use rules::{lookup, RuleInfo, Severity, CATALOGUE};

use colored::Colorize;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt::{self, Write as _};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::discovery::{self, find_binding, parse_source, ResourceRef};
use crate::error::Result;

const PARSED_FILE_CACHE: usize = 64;

/// A rule hit before it is tied to a file
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Finding {
    pub rule: &'static str,
    pub message: String,
    pub line: usize,
}

impl Finding {
    pub(crate) fn new(rule: &'static str, message: impl Into<String>, line: usize) -> Self {
        Self {
            rule,
            message: message.into(),
            line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintIssue {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    /// Empty for issues found on constructed values
    pub file: String,
    /// 1-based; 0 when unknown
    pub line: usize,
    pub fixable: bool,
}

impl LintIssue {
    pub(crate) fn from_finding(finding: Finding, file: &str) -> Self {
        let (severity, fixable) = lookup(finding.rule)
            .map(|r| (r.severity, r.fixable))
            .unwrap_or((Severity::Warning, false));
        Self {
            rule_id: finding.rule.to_string(),
            severity,
            message: finding.message,
            file: file.to_string(),
            line: finding.line,
            fixable,
        }
    }

    pub fn location(&self) -> String {
        match (self.file.is_empty(), self.line) {
            (true, _) => "-".to_string(),
            (false, 0) => self.file.clone(),
            (false, line) => format!("{}:{}", self.file, line),
        }
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.location(),
            self.severity,
            self.rule_id,
            self.message
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintOptions {
    pub disabled_rules: BTreeSet<String>,
    /// Count fixable issues; sources are never rewritten
    pub fix: bool,
}

impl LintOptions {
    pub fn with_disabled<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled_rules.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_fix(mut self, fix: bool) -> Self {
        self.fix = fix;
        self
    }

    pub fn is_enabled(&self, rule_id: &str) -> bool {
        !self.disabled_rules.contains(rule_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintResult {
    pub issues: Vec<LintIssue>,
    pub files_checked: usize,
    pub resources_checked: usize,
    pub errors: usize,
    pub warnings: usize,
    pub fixable: usize,
    pub fixed: usize,
    /// Files discovery could not parse
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discovery_errors: Vec<String>,
}

impl LintResult {
    fn from_issues(mut issues: Vec<LintIssue>) -> Self {
        issues.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then(a.line.cmp(&b.line))
                .then(a.rule_id.cmp(&b.rule_id))
        });
        let errors = issues.iter().filter(|i| i.severity == Severity::Error).count();
        let fixable = issues.iter().filter(|i| i.fixable).count();
        Self {
            warnings: issues.len() - errors,
            errors,
            fixable,
            issues,
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One line per issue and a summary line
    pub fn render_text(&self, color: bool) -> String {
        let mut out = String::new();
        for issue in &self.issues {
            let severity = match (color, issue.severity) {
                (false, s) => s.to_string(),
                (true, Severity::Error) => issue.severity.to_string().red().bold().to_string(),
                (true, Severity::Warning) => issue.severity.to_string().yellow().to_string(),
            };
            let _ = writeln!(
                out,
                "{}: {} [{}] {}",
                issue.location(),
                severity,
                issue.rule_id,
                issue.message
            );
        }
        let _ = writeln!(
            out,
            "{} error(s), {} warning(s), {} fixable in {} resource(s) across {} file(s)",
            self.errors, self.warnings, self.fixable, self.resources_checked, self.files_checked
        );
        out
    }
}

/// Runs source rules over discovered bindings, reusing parsed files
pub struct Linter {
    options: LintOptions,
    parsed: LruCache<PathBuf, Rc<syn::File>>,
}

impl Linter {
    pub fn new(options: LintOptions) -> Self {
        Self {
            options,
            parsed: LruCache::new(NonZeroUsize::new(PARSED_FILE_CACHE).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    pub fn options(&self) -> &LintOptions {
        &self.options
    }

    fn parsed(&mut self, path: &Path) -> Result<Rc<syn::File>> {
        if let Some(file) = self.parsed.get(path) {
            return Ok(Rc::clone(file));
        }
        let file = Rc::new(parse_source(path)?);
        self.parsed.put(path.to_path_buf(), Rc::clone(&file));
        Ok(file)
    }

    /// Issues for one binding; a binding no longer in its file yields none
    pub fn lint_ref(&mut self, resource: &ResourceRef) -> Result<Vec<LintIssue>> {
        let file = self.parsed(&resource.file)?;
        let Some(binding) = find_binding(&file, &resource.name) else {
            log::debug!("{} not found in {}", resource.name, resource.file.display());
            return Ok(Vec::new());
        };
        let map = Reader::new(&file).field_map(binding.init);
        let path = resource.file.display().to_string();
        Ok(source::check_binding(&resource.name, &map)
            .into_iter()
            .filter(|f| self.options.is_enabled(f.rule))
            .map(|f| LintIssue::from_finding(f, &path))
            .collect())
    }

    /// Discover everything under `root` and lint each binding
    pub fn lint_dir(&mut self, root: impl AsRef<Path>) -> Result<LintResult> {
        let found = discovery::discover(root)?;
        let mut issues = Vec::new();
        // a nested value reached from several bindings reports once
        let mut seen = HashSet::new();
        let mut parse_errors = Vec::new();

        for resource in found.all() {
            match self.lint_ref(resource) {
                Ok(hits) => issues.extend(hits.into_iter().filter(|i| {
                    seen.insert((i.rule_id.clone(), i.file.clone(), i.line, i.message.clone()))
                })),
                Err(e) => {
                    log::warn!("cannot lint {}: {}", resource.name, e);
                    parse_errors.push(e.to_string());
                }
            }
        }

        let mut result = LintResult::from_issues(issues);
        result.files_checked = found.files_scanned;
        result.resources_checked = found.total_count();
        result.discovery_errors = found.errors;
        result.discovery_errors.extend(parse_errors);

        if self.options.fix {
            for issue in result.issues.iter().filter(|i| i.fixable) {
                log::info!(
                    "{} [{}]: auto-fix not implemented",
                    issue.location(),
                    issue.rule_id
                );
            }
        }
        Ok(result)
    }
}

/// Lint every discovered binding under `root`
pub fn lint_all(root: impl AsRef<Path>, options: &LintOptions) -> Result<LintResult> {
    Linter::new(options.clone()).lint_dir(root)
}

/// Drop disabled rules from model-rule output and summarise it
pub fn summarize(issues: Vec<LintIssue>, options: &LintOptions) -> LintResult {
    let issues = issues
        .into_iter()
        .filter(|i| options.is_enabled(&i.rule_id))
        .collect();
    LintResult::from_issues(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"monitoring\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();
        for (path, src) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, src).unwrap();
        }
        dir
    }

    #[test]
    fn test_unresolved_route_receiver() {
        let dir = project(&[(
            "src/lib.rs",
            r#"use wetwire_obs::alertmanager::*;
use std::sync::LazyLock;

pub static ALERTING: LazyLock<AlertmanagerConfig> = LazyLock::new(|| {
    AlertmanagerConfig::new()
        .with_route(Route::new("ghost"))
        .add_receiver(Receiver::new("default").add_webhook_config(WebhookConfig::new("https://hooks.example")))
});
"#,
        )]);
        let result = lint_all(dir.path(), &LintOptions::default()).unwrap();
        assert_eq!(result.issues.len(), 1);
        let issue = &result.issues[0];
        assert_eq!(issue.rule_id, "WOB051");
        assert_eq!(issue.severity, Severity::Warning);
        assert!(issue.message.contains("ghost"));
        assert_eq!(issue.line, 6);
        assert_eq!(result.resources_checked, 1);
        assert_eq!(result.warnings, 1);
    }

    #[test]
    fn test_disabled_rules_and_counts() {
        let dir = project(&[(
            "src/dashboards.rs",
            r#"pub static OVERVIEW: Dashboard = Dashboard::new("", "Overview");
"#,
        )]);
        let result = lint_all(dir.path(), &LintOptions::default()).unwrap();
        let ids: Vec<_> = result.issues.iter().map(|i| i.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["WOB121", "WOB122", "WOB124"]);
        assert_eq!(result.errors, 1);
        assert_eq!(result.fixable, 1);
        assert_eq!(result.fixed, 0);

        let options = LintOptions::default().with_disabled(["WOB121", "WOB124"]).with_fix(true);
        let result = lint_all(dir.path(), &options).unwrap();
        assert_eq!(result.issues.len(), 1);
        assert!(result.has_errors());
    }

    #[test]
    fn test_shared_values_report_once() {
        let dir = project(&[(
            "src/lib.rs",
            r#"pub static NODE: LazyLock<ScrapeConfig> = LazyLock::new(|| ScrapeConfig::new(""));
pub static PROM: LazyLock<PrometheusConfig> = LazyLock::new(|| PrometheusConfig::new().add_scrape_config(NODE.clone()));
"#,
        )]);
        let result = lint_all(dir.path(), &LintOptions::default()).unwrap();
        let wob020 = result.issues.iter().filter(|i| i.rule_id == "WOB020").count();
        assert_eq!(wob020, 1);
        assert_eq!(result.resources_checked, 2);
    }

    #[test]
    fn test_render_text() {
        let result = summarize(
            lint_dashboard(&crate::grafana::Dashboard::new("d", "D")),
            &LintOptions::default().with_disabled(["WOB121"]),
        );
        let text = result.render_text(false);
        assert!(text.contains("-: warning [WOB124] dashboard has no panels"));
        assert!(text.ends_with("0 error(s), 1 warning(s), 0 fixable in 0 resource(s) across 0 file(s)\n"));
    }
}
