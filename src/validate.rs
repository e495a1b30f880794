// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! External validators
//!
//! Runs `promtool`, `amtool` and `kubeconform` over a build output directory.
//! A tool that is not on `PATH` is reported as skipped, never as a failure.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateOptions {
    pub skip_promtool: bool,
    pub skip_amtool: bool,
    pub skip_kubeconform: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Passed,
    Failed,
    Skipped,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CheckStatus::Passed => "PASSED",
            CheckStatus::Failed => "FAILED",
            CheckStatus::Skipped => "SKIPPED",
        })
    }
}

/// One tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub tool: String,
    pub target: String,
    pub status: CheckStatus,
    /// Tool output on failure, or why the check was skipped
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub checks: Vec<Check>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.status != CheckStatus::Failed)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render_text(&self, color: bool) -> String {
        let mut out = String::new();
        for check in &self.checks {
            let status = check.status.to_string();
            let status = match (color, check.status) {
                (false, _) => status,
                (true, CheckStatus::Passed) => status.green().to_string(),
                (true, CheckStatus::Failed) => status.red().bold().to_string(),
                (true, CheckStatus::Skipped) => status.yellow().to_string(),
            };
            let _ = writeln!(out, "{:<8} {} {}", status, check.tool, check.target);
            for line in check.detail.lines() {
                let _ = writeln!(out, "         {}", line);
            }
        }
        out
    }
}

/// Validate everything a build wrote under `dir`
pub fn validate(dir: impl AsRef<Path>, options: &ValidateOptions) -> Result<ValidationReport> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::NotFound(format!("build output {}", dir.display())));
    }
    let mut report = ValidationReport::default();

    for config in files_matching(dir, |name| name.starts_with("prometheus") && is_yaml(name))? {
        report.checks.push(run_check(
            "promtool",
            &["check", "config"],
            &[config],
            options.skip_promtool,
        ));
    }

    let rules = files_matching(&dir.join("rules"), is_yaml)?;
    if !rules.is_empty() {
        report.checks.push(run_check("promtool", &["check", "rules"], &rules, options.skip_promtool));
    }

    for config in files_matching(dir, |name| name.starts_with("alertmanager") && is_yaml(name))? {
        report.checks.push(run_check("amtool", &["check-config"], &[config], options.skip_amtool));
    }

    let manifests = files_matching(&dir.join("manifests"), is_yaml)?;
    if manifests.is_empty() {
        report.checks.push(Check {
            tool: "kubeconform".to_string(),
            target: dir.join("manifests").display().to_string(),
            status: CheckStatus::Skipped,
            detail: "no Kubernetes manifests".to_string(),
        });
    } else {
        report.checks.push(run_check(
            "kubeconform",
            &["-summary", "-strict"],
            &manifests,
            options.skip_kubeconform,
        ));
    }

    Ok(report)
}

fn is_yaml(name: &str) -> bool {
    name.ends_with(".yml") || name.ends_with(".yaml")
}

/// Files directly in `dir` whose name passes `keep`, sorted; empty when `dir` is missing
fn files_matching(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io_at(dir, e)),
    };
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io_at(dir, e))?.path();
        let keep_it = path.is_file() && path.file_name().and_then(|n| n.to_str()).is_some_and(&keep);
        if keep_it {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn run_check(tool: &str, args: &[&str], files: &[PathBuf], skip: bool) -> Check {
    let target = files
        .iter()
        .map(|f| f.display().to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let check = |status, detail: String| Check {
        tool: tool.to_string(),
        target: target.clone(),
        status,
        detail,
    };
    if skip {
        return check(CheckStatus::Skipped, "disabled".to_string());
    }

    log::debug!("running {} {} {}", tool, args.join(" "), target);
    match Command::new(tool).args(args).args(files).output() {
        Ok(output) if output.status.success() => check(CheckStatus::Passed, String::new()),
        Ok(output) => {
            let mut detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if detail.is_empty() {
                detail = String::from_utf8_lossy(&output.stdout).trim().to_string();
            }
            check(CheckStatus::Failed, detail)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("{} not found on PATH, skipping", tool);
            check(CheckStatus::Skipped, format!("{} not found on PATH", tool))
        }
        Err(e) => check(CheckStatus::Failed, e.to_string()),
    }
}
