// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Semantic comparison of configurations
//!
//! Two directories are compared by their discovered resources; two files are
//! parsed (YAML, then JSON) and compared structurally, with each top-level
//! key treated as one resource.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::discovery::{self, ResourceRef};
use crate::error::Error;

/// Name used for a document whose root is not a mapping
pub const DOCUMENT: &str = "(document)";

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("cannot compare directory with file")]
    MixedInputs,
    #[error("{}: {message}", path.display())]
    Unparseable { path: PathBuf, message: String },
    #[error(transparent)]
    Source(#[from] Error),
}

pub type DiffOutcome = std::result::Result<DiffResult, DiffError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOptions {
    /// Compare sequences as multisets
    pub ignore_order: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAction {
    Added,
    Modified,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub action: DiffAction,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub entries: Vec<DiffEntry>,
    pub summary: DiffSummary,
}

impl DiffResult {
    fn from_entries(mut entries: Vec<DiffEntry>) -> Self {
        entries.sort_by(|a, b| a.action.cmp(&b.action).then_with(|| a.name.cmp(&b.name)));
        let count = |action| entries.iter().filter(|e| e.action == action).count();
        let summary = DiffSummary {
            added: count(DiffAction::Added),
            removed: count(DiffAction::Removed),
            modified: count(DiffAction::Modified),
            total: entries.len(),
        };
        Self { entries, summary }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.total == 0
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `+`/`~`/`-` lines per entry, indented change paths, then a summary line
    pub fn render_text(&self, color: bool) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let (marker, name) = match entry.action {
                DiffAction::Added => ("+", entry.name.green()),
                DiffAction::Modified => ("~", entry.name.yellow()),
                DiffAction::Removed => ("-", entry.name.red()),
            };
            if color {
                let _ = writeln!(out, "{} {}", marker, name);
            } else {
                let _ = writeln!(out, "{} {}", marker, entry.name);
            }
            for change in &entry.changes {
                let _ = writeln!(out, "    {}", change);
            }
        }
        let _ = writeln!(
            out,
            "{} added, {} modified, {} removed",
            self.summary.added, self.summary.modified, self.summary.removed
        );
        out
    }
}

/// Dispatch on whether both paths are directories or both are files
pub fn diff_paths(a: impl AsRef<Path>, b: impl AsRef<Path>, options: &DiffOptions) -> DiffOutcome {
    let (a, b) = (a.as_ref(), b.as_ref());
    let a_dir = std::fs::metadata(a).map_err(|e| Error::io_at(a, e))?.is_dir();
    let b_dir = std::fs::metadata(b).map_err(|e| Error::io_at(b, e))?.is_dir();
    match (a_dir, b_dir) {
        (true, true) => diff_dirs(a, b),
        (false, false) => diff_files(a, b, options),
        _ => Err(DiffError::MixedInputs),
    }
}

/// Resources keyed by binding name; a later file wins a name collision
fn by_name(refs: Vec<&ResourceRef>) -> BTreeMap<String, &ResourceRef> {
    let mut sorted = refs;
    sorted.sort_by(|x, y| x.file.cmp(&y.file).then(x.line.cmp(&y.line)));
    sorted.into_iter().map(|r| (r.name.clone(), r)).collect()
}

pub fn diff_dirs(a: &Path, b: &Path) -> DiffOutcome {
    let left = discovery::discover(a)?;
    let right = discovery::discover(b)?;
    let (left, right) = (by_name(left.all()), by_name(right.all()));

    let mut entries = Vec::new();
    for (name, old) in &left {
        match right.get(name) {
            None => entries.push(DiffEntry {
                action: DiffAction::Removed,
                name: name.clone(),
                changes: Vec::new(),
            }),
            Some(new) if new.kind != old.kind => entries.push(DiffEntry {
                action: DiffAction::Modified,
                name: name.clone(),
                changes: vec![format!("type: {} → {}", old.kind, new.kind)],
            }),
            Some(_) => {}
        }
    }
    for name in right.keys().filter(|n| !left.contains_key(*n)) {
        entries.push(DiffEntry {
            action: DiffAction::Added,
            name: name.clone(),
            changes: Vec::new(),
        });
    }
    Ok(DiffResult::from_entries(entries))
}

/// YAML first, JSON as fallback
pub fn parse_document(path: &Path) -> std::result::Result<Value, DiffError> {
    let bytes = std::fs::read(path).map_err(|e| Error::io_at(path, e))?;
    parse_bytes(&bytes).map_err(|message| DiffError::Unparseable {
        path: path.to_path_buf(),
        message,
    })
}

fn parse_bytes(bytes: &[u8]) -> std::result::Result<Value, String> {
    match serde_yaml::from_slice::<Value>(bytes) {
        Ok(value) => Ok(value),
        Err(yaml) => serde_json::from_slice::<Value>(bytes)
            .map_err(|json| format!("not YAML ({}) or JSON ({})", yaml, json)),
    }
}

pub fn diff_files(a: &Path, b: &Path, options: &DiffOptions) -> DiffOutcome {
    let left = parse_document(a)?;
    let right = parse_document(b)?;
    Ok(diff_values(&left, &right, options))
}

/// Compare two parsed documents
pub fn diff_values(left: &Value, right: &Value, options: &DiffOptions) -> DiffResult {
    let mut entries = Vec::new();
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            for (key, old) in l {
                match r.get(key) {
                    None => entries.push(DiffEntry {
                        action: DiffAction::Removed,
                        name: key.clone(),
                        changes: Vec::new(),
                    }),
                    Some(new) => {
                        let mut changes = Vec::new();
                        compare(key, old, new, options, &mut changes);
                        if !changes.is_empty() {
                            entries.push(DiffEntry {
                                action: DiffAction::Modified,
                                name: key.clone(),
                                changes,
                            });
                        }
                    }
                }
            }
            for key in r.keys().filter(|k| !l.contains_key(*k)) {
                entries.push(DiffEntry {
                    action: DiffAction::Added,
                    name: key.clone(),
                    changes: Vec::new(),
                });
            }
        }
        _ => {
            let mut changes = Vec::new();
            compare("", left, right, options, &mut changes);
            if !changes.is_empty() {
                entries.push(DiffEntry {
                    action: DiffAction::Modified,
                    name: DOCUMENT.to_string(),
                    changes,
                });
            }
        }
    }
    DiffResult::from_entries(entries)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn label(path: &str) -> &str {
    if path.is_empty() {
        "."
    } else {
        path
    }
}

/// Canonical text of a value; object keys are already sorted
fn canonical(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn compare(path: &str, left: &Value, right: &Value, options: &DiffOptions, out: &mut Vec<String>) {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            for (key, old) in l {
                match r.get(key) {
                    Some(new) => compare(&child(path, key), old, new, options, out),
                    None => out.push(format!("{}: removed", child(path, key))),
                }
            }
            for key in r.keys().filter(|k| !l.contains_key(*k)) {
                out.push(format!("{}: added", child(path, key)));
            }
        }
        (Value::Array(l), Value::Array(r)) if options.ignore_order => {
            let mut l: Vec<String> = l.iter().map(canonical).collect();
            let mut r: Vec<String> = r.iter().map(canonical).collect();
            l.sort();
            r.sort();
            if l != r {
                out.push(format!("{}: changed", label(path)));
            }
        }
        (Value::Array(l), Value::Array(r)) => {
            if l.len() != r.len() {
                out.push(format!("{}: length changed ({} → {})", label(path), l.len(), r.len()));
            }
            for (i, (old, new)) in l.iter().zip(r).enumerate() {
                compare(&format!("{}[{}]", path, i), old, new, options, out);
            }
        }
        (l, r) if type_name(l) != type_name(r) => {
            out.push(format!("{}: type changed", label(path)));
        }
        (l, r) => {
            if l != r {
                out.push(format!("{}: {} → {}", label(path), l, r));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_identical_documents() {
        let doc = yaml("global:\n  scrape_interval: 15s\nscrape_configs:\n- job_name: node\n");
        let result = diff_values(&doc, &doc, &DiffOptions::default());
        assert!(result.is_empty());
        assert_eq!(result.summary, DiffSummary::default());
    }

    #[test]
    fn test_sequence_order() {
        let a = yaml("a: [1, 2, 3]\n");
        let b = yaml("a: [3, 2, 1]\n");

        let unordered = diff_values(&a, &b, &DiffOptions { ignore_order: true });
        assert_eq!(unordered.summary.total, 0);

        let ordered = diff_values(&a, &b, &DiffOptions::default());
        assert_eq!(ordered.summary.modified, 1);
        assert_eq!(ordered.entries[0].changes, vec!["a[0]: 1 → 3", "a[2]: 3 → 1"]);
    }

    #[test]
    fn test_nested_keys_and_types() {
        let a = yaml("route:\n  receiver: default\n  group_wait: 30s\nold: 1\n");
        let b = yaml("route:\n  receiver: 5\n  group_by: [alertname]\nnew: 1\n");
        let result = diff_values(&a, &b, &DiffOptions::default());

        assert_eq!(result.summary.total, 3);
        assert_eq!(result.entries[0].action, DiffAction::Added);
        assert_eq!(result.entries[0].name, "new");
        assert_eq!(result.entries[1].action, DiffAction::Modified);
        assert_eq!(
            result.entries[1].changes,
            vec![
                "route.group_wait: removed",
                "route.receiver: type changed",
                "route.group_by: added",
            ]
        );
        assert_eq!(result.entries[2].action, DiffAction::Removed);
    }

    #[test]
    fn test_length_change() {
        let a = yaml("xs: [1]\n");
        let b = yaml("xs: [1, 2]\n");
        let result = diff_values(&a, &b, &DiffOptions::default());
        assert_eq!(result.entries[0].changes, vec!["xs: length changed (1 → 2)"]);
    }

    #[test]
    fn test_mixed_inputs_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.yml");
        fs::write(&file, "a: 1\n").unwrap();
        let err = diff_paths(dir.path(), &file, &DiffOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "cannot compare directory with file");
    }

    #[test]
    fn test_json_fallback_and_render() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        fs::write(&a, r#"{"title": "Old", "tags": ["x"]}"#).unwrap();
        fs::write(&b, "{\"title\": \"New\",\t\"tags\": [\"x\"]}").unwrap();

        let result = diff_paths(&a, &b, &DiffOptions::default()).unwrap();
        assert_eq!(result.summary.modified, 1);
        let text = result.render_text(false);
        assert!(text.contains("~ title\n    title: \"Old\" → \"New\"\n"));
        assert!(text.ends_with("0 added, 1 modified, 0 removed\n"));
    }

    #[test]
    fn test_directory_diff() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        fs::write(
            a.path().join("lib.rs"),
            "pub static KEEP: Dashboard = Dashboard::new(\"k\", \"k\");\npub static GONE: RulesFile = RulesFile::new();\npub static SHIFT: RuleGroup = RuleGroup::new(\"g\");\n",
        )
        .unwrap();
        fs::write(
            b.path().join("lib.rs"),
            "pub static KEEP: Dashboard = Dashboard::new(\"k\", \"k\");\npub static SHIFT: RulesFile = RulesFile::new();\npub static FRESH: ScrapeConfig = ScrapeConfig::new(\"n\");\n",
        )
        .unwrap();

        let result = diff_paths(a.path(), b.path(), &DiffOptions::default()).unwrap();
        let actions: Vec<_> = result.entries.iter().map(|e| (e.action, e.name.as_str())).collect();
        assert_eq!(
            actions,
            vec![
                (DiffAction::Added, "FRESH"),
                (DiffAction::Modified, "SHIFT"),
                (DiffAction::Removed, "GONE"),
            ]
        );
        assert_eq!(result.summary.total, 3);
    }
}
