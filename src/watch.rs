// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Polling file watcher
//!
//! Re-runs lint (and build) after source files stop changing for the
//! debounce interval.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, SystemTime};
use walkdir::WalkDir;

use crate::discovery::{is_excluded_dir, is_source_file};
use crate::error::{Error, Result};
use crate::lint::{lint_all, LintOptions, LintResult};
use crate::pipeline::{build, BuildOptions, BuildReport};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

const MAX_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub debounce: Duration,
    pub lint_only: bool,
    pub lint: LintOptions,
    pub build: BuildOptions,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            lint_only: false,
            lint: LintOptions::default(),
            build: BuildOptions::default(),
        }
    }
}

/// Outcome of one lint/build pass
#[derive(Debug)]
pub struct WatchCycle {
    /// Files added, removed or modified since the previous pass; empty on the first pass
    pub changed: Vec<PathBuf>,
    pub lint: Result<LintResult>,
    /// `None` with `lint_only`
    pub build: Option<Result<BuildReport>>,
}

/// Modification time of every watched source file
pub type Snapshot = BTreeMap<PathBuf, SystemTime>;

pub fn snapshot(root: &Path) -> Snapshot {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_source_file(e.path()))
        .filter_map(|e| {
            let modified = e.metadata().ok()?.modified().ok()?;
            Some((e.into_path(), modified))
        })
        .collect()
}

/// Paths that differ between two snapshots
pub fn changed_paths(before: &Snapshot, after: &Snapshot) -> Vec<PathBuf> {
    let mut changed: Vec<PathBuf> = after
        .iter()
        .filter(|(path, modified)| before.get(*path) != Some(modified))
        .map(|(path, _)| path.clone())
        .collect();
    changed.extend(before.keys().filter(|p| !after.contains_key(*p)).cloned());
    changed.sort();
    changed
}

pub fn run_cycle(root: &Path, options: &WatchOptions, changed: Vec<PathBuf>) -> WatchCycle {
    let lint = lint_all(root, &options.lint);
    let report = (!options.lint_only).then(|| build(root, &options.build));
    WatchCycle {
        changed,
        lint,
        build: report,
    }
}

/// Watch `root` until `stop` is set, handing each pass to `on_cycle`
///
/// Runs one pass immediately. Changes are batched: a pass starts once no
/// file has changed for `options.debounce`.
pub fn watch(
    root: impl AsRef<Path>,
    options: &WatchOptions,
    stop: &AtomicBool,
    mut on_cycle: impl FnMut(WatchCycle),
) -> Result<()> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(Error::NotFound(format!("directory {}", root.display())));
    }
    let poll = options.debounce.min(MAX_POLL).max(Duration::from_millis(10));

    let mut baseline = snapshot(root);
    on_cycle(run_cycle(root, options, Vec::new()));

    let mut current = baseline.clone();
    let mut last_change: Option<Instant> = None;
    while !stop.load(Ordering::SeqCst) {
        std::thread::sleep(poll);

        let next = snapshot(root);
        if next != current {
            current = next;
            last_change = Some(Instant::now());
            continue;
        }

        let settled = last_change.is_some_and(|t| t.elapsed() >= options.debounce);
        if settled {
            last_change = None;
            let changed = changed_paths(&baseline, &current);
            baseline = current.clone();
            if changed.is_empty() {
                continue;
            }
            log::info!("{} file(s) changed", changed.len());
            on_cycle(run_cycle(root, options, changed));
        }
    }
    log::debug!("watch on {} stopped", root.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_snapshot_skips_excluded() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("target/debug")).unwrap();
        fs::write(dir.path().join("src/lib.rs"), "").unwrap();
        fs::write(dir.path().join("src/alerts_test.rs"), "").unwrap();
        fs::write(dir.path().join("target/debug/build.rs"), "").unwrap();
        fs::write(dir.path().join("README.md"), "").unwrap();

        let snap = snapshot(dir.path());
        assert_eq!(snap.keys().collect::<Vec<_>>(), vec![&dir.path().join("src/lib.rs")]);
    }

    #[test]
    fn test_changed_paths() {
        let t0 = SystemTime::UNIX_EPOCH;
        let t1 = t0 + Duration::from_secs(1);
        let snap = |entries: &[(&str, SystemTime)]| -> Snapshot {
            entries.iter().map(|(p, t)| (PathBuf::from(p), *t)).collect()
        };
        let before = snap(&[("a.rs", t0), ("b.rs", t0)]);
        let after = snap(&[("a.rs", t1), ("c.rs", t0)]);
        assert_eq!(
            changed_paths(&before, &after),
            vec![PathBuf::from("a.rs"), PathBuf::from("b.rs"), PathBuf::from("c.rs")]
        );
        assert!(changed_paths(&after, &after).is_empty());
    }

    #[test]
    fn test_watch_runs_once_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lib.rs"), "pub const PORT: u16 = 9090;\n").unwrap();
        let stop = AtomicBool::new(false);
        let options = WatchOptions {
            debounce: Duration::from_millis(20),
            lint_only: true,
            ..WatchOptions::default()
        };

        let mut cycles = 0;
        watch(dir.path(), &options, &stop, |cycle| {
            cycles += 1;
            assert!(cycle.changed.is_empty());
            assert!(cycle.build.is_none());
            assert!(cycle.lint.unwrap().is_clean());
            stop.store(true, Ordering::SeqCst);
        })
        .unwrap();
        assert_eq!(cycles, 1);
    }
}
