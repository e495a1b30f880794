// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

use std::fs;

use wetwire_obs::differ::{diff_paths, DiffOptions};
use wetwire_obs::output::WireFormat;
use wetwire_obs::prometheus::{PrometheusConfig, ScrapeConfig, StaticConfig};
use wetwire_obs::Duration;

#[test]
fn test_list_order_only_matters_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.yml");
    let b = dir.path().join("b.yml");
    fs::write(&a, "a: [1, 2, 3]\n").unwrap();
    fs::write(&b, "a: [3, 2, 1]\n").unwrap();

    let semantic = diff_paths(&a, &b, &DiffOptions { ignore_order: true }).unwrap();
    assert_eq!(semantic.summary.total, 0);

    let strict = diff_paths(&a, &b, &DiffOptions { ignore_order: false }).unwrap();
    assert_eq!(strict.entries[0].changes, vec!["a[0]: 1 → 3", "a[2]: 3 → 1"]);
}

#[test]
fn test_serialized_configs() {
    let dir = tempfile::tempdir().unwrap();
    let base = PrometheusConfig::new().add_scrape_config(
        ScrapeConfig::new("node")
            .with_scrape_interval(Duration::seconds(15))
            .add_static_config(StaticConfig::new(["localhost:9100"])),
    );
    let changed = base.clone().add_scrape_config(ScrapeConfig::new("api"));

    let a = dir.path().join("a/prometheus.yml");
    let b = dir.path().join("b/prometheus.yml");
    base.write_wire(&a).unwrap();
    changed.write_wire(&b).unwrap();

    let same = diff_paths(&a, &a, &DiffOptions::default()).unwrap();
    assert!(same.is_empty());
    assert_eq!(same.summary.added + same.summary.removed + same.summary.modified, 0);

    let result = diff_paths(&a, &b, &DiffOptions::default()).unwrap();
    let s = result.summary;
    assert_eq!(s.total, s.added + s.removed + s.modified);
    assert_eq!(s.modified, 1);
    assert_eq!(result.entries[0].name, "scrape_configs");
}
