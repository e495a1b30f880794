// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Benchmark for resource discovery and source linting.
//!
//! Builds a synthetic tree of modules, each declaring a handful of
//! resources, and measures a full walk plus parse.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use std::path::Path;

const MODULE: &str = r#"
use std::sync::LazyLock;
use wetwire_obs::prometheus::{PrometheusConfig, ScrapeConfig, StaticConfig};
use wetwire_obs::rules::{AlertingRule, RuleGroup};
use wetwire_obs::Duration;

pub static NODE_SCRAPE: LazyLock<ScrapeConfig> = LazyLock::new(|| {
    ScrapeConfig::new("node")
        .with_scrape_interval(Duration::seconds(15))
        .add_static_config(StaticConfig::new(["localhost:9100"]))
});

pub static INSTANCE_DOWN: LazyLock<AlertingRule> = LazyLock::new(|| {
    AlertingRule::new("InstanceDown", "up == 0")
        .with_for(Duration::minutes(5))
        .critical()
        .with_summary("Instance down")
});

pub static NODE_GROUP: LazyLock<RuleGroup> =
    LazyLock::new(|| RuleGroup::new("node").add_rule(INSTANCE_DOWN.clone()));

pub static CONFIG: LazyLock<PrometheusConfig> =
    LazyLock::new(|| PrometheusConfig::new().add_scrape_config(NODE_SCRAPE.clone()));

fn helper() -> u32 {
    42
}
"#;

fn synthetic_tree(root: &Path, modules: usize) {
    for i in 0..modules {
        let dir = root.join(format!("team{}", i % 8));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("service{}.rs", i)), MODULE).unwrap();
    }
}

fn bench_discover(c: &mut Criterion) {
    let mut group = c.benchmark_group("discover");
    for modules in [16usize, 128] {
        let dir = tempfile::tempdir().unwrap();
        synthetic_tree(dir.path(), modules);
        group.bench_with_input(BenchmarkId::from_parameter(modules), &modules, |b, _| {
            b.iter(|| wetwire_obs::discovery::discover(dir.path()).unwrap());
        });
    }
    group.finish();
}

fn bench_lint(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    synthetic_tree(dir.path(), 64);
    let options = wetwire_obs::lint::LintOptions::default();
    c.bench_function("lint_64_modules", |b| {
        b.iter(|| wetwire_obs::lint::lint_all(dir.path(), &options).unwrap());
    });
}

criterion_group!(benches, bench_discover, bench_lint);
criterion_main!(benches);
