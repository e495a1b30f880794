// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Benchmark for dashboard grid layout and JSON serialization.

use criterion::{criterion_group, criterion_main, Criterion};
use wetwire_obs::grafana::{Dashboard, Panel, PrometheusTarget, Row};

fn dashboard(rows: usize, panels_per_row: usize) -> Dashboard {
    let mut dashboard = Dashboard::new("bench", "Benchmark").with_tags(["bench"]);
    for r in 0..rows {
        let mut row = Row::new(format!("Row {}", r));
        for p in 0..panels_per_row {
            let panel = if p % 3 == 0 {
                Panel::stat(format!("Stat {}", p)).with_size(6, 4)
            } else {
                Panel::timeseries(format!("Series {}", p)).with_size(12, 8)
            };
            row = row.add_panel(panel.add_target(PrometheusTarget::new(format!(
                "sum(rate(http_requests_total{{row=\"{}\"}}[5m]))",
                r
            ))));
        }
        dashboard = dashboard.add_row(row);
    }
    dashboard
}

fn bench_placements(c: &mut Criterion) {
    let dashboard = dashboard(10, 12);
    c.bench_function("placements_10x12", |b| {
        b.iter(|| dashboard.placements().unwrap());
    });
}

fn bench_serialize(c: &mut Criterion) {
    let dashboard = dashboard(10, 12);
    c.bench_function("serialize_10x12", |b| {
        b.iter(|| dashboard.serialize().unwrap());
    });
}

criterion_group!(benches, bench_placements, bench_serialize);
criterion_main!(benches);
