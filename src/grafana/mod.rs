// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Grafana dashboards and provisioning files
//!
//! # Examples
//!
//! ```
//! use wetwire_obs::grafana::{Dashboard, Panel, PrometheusTarget, Row};
//!
//! let dashboard = Dashboard::new("node", "Node Overview").add_row(
//!     Row::new("CPU")
//!         .add_panel(Panel::timeseries("Usage").add_target(PrometheusTarget::new(
//!             "1 - avg(rate(node_cpu_seconds_total{mode=\"idle\"}[5m]))",
//!         )))
//!         .add_panel(Panel::stat("Cores").add_target(PrometheusTarget::new(
//!             "count(node_cpu_seconds_total{mode=\"idle\"})",
//!         ))),
//! );
//!
//! let placed = dashboard.placements().unwrap();
//! assert_eq!((placed[1].x, placed[1].y), (12, 1));
//! ```

mod dashboard;
mod layout;
mod panel;
mod provisioning;
mod target;
mod variable;

pub use dashboard::{Annotation, Dashboard, DashboardLink, DashboardTime, Row, SCHEMA_VERSION};
pub use layout::{Placement, DEFAULT_ROW_TITLE, ROW_ID_BASE};
pub use panel::{
    BarGaugeOptions, DataSourceRef, FieldColor, FieldConfig, FieldDefaults, GaugeOptions,
    GridPos, HeatmapColor, HeatmapOptions, LegendOptions, LogsOptions, Panel, PanelKind,
    PanelOptions, PieChartOptions, ReduceOptions, StatOptions, TableOptions, TextOptions,
    ThresholdStep, Thresholds, TimeseriesOptions, TooltipOptions,
};
pub use provisioning::{
    DashboardProvider, DashboardProvisioning, Datasource, DatasourceProvisioning,
    ProviderOptions,
};
pub use target::{LokiTarget, PrometheusTarget, Target};
pub use variable::{Variable, VariableKind};
