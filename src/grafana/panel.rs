// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Dashboard panels
//!
//! A [`Panel`] is one shared base record plus a [`PanelOptions`] value whose
//! variant fixes the panel kind. The kind set is closed; the wire `type`
//! string is derived from the options variant when the dashboard is
//! serialized.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::target::Target;
use crate::error::{Error, Result};

/// Reference to a Grafana data source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataSourceRef {
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uid: String,
}

impl DataSourceRef {
    pub fn new(kind: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            uid: uid.into(),
        }
    }

    pub fn prometheus(uid: impl Into<String>) -> Self {
        Self::new("prometheus", uid)
    }

    pub fn loki(uid: impl Into<String>) -> Self {
        Self::new("loki", uid)
    }
}

/// Accepts both the object form and the legacy bare-name string form
#[derive(Deserialize)]
#[serde(untagged)]
enum DataSourceRefRepr {
    Named(String),
    Object {
        #[serde(default, rename = "type")]
        kind: String,
        #[serde(default)]
        uid: String,
    },
}

impl<'de> Deserialize<'de> for DataSourceRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match DataSourceRefRepr::deserialize(deserializer)? {
            DataSourceRefRepr::Named(uid) => DataSourceRef::new("", uid),
            DataSourceRefRepr::Object { kind, uid } => DataSourceRef { kind, uid },
        })
    }
}

/// Position on the 24-column dashboard grid
///
/// Unset coordinates are filled by the layout pass at serialization time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridPos {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub w: Option<u32>,
    pub h: Option<u32>,
}

impl GridPos {
    pub const COLUMNS: u32 = 24;
    pub const DEFAULT_WIDTH: u32 = 12;
    pub const DEFAULT_HEIGHT: u32 = 8;

    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            w: Some(w),
            h: Some(h),
        }
    }

    pub fn width(&self) -> u32 {
        self.w.unwrap_or(Self::DEFAULT_WIDTH)
    }

    pub fn height(&self) -> u32 {
        self.h.unwrap_or(Self::DEFAULT_HEIGHT)
    }

    /// Both coordinates were chosen by the author
    pub fn is_pinned(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }
}

/// Closed set of panel kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Timeseries,
    Stat,
    Table,
    Gauge,
    BarGauge,
    PieChart,
    Text,
    Logs,
    Heatmap,
}

impl PanelKind {
    pub const ALL: [PanelKind; 9] = [
        PanelKind::Timeseries,
        PanelKind::Stat,
        PanelKind::Table,
        PanelKind::Gauge,
        PanelKind::BarGauge,
        PanelKind::PieChart,
        PanelKind::Text,
        PanelKind::Logs,
        PanelKind::Heatmap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeseries => "timeseries",
            Self::Stat => "stat",
            Self::Table => "table",
            Self::Gauge => "gauge",
            Self::BarGauge => "bargauge",
            Self::PieChart => "piechart",
            Self::Text => "text",
            Self::Logs => "logs",
            Self::Heatmap => "heatmap",
        }
    }

    /// Kinds that render query results and so need targets
    pub fn shows_data(&self) -> bool {
        !matches!(self, Self::Text)
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelKind {
    type Err = Error;

    /// Wire `type` string; the legacy `graph` type maps to `timeseries`
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "graph" | "timeseries" => Ok(Self::Timeseries),
            "singlestat" | "stat" => Ok(Self::Stat),
            "table" | "table-old" => Ok(Self::Table),
            "gauge" => Ok(Self::Gauge),
            "bargauge" => Ok(Self::BarGauge),
            "piechart" | "grafana-piechart-panel" => Ok(Self::PieChart),
            "text" => Ok(Self::Text),
            "logs" => Ok(Self::Logs),
            "heatmap" => Ok(Self::Heatmap),
            other => Err(Error::Unsupported(format!("panel type '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReduceOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub calcs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<bool>,
}

impl ReduceOptions {
    pub fn calc(calc: impl Into<String>) -> Self {
        Self {
            calcs: vec![calc.into()],
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegendOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_legend: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub calcs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TooltipOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeseriesOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<LegendOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<TooltipOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_options: Option<ReduceOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justify_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_header: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_height: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GaugeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_options: Option<ReduceOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_threshold_labels: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_threshold_markers: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BarGaugeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_options: Option<ReduceOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_unfilled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PieChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_options: Option<ReduceOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pie_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<LegendOptions>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub display_labels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
}

impl TextOptions {
    pub fn markdown(content: impl Into<String>) -> Self {
        Self {
            mode: Some("markdown".to_string()),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_time: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_log_message: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_log_details: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedup_strategy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeatmapColor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeatmapOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_gap: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<HeatmapColor>,
}

/// Variant-specific options; the variant decides the panel kind
#[derive(Debug, Clone, PartialEq)]
pub enum PanelOptions {
    Timeseries(TimeseriesOptions),
    Stat(StatOptions),
    Table(TableOptions),
    Gauge(GaugeOptions),
    BarGauge(BarGaugeOptions),
    PieChart(PieChartOptions),
    Text(TextOptions),
    Logs(LogsOptions),
    Heatmap(HeatmapOptions),
}

impl PanelOptions {
    pub fn default_for(kind: PanelKind) -> Self {
        match kind {
            PanelKind::Timeseries => Self::Timeseries(TimeseriesOptions::default()),
            PanelKind::Stat => Self::Stat(StatOptions::default()),
            PanelKind::Table => Self::Table(TableOptions::default()),
            PanelKind::Gauge => Self::Gauge(GaugeOptions::default()),
            PanelKind::BarGauge => Self::BarGauge(BarGaugeOptions::default()),
            PanelKind::PieChart => Self::PieChart(PieChartOptions::default()),
            PanelKind::Text => Self::Text(TextOptions::default()),
            PanelKind::Logs => Self::Logs(LogsOptions::default()),
            PanelKind::Heatmap => Self::Heatmap(HeatmapOptions::default()),
        }
    }

    pub fn kind(&self) -> PanelKind {
        match self {
            Self::Timeseries(_) => PanelKind::Timeseries,
            Self::Stat(_) => PanelKind::Stat,
            Self::Table(_) => PanelKind::Table,
            Self::Gauge(_) => PanelKind::Gauge,
            Self::BarGauge(_) => PanelKind::BarGauge,
            Self::PieChart(_) => PanelKind::PieChart,
            Self::Text(_) => PanelKind::Text,
            Self::Logs(_) => PanelKind::Logs,
            Self::Heatmap(_) => PanelKind::Heatmap,
        }
    }

    /// Wire JSON of the inner options record
    pub fn to_value(&self) -> Result<serde_json::Value> {
        let value = match self {
            Self::Timeseries(o) => serde_json::to_value(o)?,
            Self::Stat(o) => serde_json::to_value(o)?,
            Self::Table(o) => serde_json::to_value(o)?,
            Self::Gauge(o) => serde_json::to_value(o)?,
            Self::BarGauge(o) => serde_json::to_value(o)?,
            Self::PieChart(o) => serde_json::to_value(o)?,
            Self::Text(o) => serde_json::to_value(o)?,
            Self::Logs(o) => serde_json::to_value(o)?,
            Self::Heatmap(o) => serde_json::to_value(o)?,
        };
        Ok(value)
    }

    /// Read an options record for `kind`; unknown keys are dropped
    pub fn from_value(kind: PanelKind, value: serde_json::Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default_for(kind));
        }
        Ok(match kind {
            PanelKind::Timeseries => Self::Timeseries(serde_json::from_value(value)?),
            PanelKind::Stat => Self::Stat(serde_json::from_value(value)?),
            PanelKind::Table => Self::Table(serde_json::from_value(value)?),
            PanelKind::Gauge => Self::Gauge(serde_json::from_value(value)?),
            PanelKind::BarGauge => Self::BarGauge(serde_json::from_value(value)?),
            PanelKind::PieChart => Self::PieChart(serde_json::from_value(value)?),
            PanelKind::Text => Self::Text(serde_json::from_value(value)?),
            PanelKind::Logs => Self::Logs(serde_json::from_value(value)?),
            PanelKind::Heatmap => Self::Heatmap(serde_json::from_value(value)?),
        })
    }
}

/// `fieldConfig` of a panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub defaults: FieldDefaults,
    pub overrides: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<FieldColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldColor {
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub mode: String,
    pub steps: Vec<ThresholdStep>,
}

impl Thresholds {
    /// Absolute thresholds starting from a base color
    pub fn absolute(base_color: impl Into<String>) -> Self {
        Self {
            mode: "absolute".to_string(),
            steps: vec![ThresholdStep {
                color: base_color.into(),
                value: None,
            }],
        }
    }

    pub fn add_step(mut self, value: f64, color: impl Into<String>) -> Self {
        self.steps.push(ThresholdStep {
            color: color.into(),
            value: Some(value),
        });
        self
    }
}

/// A threshold step; the base step has a null value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdStep {
    pub color: String,
    #[serde(default)]
    pub value: Option<f64>,
}

/// One dashboard panel
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub id: Option<u32>,
    pub title: String,
    pub description: String,
    pub datasource: Option<DataSourceRef>,
    pub grid_pos: GridPos,
    pub targets: Vec<Target>,
    pub field_config: FieldConfig,
    pub transparent: bool,
    pub options: PanelOptions,
}

impl Panel {
    pub fn new(title: impl Into<String>, options: PanelOptions) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            datasource: None,
            grid_pos: GridPos::default(),
            targets: Vec::new(),
            field_config: FieldConfig::default(),
            transparent: false,
            options,
        }
    }

    pub fn of_kind(kind: PanelKind, title: impl Into<String>) -> Self {
        Self::new(title, PanelOptions::default_for(kind))
    }

    pub fn timeseries(title: impl Into<String>) -> Self {
        Self::of_kind(PanelKind::Timeseries, title)
    }

    pub fn stat(title: impl Into<String>) -> Self {
        Self::of_kind(PanelKind::Stat, title)
    }

    pub fn table(title: impl Into<String>) -> Self {
        Self::of_kind(PanelKind::Table, title)
    }

    pub fn gauge(title: impl Into<String>) -> Self {
        Self::of_kind(PanelKind::Gauge, title)
    }

    pub fn bar_gauge(title: impl Into<String>) -> Self {
        Self::of_kind(PanelKind::BarGauge, title)
    }

    pub fn pie_chart(title: impl Into<String>) -> Self {
        Self::of_kind(PanelKind::PieChart, title)
    }

    pub fn text(title: impl Into<String>) -> Self {
        Self::of_kind(PanelKind::Text, title)
    }

    /// Text panel rendering markdown `content`
    pub fn markdown(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(title, PanelOptions::Text(TextOptions::markdown(content)))
    }

    pub fn logs(title: impl Into<String>) -> Self {
        Self::of_kind(PanelKind::Logs, title)
    }

    pub fn heatmap(title: impl Into<String>) -> Self {
        Self::of_kind(PanelKind::Heatmap, title)
    }

    pub fn kind(&self) -> PanelKind {
        self.options.kind()
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_datasource(mut self, datasource: DataSourceRef) -> Self {
        self.datasource = Some(datasource);
        self
    }

    pub fn with_grid_pos(mut self, grid_pos: GridPos) -> Self {
        self.grid_pos = grid_pos;
        self
    }

    pub fn with_size(mut self, w: u32, h: u32) -> Self {
        self.grid_pos.w = Some(w);
        self.grid_pos.h = Some(h);
        self
    }

    pub fn with_width(mut self, w: u32) -> Self {
        self.grid_pos.w = Some(w);
        self
    }

    pub fn with_height(mut self, h: u32) -> Self {
        self.grid_pos.h = Some(h);
        self
    }

    /// Pin the panel at `(x, y)`, bypassing automatic placement
    pub fn with_position(mut self, x: u32, y: u32) -> Self {
        self.grid_pos.x = Some(x);
        self.grid_pos.y = Some(y);
        self
    }

    pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets = targets;
        self
    }

    pub fn add_target(mut self, target: impl Into<Target>) -> Self {
        self.targets.push(target.into());
        self
    }

    pub fn with_field_config(mut self, field_config: FieldConfig) -> Self {
        self.field_config = field_config;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.field_config.defaults.unit = Some(unit.into());
        self
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.field_config.defaults.decimals = Some(decimals);
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.field_config.defaults.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.field_config.defaults.max = Some(max);
        self
    }

    pub fn with_color_mode(mut self, mode: impl Into<String>) -> Self {
        self.field_config.defaults.color = Some(FieldColor {
            mode: mode.into(),
            fixed_color: None,
        });
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.field_config.defaults.thresholds = Some(thresholds);
        self
    }

    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn with_options(mut self, options: PanelOptions) -> Self {
        self.options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grafana::PrometheusTarget;

    #[test]
    fn test_kind_follows_options() {
        assert_eq!(Panel::stat("x").kind(), PanelKind::Stat);
        assert_eq!(Panel::markdown("x", "# hi").kind(), PanelKind::Text);
        let p = Panel::stat("x").with_options(PanelOptions::default_for(PanelKind::Gauge));
        assert_eq!(p.kind(), PanelKind::Gauge);
    }

    #[test]
    fn test_kind_wire_names() {
        let names: Vec<&str> = PanelKind::ALL.iter().map(PanelKind::as_str).collect();
        assert_eq!(
            names,
            vec!["timeseries", "stat", "table", "gauge", "bargauge", "piechart", "text", "logs", "heatmap"]
        );
        for kind in PanelKind::ALL {
            assert_eq!(kind.as_str().parse::<PanelKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_graph_maps_to_timeseries() {
        assert_eq!("graph".parse::<PanelKind>().unwrap(), PanelKind::Timeseries);
        assert!("alertlist".parse::<PanelKind>().is_err());
    }

    #[test]
    fn test_grid_defaults() {
        let g = GridPos::default();
        assert_eq!((g.width(), g.height()), (12, 8));
        assert!(!g.is_pinned());
        assert!(GridPos::new(0, 0, 6, 4).is_pinned());
    }

    #[test]
    fn test_options_value_round_trip() {
        let options = PanelOptions::Stat(StatOptions {
            reduce_options: Some(ReduceOptions::calc("lastNotNull")),
            color_mode: Some("background".to_string()),
            ..StatOptions::default()
        });
        let value = options.to_value().unwrap();
        assert_eq!(value["reduceOptions"]["calcs"][0], "lastNotNull");
        assert_eq!(value["colorMode"], "background");
        let back = PanelOptions::from_value(PanelKind::Stat, value).unwrap();
        assert_eq!(back, options);
    }

    #[test]
    fn test_datasource_legacy_string() {
        let ds: DataSourceRef = serde_json::from_str("\"Prometheus\"").unwrap();
        assert_eq!(ds.uid, "Prometheus");
        let ds: DataSourceRef = serde_json::from_str(r#"{"type":"loki","uid":"abc"}"#).unwrap();
        assert_eq!(ds, DataSourceRef::loki("abc"));
    }

    #[test]
    fn test_builder_field_config() {
        let p = Panel::timeseries("Latency")
            .with_unit("s")
            .with_decimals(2)
            .with_thresholds(Thresholds::absolute("green").add_step(0.5, "red"))
            .add_target(PrometheusTarget::new("histogram_quantile(0.99, rate(x[5m]))"));
        assert_eq!(p.field_config.defaults.unit.as_deref(), Some("s"));
        assert_eq!(p.field_config.defaults.thresholds.as_ref().unwrap().steps.len(), 2);
        assert_eq!(p.targets.len(), 1);
    }
}
