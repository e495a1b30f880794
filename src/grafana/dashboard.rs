// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Dashboards and rows

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

use super::layout::{self, Placement, WireDashboard};
use super::panel::{DataSourceRef, Panel};
use super::variable::Variable;
use crate::error::Result;
use crate::output::{self, is_false, WireFormat};

/// Grafana schema version written by default
pub const SCHEMA_VERSION: u32 = 39;

/// Default time picker range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardTime {
    pub from: String,
    pub to: String,
}

impl Default for DashboardTime {
    fn default() -> Self {
        Self {
            from: "now-6h".to_string(),
            to: "now".to_string(),
        }
    }
}

/// Annotation query shown on every time-series panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Annotation {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasource: Option<DataSourceRef>,
    pub enable: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub hide: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon_color: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub expr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub built_in: Option<u8>,
}

impl Annotation {
    pub fn new(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expr: expr.into(),
            enable: true,
            ..Self::default()
        }
    }

    pub fn with_datasource(mut self, datasource: DataSourceRef) -> Self {
        self.datasource = Some(datasource);
        self
    }

    pub fn with_icon_color(mut self, color: impl Into<String>) -> Self {
        self.icon_color = color.into();
        self
    }

    pub fn with_enable(mut self, enable: bool) -> Self {
        self.enable = enable;
        self
    }

    pub fn with_hide(mut self, hide: bool) -> Self {
        self.hide = hide;
        self
    }
}

/// Link rendered in the dashboard header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardLink {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub as_dropdown: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub target_blank: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon: String,
}

impl DashboardLink {
    /// Plain URL link
    pub fn url(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: "link".to_string(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Dropdown of dashboards sharing `tags`
    pub fn dashboards<I, S>(title: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            kind: "dashboards".to_string(),
            tags: tags.into_iter().map(Into::into).collect(),
            as_dropdown: true,
            ..Self::default()
        }
    }

    pub fn with_target_blank(mut self, blank: bool) -> Self {
        self.target_blank = blank;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }
}

/// A titled group of panels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub title: String,
    pub collapsed: bool,
    pub panels: Vec<Panel>,
}

impl Row {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn with_panels(mut self, panels: Vec<Panel>) -> Self {
        self.panels = panels;
        self
    }

    pub fn add_panel(mut self, panel: Panel) -> Self {
        self.panels.push(panel);
        self
    }
}

/// A Grafana dashboard
///
/// Panels are authored inside rows; the flat wire list, panel IDs and grid
/// positions are produced when the dashboard is serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub uid: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub timezone: String,
    pub editable: bool,
    /// 0 = default, 1 = shared crosshair, 2 = shared tooltip
    pub graph_tooltip: u8,
    pub time: DashboardTime,
    pub refresh: String,
    pub schema_version: u32,
    pub rows: Vec<Row>,
    pub variables: Vec<Variable>,
    pub annotations: Vec<Annotation>,
    pub links: Vec<DashboardLink>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            uid: String::new(),
            title: String::new(),
            description: String::new(),
            tags: Vec::new(),
            timezone: String::new(),
            editable: true,
            graph_tooltip: 0,
            time: DashboardTime::default(),
            refresh: String::new(),
            schema_version: SCHEMA_VERSION,
            rows: Vec::new(),
            variables: Vec::new(),
            annotations: Vec::new(),
            links: Vec::new(),
        }
    }
}

impl Dashboard {
    pub fn new(uid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
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

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn with_graph_tooltip(mut self, mode: u8) -> Self {
        self.graph_tooltip = mode;
        self
    }

    pub fn with_time(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.time = DashboardTime {
            from: from.into(),
            to: to.into(),
        };
        self
    }

    pub fn with_refresh(mut self, refresh: impl Into<String>) -> Self {
        self.refresh = refresh.into();
        self
    }

    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = version;
        self
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn add_row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = variables;
        self
    }

    pub fn add_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn add_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_links(mut self, links: Vec<DashboardLink>) -> Self {
        self.links = links;
        self
    }

    pub fn add_link(mut self, link: DashboardLink) -> Self {
        self.links.push(link);
        self
    }

    /// All content panels in traversal order
    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.rows.iter().flat_map(|r| r.panels.iter())
    }

    pub fn panel_count(&self) -> usize {
        self.rows.iter().map(|r| r.panels.len()).sum()
    }

    /// Final panel IDs and grid cells as they will be written
    pub fn placements(&self) -> Result<Vec<Placement>> {
        layout::placements(self)
    }

    /// Parse dashboard JSON, returning notes about anything dropped
    pub fn from_json(bytes: &[u8]) -> Result<(Dashboard, Vec<String>)> {
        let wire: WireDashboard = serde_json::from_slice(bytes)?;
        Ok(layout::from_wire(wire))
    }

    /// Render as two-space indented dashboard JSON
    pub fn serialize(&self) -> Result<Vec<u8>> {
        output::to_json_pretty(self)
    }

    pub fn serialize_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        output::write_atomic(path.as_ref(), &self.serialize()?)
    }
}

impl Serialize for Dashboard {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        layout::to_wire(self)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Dashboard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = WireDashboard::deserialize(deserializer)?;
        let (dashboard, warnings) = layout::from_wire(wire);
        for warning in warnings {
            log::warn!("dashboard '{}': {}", dashboard.uid, warning);
        }
        Ok(dashboard)
    }
}

impl WireFormat for Dashboard {
    fn default_file_name(&self) -> String {
        if self.uid.is_empty() {
            "dashboard.json".to_string()
        } else {
            format!("{}.json", self.uid)
        }
    }

    fn to_wire(&self) -> Result<Vec<u8>> {
        self.serialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grafana::{PrometheusTarget, Variable};

    fn sample() -> Dashboard {
        Dashboard::new("api-overview", "API Overview")
            .with_tags(["api", "golden-signals"])
            .with_refresh("30s")
            .add_row(
                Row::new("Traffic")
                    .add_panel(
                        Panel::timeseries("Requests")
                            .with_unit("reqps")
                            .add_target(PrometheusTarget::new("sum(rate(http_requests_total[5m]))")),
                    )
                    .add_panel(Panel::stat("Errors").add_target(PrometheusTarget::new("sum(up)"))),
            )
    }

    fn to_value(d: &Dashboard) -> serde_json::Value {
        serde_json::from_slice(&d.serialize().unwrap()).unwrap()
    }

    #[test]
    fn test_json_two_space_indent() {
        let text = String::from_utf8(sample().serialize().unwrap()).unwrap();
        assert!(text.starts_with("{\n  \"uid\": \"api-overview\",\n  \"title\": \"API Overview\""));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_templating_omitted_without_variables() {
        let v = to_value(&sample());
        assert!(v.get("templating").is_none());
        assert!(v.get("annotations").is_none());

        let v = to_value(&sample().add_variable(Variable::query("job", "label_values(up, job)")));
        assert_eq!(v["templating"]["list"][0]["name"], "job");
    }

    #[test]
    fn test_panel_ids_unique_and_in_grid() {
        let d = sample().add_row(
            Row::new("More")
                .add_panel(Panel::gauge("g").with_width(20))
                .add_panel(Panel::gauge("h").with_width(20)),
        );
        let placed = d.placements().unwrap();
        let mut ids: Vec<u32> = placed.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), placed.len());
        assert!(ids.iter().all(|id| *id > 0));
        assert!(placed.iter().all(|p| p.x + p.w <= 24));
    }

    #[test]
    fn test_parse_back_is_stable() {
        let bytes = sample().serialize().unwrap();
        let parsed: Dashboard = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.panel_count(), 2);
        // Positions and IDs are pinned after one layout pass.
        assert_eq!(parsed.serialize().unwrap(), bytes);
    }

    #[test]
    fn test_file_name_from_uid() {
        assert_eq!(sample().default_file_name(), "api-overview.json");
        assert_eq!(Dashboard::default().default_file_name(), "dashboard.json");
    }

    #[test]
    fn test_panel_wire_fields() {
        let v = to_value(&sample());
        let panel = &v["panels"][1];
        assert_eq!(panel["type"], "timeseries");
        assert_eq!(panel["gridPos"]["w"], 12);
        assert_eq!(panel["targets"][0]["refId"], "A");
        assert_eq!(panel["fieldConfig"]["defaults"]["unit"], "reqps");
    }
}
