// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Dashboard wire layout
//!
//! Grafana stores panels as one flat list where rows are panels of type
//! `row`. [`to_wire`] flattens the row tree, assigns IDs and places panels
//! on the 24-column grid; [`from_wire`] regroups a flat list back into rows.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

use super::dashboard::{Annotation, Dashboard, DashboardLink, DashboardTime, Row};
use super::panel::{DataSourceRef, FieldConfig, GridPos, Panel, PanelKind, PanelOptions};
use super::target::Target;
use super::variable::Variable;
use crate::error::Result;
use crate::output::is_false;

/// Title given to the synthetic row that collects panels placed before any row
pub const DEFAULT_ROW_TITLE: &str = "Default";

/// Row panel IDs are offset so they never collide with content panels
pub const ROW_ID_BASE: u32 = 1000;

const ROW_TYPE: &str = "row";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct WireDashboard {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uid: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timezone: String,
    pub editable: bool,
    pub graph_tooltip: u8,
    pub time: DashboardTime,
    #[serde(
        skip_serializing_if = "String::is_empty",
        deserialize_with = "string_or_false"
    )]
    pub refresh: String,
    pub schema_version: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<DashboardLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<WireList<Annotation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templating: Option<WireList<Variable>>,
    pub panels: Vec<WirePanel>,
}

impl Default for WireDashboard {
    fn default() -> Self {
        let base = Dashboard::default();
        Self {
            uid: String::new(),
            title: String::new(),
            description: String::new(),
            tags: Vec::new(),
            timezone: String::new(),
            editable: base.editable,
            graph_tooltip: 0,
            time: base.time,
            refresh: String::new(),
            schema_version: base.schema_version,
            links: Vec::new(),
            annotations: None,
            templating: None,
            panels: Vec::new(),
        }
    }
}

/// Grafana writes `"refresh": false` when auto-refresh is off
fn string_or_false<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        _ => String::new(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WireList<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct WirePanel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasource: Option<DataSourceRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_pos: Option<WireGridPos>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<Target>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_config: Option<FieldConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "is_false")]
    pub transparent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panels: Option<Vec<WirePanel>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct WireGridPos {
    pub h: u32,
    pub w: u32,
    pub x: u32,
    pub y: u32,
}

/// Final ID and grid cell of one panel after layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub id: u32,
    pub title: String,
    pub kind: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    /// Index of the owning row
    pub row: usize,
}

/// Hands out sequential panel IDs, skipping IDs pinned by the author
struct IdAllocator {
    taken: BTreeSet<u32>,
    next: u32,
}

impl IdAllocator {
    fn new(explicit: impl IntoIterator<Item = u32>) -> Self {
        Self {
            taken: explicit.into_iter().collect(),
            next: 1,
        }
    }

    fn assign(&mut self, explicit: Option<u32>) -> u32 {
        if let Some(id) = explicit {
            return id;
        }
        while self.taken.contains(&self.next) {
            self.next += 1;
        }
        let id = self.next;
        self.taken.insert(id);
        self.next += 1;
        id
    }
}

/// `A`, `B`, …, `Z`, `AA`, `AB`, …
fn ref_id_for(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn panel_to_wire(panel: &Panel, id: u32, pos: WireGridPos) -> Result<WirePanel> {
    let mut targets = panel.targets.clone();
    for (i, target) in targets.iter_mut().enumerate() {
        if target.ref_id().is_empty() {
            target.set_ref_id(ref_id_for(i));
        }
    }
    Ok(WirePanel {
        id: Some(id),
        kind: panel.kind().as_str().to_string(),
        title: panel.title.clone(),
        description: panel.description.clone(),
        datasource: panel.datasource.clone(),
        grid_pos: Some(pos),
        targets,
        field_config: Some(panel.field_config.clone()),
        options: Some(panel.options.to_value()?),
        transparent: panel.transparent,
        collapsed: None,
        panels: None,
    })
}

/// Lay out one row's panels starting at `start_y`; returns the panels and
/// the first free y below them, pinned panels included
///
/// Auto-placed panels wider than the grid are narrowed to it.
fn place_row(panels: &[Panel], start_y: u32, ids: &mut IdAllocator) -> Result<(Vec<WirePanel>, u32)> {
    let (mut x, mut y, mut row_max) = (0u32, start_y, 0u32);
    let mut pinned_bottom = start_y;
    let mut out = Vec::with_capacity(panels.len());

    for panel in panels {
        let (w, h) = (panel.grid_pos.width(), panel.grid_pos.height());
        let pos = match (panel.grid_pos.x, panel.grid_pos.y) {
            (Some(px), Some(py)) => {
                pinned_bottom = pinned_bottom.max(py + h);
                WireGridPos { h, w, x: px, y: py }
            }
            _ => {
                let w = w.min(GridPos::COLUMNS);
                if x + w > GridPos::COLUMNS {
                    x = 0;
                    y += row_max;
                    row_max = 0;
                }
                let pos = WireGridPos { h, w, x, y };
                x += w;
                row_max = row_max.max(h);
                pos
            }
        };
        out.push(panel_to_wire(panel, ids.assign(panel.id), pos)?);
    }

    Ok((out, (y + row_max).max(pinned_bottom)))
}

fn row_header(index: usize, row: &Row, y: u32, children: Vec<WirePanel>) -> WirePanel {
    WirePanel {
        id: Some(ROW_ID_BASE + index as u32),
        kind: ROW_TYPE.to_string(),
        title: row.title.clone(),
        grid_pos: Some(WireGridPos {
            h: 1,
            w: GridPos::COLUMNS,
            x: 0,
            y,
        }),
        collapsed: Some(row.collapsed),
        panels: Some(children),
        ..WirePanel::default()
    }
}

/// Flatten a dashboard into its wire form
pub(crate) fn to_wire(dashboard: &Dashboard) -> Result<WireDashboard> {
    let mut ids = IdAllocator::new(dashboard.panels().filter_map(|p| p.id));
    let mut panels = Vec::new();
    let mut y = 0u32;

    for (index, row) in dashboard.rows.iter().enumerate() {
        let header_y = y;
        y += 1;
        let (children, next_y) = place_row(&row.panels, y, &mut ids)?;
        if row.collapsed {
            panels.push(row_header(index, row, header_y, children));
        } else {
            panels.push(row_header(index, row, header_y, Vec::new()));
            panels.extend(children);
            y = next_y;
        }
    }

    Ok(WireDashboard {
        uid: dashboard.uid.clone(),
        title: dashboard.title.clone(),
        description: dashboard.description.clone(),
        tags: dashboard.tags.clone(),
        timezone: dashboard.timezone.clone(),
        editable: dashboard.editable,
        graph_tooltip: dashboard.graph_tooltip,
        time: dashboard.time.clone(),
        refresh: dashboard.refresh.clone(),
        schema_version: dashboard.schema_version,
        links: dashboard.links.clone(),
        annotations: (!dashboard.annotations.is_empty()).then(|| WireList {
            list: dashboard.annotations.clone(),
        }),
        templating: (!dashboard.variables.is_empty()).then(|| WireList {
            list: dashboard.variables.clone(),
        }),
        panels,
    })
}

/// Every content panel's final placement, collapsed rows included
pub fn placements(dashboard: &Dashboard) -> Result<Vec<Placement>> {
    let wire = to_wire(dashboard)?;
    let mut out = Vec::new();
    let mut row = 0usize;
    let mut seen_row = false;

    let mut push = |p: &WirePanel, row: usize| {
        let pos = p.grid_pos.unwrap_or_default();
        out.push(Placement {
            id: p.id.unwrap_or_default(),
            title: p.title.clone(),
            kind: p.kind.clone(),
            x: pos.x,
            y: pos.y,
            w: pos.w,
            h: pos.h,
            row,
        });
    };

    for p in &wire.panels {
        if p.kind == ROW_TYPE {
            if seen_row {
                row += 1;
            }
            seen_row = true;
            for child in p.panels.iter().flatten() {
                push(child, row);
            }
        } else {
            push(p, row);
        }
    }
    Ok(out)
}

fn panel_from_wire(wire: WirePanel, warnings: &mut Vec<String>) -> Option<Panel> {
    let kind: PanelKind = match wire.kind.parse() {
        Ok(kind) => kind,
        Err(_) => {
            warnings.push(format!(
                "panel '{}': unsupported type '{}' skipped",
                wire.title, wire.kind
            ));
            return None;
        }
    };
    if wire.kind == "graph" {
        log::debug!("panel '{}': legacy graph mapped to timeseries", wire.title);
    }

    let options = match PanelOptions::from_value(kind, wire.options.unwrap_or_default()) {
        Ok(options) => options,
        Err(e) => {
            warnings.push(format!(
                "panel '{}': options not understood ({}); defaults used",
                wire.title, e
            ));
            PanelOptions::default_for(kind)
        }
    };

    let mut panel = Panel::new(wire.title, options)
        .with_description(wire.description)
        .with_targets(wire.targets)
        .with_field_config(wire.field_config.unwrap_or_default())
        .with_transparent(wire.transparent);
    panel.id = wire.id;
    panel.datasource = wire.datasource;
    if let Some(pos) = wire.grid_pos {
        panel.grid_pos = GridPos::new(pos.x, pos.y, pos.w, pos.h);
    }
    Some(panel)
}

/// Regroup a flat wire panel list into rows
///
/// Panels before the first row marker go to a synthetic row titled
/// [`DEFAULT_ROW_TITLE`]; collapsed rows take their nested panels.
pub(crate) fn from_wire(wire: WireDashboard) -> (Dashboard, Vec<String>) {
    let mut warnings = Vec::new();
    let mut rows: Vec<Row> = Vec::new();

    for wp in wire.panels {
        if wp.kind == ROW_TYPE {
            let mut row = Row::new(wp.title).with_collapsed(wp.collapsed.unwrap_or(false));
            for child in wp.panels.unwrap_or_default() {
                if let Some(panel) = panel_from_wire(child, &mut warnings) {
                    row.panels.push(panel);
                }
            }
            rows.push(row);
            continue;
        }
        let Some(panel) = panel_from_wire(wp, &mut warnings) else {
            continue;
        };
        match rows.last_mut() {
            Some(row) => row.panels.push(panel),
            None => rows.push(Row::new(DEFAULT_ROW_TITLE).add_panel(panel)),
        }
    }

    let dashboard = Dashboard {
        uid: wire.uid,
        title: wire.title,
        description: wire.description,
        tags: wire.tags,
        timezone: wire.timezone,
        editable: wire.editable,
        graph_tooltip: wire.graph_tooltip,
        time: wire.time,
        refresh: wire.refresh,
        schema_version: wire.schema_version,
        rows,
        variables: wire.templating.map(|t| t.list).unwrap_or_default(),
        annotations: wire.annotations.map(|a| a.list).unwrap_or_default(),
        links: wire.links,
    };
    (dashboard, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grafana::PrometheusTarget;

    fn three_panel_dashboard() -> Dashboard {
        Dashboard::new("svc", "Service").add_row(
            Row::new("Overview")
                .add_panel(Panel::timeseries("a").with_size(12, 8))
                .add_panel(Panel::timeseries("b").with_size(12, 8))
                .add_panel(Panel::timeseries("c").with_size(12, 8)),
        )
    }

    #[test]
    fn test_three_panels_wrap() {
        let placed = placements(&three_panel_dashboard()).unwrap();
        let cells: Vec<(u32, u32)> = placed.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(cells, vec![(0, 1), (12, 1), (0, 9)]);
        let ids: Vec<u32> = placed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_row_header_and_flat_order() {
        let wire = to_wire(&three_panel_dashboard()).unwrap();
        let kinds: Vec<&str> = wire.panels.iter().map(|p| p.kind.as_str()).collect();
        assert_eq!(kinds, vec!["row", "timeseries", "timeseries", "timeseries"]);
        let header = &wire.panels[0];
        assert_eq!(header.id, Some(1000));
        assert_eq!(header.grid_pos, Some(WireGridPos { h: 1, w: 24, x: 0, y: 0 }));
    }

    #[test]
    fn test_second_row_starts_below_first() {
        let dash = three_panel_dashboard().add_row(Row::new("More").add_panel(Panel::stat("d")));
        let wire = to_wire(&dash).unwrap();
        let second_header = &wire.panels[4];
        assert_eq!(second_header.kind, "row");
        assert_eq!(second_header.id, Some(1001));
        assert_eq!(second_header.grid_pos.unwrap().y, 17);
        assert_eq!(wire.panels[5].grid_pos.unwrap().y, 18);
        assert_eq!(wire.panels[5].id, Some(4));
    }

    #[test]
    fn test_collapsed_row_embeds_children() {
        let dash = Dashboard::new("x", "X")
            .add_row(
                Row::new("Hidden")
                    .with_collapsed(true)
                    .add_panel(Panel::stat("s1"))
                    .add_panel(Panel::stat("s2")),
            )
            .add_row(Row::new("Shown").add_panel(Panel::stat("s3")));
        let wire = to_wire(&dash).unwrap();

        assert_eq!(wire.panels.len(), 3);
        assert_eq!(wire.panels[0].panels.as_ref().unwrap().len(), 2);
        assert_eq!(wire.panels[0].collapsed, Some(true));
        // The collapsed row takes one unit of header height only.
        assert_eq!(wire.panels[1].grid_pos.unwrap().y, 1);
        assert_eq!(wire.panels[2].grid_pos.unwrap().y, 2);
        assert_eq!(wire.panels[2].id, Some(3));
    }

    #[test]
    fn test_explicit_ids_and_positions_kept() {
        let dash = Dashboard::new("x", "X").add_row(
            Row::new("r")
                .add_panel(Panel::stat("auto"))
                .add_panel(Panel::stat("pinned").with_id(1).with_position(6, 30)),
        );
        let placed = placements(&dash).unwrap();
        assert_eq!(placed[0].id, 2);
        assert_eq!(placed[1].id, 1);
        assert_eq!((placed[1].x, placed[1].y), (6, 30));
    }

    #[test]
    fn test_pinned_panels_push_next_row_down() {
        let wire: WireDashboard = serde_json::from_str(
            r#"{
                "uid": "u", "title": "T",
                "panels": [
                    {"id": 10, "type": "row", "title": "R1", "gridPos": {"h": 1, "w": 24, "x": 0, "y": 0}},
                    {"id": 1, "type": "timeseries", "title": "ts", "gridPos": {"h": 8, "w": 24, "x": 0, "y": 1}},
                    {"id": 11, "type": "row", "title": "R2", "gridPos": {"h": 1, "w": 24, "x": 0, "y": 9}},
                    {"id": 2, "type": "stat", "title": "st", "gridPos": {"h": 4, "w": 6, "x": 0, "y": 10}}
                ]
            }"#,
        )
        .unwrap();
        let (dash, _) = from_wire(wire);
        let out = to_wire(&dash).unwrap();

        let cells: Vec<(&str, u32, u32)> = out
            .panels
            .iter()
            .map(|p| (p.title.as_str(), p.grid_pos.unwrap().y, p.grid_pos.unwrap().h))
            .collect();
        assert_eq!(cells, vec![("R1", 0, 1), ("ts", 1, 8), ("R2", 9, 1), ("st", 10, 4)]);
    }

    #[test]
    fn test_auto_placed_width_clamped_to_grid() {
        let dash = Dashboard::new("x", "X").add_row(
            Row::new("r")
                .add_panel(Panel::stat("wide").with_size(30, 4))
                .add_panel(Panel::stat("next").with_size(6, 4)),
        );
        let placed = placements(&dash).unwrap();
        assert_eq!((placed[0].x, placed[0].w), (0, GridPos::COLUMNS));
        assert_eq!((placed[1].x, placed[1].y), (0, 5));
        assert!(placed.iter().all(|p| p.x + p.w <= GridPos::COLUMNS));
    }

    #[test]
    fn test_empty_tags_omitted() {
        let json = serde_json::to_value(to_wire(&Dashboard::new("x", "X")).unwrap()).unwrap();
        assert!(json.get("tags").is_none());
        let tagged = serde_json::to_value(to_wire(&Dashboard::new("x", "X").add_tag("api")).unwrap()).unwrap();
        assert_eq!(tagged["tags"], serde_json::json!(["api"]));
    }

    #[test]
    fn test_ref_ids_assigned() {
        let dash = Dashboard::new("x", "X").add_row(
            Row::new("r").add_panel(
                Panel::timeseries("t")
                    .add_target(PrometheusTarget::new("up"))
                    .add_target(PrometheusTarget::new("up").with_ref_id("Q"))
                    .add_target(PrometheusTarget::new("up")),
            ),
        );
        let wire = to_wire(&dash).unwrap();
        let refs: Vec<&str> = wire.panels[1].targets.iter().map(Target::ref_id).collect();
        assert_eq!(refs, vec!["A", "Q", "C"]);
        assert_eq!(ref_id_for(25), "Z");
        assert_eq!(ref_id_for(26), "AA");
    }

    #[test]
    fn test_from_wire_synthesizes_default_row() {
        let wire: WireDashboard = serde_json::from_str(
            r#"{
                "uid": "u", "title": "T",
                "panels": [
                    {"id": 1, "type": "graph", "title": "old", "gridPos": {"h": 8, "w": 12, "x": 0, "y": 0}},
                    {"id": 2, "type": "row", "title": "R", "collapsed": true, "panels": [
                        {"id": 3, "type": "stat", "title": "inner"}
                    ]},
                    {"id": 4, "type": "alertlist", "title": "unsupported"}
                ]
            }"#,
        )
        .unwrap();
        let (dash, warnings) = from_wire(wire);
        assert_eq!(dash.rows.len(), 2);
        assert_eq!(dash.rows[0].title, DEFAULT_ROW_TITLE);
        assert_eq!(dash.rows[0].panels[0].kind(), PanelKind::Timeseries);
        assert!(dash.rows[1].collapsed);
        assert_eq!(dash.rows[1].panels[0].title, "inner");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("alertlist"));
    }

    #[test]
    fn test_refresh_false_reads_as_empty() {
        let wire: WireDashboard = serde_json::from_str(r#"{"title":"x","refresh":false}"#).unwrap();
        assert_eq!(wire.refresh, "");
    }
}
