// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Panel queries, polymorphic over the data source type

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::panel::DataSourceRef;
use crate::output::is_false;

/// A panel query
///
/// On the wire the variant is decided by `datasource.type`; targets without a
/// data source type are read as Prometheus queries.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Prometheus(PrometheusTarget),
    Loki(LokiTarget),
}

impl Target {
    pub fn expr(&self) -> &str {
        match self {
            Target::Prometheus(t) => &t.expr,
            Target::Loki(t) => &t.expr,
        }
    }

    pub fn ref_id(&self) -> &str {
        match self {
            Target::Prometheus(t) => &t.ref_id,
            Target::Loki(t) => &t.ref_id,
        }
    }

    pub(crate) fn set_ref_id(&mut self, ref_id: String) {
        match self {
            Target::Prometheus(t) => t.ref_id = ref_id,
            Target::Loki(t) => t.ref_id = ref_id,
        }
    }
}

impl From<PrometheusTarget> for Target {
    fn from(target: PrometheusTarget) -> Self {
        Target::Prometheus(target)
    }
}

impl From<LokiTarget> for Target {
    fn from(target: LokiTarget) -> Self {
        Target::Loki(target)
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Target::Prometheus(t) => t.serialize(serializer),
            Target::Loki(t) => t.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let is_loki = value
            .pointer("/datasource/type")
            .and_then(serde_json::Value::as_str)
            == Some("loki");
        if is_loki {
            serde_json::from_value(value)
                .map(Target::Loki)
                .map_err(serde::de::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(Target::Prometheus)
                .map_err(serde::de::Error::custom)
        }
    }
}

/// A PromQL query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrometheusTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasource: Option<DataSourceRef>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ref_id: String,
    pub expr: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub legend_format: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub interval: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub format: String,
    #[serde(skip_serializing_if = "is_false")]
    pub instant: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub range: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub hide: bool,
}

impl PrometheusTarget {
    pub fn new(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            ..Self::default()
        }
    }

    pub fn with_datasource(mut self, datasource: DataSourceRef) -> Self {
        self.datasource = Some(datasource);
        self
    }

    pub fn with_ref_id(mut self, ref_id: impl Into<String>) -> Self {
        self.ref_id = ref_id.into();
        self
    }

    pub fn with_legend_format(mut self, legend: impl Into<String>) -> Self {
        self.legend_format = legend.into();
        self
    }

    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = interval.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Evaluate at a single instant rather than over the time range
    pub fn instant(mut self) -> Self {
        self.instant = true;
        self.range = false;
        self
    }

    pub fn range(mut self) -> Self {
        self.range = true;
        self.instant = false;
        self
    }

    pub fn with_hide(mut self, hide: bool) -> Self {
        self.hide = hide;
        self
    }
}

/// A LogQL query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LokiTarget {
    pub datasource: DataSourceRef,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ref_id: String,
    pub expr: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub legend_format: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub query_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<u32>,
    #[serde(skip_serializing_if = "is_false")]
    pub hide: bool,
}

impl Default for LokiTarget {
    fn default() -> Self {
        Self {
            datasource: DataSourceRef::loki(""),
            ref_id: String::new(),
            expr: String::new(),
            legend_format: String::new(),
            query_type: String::new(),
            max_lines: None,
            hide: false,
        }
    }
}

impl LokiTarget {
    pub fn new(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            ..Self::default()
        }
    }

    /// Point at a specific Loki data source; the type stays `loki`
    pub fn with_datasource_uid(mut self, uid: impl Into<String>) -> Self {
        self.datasource = DataSourceRef::loki(uid);
        self
    }

    pub fn with_ref_id(mut self, ref_id: impl Into<String>) -> Self {
        self.ref_id = ref_id.into();
        self
    }

    pub fn with_legend_format(mut self, legend: impl Into<String>) -> Self {
        self.legend_format = legend.into();
        self
    }

    pub fn with_query_type(mut self, query_type: impl Into<String>) -> Self {
        self.query_type = query_type.into();
        self
    }

    pub fn with_max_lines(mut self, max: u32) -> Self {
        self.max_lines = Some(max);
        self
    }

    pub fn with_hide(mut self, hide: bool) -> Self {
        self.hide = hide;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prometheus_target_json() {
        let t: Target = PrometheusTarget::new("up")
            .with_ref_id("A")
            .with_legend_format("{{instance}}")
            .instant()
            .into();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(
            json,
            r#"{"refId":"A","expr":"up","legendFormat":"{{instance}}","instant":true}"#
        );
    }

    #[test]
    fn test_dispatch_on_datasource_type() {
        let t: Target = serde_json::from_str(
            r#"{"datasource":{"type":"loki","uid":"logs"},"refId":"A","expr":"{app=\"api\"}"}"#,
        )
        .unwrap();
        assert!(matches!(t, Target::Loki(_)));

        let t: Target = serde_json::from_str(r#"{"refId":"B","expr":"up"}"#).unwrap();
        assert!(matches!(t, Target::Prometheus(_)));
        assert_eq!(t.ref_id(), "B");
    }

    #[test]
    fn test_loki_keeps_type() {
        let t = LokiTarget::new("{job=\"x\"}").with_datasource_uid("L1");
        assert_eq!(t.datasource.kind, "loki");
        let json = serde_json::to_value(Target::from(t)).unwrap();
        assert_eq!(json["datasource"]["type"], "loki");
    }

    #[test]
    fn test_instant_and_range_exclusive() {
        let t = PrometheusTarget::new("up").instant().range();
        assert!(t.range);
        assert!(!t.instant);
    }
}
