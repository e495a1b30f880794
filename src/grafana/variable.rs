// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Dashboard template variables

use serde::{Deserialize, Deserializer, Serialize};

use super::panel::DataSourceRef;
use crate::output::is_false;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    #[default]
    Query,
    Custom,
    Constant,
    Datasource,
    Interval,
    Textbox,
}

impl VariableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Custom => "custom",
            Self::Constant => "constant",
            Self::Datasource => "datasource",
            Self::Interval => "interval",
            Self::Textbox => "textbox",
        }
    }
}

/// One entry of `templating.list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VariableKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasource: Option<DataSourceRef>,
    #[serde(
        skip_serializing_if = "String::is_empty",
        deserialize_with = "string_or_query_object"
    )]
    pub query: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub regex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<u8>,
    #[serde(skip_serializing_if = "is_false")]
    pub multi: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub include_all: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide: Option<u8>,
}

/// Newer Grafana versions store query variables as `{"query": "...", ...}`
fn string_or_query_object<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Object(map) => map
            .get("query")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    /// Values from a data source query (`label_values(up, job)`)
    pub fn query(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Query).with_query(query)
    }

    /// Comma-separated fixed values
    pub fn custom<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined: Vec<String> = values.into_iter().map(|v| v.as_ref().to_string()).collect();
        Self::new(name, VariableKind::Custom).with_query(joined.join(","))
    }

    pub fn constant(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Constant).with_query(value)
    }

    /// Pick among data sources of a plugin type (`prometheus`, `loki`)
    pub fn datasource(name: impl Into<String>, plugin: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Datasource).with_query(plugin)
    }

    pub fn interval<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined: Vec<String> = values.into_iter().map(|v| v.as_ref().to_string()).collect();
        Self::new(name, VariableKind::Interval).with_query(joined.join(","))
    }

    pub fn textbox(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Textbox).with_query(default)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_datasource(mut self, datasource: DataSourceRef) -> Self {
        self.datasource = Some(datasource);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = regex.into();
        self
    }

    /// 1 = on dashboard load, 2 = on time range change
    pub fn with_refresh(mut self, refresh: u8) -> Self {
        self.refresh = Some(refresh);
        self
    }

    pub fn with_sort(mut self, sort: u8) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn with_include_all(mut self, include_all: bool) -> Self {
        self.include_all = include_all;
        self
    }

    pub fn with_hide(mut self, hide: u8) -> Self {
        self.hide = Some(hide);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_variable_json() {
        let v = Variable::query("job", "label_values(up, job)")
            .with_datasource(DataSourceRef::prometheus("prom"))
            .with_refresh(1)
            .with_include_all(true);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], "query");
        assert_eq!(json["includeAll"], true);
        assert_eq!(json["query"], "label_values(up, job)");
        assert!(json.get("multi").is_none());
    }

    #[test]
    fn test_custom_joins_values() {
        let v = Variable::custom("env", ["prod", "staging"]);
        assert_eq!(v.query, "prod,staging");
        assert_eq!(v.kind, VariableKind::Custom);
    }

    #[test]
    fn test_query_object_form() {
        let v: Variable = serde_json::from_str(
            r#"{"name":"ns","type":"query","query":{"query":"label_values(kube_pod_info, namespace)","refId":"X"}}"#,
        )
        .unwrap();
        assert_eq!(v.query, "label_values(kube_pod_info, namespace)");
    }
}
