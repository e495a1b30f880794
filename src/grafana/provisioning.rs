// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Grafana file provisioning (`provisioning/datasources`, `provisioning/dashboards`)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::output::{self, is_false, is_zero_u32, WireFormat};

const API_VERSION: u32 = 1;

fn api_version() -> u32 {
    API_VERSION
}

/// `apiVersion: 1` data source provisioning file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceProvisioning {
    #[serde(default = "api_version")]
    pub api_version: u32,
    #[serde(default)]
    pub datasources: Vec<Datasource>,
}

impl Default for DatasourceProvisioning {
    fn default() -> Self {
        Self {
            api_version: API_VERSION,
            datasources: Vec::new(),
        }
    }
}

impl DatasourceProvisioning {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_datasource(mut self, datasource: Datasource) -> Self {
        self.datasources.push(datasource);
        self
    }

    pub fn with_datasources(mut self, datasources: Vec<Datasource>) -> Self {
        self.datasources = datasources;
        self
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        output::to_yaml(self)
    }

    pub fn serialize_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        output::write_atomic(path.as_ref(), &self.serialize()?)
    }
}

impl WireFormat for DatasourceProvisioning {
    fn default_file_name(&self) -> String {
        "datasources.yml".to_string()
    }

    fn to_wire(&self) -> Result<Vec<u8>> {
        self.serialize()
    }
}

/// One provisioned data source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Datasource {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub access: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "is_false")]
    pub is_default: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub json_data: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "is_false")]
    pub editable: bool,
}

impl Datasource {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            url: url.into(),
            access: "proxy".to_string(),
            ..Self::default()
        }
    }

    pub fn prometheus(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, "prometheus", url)
    }

    pub fn loki(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, "loki", url)
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    pub fn with_access(mut self, access: impl Into<String>) -> Self {
        self.access = access.into();
        self
    }

    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    pub fn with_json_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.json_data.insert(key.into(), value);
        self
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }
}

/// `apiVersion: 1` dashboard provider file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardProvisioning {
    #[serde(default = "api_version")]
    pub api_version: u32,
    #[serde(default)]
    pub providers: Vec<DashboardProvider>,
}

impl Default for DashboardProvisioning {
    fn default() -> Self {
        Self {
            api_version: API_VERSION,
            providers: Vec::new(),
        }
    }
}

impl DashboardProvisioning {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_provider(mut self, provider: DashboardProvider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_providers(mut self, providers: Vec<DashboardProvider>) -> Self {
        self.providers = providers;
        self
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        output::to_yaml(self)
    }

    pub fn serialize_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        output::write_atomic(path.as_ref(), &self.serialize()?)
    }
}

impl WireFormat for DashboardProvisioning {
    fn default_file_name(&self) -> String {
        "dashboards.yml".to_string()
    }

    fn to_wire(&self) -> Result<Vec<u8>> {
        self.serialize()
    }
}

/// Loads dashboard JSON files from a directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardProvider {
    pub name: String,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub org_id: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub folder: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "is_false")]
    pub disable_deletion: bool,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub update_interval_seconds: u32,
    #[serde(skip_serializing_if = "is_false")]
    pub allow_ui_updates: bool,
    pub options: ProviderOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderOptions {
    pub path: String,
    #[serde(skip_serializing_if = "is_false")]
    pub folders_from_files_structure: bool,
}

impl DashboardProvider {
    /// File provider reading dashboards from `path`
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: "file".to_string(),
            options: ProviderOptions {
                path: path.into(),
                folders_from_files_structure: false,
            },
            ..Self::default()
        }
    }

    pub fn with_org_id(mut self, org_id: u32) -> Self {
        self.org_id = org_id;
        self
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn with_disable_deletion(mut self, disable: bool) -> Self {
        self.disable_deletion = disable;
        self
    }

    pub fn with_update_interval_seconds(mut self, seconds: u32) -> Self {
        self.update_interval_seconds = seconds;
        self
    }

    pub fn with_allow_ui_updates(mut self, allow: bool) -> Self {
        self.allow_ui_updates = allow;
        self
    }

    pub fn with_folders_from_files_structure(mut self, enabled: bool) -> Self {
        self.options.folders_from_files_structure = enabled;
        self
    }
}
