// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Relabeling rules shared by scrape, metric, alert and remote-write paths

use serde::{Deserialize, Serialize};
use std::fmt;

/// Relabel action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelabelAction {
    #[default]
    Replace,
    Keep,
    Drop,
    KeepEqual,
    DropEqual,
    HashMod,
    LabelMap,
    LabelDrop,
    LabelKeep,
    Lowercase,
    Uppercase,
}

impl RelabelAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Keep => "keep",
            Self::Drop => "drop",
            Self::KeepEqual => "keepequal",
            Self::DropEqual => "dropequal",
            Self::HashMod => "hashmod",
            Self::LabelMap => "labelmap",
            Self::LabelDrop => "labeldrop",
            Self::LabelKeep => "labelkeep",
            Self::Lowercase => "lowercase",
            Self::Uppercase => "uppercase",
        }
    }
}

impl fmt::Display for RelabelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One relabel step
///
/// `action` stays unset unless chosen explicitly, so a plain replace rule
/// serializes without an `action:` key just as hand-written files do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelabelConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_labels: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub separator: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub target_label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub regex: String,
    #[serde(skip_serializing_if = "is_zero_u64")]
    pub modulus: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub replacement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<RelabelAction>,
}

fn is_zero_u64(n: &u64) -> bool {
    *n == 0
}

impl RelabelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only series whose source labels match `regex`
    pub fn keep<I, S>(source_labels: I, regex: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new()
            .with_source_labels(source_labels)
            .with_regex(regex)
            .with_action(RelabelAction::Keep)
    }

    /// Drop series whose source labels match `regex`
    pub fn drop<I, S>(source_labels: I, regex: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new()
            .with_source_labels(source_labels)
            .with_regex(regex)
            .with_action(RelabelAction::Drop)
    }

    /// Copy the joined source labels into `target_label`
    pub fn replace<I, S>(source_labels: I, target_label: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new()
            .with_source_labels(source_labels)
            .with_target_label(target_label)
    }

    pub fn label_map(regex: impl Into<String>) -> Self {
        Self::new()
            .with_regex(regex)
            .with_action(RelabelAction::LabelMap)
    }

    pub fn label_drop(regex: impl Into<String>) -> Self {
        Self::new()
            .with_regex(regex)
            .with_action(RelabelAction::LabelDrop)
    }

    pub fn with_source_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_source_label(mut self, label: impl Into<String>) -> Self {
        self.source_labels.push(label.into());
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_target_label(mut self, label: impl Into<String>) -> Self {
        self.target_label = label.into();
        self
    }

    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = regex.into();
        self
    }

    pub fn with_modulus(mut self, modulus: u64) -> Self {
        self.modulus = modulus;
        self
    }

    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = replacement.into();
        self
    }

    pub fn with_action(mut self, action: RelabelAction) -> Self {
        self.action = Some(action);
        self
    }
}
