// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Inhibition rules and time-based muting

use serde::{Deserialize, Serialize};

use super::Matcher;

/// Suppress target alerts while a matching source alert fires
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InhibitRule {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_matchers: Vec<Matcher>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_matchers: Vec<Matcher>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub equal: Vec<String>,
}

impl InhibitRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_matchers(mut self, matchers: Vec<Matcher>) -> Self {
        self.source_matchers = matchers;
        self
    }

    pub fn add_source_matcher(mut self, matcher: Matcher) -> Self {
        self.source_matchers.push(matcher);
        self
    }

    pub fn with_target_matchers(mut self, matchers: Vec<Matcher>) -> Self {
        self.target_matchers = matchers;
        self
    }

    pub fn add_target_matcher(mut self, matcher: Matcher) -> Self {
        self.target_matchers.push(matcher);
        self
    }

    pub fn with_equal<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.equal = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_equal(mut self, label: impl Into<String>) -> Self {
        self.equal.push(label.into());
        self
    }
}

/// Named set of time intervals referenced from routes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuteTimeInterval {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub time_intervals: Vec<TimeInterval>,
}

impl MuteTimeInterval {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time_intervals: Vec::new(),
        }
    }

    pub fn with_time_intervals(mut self, intervals: Vec<TimeInterval>) -> Self {
        self.time_intervals = intervals;
        self
    }

    pub fn add_time_interval(mut self, interval: TimeInterval) -> Self {
        self.time_intervals.push(interval);
        self
    }
}

/// One recurring window; every populated field must match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeInterval {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub times: Vec<TimeRange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub weekdays: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub days_of_month: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub months: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub years: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub location: String,
}

impl TimeInterval {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_time(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.times.push(TimeRange {
            start_time: start.into(),
            end_time: end.into(),
        });
        self
    }

    pub fn with_weekdays<I, S>(mut self, weekdays: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.weekdays = weekdays.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_days_of_month<I, S>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.days_of_month = days.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_months<I, S>(mut self, months: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.months = months.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_years<I, S>(mut self, years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.years = years.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}

/// `HH:MM` start and end of a daily window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_time: String,
    pub end_time: String,
}
