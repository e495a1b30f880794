// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Routing tree and label matchers

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::duration::Duration;
use crate::error::{Error, Result};
use crate::output::is_false;

/// Matcher operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOp {
    Equal,
    NotEqual,
    Regex,
    NotRegex,
}

impl MatchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Regex => "=~",
            Self::NotRegex => "!~",
        }
    }
}

impl fmt::Display for MatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label matcher, written on the wire as `name="value"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matcher {
    pub name: String,
    pub op: MatchOp,
    pub value: String,
}

impl Matcher {
    pub fn new(name: impl Into<String>, op: MatchOp, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op,
            value: value.into(),
        }
    }

    pub fn equal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, MatchOp::Equal, value)
    }

    pub fn not_equal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, MatchOp::NotEqual, value)
    }

    pub fn regex(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, MatchOp::Regex, value)
    }

    pub fn not_regex(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, MatchOp::NotRegex, value)
    }

    /// Parse `name="value"`, `name=~"re"` or the unquoted `name=value` form
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        let split = s
            .find(['=', '!'])
            .ok_or_else(|| Error::InvalidInput(format!("matcher '{}' has no operator", input)))?;
        let name = s[..split].trim();
        if name.is_empty() {
            return Err(Error::InvalidInput(format!("matcher '{}' has no label name", input)));
        }

        let rest = &s[split..];
        let (op, raw) = if let Some(v) = rest.strip_prefix("=~") {
            (MatchOp::Regex, v)
        } else if let Some(v) = rest.strip_prefix("!~") {
            (MatchOp::NotRegex, v)
        } else if let Some(v) = rest.strip_prefix("!=") {
            (MatchOp::NotEqual, v)
        } else if let Some(v) = rest.strip_prefix('=') {
            (MatchOp::Equal, v)
        } else {
            return Err(Error::InvalidInput(format!("matcher '{}' has a bad operator", input)));
        };

        let raw = raw.trim();
        let value = match raw.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
            Some(quoted) => unescape(quoted),
            None => raw.to_string(),
        };
        Ok(Self::new(name, op, value))
    }
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}\"{}\"", self.name, self.op, escape(&self.value))
    }
}

impl FromStr for Matcher {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Matcher::parse(s)
    }
}

impl Serialize for Matcher {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct MatcherVisitor;

impl<'de> Visitor<'de> for MatcherVisitor {
    type Value = Matcher;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a matcher such as severity=\"critical\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Matcher, E> {
        Matcher::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Matcher {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_str(MatcherVisitor)
    }
}

/// A node of the routing tree
///
/// Children are owned; the tree can be arbitrarily deep but never shares
/// nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Route {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub receiver: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub r#continue: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matchers: Vec<Matcher>,
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub group_wait: Duration,
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub group_interval: Duration,
    #[serde(skip_serializing_if = "Duration::is_zero")]
    pub repeat_interval: Duration,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mute_time_intervals: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub active_time_intervals: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
}

impl Route {
    pub fn new(receiver: impl Into<String>) -> Self {
        Self {
            receiver: receiver.into(),
            ..Self::default()
        }
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = receiver.into();
        self
    }

    pub fn with_group_by<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_group_by(mut self, label: impl Into<String>) -> Self {
        self.group_by.push(label.into());
        self
    }

    pub fn with_continue(mut self, cont: bool) -> Self {
        self.r#continue = cont;
        self
    }

    pub fn with_matchers(mut self, matchers: Vec<Matcher>) -> Self {
        self.matchers = matchers;
        self
    }

    pub fn add_matcher(mut self, matcher: Matcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn with_group_wait(mut self, wait: Duration) -> Self {
        self.group_wait = wait;
        self
    }

    pub fn with_group_interval(mut self, interval: Duration) -> Self {
        self.group_interval = interval;
        self
    }

    pub fn with_repeat_interval(mut self, interval: Duration) -> Self {
        self.repeat_interval = interval;
        self
    }

    pub fn with_mute_time_intervals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mute_time_intervals = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_mute_time_interval(mut self, name: impl Into<String>) -> Self {
        self.mute_time_intervals.push(name.into());
        self
    }

    pub fn add_active_time_interval(mut self, name: impl Into<String>) -> Self {
        self.active_time_intervals.push(name.into());
        self
    }

    pub fn with_routes(mut self, routes: Vec<Route>) -> Self {
        self.routes = routes;
        self
    }

    pub fn add_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Pre-order walk over this node and every descendant
    pub fn walk(&self) -> Vec<&Route> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(route) = stack.pop() {
            out.push(route);
            stack.extend(route.routes.iter().rev());
        }
        out
    }

    /// Non-empty receiver names referenced anywhere in the subtree
    pub fn referenced_receivers(&self) -> Vec<&str> {
        self.walk()
            .into_iter()
            .filter(|r| !r.receiver.is_empty())
            .map(|r| r.receiver.as_str())
            .collect()
    }

    /// Depth of the subtree (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.routes.iter().map(Route::depth).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matcher_display() {
        assert_eq!(Matcher::equal("severity", "critical").to_string(), "severity=\"critical\"");
        assert_eq!(Matcher::regex("team", "db|api").to_string(), "team=~\"db|api\"");
        assert_eq!(Matcher::not_equal("env", "dev").to_string(), "env!=\"dev\"");
    }

    #[test]
    fn test_matcher_parse_forms() {
        assert_eq!(Matcher::parse("severity=\"critical\"").unwrap(), Matcher::equal("severity", "critical"));
        assert_eq!(Matcher::parse("severity = critical").unwrap(), Matcher::equal("severity", "critical"));
        assert_eq!(Matcher::parse("team!~\"ops.*\"").unwrap(), Matcher::not_regex("team", "ops.*"));
        assert!(Matcher::parse("no-operator").is_err());
        assert!(Matcher::parse("=value").is_err());
    }

    #[test]
    fn test_matcher_escaping_survives_parse() {
        let m = Matcher::equal("msg", "say \"hi\"");
        assert_eq!(Matcher::parse(&m.to_string()).unwrap(), m);
    }

    #[test]
    fn test_route_serializes_continue_keyword() {
        let route = Route::new("pager").with_continue(true);
        let out = serde_yaml::to_string(&route).unwrap();
        assert_eq!(out, "receiver: pager\ncontinue: true\n");
    }

    #[test]
    fn test_group_interval_single_unit() {
        let route = Route::new("default").with_group_interval(Duration::minutes(5));
        let out = serde_yaml::to_string(&route).unwrap();
        assert!(out.contains("group_interval: 5m"));
    }

    #[test]
    fn test_walk_is_preorder() {
        let tree = Route::new("root")
            .add_route(Route::new("a").add_route(Route::new("a1")))
            .add_route(Route::new("b"));
        let names: Vec<&str> = tree.walk().iter().map(|r| r.receiver.as_str()).collect();
        assert_eq!(names, vec!["root", "a", "a1", "b"]);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_referenced_receivers_skip_inherited() {
        let tree = Route::new("root").add_route(Route::default().add_matcher(Matcher::equal("a", "b")));
        assert_eq!(tree.referenced_receivers(), vec!["root"]);
    }
}
