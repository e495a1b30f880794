// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Identifier derivation for generated bindings

use std::collections::HashMap;

/// `team-notifications` → `TeamNotifications`
///
/// Splits on `-`, `_`, `.`, `/` and spaces and capitalizes each part. Parts
/// keep their remaining characters; anything that cannot appear in an
/// identifier is dropped. A leading digit gets an `N` prefix.
pub fn pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for part in name.split(|c: char| matches!(c, '-' | '_' | '.' | '/' | ' ')) {
        let mut chars = part.chars().filter(|c| c.is_ascii_alphanumeric());
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'N');
    }
    out
}

/// PascalCase name with a role suffix; empty names fall back to `default`
pub fn role_ident(name: &str, suffix: &str, default: &str) -> String {
    let base = pascal_case(name);
    let base = if base.is_empty() { default.to_string() } else { base };
    if base.ends_with(suffix) {
        base
    } else {
        format!("{}{}", base, suffix)
    }
}

/// `TeamNotificationsReceiver` → `TEAM_NOTIFICATIONS_RECEIVER`
pub fn screaming_snake(pascal: &str) -> String {
    let chars: Vec<char> = pascal.chars().collect();
    let mut out = String::with_capacity(pascal.len() + 4);
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase() || prev.is_ascii_digit() || (prev.is_ascii_uppercase() && next_lower) {
                out.push('_');
            }
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

/// `NodeExporter` → `node_exporter`, for output file names
pub fn snake_case(pascal: &str) -> String {
    screaming_snake(pascal).to_ascii_lowercase()
}

/// Hands out unique static names; repeats get `_2`, `_3`, … in encounter order
#[derive(Debug, Default)]
pub struct NameTable {
    seen: HashMap<String, usize>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a name so later claims of it get a suffix
    pub fn reserve(&mut self, name: &str) {
        self.seen.entry(name.to_string()).or_insert(1);
    }

    pub fn claim(&mut self, name: &str) -> String {
        let mut count = self.seen.get(name).copied().unwrap_or(0);
        loop {
            count += 1;
            let candidate = if count == 1 {
                name.to_string()
            } else {
                format!("{}_{}", name, count)
            };
            self.seen.insert(name.to_string(), count);
            if count == 1 || !self.seen.contains_key(&candidate) {
                self.seen.insert(candidate.clone(), 1);
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("team-notifications"), "TeamNotifications");
        assert_eq!(pascal_case("node_exporter.v2/prod api"), "NodeExporterV2ProdApi");
        assert_eq!(pascal_case("kube-state-metrics"), "KubeStateMetrics");
        assert_eq!(pascal_case("5xx-errors"), "N5xxErrors");
        assert_eq!(pascal_case(""), "");
        assert_eq!(pascal_case("--"), "");
    }

    #[test]
    fn test_role_ident() {
        assert_eq!(role_ident("team-notifications", "Receiver", "Config"), "TeamNotificationsReceiver");
        assert_eq!(role_ident("", "Row", "Dashboard"), "DashboardRow");
        assert_eq!(role_ident("default-receiver", "Receiver", "Config"), "DefaultReceiver");
    }

    #[test]
    fn test_screaming_snake() {
        assert_eq!(screaming_snake("TeamNotificationsReceiver"), "TEAM_NOTIFICATIONS_RECEIVER");
        assert_eq!(screaming_snake("HTTPApiScrape"), "HTTP_API_SCRAPE");
        assert_eq!(screaming_snake("NodeV2Scrape"), "NODE_V2_SCRAPE");
        assert_eq!(snake_case("ApiServerRules"), "api_server_rules");
    }

    #[test]
    fn test_name_table_suffixes() {
        let mut names = NameTable::new();
        names.reserve("CONFIG");
        assert_eq!(names.claim("API_SCRAPE"), "API_SCRAPE");
        assert_eq!(names.claim("API_SCRAPE"), "API_SCRAPE_2");
        assert_eq!(names.claim("API_SCRAPE"), "API_SCRAPE_3");
        assert_eq!(names.claim("CONFIG"), "CONFIG_2");
    }
}
