// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Rule catalogue
//!
//! | Range   | Subsystem          |
//! |---------|--------------------|
//! | 001-019 | Core patterns      |
//! | 020-049 | Prometheus         |
//! | 050-079 | Alertmanager       |
//! | 080-099 | Rules              |
//! | 100-119 | PromQL             |
//! | 120-149 | Grafana dashboards |
//! | 150-169 | Grafana panels     |
//! | 200-219 | Security           |

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleInfo {
    pub id: &'static str,
    pub severity: Severity,
    pub fixable: bool,
    pub summary: &'static str,
}

const fn rule(id: &'static str, severity: Severity, fixable: bool, summary: &'static str) -> RuleInfo {
    RuleInfo {
        id,
        severity,
        fixable,
        summary,
    }
}

use Severity::{Error, Warning};

pub const CATALOGUE: &[RuleInfo] = &[
    rule("WOB001", Warning, false, "resource initialised with no fields"),
    rule("WOB020", Error, false, "scrape config job name is empty"),
    rule("WOB021", Error, false, "scrape timeout exceeds scrape interval"),
    rule("WOB022", Warning, false, "scrape config has no targets or service discovery"),
    rule("WOB023", Error, false, "duplicate scrape job name"),
    rule("WOB050", Error, false, "Alertmanager config has no receivers"),
    rule("WOB051", Warning, false, "route references an undefined receiver"),
    rule("WOB052", Warning, false, "receiver has no notification integrations"),
    rule("WOB053", Warning, false, "repeat interval shorter than group interval"),
    rule("WOB080", Warning, true, "alerting rule has no `for` duration"),
    rule("WOB081", Warning, true, "alerting rule has no severity label"),
    rule("WOB082", Warning, false, "alerting rule has no summary annotation"),
    rule("WOB083", Error, false, "rule expression is empty"),
    rule("WOB084", Warning, false, "recording rule name is not level:metric:operations"),
    rule("WOB085", Warning, false, "rule group has no rules"),
    rule("WOB100", Warning, false, "rate-style function over a non-counter metric"),
    rule("WOB101", Error, false, "unbalanced brackets in PromQL expression"),
    rule("WOB102", Warning, false, "range window shorter than 1m"),
    rule("WOB120", Error, false, "dashboard title is empty"),
    rule("WOB121", Warning, true, "dashboard has no tags"),
    rule("WOB122", Error, false, "dashboard UID is empty"),
    rule("WOB123", Error, false, "dashboard UID longer than 40 characters"),
    rule("WOB124", Warning, false, "dashboard has no panels"),
    rule("WOB150", Warning, false, "panel title is empty"),
    rule("WOB151", Warning, false, "data panel has no targets"),
    rule("WOB152", Error, false, "panel extends past the 24-column grid"),
    rule("WOB153", Error, false, "duplicate panel ID"),
    rule("WOB200", Error, false, "secret hard-coded as a literal"),
    rule("WOB201", Warning, false, "TLS verification disabled"),
    rule("WOB202", Warning, false, "plain http:// endpoint"),
];

/// Look up a rule by ID
pub fn lookup(id: &str) -> Option<&'static RuleInfo> {
    CATALOGUE.iter().find(|r| r.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_unique_and_sorted() {
        let ids: Vec<_> = CATALOGUE.iter().map(|r| r.id).collect();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(sorted, ids);
    }

    #[test]
    fn test_lookup() {
        let rule = lookup("WOB121").unwrap();
        assert!(rule.fixable);
        assert_eq!(rule.severity, Severity::Warning);
        assert!(lookup("WOB999").is_none());
    }
}
