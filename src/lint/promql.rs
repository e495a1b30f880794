// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Lexical PromQL checks
//!
//! Expressions are not parsed; these are token-level heuristics.

use crate::duration::Duration;

const RATE_FUNCTIONS: [&str; 3] = ["rate", "irate", "increase"];
const COUNTER_SUFFIXES: [&str; 4] = ["_total", "_count", "_sum", "_bucket"];
const MIN_RATE_WINDOW: Duration = Duration::minutes(1);

/// `(rule_id, message)` for every problem found in `expr`
pub fn check(expr: &str) -> Vec<(&'static str, String)> {
    let mut found = Vec::new();
    if let Some(message) = bracket_error(expr) {
        found.push(("WOB101", message));
        return found;
    }
    for call in rate_calls(expr) {
        if let Some(metric) = leading_metric(call.body) {
            if !COUNTER_SUFFIXES.iter().any(|s| metric.ends_with(s)) {
                found.push((
                    "WOB100",
                    format!("{}() over '{}', which does not look like a counter", call.function, metric),
                ));
            }
        }
        if let Some(window) = range_window(call.body) {
            if let Ok(d) = Duration::parse(window) {
                if d < MIN_RATE_WINDOW {
                    found.push((
                        "WOB102",
                        format!("{}() window [{}] is shorter than 1m", call.function, window),
                    ));
                }
            }
        }
    }
    found
}

/// Bytes of `expr` with quoted strings blanked out
fn code_bytes(expr: &str) -> Vec<u8> {
    let mut out = expr.as_bytes().to_vec();
    let mut quote: Option<u8> = None;
    let mut escaped = false;
    for b in out.iter_mut() {
        match quote {
            Some(q) => {
                let current = *b;
                *b = b' ';
                if escaped {
                    escaped = false;
                } else if current == b'\\' && q != b'`' {
                    escaped = true;
                } else if current == q {
                    quote = None;
                }
            }
            None if matches!(*b, b'"' | b'\'' | b'`') => {
                quote = Some(*b);
                *b = b' ';
            }
            None => {}
        }
    }
    out
}

fn bracket_error(expr: &str) -> Option<String> {
    let mut stack: Vec<(u8, usize)> = Vec::new();
    for (i, b) in code_bytes(expr).into_iter().enumerate() {
        match b {
            b'(' | b'[' | b'{' => stack.push((b, i)),
            b')' | b']' | b'}' => {
                let open = match b {
                    b')' => b'(',
                    b']' => b'[',
                    _ => b'{',
                };
                match stack.pop() {
                    Some((o, _)) if o == open => {}
                    _ => return Some(format!("unexpected '{}' at offset {}", b as char, i)),
                }
            }
            _ => {}
        }
    }
    stack
        .pop()
        .map(|(b, i)| format!("'{}' at offset {} is never closed", b as char, i))
}

struct RateCall<'a> {
    function: &'static str,
    body: &'a str,
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b':'
}

/// Argument text of every `rate(`/`irate(`/`increase(` call
fn rate_calls(expr: &str) -> Vec<RateCall<'_>> {
    let code = code_bytes(expr);
    let mut calls = Vec::new();
    let mut i = 0;
    while i < code.len() {
        if i > 0 && is_ident_byte(code[i - 1]) {
            i += 1;
            continue;
        }
        let hit = RATE_FUNCTIONS.iter().find(|f| {
            let end = i + f.len();
            code.get(i..end) == Some(f.as_bytes())
                && code[end..].iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'(')
        });
        let Some(function) = hit else {
            i += 1;
            continue;
        };
        let Some(open) = code[i..].iter().position(|b| *b == b'(').map(|p| p + i) else {
            break;
        };
        let mut depth = 0usize;
        let mut close = None;
        for (j, b) in code.iter().enumerate().skip(open) {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(j);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(close) = close else { break };
        calls.push(RateCall {
            function: *function,
            body: &expr[open + 1..close],
        });
        i = open + 1;
    }
    calls
}

/// Metric name at the start of a call argument; `None` when it is a nested call
fn leading_metric(body: &str) -> Option<&str> {
    let trimmed = body.trim_start();
    let end = trimmed
        .bytes()
        .position(|b| !is_ident_byte(b))
        .unwrap_or(trimmed.len());
    if end == 0 {
        return None;
    }
    let name = &trimmed[..end];
    if trimmed[end..].trim_start().starts_with('(') {
        return None;
    }
    Some(name)
}

/// Range selector of the outermost vector in a call argument (`5m` in `x[5m]`, `1h` in `x[1h:5m]`)
fn range_window(body: &str) -> Option<&str> {
    let code = code_bytes(body);
    let mut depth = 0usize;
    for (i, b) in code.iter().enumerate() {
        match b {
            b'(' | b'{' => depth += 1,
            b')' | b'}' => depth = depth.saturating_sub(1),
            b'[' if depth == 0 => {
                let close = code[i..].iter().position(|c| *c == b']')? + i;
                let inner = &body[i + 1..close];
                return Some(inner.split(':').next().unwrap_or(inner).trim());
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(expr: &str) -> Vec<&'static str> {
        check(expr).into_iter().map(|(id, _)| id).collect()
    }

    #[test]
    fn test_clean_expressions() {
        assert!(ids(r#"sum(rate(http_requests_total{job="api"}[5m])) by (code)"#).is_empty());
        assert!(ids("histogram_quantile(0.99, rate(http_duration_seconds_bucket[5m]))").is_empty());
        assert!(ids("up == 0").is_empty());
    }

    #[test]
    fn test_unbalanced() {
        assert_eq!(ids("sum(rate(x_total[5m])"), vec!["WOB101"]);
        assert_eq!(ids("x_total[5m])"), vec!["WOB101"]);
        // brackets inside label values are not code
        assert!(ids(r#"x_total{path="/a(b"}"#).is_empty());
    }

    #[test]
    fn test_non_counter() {
        assert_eq!(ids("rate(node_memory_free_bytes[5m])"), vec!["WOB100"]);
        assert_eq!(ids("irate(process_cpu_seconds_total[5m])"), Vec::<&str>::new());
    }

    #[test]
    fn test_short_window() {
        assert_eq!(ids("increase(errors_total[30s])"), vec!["WOB102"]);
        assert!(ids("rate(errors_total[1m])").is_empty());
        assert_eq!(ids("rate(errors_total[30s:10s])"), vec!["WOB102"]);
    }

    #[test]
    fn test_function_names_need_word_boundary() {
        // `irate` must not also be reported as `rate`
        let found = check("irate(free_bytes[5m])");
        assert_eq!(found.len(), 1);
        assert!(found[0].1.starts_with("irate()"));
    }
}
