// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Syntactic scan of one Rust source file
//!
//! Module-level `static` and `const` items are matched against the
//! recognized type names, first through their declared type and then through
//! the value they are initialised with.

use std::path::Path;
use syn::visit::Visit;
use syn::{Expr, File, Item, Type, Visibility};

use super::ResourceKind;
use crate::error::{Error, Result};

/// A module-level binding whose type is recognized
#[derive(Debug, Clone)]
pub struct Binding<'a> {
    pub name: String,
    /// 1-based line of the identifier
    pub line: usize,
    pub kind: ResourceKind,
    pub exported: bool,
    pub ty: &'a Type,
    pub init: &'a Expr,
}

/// Read and parse `path`; syntax errors carry the line they were found on
pub fn parse_source(path: &Path) -> Result<File> {
    let source = std::fs::read_to_string(path).map_err(|e| Error::io_at(path, e))?;
    syn::parse_file(&source).map_err(|e| {
        let line = e.span().start().line;
        Error::parse(path, (line > 0).then_some(line), e.to_string())
    })
}

/// Every recognized binding in source order, exported or not
pub fn scan_file(file: &File) -> Vec<Binding<'_>> {
    file.items.iter().filter_map(scan_item).collect()
}

/// The recognized binding called `name`
pub fn find_binding<'a>(file: &'a File, name: &str) -> Option<Binding<'a>> {
    scan_file(file).into_iter().find(|b| b.name == name)
}

fn scan_item(item: &Item) -> Option<Binding<'_>> {
    let (ident, vis, ty, init) = match item {
        Item::Static(s) => (&s.ident, &s.vis, &*s.ty, &*s.expr),
        Item::Const(c) => (&c.ident, &c.vis, &*c.ty, &*c.expr),
        _ => return None,
    };
    let kind = declared_kind(ty).or_else(|| constructed_kind(init))?;
    let name = ident.to_string();

    Some(Binding {
        exported: is_exported(vis, &name),
        line: ident.span().start().line,
        name,
        kind,
        ty,
        init,
    })
}

/// `pub` with an upper-case ASCII first letter
pub fn is_exported(vis: &Visibility, name: &str) -> bool {
    matches!(vis, Visibility::Public(_))
        && name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

struct FirstRecognized(Option<ResourceKind>);

impl<'ast> Visit<'ast> for FirstRecognized {
    fn visit_path_segment(&mut self, segment: &'ast syn::PathSegment) {
        if self.0.is_none() {
            self.0 = ResourceKind::from_ident(&segment.ident.to_string());
        }
        syn::visit::visit_path_segment(self, segment);
    }
}

/// First recognized name anywhere in the type (`LazyLock<T>`, `&'static pkg::T`)
pub fn declared_kind(ty: &Type) -> Option<ResourceKind> {
    let mut finder = FirstRecognized(None);
    finder.visit_type(ty);
    finder.0
}

/// Type produced by a struct literal, constructor call or builder chain
pub fn constructed_kind(expr: &Expr) -> Option<ResourceKind> {
    match expr {
        Expr::Struct(s) => s
            .path
            .segments
            .last()
            .and_then(|seg| ResourceKind::from_ident(&seg.ident.to_string())),
        Expr::Reference(r) => constructed_kind(&r.expr),
        Expr::Paren(p) => constructed_kind(&p.expr),
        Expr::Group(g) => constructed_kind(&g.expr),
        Expr::MethodCall(m) => constructed_kind(&m.receiver),
        Expr::Closure(c) => constructed_kind(&c.body),
        Expr::Block(b) => tail_expr(&b.block).and_then(constructed_kind),
        Expr::Call(call) => {
            if let Expr::Path(p) = &*call.func {
                let segments = &p.path.segments;
                if segments.len() >= 2 {
                    let owner = &segments[segments.len() - 2].ident;
                    if let Some(kind) = ResourceKind::from_ident(&owner.to_string()) {
                        return Some(kind);
                    }
                }
            }
            // LazyLock::new(|| …), Box::new(…)
            call.args.iter().find_map(constructed_kind)
        }
        _ => None,
    }
}

pub(crate) fn tail_expr(block: &syn::Block) -> Option<&Expr> {
    match block.stmts.last()? {
        syn::Stmt::Expr(expr, None) => Some(expr),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(String, ResourceKind, bool)> {
        let file = syn::parse_file(src).unwrap();
        scan_file(&file)
            .into_iter()
            .map(|b| (b.name, b.kind, b.exported))
            .collect()
    }

    #[test]
    fn test_declared_type_forms() {
        let found = kinds(
            r#"
            pub static A: LazyLock<PrometheusConfig> = LazyLock::new(build);
            pub static B: &'static obs::rules::RulesFile = &RULES;
            pub const C: Dashboard = make();
            "#,
        );
        assert_eq!(
            found,
            vec![
                ("A".to_string(), ResourceKind::PrometheusConfig, true),
                ("B".to_string(), ResourceKind::RulesFile, true),
                ("C".to_string(), ResourceKind::Dashboard, true),
            ]
        );
    }

    #[test]
    fn test_inferred_from_initialiser() {
        let found = kinds(
            r#"
            pub static NODE: LazyLock<Job> = LazyLock::new(|| ScrapeConfig::new("node").with_metrics_path("/m"));
            pub static LIT: Wrapper = Wrapper(&AlertingRule { alert: String::new() });
            pub static BLOCK: Holder = Holder::new({ let g = RuleGroup::new("x"); g });
            "#,
        );
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].1, ResourceKind::ScrapeConfig);
        assert_eq!(found[1].1, ResourceKind::AlertingRule);
    }

    #[test]
    fn test_visibility_and_case() {
        let found = kinds(
            r#"
            pub static MY_CONFIG: PrometheusConfig = PrometheusConfig::new();
            pub static my_config: PrometheusConfig = PrometheusConfig::new();
            static HIDDEN: PrometheusConfig = PrometheusConfig::new();
            pub(crate) static CRATE_ONLY: PrometheusConfig = PrometheusConfig::new();
            "#,
        );
        let exported: Vec<_> = found.iter().filter(|f| f.2).map(|f| f.0.as_str()).collect();
        assert_eq!(exported, vec!["MY_CONFIG"]);
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn test_unrecognized_items_skipped() {
        assert!(kinds("pub static PORT: u16 = 9090; pub fn f() {}").is_empty());
    }

    #[test]
    fn test_line_numbers() {
        let file = syn::parse_file("\n\npub static D: Dashboard = Dashboard::new(\"a\", \"b\");\n").unwrap();
        assert_eq!(scan_file(&file)[0].line, 3);
    }
}
