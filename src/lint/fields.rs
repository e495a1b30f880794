// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Field maps read from builder expressions
//!
//! An initialiser such as
//!
//! ```text
//! ScrapeConfig::new("node").with_scrape_interval(Duration::seconds(15)).add_static_config(..)
//! ```
//!
//! becomes a [`FieldMap`] of type `ScrapeConfig` with entries `job_name`,
//! `scrape_interval` and `static_configs`. Constructor arguments map to the
//! required fields, `with_x(v)` sets `x` and `add_x(v)` appends to the plural
//! of `x`. Struct literals map field for field. Paths naming another static
//! or const in the same file are followed.

use std::collections::HashMap;
use syn::spanned::Spanned;
use syn::{Expr, File, Item, Lit};

use crate::discovery::tail_expr;
use crate::duration::Duration;

const MAX_DEPTH: usize = 16;

/// A value recovered from syntax
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Str(String),
    Num(f64),
    Bool(bool),
    List(Vec<Node>),
    Object(Box<FieldMap>),
    /// Anything that cannot be read without running the code
    Unknown,
}

impl Node {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Node::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&FieldMap> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    /// `Duration::seconds(15)`, `Duration::parse("15s")?`, `"15s".parse()`
    pub fn as_duration(&self) -> Option<Duration> {
        let map = self.as_object()?;
        if map.type_name != "Duration" {
            return None;
        }
        let arg = map.constructor_args.first()?;
        let value = || arg.as_num().filter(|n| *n >= 0.0).map(|n| n as u64);
        match map.constructor.as_str() {
            "parse" | "from_str" => arg.as_str().and_then(|s| Duration::parse(s).ok()),
            "millis" => value().map(Duration::millis),
            "seconds" => value().map(Duration::seconds),
            "minutes" => value().map(Duration::minutes),
            "hours" => value().map(Duration::hours),
            "days" => value().map(Duration::days),
            _ => None,
        }
    }

    /// Items of a list, or the node itself
    pub fn items(&self) -> Vec<&Node> {
        match self {
            Node::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }
}

/// One `with_x`/`add_x`/literal field assignment
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub args: Vec<Node>,
    pub append: bool,
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    /// Last segment of the constructed type; empty when the chain root is unknown
    pub type_name: String,
    /// `new`, `default`, `timeseries`, … or empty for struct literals
    pub constructor: String,
    pub constructor_args: Vec<Node>,
    pub line: usize,
    /// Built on top of something unreadable (`..base`, `make().with_x(..)`)
    pub opaque: bool,
    pub fields: Vec<Field>,
}

impl FieldMap {
    /// Nothing was set beyond the bare constructor
    pub fn is_bare(&self) -> bool {
        !self.opaque && self.fields.is_empty() && self.constructor_args.is_empty()
    }

    /// Last value assigned to `name` (single-argument setters)
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.fields
            .iter()
            .rev()
            .find(|f| f.name == name && !f.append)
            .and_then(|f| f.args.first())
    }

    /// Whether anything was assigned to `name`
    pub fn has(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Elements of list field `name`: the last `with_` list plus later `add_` calls
    pub fn list(&self, name: &str) -> Vec<&Node> {
        let start = self
            .fields
            .iter()
            .rposition(|f| f.name == name && !f.append)
            .unwrap_or(0);
        let mut out = Vec::new();
        for field in self.fields[start..].iter().filter(|f| f.name == name) {
            match (field.append, field.args.first()) {
                (true, Some(arg)) if field.args.len() == 1 => out.push(arg),
                (true, _) => {}
                (false, Some(arg)) => out.extend(arg.items()),
                (false, None) => {}
            }
        }
        out
    }

    /// Keys of a map field: `with_x(BTreeMap::from([(k, v), …]))` then `add_x(k, v)`
    pub fn keys(&self, plural: &str) -> Vec<String> {
        let mut keys = Vec::new();
        let start = self
            .fields
            .iter()
            .rposition(|f| f.name == plural && !f.append)
            .unwrap_or(0);
        for field in self.fields[start..].iter().filter(|f| f.name == plural) {
            if field.append {
                if let Some(k) = field.args.first().and_then(Node::as_str) {
                    keys.push(k.to_string());
                }
            } else if let Some(arg) = field.args.first() {
                for pair in arg.items() {
                    if let Some(k) = pair.items().first().and_then(|n| n.as_str()) {
                        keys.push(k.to_string());
                    }
                }
            }
        }
        keys
    }

    /// Whether a zero-argument marker method (`critical()`) was called
    pub fn called(&self, method: &str) -> bool {
        self.fields.iter().any(|f| f.name == method && f.args.is_empty())
    }

    /// Whether `list` holds only values that could be read
    pub fn list_is_known(&self, name: &str) -> bool {
        self.list(name).iter().all(|n| !matches!(n, Node::Unknown))
    }

    /// Every nested object, depth first
    pub fn children(&self) -> Vec<&FieldMap> {
        fn collect<'a>(node: &'a Node, out: &mut Vec<&'a FieldMap>) {
            match node {
                Node::Object(map) => out.push(map),
                Node::List(items) => items.iter().for_each(|n| collect(n, out)),
                _ => {}
            }
        }
        // mapped constructor arguments already appear as fields
        let mapped = constructor_fields(&self.type_name, &self.constructor).len();
        let mut out = Vec::new();
        for node in self
            .constructor_args
            .iter()
            .skip(mapped)
            .chain(self.fields.iter().flat_map(|f| f.args.iter()))
        {
            collect(node, &mut out);
        }
        out
    }
}

/// Field names filled by constructor arguments
fn constructor_fields(type_name: &str, constructor: &str) -> &'static [&'static str] {
    match (type_name, constructor) {
        ("Dashboard", "new") => &["uid", "title"],
        ("ScrapeConfig", "new") => &["job_name"],
        ("AlertingRule", "new") => &["alert", "expr"],
        ("RecordingRule", "new") => &["record", "expr"],
        ("RuleGroup", "new") | ("Receiver", "new") | ("MuteTimeInterval", "new") => &["name"],
        ("Route", "new") => &["receiver"],
        ("StaticConfig", "new") => &["targets"],
        ("RemoteWrite", "new") | ("RemoteRead", "new") | ("WebhookConfig", "new") => &["url"],
        ("PagerdutyConfig", "new") => &["routing_key"],
        ("SlackConfig", "new") => &["channel"],
        ("EmailConfig", "new") => &["to"],
        ("BasicAuth", "new") => &["username"],
        ("Row", "new") => &["title"],
        ("PrometheusTarget", "new") | ("LokiTarget", "new") => &["expr"],
        ("Panel", "new") => &["title", "options"],
        ("Panel", "of_kind") => &["kind", "title"],
        ("Panel", _) => &["title"],
        ("GridPos", "new") => &["x", "y", "w", "h"],
        _ => &[],
    }
}

/// `add_scrape_config` → `scrape_configs`, `add_remote_write` → `remote_write`
pub fn plural(singular: &str) -> String {
    if singular.ends_with('s') || singular.ends_with("_write") || singular.ends_with("_read") {
        singular.to_string()
    } else {
        format!("{}s", singular)
    }
}

/// Reads field maps out of one parsed file
pub struct Reader<'a> {
    items: HashMap<String, &'a Expr>,
}

impl<'a> Reader<'a> {
    pub fn new(file: &'a File) -> Self {
        let items = file
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Static(s) => Some((s.ident.to_string(), &*s.expr)),
                Item::Const(c) => Some((c.ident.to_string(), &*c.expr)),
                _ => None,
            })
            .collect();
        Self { items }
    }

    /// Field map of the value `expr` constructs; opaque when the root is unreadable
    pub fn field_map(&self, expr: &Expr) -> FieldMap {
        match self.node(expr, 0) {
            Node::Object(map) => *map,
            _ => FieldMap {
                line: expr.span().start().line,
                opaque: true,
                ..FieldMap::default()
            },
        }
    }

    fn node(&self, expr: &Expr, depth: usize) -> Node {
        if depth > MAX_DEPTH {
            return Node::Unknown;
        }
        let next = depth + 1;
        match expr {
            Expr::Lit(lit) => literal(&lit.lit),
            Expr::Unary(u) => match (&u.op, self.node(&u.expr, next)) {
                (syn::UnOp::Neg(_), Node::Num(n)) => Node::Num(-n),
                (syn::UnOp::Deref(_), node) => node,
                _ => Node::Unknown,
            },
            Expr::Reference(r) => self.node(&r.expr, next),
            Expr::Paren(p) => self.node(&p.expr, next),
            Expr::Group(g) => self.node(&g.expr, next),
            Expr::Try(t) => self.node(&t.expr, next),
            Expr::Closure(c) => self.node(&c.body, next),
            Expr::Block(b) => tail_expr(&b.block)
                .map(|e| self.node(e, next))
                .unwrap_or(Node::Unknown),
            Expr::Array(a) => Node::List(a.elems.iter().map(|e| self.node(e, next)).collect()),
            Expr::Tuple(t) => Node::List(t.elems.iter().map(|e| self.node(e, next)).collect()),
            Expr::Macro(m) if m.mac.path.is_ident("vec") => m
                .mac
                .parse_body_with(syn::punctuated::Punctuated::<Expr, syn::Token![,]>::parse_terminated)
                .map(|elems| Node::List(elems.iter().map(|e| self.node(e, next)).collect()))
                .unwrap_or(Node::Unknown),
            Expr::Path(p) if p.path.segments.len() == 1 => {
                let name = p.path.segments[0].ident.to_string();
                self.items
                    .get(&name)
                    .map(|e| self.node(e, next))
                    .unwrap_or(Node::Unknown)
            }
            Expr::Struct(s) => self.struct_literal(s, next),
            Expr::Call(call) => self.call(call, next),
            Expr::MethodCall(m) => self.method_call(m, next),
            _ => Node::Unknown,
        }
    }

    fn struct_literal(&self, s: &syn::ExprStruct, depth: usize) -> Node {
        let type_name = s
            .path
            .segments
            .last()
            .map(|seg| seg.ident.to_string())
            .unwrap_or_default();
        let fields = s
            .fields
            .iter()
            .filter_map(|fv| match &fv.member {
                syn::Member::Named(ident) => Some(Field {
                    name: ident.to_string().trim_start_matches("r#").to_string(),
                    args: vec![self.node(&fv.expr, depth)],
                    append: false,
                    line: ident.span().start().line,
                }),
                syn::Member::Unnamed(_) => None,
            })
            .collect();
        let opaque = s.rest.as_deref().is_some_and(|rest| !is_default_call(rest));
        Node::Object(Box::new(FieldMap {
            type_name,
            constructor: String::new(),
            constructor_args: Vec::new(),
            line: s.path.span().start().line,
            opaque,
            fields,
        }))
    }

    fn call(&self, call: &syn::ExprCall, depth: usize) -> Node {
        let Expr::Path(p) = &*call.func else {
            return Node::Unknown;
        };
        let segments: Vec<String> = p.path.segments.iter().map(|s| s.ident.to_string()).collect();
        let args: Vec<Node> = call.args.iter().map(|a| self.node(a, depth)).collect();

        match segments.as_slice() {
            [.., owner, f] if owner == "LazyLock" || owner == "Box" || owner == "Arc" || f == "from" => {
                // wrappers, `String::from("x")` and `BTreeMap::from([...])`
                args.into_iter().next().unwrap_or(Node::Unknown)
            }
            [.., owner, _] if owner.starts_with(|c: char| c.is_ascii_lowercase()) => Node::Unknown,
            [.., owner, constructor] => {
                let type_name = owner.clone();
                let names = constructor_fields(&type_name, constructor);
                let fields = names
                    .iter()
                    .zip(args.iter())
                    .map(|(name, arg)| Field {
                        name: name.to_string(),
                        args: vec![arg.clone()],
                        append: false,
                        line: call.span().start().line,
                    })
                    .collect();
                Node::Object(Box::new(FieldMap {
                    type_name,
                    constructor: constructor.clone(),
                    constructor_args: args,
                    line: call.span().start().line,
                    opaque: false,
                    fields,
                }))
            }
            [single] if single == "Some" => args.into_iter().next().unwrap_or(Node::Unknown),
            _ => Node::Unknown,
        }
    }

    fn method_call(&self, m: &syn::ExprMethodCall, depth: usize) -> Node {
        let receiver = self.node(&m.receiver, depth);
        let method = m.method.to_string();
        let args: Vec<Node> = m.args.iter().map(|a| self.node(a, depth)).collect();

        match method.as_str() {
            "clone" | "into" | "to_owned" | "to_string" | "unwrap" | "expect" | "build" => {
                return receiver
            }
            "parse" => {
                // "15s".parse::<Duration>()
                if let Node::Str(s) = receiver {
                    return Node::Object(Box::new(FieldMap {
                        type_name: "Duration".to_string(),
                        constructor: "parse".to_string(),
                        constructor_args: vec![Node::Str(s)],
                        line: m.span().start().line,
                        ..FieldMap::default()
                    }));
                }
                return Node::Unknown;
            }
            _ => {}
        }

        let mut map = match receiver {
            Node::Object(map) => *map,
            _ => FieldMap {
                line: m.span().start().line,
                opaque: true,
                ..FieldMap::default()
            },
        };
        let line = m.method.span().start().line;
        let (name, append) = if let Some(rest) = method.strip_prefix("with_") {
            (rest.to_string(), false)
        } else if let Some(rest) = method.strip_prefix("add_") {
            (plural(rest), true)
        } else {
            (method.clone(), false)
        };
        map.fields.push(Field {
            name,
            args,
            append,
            line,
        });
        Node::Object(Box::new(map))
    }
}

fn literal(lit: &Lit) -> Node {
    match lit {
        Lit::Str(s) => Node::Str(s.value()),
        Lit::Int(i) => i.base10_parse::<f64>().map(Node::Num).unwrap_or(Node::Unknown),
        Lit::Float(f) => f.base10_parse::<f64>().map(Node::Num).unwrap_or(Node::Unknown),
        Lit::Bool(b) => Node::Bool(b.value),
        _ => Node::Unknown,
    }
}

/// `Default::default()` or `T::default()`
fn is_default_call(expr: &Expr) -> bool {
    match expr {
        Expr::Call(call) => match &*call.func {
            Expr::Path(p) => p.path.segments.last().is_some_and(|s| s.ident == "default"),
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(src: &str, name: &str) -> FieldMap {
        let file = syn::parse_file(src).unwrap();
        let reader = Reader::new(&file);
        let expr = file
            .items
            .iter()
            .find_map(|item| match item {
                Item::Static(s) if s.ident == name => Some(&*s.expr),
                _ => None,
            })
            .unwrap();
        reader.field_map(expr)
    }

    #[test]
    fn test_builder_chain() {
        let map = read(
            r#"pub static NODE: LazyLock<ScrapeConfig> = LazyLock::new(|| {
                ScrapeConfig::new("node")
                    .with_scrape_interval(Duration::seconds(15))
                    .add_static_config(StaticConfig::new(["localhost:9100"]))
            });"#,
            "NODE",
        );
        assert_eq!(map.type_name, "ScrapeConfig");
        assert_eq!(map.get("job_name"), Some(&Node::Str("node".into())));
        assert_eq!(
            map.get("scrape_interval").and_then(Node::as_duration),
            Some(Duration::seconds(15))
        );
        assert_eq!(map.list("static_configs").len(), 1);
        assert!(!map.is_bare());
    }

    #[test]
    fn test_struct_literal_and_rest() {
        let map = read(
            r#"pub static A: AlertingRule = AlertingRule { alert: String::new(), expr: "up == 0".to_string(), ..Default::default() };
               pub static B: AlertingRule = AlertingRule { alert: "x".into(), ..BASE };"#,
            "A",
        );
        assert!(!map.opaque);
        assert_eq!(map.get("expr").and_then(Node::as_str), Some("up == 0"));

        let src = r#"pub static B: AlertingRule = AlertingRule { alert: "x".into(), ..BASE };"#;
        assert!(read(src, "B").opaque);
    }

    #[test]
    fn test_follows_same_file_statics() {
        let map = read(
            r#"static DEFAULT: LazyLock<Receiver> = LazyLock::new(|| Receiver::new("default"));
               pub static AM: LazyLock<AlertmanagerConfig> = LazyLock::new(|| {
                   AlertmanagerConfig::new()
                       .with_route(Route::new("ghost"))
                       .add_receiver(DEFAULT.clone())
               });"#,
            "AM",
        );
        let receivers = map.list("receivers");
        assert_eq!(receivers.len(), 1);
        let receiver = receivers[0].as_object().unwrap();
        assert_eq!(receiver.get("name").and_then(Node::as_str), Some("default"));
        let route = map.get("route").and_then(Node::as_object).unwrap();
        assert_eq!(route.get("receiver").and_then(Node::as_str), Some("ghost"));
    }

    #[test]
    fn test_map_keys_and_markers() {
        let map = read(
            r#"pub static R: AlertingRule = AlertingRule::new("Down", "up == 0")
                .with_labels(BTreeMap::from([("team".to_string(), "infra".to_string())]))
                .add_label("severity", "page")
                .critical();"#,
            "R",
        );
        assert_eq!(map.keys("labels"), vec!["team", "severity"]);
        assert!(map.called("critical"));
    }

    #[test]
    fn test_bare_and_opaque() {
        assert!(read("pub static P: PrometheusConfig = PrometheusConfig::new();", "P").is_bare());
        let map = read("pub static P: PrometheusConfig = make().with_global(g());", "P");
        assert!(map.opaque);
        assert!(!map.is_bare());
    }

    #[test]
    fn test_vec_macro() {
        let map = read(
            r#"pub static D: Dashboard = Dashboard::new("u", "t").with_tags(vec!["a", "b"]);"#,
            "D",
        );
        assert_eq!(map.list("tags").len(), 2);
    }
}
