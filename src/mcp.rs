// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Model Context Protocol (MCP) Server
//!
//! JSON-RPC 2.0 over stdio, one message per line. Exposes discovery, lint,
//! build, diff and import as tools so agents can author and check
//! configuration without shelling out to the CLI.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::codegen::{self, generate_source};
use crate::config::ProjectConfig;
use crate::differ::{diff_paths, DiffOptions};
use crate::discovery::discover;
use crate::error::{Error, Result};
use crate::importer::import_file;
use crate::lint::lint_all;
use crate::pipeline::build;

pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

pub struct McpServer {
    server_info: ServerInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl McpError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

/// Tool name, description, input schema
struct ToolSpec {
    name: &'static str,
    description: &'static str,
    schema: fn() -> Value,
}

const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "wetwire_list",
        description: "Discover observability resources declared in a Rust source tree",
        schema: || path_schema("Directory to scan"),
    },
    ToolSpec {
        name: "wetwire_lint",
        description: "Lint discovered resources and return issues sorted by file and line",
        schema: || {
            json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Directory to lint" },
                    "disable": { "type": "array", "items": { "type": "string" }, "description": "Rule IDs to skip" }
                },
                "required": ["path"]
            })
        },
    },
    ToolSpec {
        name: "wetwire_build",
        description: "Write prometheus.yml, alertmanager.yml, rules and dashboards for a source tree",
        schema: || {
            json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Directory to build" },
                    "output": { "type": "string", "description": "Output directory" }
                },
                "required": ["path"]
            })
        },
    },
    ToolSpec {
        name: "wetwire_diff",
        description: "Compare two files or two source directories",
        schema: || {
            json!({
                "type": "object",
                "properties": {
                    "left": { "type": "string" },
                    "right": { "type": "string" },
                    "ignore_order": { "type": "boolean" }
                },
                "required": ["left", "right"]
            })
        },
    },
    ToolSpec {
        name: "wetwire_import",
        description: "Convert a Prometheus, Alertmanager, rules or Grafana file into Rust source",
        schema: || {
            json!({
                "type": "object",
                "properties": {
                    "file": { "type": "string" },
                    "package": { "type": "string", "description": "Package name for the generated code" }
                },
                "required": ["file"]
            })
        },
    },
];

fn path_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": { "path": { "type": "string", "description": description } },
        "required": ["path"]
    })
}

fn string_arg<'a>(args: &'a Value, key: &str) -> std::result::Result<&'a str, McpError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| McpError::new(INVALID_PARAMS, format!("missing string argument '{}'", key)))
}

impl McpServer {
    pub fn new() -> Self {
        Self {
            server_info: ServerInfo {
                name: "wetwire-observability".to_string(),
                version: crate::VERSION.to_string(),
            },
        }
    }

    pub fn run_stdio(&mut self) -> Result<()> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Answer requests line by line until `input` is exhausted
    pub fn serve(&mut self, input: impl BufRead, mut output: impl Write) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<McpRequest>(&line) {
                Ok(request) if request.id.is_none() && request.method.starts_with("notifications/") => {
                    log::debug!("notification {}", request.method);
                    continue;
                }
                Ok(request) => self.handle_request(request),
                Err(e) => McpResponse {
                    jsonrpc: "2.0".to_string(),
                    id: None,
                    result: None,
                    error: Some(McpError::new(PARSE_ERROR, format!("Parse error: {}", e))),
                },
            };

            writeln!(output, "{}", serde_json::to_string(&response)?)?;
            output.flush()?;
        }
        Ok(())
    }

    pub fn handle_request(&mut self, request: McpRequest) -> McpResponse {
        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(&request.params),
            "ping" => Ok(json!({})),
            _ => Err(McpError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )),
        };

        match result {
            Ok(value) => McpResponse {
                jsonrpc: "2.0".to_string(),
                id: request.id,
                result: Some(value),
                error: None,
            },
            Err(error) => McpResponse {
                jsonrpc: "2.0".to_string(),
                id: request.id,
                result: None,
                error: Some(error),
            },
        }
    }

    fn handle_initialize(&self) -> std::result::Result<Value, McpError> {
        Ok(json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "serverInfo": self.server_info,
            "capabilities": { "tools": { "listChanged": false } }
        }))
    }

    fn handle_tools_list(&self) -> Value {
        let tools: Vec<Value> = TOOLS
            .iter()
            .map(|t| json!({ "name": t.name, "description": t.description, "inputSchema": (t.schema)() }))
            .collect();
        json!({ "tools": tools })
    }

    fn handle_tools_call(&mut self, params: &Value) -> std::result::Result<Value, McpError> {
        let name = string_arg(params, "name")?;
        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        let text = match name {
            "wetwire_list" => tool_list(&arguments)?,
            "wetwire_lint" => tool_lint(&arguments)?,
            "wetwire_build" => tool_build(&arguments)?,
            "wetwire_diff" => tool_diff(&arguments)?,
            "wetwire_import" => tool_import(&arguments)?,
            other => return Err(McpError::new(INVALID_PARAMS, format!("unknown tool '{}'", other))),
        };

        Ok(match text {
            Ok(text) => json!({ "content": [{ "type": "text", "text": text }] }),
            Err(e) => json!({ "content": [{ "type": "text", "text": format!("Error: {}", e) }], "isError": true }),
        })
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Outer error: bad arguments (JSON-RPC error). Inner error: the tool failed (`isError`).
type ToolOutcome = std::result::Result<Result<String>, McpError>;

fn project(path: &Path) -> Result<ProjectConfig> {
    ProjectConfig::discover(path)
}

fn tool_list(args: &Value) -> ToolOutcome {
    let path = string_arg(args, "path")?;
    Ok(discover(path).and_then(|r| r.to_json()))
}

fn tool_lint(args: &Value) -> ToolOutcome {
    let path = Path::new(string_arg(args, "path")?);
    let disabled: Vec<String> = args
        .get("disable")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();
    Ok(project(path).and_then(|config| {
        let options = config.lint_options().with_disabled(disabled);
        lint_all(path, &options)?.to_json()
    }))
}

fn tool_build(args: &Value) -> ToolOutcome {
    let path = Path::new(string_arg(args, "path")?);
    let output = args.get("output").and_then(Value::as_str).map(PathBuf::from);
    Ok(project(path).and_then(|config| {
        let mut options = config.build_options();
        if let Some(output) = output {
            options = options.with_output(output);
        }
        build(path, &options)?.to_json()
    }))
}

fn tool_diff(args: &Value) -> ToolOutcome {
    let left = string_arg(args, "left")?;
    let right = string_arg(args, "right")?;
    let options = DiffOptions {
        ignore_order: args.get("ignore_order").and_then(Value::as_bool).unwrap_or(true),
    };
    Ok(diff_paths(left, right, &options)
        .map_err(|e| Error::Other(e.to_string()))
        .and_then(|result| result.to_json()))
}

fn tool_import(args: &Value) -> ToolOutcome {
    let file = string_arg(args, "file")?;
    let package = args.get("package").and_then(Value::as_str).unwrap_or("imported");
    Ok(import_file(file).and_then(|imported| {
        let source = generate_source(&imported.config, package).map_err(|e| match e {
            codegen::CodegenError::Source(inner) => inner,
            other => Error::Other(other.to_string()),
        })?;
        let mut text = String::from_utf8_lossy(&source).into_owned();
        for warning in &imported.warnings {
            text.push_str(&format!("// warning: {}\n", warning));
        }
        Ok(text)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn call(server: &mut McpServer, method: &str, params: Value) -> McpResponse {
        server.handle_request(McpRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: method.to_string(),
            params,
        })
    }

    #[test]
    fn test_initialize_and_tools_list() {
        let mut server = McpServer::new();
        let init = call(&mut server, "initialize", json!({}));
        assert_eq!(init.result.unwrap()["protocolVersion"], MCP_PROTOCOL_VERSION);

        let list = call(&mut server, "tools/list", json!({})).result.unwrap();
        let names: Vec<&str> = list["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["wetwire_list", "wetwire_lint", "wetwire_build", "wetwire_diff", "wetwire_import"]
        );
    }

    #[test]
    fn test_unknown_method_and_missing_args() {
        let mut server = McpServer::new();
        let resp = call(&mut server, "resources/read", json!({}));
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);

        let resp = call(&mut server, "tools/call", json!({ "name": "wetwire_list", "arguments": {} }));
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[test]
    fn test_tool_failure_is_in_band() {
        let mut server = McpServer::new();
        let resp = call(
            &mut server,
            "tools/call",
            json!({ "name": "wetwire_list", "arguments": { "path": "/nonexistent/wetwire" } }),
        );
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
    }

    #[test]
    fn test_import_tool_returns_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yml");
        fs::write(&path, "groups:\n- name: api\n  rules:\n  - record: job:up:sum\n    expr: sum(up) by (job)\n").unwrap();

        let mut server = McpServer::new();
        let resp = call(
            &mut server,
            "tools/call",
            json!({ "name": "wetwire_import", "arguments": { "file": path, "package": "ops" } }),
        );
        let text = resp.result.unwrap()["content"][0]["text"].as_str().unwrap().to_string();
        assert!(text.contains("pub static RULES"));
    }

    #[test]
    fn test_serve_skips_notifications() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#,
            "\n",
            "not json\n",
        );
        let mut out = Vec::new();
        McpServer::new().serve(input.as_bytes(), &mut out).unwrap();
        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 7);
        assert_eq!(lines[1]["error"]["code"], PARSE_ERROR);
    }
}
