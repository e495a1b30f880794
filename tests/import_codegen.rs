// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

use std::fs;
use std::path::Path;
use std::process::Command;

use wetwire_obs::codegen::{generate_package, generate_source};
use wetwire_obs::discovery::{discover, ResourceKind};
use wetwire_obs::importer::{import_bytes, import_file, ImportFormat};

const PROMETHEUS: &str = "global:
  scrape_interval: 15s
  evaluation_interval: 30s
  external_labels:
    cluster: prod
scrape_configs:
- job_name: node
  static_configs:
  - targets:
    - node-1:9100
    - node-2:9100
    labels:
      env: prod
- job_name: api
  scrape_interval: 10s
  metrics_path: /internal/metrics
  kubernetes_sd_configs:
  - role: pod
  relabel_configs:
  - source_labels:
    - __meta_kubernetes_pod_label_app
    regex: api
    action: keep
rule_files:
- rules/*.yml
remote_write:
- url: https://cortex.example.com/api/v1/push
";

const ALERTMANAGER: &str = "route:
  receiver: default
  group_by:
  - alertname
  routes:
  - receiver: team-pager
    matchers:
    - severity=\"critical\"
receivers:
- name: default
- name: team-pager
  pagerduty_configs:
  - routing_key: abc
";

#[test]
fn test_prometheus_import_round_trips_bytes() {
    let imported = import_bytes(PROMETHEUS.as_bytes(), ImportFormat::Prometheus).unwrap();
    assert!(imported.warnings.is_empty());
    assert_eq!(imported.config.serialize().unwrap(), PROMETHEUS.as_bytes());
}

#[test]
fn test_codegen_is_deterministic() {
    for (text, format) in [
        (PROMETHEUS, ImportFormat::Prometheus),
        (ALERTMANAGER, ImportFormat::Alertmanager),
    ] {
        let imported = import_bytes(text.as_bytes(), format).unwrap();
        let first = generate_source(&imported.config, "ops").unwrap();
        let second = generate_source(&imported.config, "ops").unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_codegen_renders_enum_fields() {
    let prometheus = "scrape_configs:
- job_name: api
  kubernetes_sd_configs:
  - role: endpoints
  relabel_configs:
  - source_labels:
    - __meta_kubernetes_service_name
    regex: api
    action: keep
";
    let imported = import_bytes(prometheus.as_bytes(), ImportFormat::Prometheus).unwrap();
    let src = String::from_utf8(generate_source(&imported.config, "ops").unwrap()).unwrap();
    assert!(src.contains("KubernetesRole::Endpoints"));
    assert!(src.contains("RelabelAction::Keep"));
    syn::parse_file(&src).unwrap();

    let dashboard = r#"{"uid": "svc", "title": "Service", "templating": {"list": [
        {"name": "env", "type": "custom", "query": "prod,staging"}
    ]}}"#;
    let imported = import_bytes(dashboard.as_bytes(), ImportFormat::Grafana).unwrap();
    let src = String::from_utf8(generate_source(&imported.config, "ops").unwrap()).unwrap();
    assert!(src.contains("VariableKind::Custom"));
    syn::parse_file(&src).unwrap();
}

#[test]
fn test_generated_package_is_discoverable() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("alertmanager.yml");
    fs::write(&input, ALERTMANAGER).unwrap();
    let imported = import_file(&input).unwrap();

    let out = dir.path().join("generated");
    let files = generate_package(&imported.config, "ops-alerts", &out, None).unwrap();
    assert_eq!(files.len(), 2);

    let result = discover(&out).unwrap();
    assert!(result.errors.is_empty());
    let config = result.find("CONFIG").unwrap();
    assert_eq!(config.kind, ResourceKind::AlertmanagerConfig);
    assert_eq!(config.package, "ops_alerts");
}

/// Compiles the generated package against this checkout; needs cargo and network access
#[test]
#[ignore]
fn test_generated_prometheus_package_compiles() {
    let dir = tempfile::tempdir().unwrap();
    let imported = import_bytes(PROMETHEUS.as_bytes(), ImportFormat::Prometheus).unwrap();
    let library = Path::new(env!("CARGO_MANIFEST_DIR"));
    generate_package(&imported.config, "generated", dir.path(), Some(library)).unwrap();
    fs::write(dir.path().join("Cargo.toml"), {
        let mut manifest = fs::read_to_string(dir.path().join("Cargo.toml")).unwrap();
        manifest.push_str("\n[workspace]\n");
        manifest
    })
    .unwrap();

    let status = Command::new(env!("CARGO"))
        .args(["build", "--quiet", "--manifest-path"])
        .arg(dir.path().join("Cargo.toml"))
        .status()
        .unwrap();
    assert!(status.success());
}

/// Runs a binary that prints the generated `CONFIG`; needs cargo and network access
#[test]
#[ignore]
fn test_generated_prometheus_package_reproduces_input() {
    let dir = tempfile::tempdir().unwrap();
    let imported = import_bytes(PROMETHEUS.as_bytes(), ImportFormat::Prometheus).unwrap();
    let library = Path::new(env!("CARGO_MANIFEST_DIR"));
    generate_package(&imported.config, "generated", dir.path(), Some(library)).unwrap();
    let mut manifest = fs::read_to_string(dir.path().join("Cargo.toml")).unwrap();
    manifest.push_str("\n[workspace]\n");
    fs::write(dir.path().join("Cargo.toml"), manifest).unwrap();
    fs::write(
        dir.path().join("src/main.rs"),
        "use std::io::Write;\n\
         fn main() {\n\
             let bytes = generated::CONFIG.serialize().unwrap();\n\
             std::io::stdout().write_all(&bytes).unwrap();\n\
         }\n",
    )
    .unwrap();

    let output = Command::new(env!("CARGO"))
        .args(["run", "--quiet", "--manifest-path"])
        .arg(dir.path().join("Cargo.toml"))
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8(output.stdout).unwrap(), PROMETHEUS);
}
