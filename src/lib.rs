// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! # Wetwire Observability
//!
//! Prometheus, Alertmanager, recording/alerting rules and Grafana dashboards
//! declared as typed Rust values, then discovered, linted, diffed and
//! serialized to the files each tool reads.
//!
//! ## Features
//!
//! - **Config model**: builders for every supported tree with byte-stable
//!   YAML/JSON output ([`prometheus`], [`alertmanager`], [`rules`], [`grafana`])
//! - **Discovery**: find exported `static`/`const` bindings of those types in a
//!   source tree without compiling it ([`discovery`])
//! - **Linting**: source and model rules (`WOB…` IDs) ([`lint`])
//! - **Diffing**: semantic comparison of wire files or whole trees ([`differ`])
//! - **Import and codegen**: existing configs back to Rust source
//!   ([`importer`], [`codegen`])
//! - **Build**: load values through a helper crate and write outputs
//!   ([`loader`], [`pipeline`])
//!
//! ## Quick Start
//!
//! ```no_run
//! use wetwire_obs::prometheus::{PrometheusConfig, ScrapeConfig, StaticConfig};
//! use wetwire_obs::output::WireFormat;
//! use wetwire_obs::Duration;
//!
//! let config = PrometheusConfig::new().add_scrape_config(
//!     ScrapeConfig::new("node")
//!         .with_scrape_interval(Duration::seconds(15))
//!         .add_static_config(StaticConfig::new(["localhost:9100"])),
//! );
//! config.write_wire("build/prometheus.yml".as_ref())?;
//! # Ok::<(), wetwire_obs::Error>(())
//! ```

pub mod alertmanager;
pub mod codegen;
pub mod config;
pub mod differ;
pub mod discovery;
pub mod duration;
pub mod error;
pub mod grafana;
pub mod importer;
pub mod lint;
pub mod loader;
pub mod mcp;
pub mod output;
pub mod pipeline;
pub mod prometheus;
pub mod rules;
pub mod validate;
pub mod watch;

pub use duration::Duration;
pub use error::{Error, Result};

/// Library version, also written into generated `Cargo.toml` files
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
