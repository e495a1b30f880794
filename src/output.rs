// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Wire-format rendering and file output shared by every top-level config

use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};

/// A top-level configuration that renders to a file consumed by an external tool
pub trait WireFormat {
    /// Conventional file name for this output (`prometheus.yml`, `<uid>.json`, …)
    fn default_file_name(&self) -> String;

    /// Render the bit-exact wire bytes
    fn to_wire(&self) -> Result<Vec<u8>>;

    /// Render and write atomically, creating intermediate directories
    fn write_wire(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_wire()?)
    }
}

/// Render a value as block-style YAML
pub fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_yaml::to_string(value)?.into_bytes())
}

/// Render a value as two-space indented JSON with a trailing newline
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut out = serde_json::to_vec_pretty(value)?;
    out.push(b'\n');
    Ok(out)
}

/// Write bytes to `path` through a temporary sibling file and a rename
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| Error::io_at(dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io_at(dir, e))?;
    tmp.write_all(bytes).map_err(|e| Error::io_at(path, e))?;
    tmp.flush().map_err(|e| Error::io_at(path, e))?;
    tmp.persist(path).map_err(|e| Error::io_at(path, e.error))?;

    log::info!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Serde helper: skip `false` booleans
pub(crate) fn is_false(b: &bool) -> bool {
    !*b
}

/// Serde helper: skip zero integers
pub(crate) fn is_zero_u32(n: &u32) -> bool {
    *n == 0
}
