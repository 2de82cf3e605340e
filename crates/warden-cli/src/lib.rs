//! # warden-cli — Command-Line Front End
//!
//! Provides the `warden` binary. Handlers live here so they can be tested
//! without spawning a process; `main.rs` only parses arguments and
//! dispatches.
//!
//! ## Subcommands
//!
//! - `warden map` — list every schema path present in a payload.
//! - `warden query` — run one path query and print its hits and misses.
//! - `warden compile` — compile paths and print their segments.
//! - `warden check` — apply a schema document to a payload.
//!
//! ```bash
//! warden map payload.json
//! warden query 'items[].sku' payload.yaml
//! warden compile 'a[].b' 'c[]'
//! warden check --schema order.yaml payload.json --emit
//! ```
//!
//! Payloads are JSON when the extension is `.json` and YAML otherwise.

pub mod check;
pub mod compile;
pub mod map;
pub mod query;

use std::path::Path;

use anyhow::{Context, Result};

use warden_core::Node;
use warden_schema::DocumentFormat;

/// Read a payload file into a [`Node`] tree.
pub fn load_data(path: &Path) -> Result<Node> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_data(&text, DocumentFormat::from_path(path))
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Parse payload text in the given format.
pub fn parse_data(text: &str, format: DocumentFormat) -> Result<Node> {
    match format {
        DocumentFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(text)?;
            Ok(Node::from_json(value))
        }
        DocumentFormat::Yaml => {
            let value: serde_yaml::Value = serde_yaml::from_str(text)?;
            Ok(Node::from_yaml(&value)?)
        }
    }
}

/// Render a tree in the given format.
pub fn render_data(data: &Node, format: DocumentFormat) -> Result<String> {
    let value = data.to_json();
    match format {
        DocumentFormat::Json => Ok(serde_json::to_string_pretty(&value)?),
        DocumentFormat::Yaml => Ok(serde_yaml::to_string(&value)?),
    }
}
