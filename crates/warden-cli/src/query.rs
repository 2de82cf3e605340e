//! # Query Subcommand
//!
//! Runs one path query against a payload and prints the matched values
//! together with the inspection report as JSON.
//!
//! ```bash
//! $ warden query 'evilThings.magic[].risk' things.yaml
//! {
//!   "path": "evilThings.magic[].risk",
//!   "values": ["high", null],
//!   "inspection": {
//!     "evilThings.magic[0].risk": "hit",
//!     "evilThings.magic[1].risk": "undefined"
//!   }
//! }
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};

use warden_query::Query;

use crate::load_data;

/// Arguments for the query subcommand.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Schema path to run, e.g. `items[].sku`.
    pub path: String,

    /// Payload file (JSON or YAML).
    pub file: PathBuf,

    /// Exit with status 1 when nothing matched.
    #[arg(long)]
    pub require_hit: bool,
}

/// Execute the query subcommand.
pub fn run_query(args: &QueryArgs) -> Result<u8> {
    let (report, hit) = query_report(args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if args.require_hit && !hit {
        return Ok(1);
    }
    Ok(0)
}

fn query_report(args: &QueryArgs) -> Result<(Value, bool)> {
    let data = load_data(&args.file)?;
    let query = Query::exec(&args.path, &data, "")
        .with_context(|| format!("query {:?} failed", args.path))?;

    let values: Vec<Value> = query.values(&data).into_iter().map(|v| v.to_json()).collect();
    let report = json!({
        "path": query.path().as_str(),
        "values": values,
        "inspection": serde_json::to_value(query.inspection())?,
    });
    Ok((report, query.has_hit()))
}
