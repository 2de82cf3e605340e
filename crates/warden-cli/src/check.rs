//! # Check Subcommand
//!
//! Applies a schema document to a payload: required paths, the unknown-field
//! check for strict documents, type coercion and checking, validation, then
//! sanitizing. Stops at the first failure and exits with status 1.
//!
//! With `--emit` the coerced and sanitized payload is printed in the
//! payload's own format instead of the `OK` line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use warden_core::SchemaError;
use warden_rules::RuleRegistry;
use warden_schema::{DocumentFormat, SchemaDocument, SchemaWarden};

use crate::{load_data, render_data};

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema document (JSON or YAML).
    #[arg(long, short)]
    pub schema: PathBuf,

    /// Payload file (JSON or YAML).
    pub file: PathBuf,

    /// Print the normalized payload on success.
    #[arg(long)]
    pub emit: bool,
}

/// Outcome of a check that ran to completion.
#[derive(Debug)]
pub enum CheckOutcome {
    /// The payload passed; carries the rendered payload when `--emit` was set.
    Passed(Option<String>),
    /// The payload was rejected.
    Rejected(SchemaError),
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    match check(args)? {
        CheckOutcome::Passed(Some(rendered)) => {
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
            Ok(0)
        }
        CheckOutcome::Passed(None) => {
            println!("OK {}", args.file.display());
            Ok(0)
        }
        CheckOutcome::Rejected(err) => {
            println!("FAIL {}: {err}", args.file.display());
            Ok(1)
        }
    }
}

/// Load both files and run the document against the payload.
pub fn check(args: &CheckArgs) -> Result<CheckOutcome> {
    let document = SchemaDocument::load(&args.schema)
        .with_context(|| format!("invalid schema document {}", args.schema.display()))?;
    let mut data = load_data(&args.file)?;
    let registry = RuleRegistry::standard();

    tracing::info!(
        schema = %args.schema.display(),
        file = %args.file.display(),
        name = %document.name,
        "checking payload"
    );

    let result = SchemaWarden::with_registry(&mut data, &document.name, &registry).run(&document);
    match result {
        Ok(()) if args.emit => {
            let rendered = render_data(&data, DocumentFormat::from_path(&args.file))?;
            Ok(CheckOutcome::Passed(Some(rendered)))
        }
        Ok(()) => Ok(CheckOutcome::Passed(None)),
        Err(err) => {
            tracing::warn!(error = %err, "payload rejected");
            Ok(CheckOutcome::Rejected(err))
        }
    }
}
