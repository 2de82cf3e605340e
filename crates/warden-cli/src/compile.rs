//! # Compile Subcommand
//!
//! Compiles schema paths and prints their segments, one path per line:
//!
//! ```text
//! $ warden compile 'a[].b' 'c[]'
//! a[].b: a "[]." b ""
//! c[]: c "[]"
//! ```
//!
//! The first malformed path aborts the run.

use anyhow::{Context, Result};
use clap::Args;

use warden_core::SchemaPath;

/// Arguments for the compile subcommand.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Paths to compile.
    #[arg(required = true)]
    pub paths: Vec<String>,
}

/// Execute the compile subcommand.
pub fn run_compile(args: &CompileArgs) -> Result<u8> {
    for path in &args.paths {
        println!("{}", describe(path)?);
    }
    Ok(0)
}

fn describe(path: &str) -> Result<String> {
    let compiled =
        SchemaPath::compile(path).with_context(|| format!("cannot compile {path:?}"))?;
    let segments: Vec<String> = compiled
        .segments()
        .iter()
        .map(|s| format!("{} {:?}", s.symbol(), s.kind().as_str()))
        .collect();
    Ok(format!("{}: {}", compiled.as_str(), segments.join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_each_segment() {
        assert_eq!(describe("a[].b").unwrap(), r#"a[].b: a "[]." b """#);
        assert_eq!(describe("c[]").unwrap(), r#"c[]: c "[]""#);
        assert_eq!(describe("x.y").unwrap(), r#"x.y: x "." y """#);
    }

    #[test]
    fn root_path_has_no_segments() {
        assert_eq!(describe("").unwrap(), ": ");
    }

    #[test]
    fn malformed_path_aborts() {
        let args = CompileArgs {
            paths: vec!["ok".to_string(), "bad.".to_string()],
        };
        assert!(run_compile(&args).is_err());
    }
}
