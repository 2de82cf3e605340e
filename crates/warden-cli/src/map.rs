//! # Map Subcommand
//!
//! Prints every schema path present in a payload, one per line, sorted.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use warden_query::map_paths;

use crate::load_data;

/// Arguments for the map subcommand.
#[derive(Args, Debug)]
pub struct MapArgs {
    /// Payload file (JSON or YAML).
    pub file: PathBuf,
}

/// Execute the map subcommand.
pub fn run_map(args: &MapArgs) -> Result<u8> {
    for path in map_lines(args)? {
        println!("{path}");
    }
    Ok(0)
}

fn map_lines(args: &MapArgs) -> Result<Vec<String>> {
    let data = load_data(&args.file)?;
    let paths = map_paths(&data);
    tracing::info!(file = %args.file.display(), paths = paths.len(), "mapped payload");
    Ok(paths.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_lists_sorted_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("song.json");
        std::fs::write(
            &file,
            r#"{"title": "x", "measures": [{"notes": [1, 2], "intensity": 3}]}"#,
        )
        .unwrap();

        let lines = map_lines(&MapArgs { file }).unwrap();
        assert_eq!(
            lines,
            vec!["measures[].intensity", "measures[].notes[]", "title"]
        );
    }

    #[test]
    fn map_missing_file_is_an_error() {
        let args = MapArgs {
            file: PathBuf::from("/definitely/not/here.json"),
        };
        assert!(run_map(&args).is_err());
    }
}
