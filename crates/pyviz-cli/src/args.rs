//! Command-line argument definitions for the pyviz CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input document and its kind, the
//! output path, the configuration file, and logging verbosity.

use clap::{Parser, ValueEnum};

/// What the input document describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InputKind {
    /// A JSON syntax tree
    #[default]
    ParseTree,
    /// A JSON object snapshot keyed by record name
    ObjectTree,
    /// A JSON token list
    Tokens,
}

/// Command-line arguments for the pyviz diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input JSON document
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Kind of the input document
    #[arg(short, long, value_enum, default_value_t = InputKind::ParseTree)]
    pub kind: InputKind,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["pyviz", "tree.json"]);
        assert_eq!(args.input, "tree.json");
        assert_eq!(args.kind, InputKind::ParseTree);
        assert_eq!(args.output, "out.svg");
        assert!(args.config.is_none());
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_kind_is_kebab_case() {
        let args = Args::parse_from(["pyviz", "lunch.json", "-k", "object-tree", "-o", "lunch.svg"]);
        assert_eq!(args.kind, InputKind::ObjectTree);
        assert_eq!(args.output, "lunch.svg");

        let args = Args::parse_from(["pyviz", "tokens.json", "--kind", "tokens"]);
        assert_eq!(args.kind, InputKind::Tokens);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(Args::try_parse_from(["pyviz", "x.json", "-k", "bytecode"]).is_err());
    }
}
