use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use thiserror::Error;

// --- Errors ---

#[derive(Debug, Error)]
pub enum CountsError {
    #[error("cannot open counts file {path:?}: {source}")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed count record on line {line_num}: '{line}' ({reason})")]
    MalformedCountRecord {
        line_num: usize,
        line: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrammarError {
    #[error("nonterminal '{0}' has rule occurrences but a zero left-hand-side count")]
    UndefinedProbability(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("sentence has no tokens")]
    EmptySentence,
    #[error("no nonterminal spans the whole sentence")]
    NoParseFound,
    #[error("chart has no backpointer for '{label}' over [{start}, {end}]")]
    MissingBackpointer {
        label: String,
        start: usize,
        end: usize,
    },
}

// --- Command Line ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Nested arrays: `["S", ["NP", "dog"], ["VP", "barks"]]`
    #[default]
    Json,
    /// Penn-style brackets: `(S (NP dog) (VP barks))`
    Bracketed,
}

#[derive(Parser, Debug)]
#[command(
    name = "pcfg-cky",
    about = "Reads rule counts to train a PCFG, then parses sentences from stdin with the CKY algorithm",
    version
)]
pub struct Cli {
    /// Counts file with NONTERMINAL, BINARYRULE and UNARYRULE records
    #[arg()]
    pub counts_file: PathBuf,

    /// Preferred root symbol for full-sentence parses
    #[arg(long, default_value = "S")]
    pub start_symbol: String,

    /// Words seen fewer times than this are replaced by the rare-word token
    #[arg(long, default_value_t = 5)]
    pub rare_threshold: u64,

    /// Placeholder token used for rare words
    #[arg(long, default_value = "_RARE_")]
    pub rare_token: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Read unknown record types with two fields as UNARYRULE instead of failing
    #[arg(long)]
    pub permissive: bool,
}
