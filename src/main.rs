use std::io::{self, BufWriter};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pcfg_cky::output::parse_lines;
use pcfg_cky::structs::Cli;
use pcfg_cky::{read_counts, GrammarModel, ParseOptions, RareWordPolicy, RecordMode};

fn run(cli: Cli) -> anyhow::Result<()> {
    let mode = if cli.permissive {
        RecordMode::Permissive
    } else {
        RecordMode::Strict
    };

    let records = read_counts(&cli.counts_file, mode)
        .with_context(|| format!("failed to train from {}", cli.counts_file.display()))?;
    let grammar = GrammarModel::from_records(records);

    let options = ParseOptions {
        start_symbol: cli.start_symbol,
        rare_words: RareWordPolicy::new(cli.rare_threshold, cli.rare_token),
    };

    let stdin = io::stdin();
    let mut writer = BufWriter::new(io::stdout().lock());
    let failures = parse_lines(&grammar, stdin.lock(), &mut writer, &options, cli.format)
        .context("failed to parse sentences from standard input")?;

    info!(failures, "finished parsing");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
