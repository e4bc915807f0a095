use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::cyk::{parse_sentence, Parse, ParseOptions};
use crate::grammar::GrammarModel;
use crate::structs::{OutputFormat, ParseError};

// --- Output Writing ---

/// Writes one line for a parsed sentence.
///
/// Sentences without a parse are written as `null` (JSON) or
/// `(NOPARSE w1 w2 ...)` so that output lines stay aligned with input lines.
/// Empty sentences produce no line.
pub fn write_parse<W: Write>(
    writer: &mut W,
    result: &Result<Parse, ParseError>,
    words: &[String],
    format: OutputFormat,
) -> io::Result<()> {
    match result {
        Ok(parse) => match format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut *writer, &parse.tree)?;
                writeln!(writer)
            }
            OutputFormat::Bracketed => writeln!(writer, "{}", parse.tree),
        },
        Err(ParseError::EmptySentence) => Ok(()),
        Err(e) => {
            warn!("No parse for '{}': {}", words.join(" "), e);
            match format {
                OutputFormat::Json => writeln!(writer, "null"),
                OutputFormat::Bracketed => writeln!(writer, "(NOPARSE {})", words.join(" ")),
            }
        }
    }
}

/// Parses every line of `reader` as a space-separated sentence and writes
/// one result line per non-blank input line. Returns the number of
/// sentences without a parse.
pub fn parse_lines<R: BufRead, W: Write>(
    grammar: &GrammarModel,
    mut reader: R,
    writer: &mut W,
    options: &ParseOptions,
    format: OutputFormat,
) -> io::Result<usize> {
    let mut failures = 0;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        // invalid UTF-8 only spoils the tokens it appears in
        let line = String::from_utf8_lossy(&buf);
        let sentence = line.trim();
        if sentence.is_empty() {
            continue;
        }

        let words: Vec<String> = sentence.split(' ').map(String::from).collect();
        let result = parse_sentence(grammar, &words, options);
        if result.is_err() {
            failures += 1;
        }
        write_parse(writer, &result, &words, format)?;
    }
    writer.flush()?;
    Ok(failures)
}
