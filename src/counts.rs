use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nom::{
    bytes::complete::take_while1,
    character::complete::{digit1, space1},
    combinator::{all_consuming, map_res},
    multi::many0,
    sequence::{preceded, tuple},
    IResult,
};
use tracing::{debug, warn};

use crate::structs::CountsError;

// --- Count Records ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountRecord {
    NonTerminal {
        symbol: String,
        count: u64,
    },
    BinaryRule {
        parent: String,
        left: String,
        right: String,
        count: u64,
    },
    UnaryRule {
        parent: String,
        word: String,
        count: u64,
    },
}

/// How record types other than the three known literals are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordMode {
    /// Unknown record types are a hard error.
    #[default]
    Strict,
    /// Unknown record types with two fields are read as unary rules.
    Permissive,
}

// --- Line Parsing ---

fn field(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

fn count(input: &str) -> IResult<&str, u64> {
    map_res(digit1, |digits: &str| digits.parse::<u64>())(input)
}

// <count> <TYPE> <field> <field> ...
fn raw_record(input: &str) -> IResult<&str, (u64, &str, Vec<&str>)> {
    all_consuming(tuple((
        count,
        preceded(space1, field),
        many0(preceded(space1, field)),
    )))(input)
}

/// Parses one line of a counts file. Blank lines yield `Ok(None)`.
pub fn parse_record(
    line: &str,
    line_num: usize,
    mode: RecordMode,
) -> Result<Option<CountRecord>, CountsError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let malformed = |reason: String| CountsError::MalformedCountRecord {
        line_num,
        line: trimmed.to_string(),
        reason,
    };

    let (_, (n, kind, fields)) = raw_record(trimmed)
        .map_err(|_| malformed("expected '<count> <TYPE> <symbols...>'".to_string()))?;

    let record = match (kind, fields.as_slice()) {
        ("NONTERMINAL", [symbol]) => CountRecord::NonTerminal {
            symbol: symbol.to_string(),
            count: n,
        },
        ("BINARYRULE", [parent, left, right]) => CountRecord::BinaryRule {
            parent: parent.to_string(),
            left: left.to_string(),
            right: right.to_string(),
            count: n,
        },
        ("UNARYRULE", [parent, word]) => CountRecord::UnaryRule {
            parent: parent.to_string(),
            word: word.to_string(),
            count: n,
        },
        ("NONTERMINAL" | "BINARYRULE" | "UNARYRULE", _) => {
            return Err(malformed(format!(
                "wrong number of fields ({}) for {}",
                fields.len(),
                kind
            )));
        }
        (other, [parent, word]) if mode == RecordMode::Permissive => {
            warn!(line_num, record_type = other, "reading unknown record type as UNARYRULE");
            CountRecord::UnaryRule {
                parent: parent.to_string(),
                word: word.to_string(),
                count: n,
            }
        }
        (other, _) => {
            return Err(malformed(format!("unknown record type '{}'", other)));
        }
    };

    Ok(Some(record))
}

// --- Loading Counts ---

pub fn read_counts_from<R: BufRead>(
    reader: R,
    source: &Path,
    mode: RecordMode,
) -> Result<Vec<CountRecord>, CountsError> {
    let mut records = Vec::new();
    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|e| CountsError::InputUnavailable {
            path: source.to_path_buf(),
            source: e,
        })?;
        if let Some(record) = parse_record(&line, line_num + 1, mode)? {
            records.push(record);
        }
    }
    debug!(path = ?source, records = records.len(), "read count records");
    Ok(records)
}

pub fn read_counts(path: &Path, mode: RecordMode) -> Result<Vec<CountRecord>, CountsError> {
    let file = File::open(path).map_err(|e| CountsError::InputUnavailable {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_counts_from(BufReader::new(file), path, mode)
}
