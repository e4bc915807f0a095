//! Probabilistic context-free grammar parsing in Chomsky Normal Form.
//!
//! A [`GrammarModel`] is trained from rule counts, then [`parse_sentence`]
//! runs the CKY algorithm over a tokenized sentence and rebuilds the most
//! probable tree from the chart's backpointers.

pub mod counts;
pub mod cyk;
pub mod grammar;
pub mod output;
pub mod rare;
pub mod structs;
pub mod tree;


pub use counts::{read_counts, CountRecord, RecordMode};
pub use cyk::{fill_chart, parse_sentence, Chart, Parse, ParseOptions};
pub use grammar::GrammarModel;
pub use rare::RareWordPolicy;
pub use structs::{CountsError, GrammarError, OutputFormat, ParseError};
pub use tree::Tree;
