use std::fmt;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::cyk::{BackPointer, Chart};
use crate::grammar::{GrammarModel, NonTerminalId};
use crate::structs::ParseError;

// --- Parse Tree ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    Leaf {
        label: String,
        word: String,
    },
    Node {
        label: String,
        left: Box<Tree>,
        right: Box<Tree>,
    },
}

impl Tree {
    pub fn label(&self) -> &str {
        match self {
            Tree::Leaf { label, .. } | Tree::Node { label, .. } => label,
        }
    }

    /// Leaf words from left to right.
    pub fn words(&self) -> Vec<&str> {
        let mut words = Vec::new();
        collect_words(self, &mut words);
        words
    }
}

fn collect_words<'a>(tree: &'a Tree, words: &mut Vec<&'a str>) {
    match tree {
        Tree::Leaf { word, .. } => words.push(word),
        Tree::Node { left, right, .. } => {
            collect_words(left, words);
            collect_words(right, words);
        }
    }
}

/// `[label, word]` for leaves, `[label, left, right]` for inner nodes.
impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tree::Leaf { label, word } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(label)?;
                seq.serialize_element(word)?;
                seq.end()
            }
            Tree::Node { label, left, right } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element(label)?;
                seq.serialize_element(left.as_ref())?;
                seq.serialize_element(right.as_ref())?;
                seq.end()
            }
        }
    }
}

// (S (NP dog) (VP barks))
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Leaf { label, word } => write!(f, "({} {})", label, word),
            Tree::Node { label, left, right } => write!(f, "({} {} {})", label, left, right),
        }
    }
}

// --- Tree Reconstruction ---

// recursive reconstruction of the parse tree from the completed CYK chart
pub fn recover_tree(
    grammar: &GrammarModel,
    chart: &Chart,
    words: &[String],
    i: usize, // span start index
    j: usize, // span end index (inclusive)
    non_terminal_id: NonTerminalId,
) -> Result<Tree, ParseError> {
    let label = grammar.non_terminal_symbol(non_terminal_id).unwrap_or_default();
    let missing = || ParseError::MissingBackpointer {
        label: label.to_string(),
        start: i,
        end: j,
    };

    if i == j {
        let word = words.get(i).ok_or_else(missing)?;
        return Ok(Tree::Leaf {
            label: label.to_string(),
            word: word.clone(),
        });
    }

    match chart.entry(i, j, non_terminal_id).map(|e| e.backpointer) {
        Some(BackPointer::Binary {
            split_point,
            left_child_non_terminal_id,
            right_child_non_terminal_id,
        }) => {
            let left = recover_tree(grammar, chart, words, i, split_point, left_child_non_terminal_id)?;
            let right = recover_tree(grammar, chart, words, split_point + 1, j, right_child_non_terminal_id)?;
            Ok(Tree::Node {
                label: label.to_string(),
                left: Box::new(left),
                right: Box::new(right),
            })
        }
        Some(BackPointer::Terminal) | None => Err(missing()),
    }
}
