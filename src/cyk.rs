use std::collections::HashMap;

use tracing::debug;

use crate::grammar::{GrammarModel, NonTerminalId};
use crate::rare::RareWordPolicy;
use crate::structs::ParseError;
use crate::tree::{recover_tree, Tree};

#[derive(Debug, Clone, PartialEq)]
pub struct ChartEntry {
    pub score: f64,
    pub backpointer: BackPointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackPointer {
    /// Single-word span; the leaf word comes from the input sentence.
    Terminal,
    Binary {
        split_point: usize,
        left_child_non_terminal_id: NonTerminalId,
        right_child_non_terminal_id: NonTerminalId,
    },
}

// chart[i][j] covers words i..=j; only non-zero cells are stored
#[derive(Debug, Clone)]
pub struct Chart {
    cells: Vec<Vec<HashMap<NonTerminalId, ChartEntry>>>,
}

impl Chart {
    fn new(n: usize) -> Self {
        Chart {
            cells: vec![vec![HashMap::new(); n]; n],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn entry(&self, i: usize, j: usize, non_terminal_id: NonTerminalId) -> Option<&ChartEntry> {
        self.cells.get(i)?.get(j)?.get(&non_terminal_id)
    }

    pub fn score(&self, i: usize, j: usize, non_terminal_id: NonTerminalId) -> f64 {
        self.entry(i, j, non_terminal_id).map_or(0.0, |e| e.score)
    }

    pub fn cell(&self, i: usize, j: usize) -> impl Iterator<Item = (NonTerminalId, &ChartEntry)> {
        self.cells
            .get(i)
            .and_then(|row| row.get(j))
            .into_iter()
            .flatten()
            .map(|(id, entry)| (*id, entry))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    pub start_symbol: String,
    pub rare_words: RareWordPolicy,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            start_symbol: "S".to_string(),
            rare_words: RareWordPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parse {
    pub tree: Tree,
    pub score: f64,
}

/// Fills the chart bottom-up by span length. Ties keep the first candidate in
/// nonterminal, rule, split-point order.
pub fn fill_chart(grammar: &GrammarModel, words: &[String], rare_words: &RareWordPolicy) -> Chart {
    let n = words.len();
    let mut chart = Chart::new(n);

    // Base case: single words
    for (i, word) in words.iter().enumerate() {
        let resolved = rare_words.resolve(grammar, word);
        let cell = &mut chart.cells[i][i];
        for (lhs_id, probability) in grammar.lexical_probs(resolved) {
            cell.insert(lhs_id, ChartEntry {
                score: probability,
                backpointer: BackPointer::Terminal,
            });
        }
    }

    for span in 1..n {
        for i in 0..(n - span) {
            let j = i + span;

            // Collect the winners first; the chart is read while searching.
            let mut winners: Vec<(NonTerminalId, ChartEntry)> = Vec::new();

            for lhs_id in 0..grammar.non_terminal_len() {
                let mut best: Option<ChartEntry> = None;
                for rule in grammar.binary_rules_for(lhs_id) {
                    for split_point in i..j {
                        let left = chart.score(i, split_point, rule.rhs1_id);
                        if left == 0.0 {
                            continue;
                        }
                        let right = chart.score(split_point + 1, j, rule.rhs2_id);
                        if right == 0.0 {
                            continue;
                        }

                        let score = rule.probability * left * right;
                        if score > best.as_ref().map_or(0.0, |e| e.score) {
                            best = Some(ChartEntry {
                                score,
                                backpointer: BackPointer::Binary {
                                    split_point,
                                    left_child_non_terminal_id: rule.rhs1_id,
                                    right_child_non_terminal_id: rule.rhs2_id,
                                },
                            });
                        }
                    }
                }
                if let Some(entry) = best {
                    winners.push((lhs_id, entry));
                }
            }

            chart.cells[i][j].extend(winners);
        }
    }

    chart
}

// start symbol if it spans the sentence, else the best-scoring nonterminal
fn select_root(grammar: &GrammarModel, chart: &Chart, start_symbol: &str) -> Option<NonTerminalId> {
    let last = chart.len().checked_sub(1)?;

    if let Some(start_id) = grammar.non_terminal_id(start_symbol) {
        if chart.score(0, last, start_id) > 0.0 {
            return Some(start_id);
        }
    }

    let mut max_score = 0.0;
    let mut root = None;
    for non_terminal_id in 0..grammar.non_terminal_len() {
        let score = chart.score(0, last, non_terminal_id);
        if score > max_score {
            max_score = score;
            root = Some(non_terminal_id);
        }
    }
    if let Some(id) = root {
        debug!(
            start_symbol,
            root = ?grammar.non_terminal_symbol(id),
            "start symbol does not span the sentence, using best root"
        );
    }
    root
}

pub fn parse_sentence(
    grammar: &GrammarModel,
    words: &[String],
    options: &ParseOptions,
) -> Result<Parse, ParseError> {
    if words.is_empty() {
        return Err(ParseError::EmptySentence);
    }

    let chart = fill_chart(grammar, words, &options.rare_words);
    let root_id = select_root(grammar, &chart, &options.start_symbol).ok_or(ParseError::NoParseFound)?;

    let last = words.len() - 1;
    let tree = recover_tree(grammar, &chart, words, 0, last, root_id)?;
    let score = chart.score(0, last, root_id);

    debug!(words = words.len(), root = tree.label(), score, "parsed sentence");
    Ok(Parse { tree, score })
}
