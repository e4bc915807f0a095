use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::counts::CountRecord;
use crate::structs::GrammarError;

/// Position of a nonterminal in the order its NONTERMINAL record was first read.
pub type NonTerminalId = usize;

// --- Grammar Structures ---

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryRule {
    pub lhs_id: NonTerminalId,
    pub rhs1_id: NonTerminalId,
    pub rhs2_id: NonTerminalId,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexicalEntry {
    pub lhs_id: NonTerminalId,
    pub count: u64,
}

// Count maps keep first-read key order; parsing enumerates in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrammarModel {
    non_terminal_counts: IndexMap<String, u64>,
    binary_rule_counts: IndexMap<(String, String, String), u64>,
    unary_rule_counts: IndexMap<(String, String), u64>,

    binary_rules_by_lhs: Vec<Vec<BinaryRule>>,
    lexicon: HashMap<String, Vec<LexicalEntry>>,
}

impl GrammarModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = CountRecord>,
    {
        let mut grammar = Self::new();
        grammar.train(records);
        grammar
    }

    // later records overwrite earlier ones with the same key
    pub fn train<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = CountRecord>,
    {
        for record in records {
            match record {
                CountRecord::NonTerminal { symbol, count } => {
                    self.non_terminal_counts.insert(symbol, count);
                }
                CountRecord::BinaryRule { parent, left, right, count } => {
                    self.binary_rule_counts.insert((parent, left, right), count);
                }
                CountRecord::UnaryRule { parent, word, count } => {
                    self.unary_rule_counts.insert((parent, word), count);
                }
            }
        }
        self.build_indexes();

        info!(
            non_terminals = self.non_terminal_counts.len(),
            binary_rules = self.binary_rule_counts.len(),
            unary_rules = self.unary_rule_counts.len(),
            "trained grammar"
        );
    }

    fn build_indexes(&mut self) {
        let mut binary_rules_by_lhs = vec![Vec::new(); self.non_terminal_counts.len()];
        for ((lhs, rhs1, rhs2), &count) in &self.binary_rule_counts {
            if count == 0 {
                continue;
            }
            let ids = (
                self.non_terminal_id(lhs),
                self.non_terminal_id(rhs1),
                self.non_terminal_id(rhs2),
            );
            let (Some(lhs_id), Some(rhs1_id), Some(rhs2_id)) = ids else {
                warn!("Skipping binary rule {} -> {} {}: symbol is not a known nonterminal", lhs, rhs1, rhs2);
                continue;
            };
            if count > self.non_terminal_count(lhs) {
                warn!("Binary rule {} -> {} {} outnumbers its nonterminal, probability clamped to 1", lhs, rhs1, rhs2);
            }
            match self.try_binary_prob(lhs, rhs1, rhs2) {
                Ok(probability) => binary_rules_by_lhs[lhs_id].push(BinaryRule {
                    lhs_id,
                    rhs1_id,
                    rhs2_id,
                    probability,
                }),
                Err(e) => warn!("Skipping binary rule {} -> {} {}: {}", lhs, rhs1, rhs2, e),
            }
        }

        let mut lexicon: HashMap<String, Vec<LexicalEntry>> = HashMap::new();
        for ((lhs, word), &count) in &self.unary_rule_counts {
            let Some(lhs_id) = self.non_terminal_id(lhs) else {
                warn!("Unary rule {} -> {} has an unknown nonterminal", lhs, word);
                continue;
            };
            if let Err(e) = self.try_unary_prob(lhs, word) {
                warn!("Unary rule {} -> {}: {}", lhs, word, e);
            } else if count > self.non_terminal_count(lhs) {
                warn!("Unary rule {} -> {} outnumbers its nonterminal, probability clamped to 1", lhs, word);
            }
            lexicon
                .entry(word.clone())
                .or_default()
                .push(LexicalEntry { lhs_id, count });
        }

        self.binary_rules_by_lhs = binary_rules_by_lhs;
        self.lexicon = lexicon;
    }

    // --- Counts ---

    // a symbol's index is its id
    pub fn non_terminals(&self) -> impl Iterator<Item = &str> {
        self.non_terminal_counts.keys().map(String::as_str)
    }

    pub fn non_terminal_len(&self) -> usize {
        self.non_terminal_counts.len()
    }

    pub fn non_terminal_id(&self, symbol: &str) -> Option<NonTerminalId> {
        self.non_terminal_counts.get_index_of(symbol)
    }

    pub fn non_terminal_symbol(&self, id: NonTerminalId) -> Option<&str> {
        self.non_terminal_counts
            .get_index(id)
            .map(|(symbol, _)| symbol.as_str())
    }

    pub fn non_terminal_count(&self, symbol: &str) -> u64 {
        self.non_terminal_counts.get(symbol).copied().unwrap_or(0)
    }

    pub fn binary_rule_count(&self, lhs: &str, rhs1: &str, rhs2: &str) -> u64 {
        let key = (lhs.to_string(), rhs1.to_string(), rhs2.to_string());
        self.binary_rule_counts.get(&key).copied().unwrap_or(0)
    }

    pub fn unary_rule_count(&self, lhs: &str, word: &str) -> u64 {
        let key = (lhs.to_string(), word.to_string());
        self.unary_rule_counts.get(&key).copied().unwrap_or(0)
    }

    pub fn word_count(&self, word: &str) -> u64 {
        self.lexicon
            .get(word)
            .map_or(0, |entries| entries.iter().map(|e| e.count).sum())
    }

    // --- Probabilities ---

    pub fn try_binary_prob(&self, lhs: &str, rhs1: &str, rhs2: &str) -> Result<f64, GrammarError> {
        relative_frequency(
            self.binary_rule_count(lhs, rhs1, rhs2),
            self.non_terminal_count(lhs),
            lhs,
        )
    }

    pub fn try_unary_prob(&self, lhs: &str, word: &str) -> Result<f64, GrammarError> {
        relative_frequency(
            self.unary_rule_count(lhs, word),
            self.non_terminal_count(lhs),
            lhs,
        )
    }

    // undefined probabilities read as 0
    pub fn binary_prob(&self, lhs: &str, rhs1: &str, rhs2: &str) -> f64 {
        self.try_binary_prob(lhs, rhs1, rhs2).unwrap_or(0.0)
    }

    pub fn unary_prob(&self, lhs: &str, word: &str) -> f64 {
        self.try_unary_prob(lhs, word).unwrap_or(0.0)
    }

    // --- Parser Indexes ---

    pub fn binary_rules_for(&self, lhs_id: NonTerminalId) -> &[BinaryRule] {
        self.binary_rules_by_lhs
            .get(lhs_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn lexical_probs<'a>(&'a self, word: &str) -> impl Iterator<Item = (NonTerminalId, f64)> + 'a {
        self.lexicon
            .get(word)
            .into_iter()
            .flatten()
            .filter_map(move |entry| {
                let total = self.non_terminal_counts.get_index(entry.lhs_id).map_or(0, |(_, c)| *c);
                if entry.count == 0 || total == 0 {
                    return None;
                }
                Some((entry.lhs_id, (entry.count as f64 / total as f64).min(1.0)))
            })
    }
}

// count / total, capped at 1 for rules that outnumber their nonterminal
fn relative_frequency(count: u64, total: u64, lhs: &str) -> Result<f64, GrammarError> {
    if count == 0 {
        return Ok(0.0);
    }
    if total == 0 {
        return Err(GrammarError::UndefinedProbability(lhs.to_string()));
    }
    Ok((count as f64 / total as f64).min(1.0))
}
