use crate::grammar::GrammarModel;

pub const DEFAULT_RARE_THRESHOLD: u64 = 5;
pub const DEFAULT_RARE_TOKEN: &str = "_RARE_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordClass {
    Known,
    Rare,
}

/// A word is rare when its unary counts summed over all nonterminals fall
/// below `threshold`; rare words are looked up as `placeholder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RareWordPolicy {
    pub threshold: u64,
    pub placeholder: String,
}

impl Default for RareWordPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_RARE_THRESHOLD,
            placeholder: DEFAULT_RARE_TOKEN.to_string(),
        }
    }
}

impl RareWordPolicy {
    pub fn new(threshold: u64, placeholder: impl Into<String>) -> Self {
        Self {
            threshold,
            placeholder: placeholder.into(),
        }
    }

    pub fn classify(&self, grammar: &GrammarModel, word: &str) -> WordClass {
        if grammar.word_count(word) < self.threshold {
            WordClass::Rare
        } else {
            WordClass::Known
        }
    }

    pub fn resolve<'a>(&'a self, grammar: &GrammarModel, word: &'a str) -> &'a str {
        match self.classify(grammar, word) {
            WordClass::Known => word,
            WordClass::Rare => &self.placeholder,
        }
    }
}
