// src/data/vocab.rs
//! Character vocabulary: bijection between symbols and indices `0..len`

use std::collections::HashMap;
use std::path::Path;

use crate::error::{CharnnError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    symbols: Vec<char>,
    index: HashMap<char, usize>,
}

impl Vocabulary {
    /// Most frequent symbol first; ties keep first-occurrence order.
    pub fn from_text(text: &str) -> Self {
        let mut counts: HashMap<char, (usize, usize)> = HashMap::new();
        for (pos, c) in text.chars().enumerate() {
            counts.entry(c).or_insert((0, pos)).0 += 1;
        }

        let mut ranked: Vec<(char, usize, usize)> =
            counts.into_iter().map(|(c, (count, first))| (c, count, first)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        let symbols = ranked.into_iter().map(|(c, _, _)| c).collect();
        Self::build(symbols)
    }

    pub fn from_symbols(symbols: Vec<char>) -> Result<Self> {
        let vocab = Self::build(symbols);
        if vocab.index.len() != vocab.symbols.len() {
            return Err(CharnnError::Config("vocabulary symbols must be unique".into()));
        }
        Ok(vocab)
    }

    fn build(symbols: Vec<char>) -> Self {
        let index = symbols.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Self { symbols, index }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn index_of(&self, symbol: char) -> Result<usize> {
        self.index
            .get(&symbol)
            .copied()
            .ok_or(CharnnError::UnknownSymbol(symbol))
    }

    pub fn symbol(&self, index: usize) -> Result<char> {
        self.symbols
            .get(index)
            .copied()
            .ok_or(CharnnError::OutOfVocabulary { index, vocab_size: self.len() })
    }

    pub fn encode(&self, text: &str) -> Result<Vec<usize>> {
        text.chars().map(|c| self.index_of(c)).collect()
    }

    pub fn decode(&self, indices: &[usize]) -> Result<String> {
        indices.iter().map(|&i| self.symbol(i)).collect()
    }

    /// Stores the ordered symbol list as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string(&self.symbols)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| CharnnError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let symbols: Vec<char> = serde_json::from_str(&raw)?;
        Self::from_symbols(symbols)
    }
}
