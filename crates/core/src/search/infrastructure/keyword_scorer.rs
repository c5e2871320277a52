use std::collections::HashSet;

/// Lowercased, whitespace-split tokens with surrounding punctuation removed.
///
/// Duplicates are dropped, keeping first occurrence order.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

/// Scores descriptions by the share of query tokens they contain.
pub struct KeywordScorer {
    tokens: Vec<String>,
}

impl KeywordScorer {
    pub fn new(query: &str) -> Self {
        Self {
            tokens: tokenize(query),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Fraction of distinct query tokens present in `description`, in `[0, 1]`.
    pub fn overlap_ratio(&self, description: &str) -> f64 {
        if self.tokens.is_empty() {
            return 0.0;
        }
        let words: HashSet<String> = tokenize(description).into_iter().collect();
        let matched = self.tokens.iter().filter(|t| words.contains(*t)).count();
        matched as f64 / self.tokens.len() as f64
    }
}
