//! In-memory BM25 (Okapi) scorer.
//!
//! Builds posting statistics over the corpus once at index construction
//! and scores a query against every chunk in corpus order. Tokenization
//! is deliberately plain: case-folded whitespace splitting, no stemming,
//! no stop-word removal at this layer.

use std::collections::HashMap;

/// Standard Okapi parameters.
const K1: f64 = 1.5;
const B: f64 = 0.75;

/// Case-folded whitespace tokenizer shared by the lexical index and the
/// synthesizer's query analysis.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// BM25 posting statistics for a fixed corpus.
///
/// Read-only after construction; `scores` never mutates shared state,
/// so one index serves concurrent queries.
pub struct Bm25Index {
    /// Per-chunk term frequencies, in corpus order.
    term_freqs: Vec<HashMap<String, usize>>,
    /// Number of chunks each term appears in.
    doc_freqs: HashMap<String, usize>,
    /// Per-chunk token counts.
    doc_lens: Vec<usize>,
    avg_doc_len: f64,
}

impl Bm25Index {
    /// Build posting statistics from pre-tokenized chunk texts.
    pub fn build(tokenized_corpus: &[Vec<String>]) -> Self {
        let mut term_freqs = Vec::with_capacity(tokenized_corpus.len());
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();
        let mut doc_lens = Vec::with_capacity(tokenized_corpus.len());

        for tokens in tokenized_corpus {
            let mut freqs: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *freqs.entry(token.clone()).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            doc_lens.push(tokens.len());
            term_freqs.push(freqs);
        }

        let total: usize = doc_lens.iter().sum();
        let avg_doc_len = if doc_lens.is_empty() {
            0.0
        } else {
            total as f64 / doc_lens.len() as f64
        };

        Self {
            term_freqs,
            doc_freqs,
            doc_lens,
            avg_doc_len,
        }
    }

    pub fn len(&self) -> usize {
        self.term_freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.term_freqs.is_empty()
    }

    /// Raw BM25 score of the query against every chunk, in corpus order.
    /// Scores have no fixed range; chunks sharing no terms with the
    /// query score 0.
    pub fn scores(&self, query_tokens: &[String]) -> Vec<f64> {
        let n = self.len();
        let mut scores = vec![0.0; n];
        if n == 0 {
            return scores;
        }

        for term in query_tokens {
            let df = match self.doc_freqs.get(term) {
                Some(&df) => df as f64,
                None => continue,
            };

            // Okapi idf with the +1 floor so common terms never go negative
            let idf = (((n as f64 - df + 0.5) / (df + 0.5)) + 1.0).ln();

            for (i, freqs) in self.term_freqs.iter().enumerate() {
                let tf = match freqs.get(term) {
                    Some(&tf) => tf as f64,
                    None => continue,
                };
                let len_norm = 1.0 - B + B * (self.doc_lens[i] as f64 / self.avg_doc_len);
                scores[i] += idf * (tf * (K1 + 1.0)) / (tf + K1 * len_norm);
            }
        }

        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Vec<Vec<String>> {
        texts.iter().map(|t| tokenize(t)).collect()
    }

    #[test]
    fn test_tokenize_case_folds() {
        assert_eq!(tokenize("Vata governs Movement"), vec!["vata", "governs", "movement"]);
    }

    #[test]
    fn test_empty_corpus() {
        let index = Bm25Index::build(&[]);
        assert!(index.is_empty());
        assert!(index.scores(&tokenize("anything")).is_empty());
    }

    #[test]
    fn test_matching_chunk_outscores_nonmatching() {
        let index = Bm25Index::build(&corpus(&[
            "triphala supports digestion and regularity",
            "the clinic offers a stress support program",
        ]));
        let scores = index.scores(&tokenize("triphala digestion"));
        assert!(scores[0] > scores[1]);
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn test_unknown_terms_score_zero() {
        let index = Bm25Index::build(&corpus(&["vata pitta kapha"]));
        let scores = index.scores(&tokenize("quantum entanglement"));
        assert_eq!(scores, vec![0.0]);
    }

    #[test]
    fn test_term_frequency_saturation() {
        // Repetition helps, but sub-linearly.
        let index = Bm25Index::build(&corpus(&[
            "sleep sleep sleep sleep",
            "sleep rest routine balance",
        ]));
        let scores = index.scores(&tokenize("sleep"));
        assert!(scores[0] > scores[1]);
        assert!(scores[0] < scores[1] * 4.0);
    }

    #[test]
    fn test_scores_in_corpus_order_and_deterministic() {
        let texts = corpus(&["alpha beta", "beta gamma", "gamma delta"]);
        let index = Bm25Index::build(&texts);
        let a = index.scores(&tokenize("beta gamma"));
        let b = index.scores(&tokenize("beta gamma"));
        assert_eq!(a.len(), 3);
        assert_eq!(a, b);
    }
}
