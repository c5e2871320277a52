/// Relevance ranking that blends keyword overlap with embedding similarity.
///
/// Both signals are in `[0, 1]` before weighting: the keyword term is the
/// share of query tokens found in the description, and the embedding term is
/// cosine similarity with negative values clamped to zero. When the query
/// carries only one signal, that signal alone is the score. Text that is not
/// blank but yields no tokens is still text: it just matches nothing.
use std::cmp::Ordering;

use ndarray::Array1;

use crate::search::domain::image_ranker::ImageRanker;
use crate::search::domain::search_query::{SearchQuery, SearchResult};
use crate::search::infrastructure::keyword_scorer::KeywordScorer;
use crate::shared::analysis_error::AnalysisError;
use crate::shared::cancellation::CancellationToken;
use crate::shared::constants::{DEFAULT_EMBEDDING_WEIGHT, DEFAULT_KEYWORD_WEIGHT};
use crate::shared::embedding::{check_dimension, unit_vector, EmbeddingMatrix};
use crate::shared::gallery_image::GalleryImage;

pub struct HybridSearchIndex {
    keyword_weight: f64,
    embedding_weight: f64,
}

impl HybridSearchIndex {
    pub fn new(keyword_weight: f64, embedding_weight: f64) -> Self {
        Self {
            keyword_weight,
            embedding_weight,
        }
    }
}

impl Default for HybridSearchIndex {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORD_WEIGHT, DEFAULT_EMBEDDING_WEIGHT)
    }
}

struct Scored {
    position: usize,
    timestamp: i64,
    result: SearchResult,
}

impl ImageRanker for HybridSearchIndex {
    fn search(
        &self,
        query: &SearchQuery,
        corpus: &[GalleryImage],
        top_k: Option<usize>,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, AnalysisError> {
        let has_text = !query.text.trim().is_empty();
        let keywords = KeywordScorer::new(&query.text);
        let query_unit: Option<Array1<f64>> = query
            .embedding
            .as_deref()
            .map(|e| unit_vector(e, "query"))
            .transpose()?;

        let (keyword_weight, embedding_weight) = match (has_text, query_unit.is_some()) {
            (false, false) => return Err(AnalysisError::EmptyQuery),
            (true, false) => (1.0, 0.0),
            (false, true) => (0.0, 1.0),
            (true, true) => (self.keyword_weight, self.embedding_weight),
        };

        let similarities = match &query_unit {
            Some(q) => {
                cancel.check()?;
                Some(embedding_similarities(q, corpus)?)
            }
            None => None,
        };

        let mut scored: Vec<Scored> = Vec::new();
        for (position, image) in corpus.iter().enumerate() {
            cancel.check()?;

            let keyword = if keyword_weight > 0.0 && !keywords.is_empty() {
                keywords.overlap_ratio(&image.description)
            } else {
                0.0
            };
            let similarity = similarities
                .as_ref()
                .map_or(0.0, |sims| sims[position].clamp(0.0, 1.0));

            let score = keyword_weight * keyword + embedding_weight * similarity;
            if score > 0.0 {
                scored.push(Scored {
                    position,
                    timestamp: image.capture_timestamp,
                    result: SearchResult {
                        image_id: image.id.clone(),
                        score,
                    },
                });
            }
        }

        scored.sort_by(rank_order);
        if let Some(k) = top_k {
            scored.truncate(k);
        }
        log::debug!(
            "Search '{}' matched {} of {} images",
            query.text,
            scored.len(),
            corpus.len()
        );
        Ok(scored.into_iter().map(|s| s.result).collect())
    }
}

/// Cosine similarity of every image embedding to the unit query, in corpus order.
fn embedding_similarities(
    query: &Array1<f64>,
    corpus: &[GalleryImage],
) -> Result<Array1<f64>, AnalysisError> {
    for image in corpus {
        check_dimension(query.len(), &image.embedding, &image.id)?;
    }
    let rows: Vec<&[f32]> = corpus.iter().map(|img| img.embedding.as_slice()).collect();
    let embeddings = EmbeddingMatrix::from_rows(&rows, |i| corpus[i].id.clone())?;
    Ok(embeddings.similarities_to(&query.view()))
}

/// Higher score first, then newer photo, then input order.
fn rank_order(a: &Scored, b: &Scored) -> Ordering {
    b.result
        .score
        .total_cmp(&a.result.score)
        .then_with(|| b.timestamp.cmp(&a.timestamp))
        .then_with(|| a.position.cmp(&b.position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::gallery_image::test_support::{described, image};
    use approx::assert_relative_eq;

    fn search(
        index: &HybridSearchIndex,
        query: &SearchQuery,
        corpus: &[GalleryImage],
        top_k: Option<usize>,
    ) -> Result<Vec<SearchResult>, AnalysisError> {
        index.search(query, corpus, top_k, &CancellationToken::new())
    }

    fn search_default(
        query: &SearchQuery,
        corpus: &[GalleryImage],
    ) -> Result<Vec<SearchResult>, AnalysisError> {
        search(&HybridSearchIndex::default(), query, corpus, None)
    }

    fn ids(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.image_id.as_str()).collect()
    }

    #[test]
    fn test_keyword_only_ranking() {
        let corpus = vec![
            described("dog", 0, "dog on beach"),
            described("cat", 0, "cat indoors"),
        ];
        let results = search_default(&SearchQuery::text("dog beach"), &corpus).unwrap();
        assert_eq!(ids(&results), vec!["dog"]);
        assert!(results[0].score > 0.0);
    }

    #[test]
    fn test_keyword_only_uses_full_weight() {
        let corpus = vec![described("a", 0, "dog on beach")];
        let results = search_default(&SearchQuery::text("dog cat"), &corpus).unwrap();
        assert_relative_eq!(results[0].score, 0.5);
    }

    #[test]
    fn test_more_overlap_ranks_higher() {
        let corpus = vec![
            described("partial", 0, "sunset"),
            described("full", 0, "sunset over the beach"),
        ];
        let results = search_default(&SearchQuery::text("sunset beach"), &corpus).unwrap();
        assert_eq!(ids(&results), vec!["full", "partial"]);
    }

    #[test]
    fn test_ties_break_by_newer_timestamp() {
        let corpus = vec![
            described("old", 100, "party"),
            described("new", 300, "party"),
            described("mid", 200, "party"),
        ];
        let results = search_default(&SearchQuery::text("party"), &corpus).unwrap();
        assert_eq!(ids(&results), vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_equal_score_and_timestamp_keep_input_order() {
        let corpus = vec![described("first", 5, "party"), described("second", 5, "party")];
        let results = search_default(&SearchQuery::text("party"), &corpus).unwrap();
        assert_eq!(ids(&results), vec!["first", "second"]);
    }

    #[test]
    fn test_top_k_truncates() {
        let corpus: Vec<GalleryImage> = (0..5)
            .map(|i| described(&format!("img{i}"), i, "group photo"))
            .collect();
        let index = HybridSearchIndex::default();
        let query = SearchQuery::text("group");
        let results = search(&index, &query, &corpus, Some(2)).unwrap();
        assert_eq!(ids(&results), vec!["img4", "img3"]);
        let none = search(&index, &query, &corpus, Some(0)).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_blank_query_without_embedding_fails() {
        let err = search_default(&SearchQuery::text("  \t "), &[]).unwrap_err();
        assert_eq!(err, AnalysisError::EmptyQuery);
    }

    #[test]
    fn test_punctuation_only_query_matches_nothing() {
        let corpus = vec![described("a", 0, "dog on beach"), described("b", 0, "?!")];
        let results = search_default(&SearchQuery::text("?!"), &corpus).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_punctuation_only_text_still_weights_keywords() {
        let mut img = described("a", 0, "dog on beach");
        img.embedding = vec![1.0, 0.0];
        let index = HybridSearchIndex::new(0.4, 0.6);
        let query = SearchQuery::text("...").with_embedding(vec![1.0, 0.0]);
        let results = search(&index, &query, &[img], None).unwrap();
        assert_relative_eq!(results[0].score, 0.6, epsilon = 1e-9);
    }

    #[test]
    fn test_embedding_only_query() {
        let corpus = vec![
            image("near", 0, vec![1.0, 0.1]),
            image("far", 0, vec![0.0, 1.0]),
            image("opposite", 0, vec![-1.0, 0.0]),
        ];
        let results = search_default(&SearchQuery::embedding(vec![1.0, 0.0]), &corpus).unwrap();
        // Orthogonal and opposite embeddings score zero and are excluded.
        assert_eq!(ids(&results), vec!["near"]);
        assert!(results[0].score > 0.99);
    }

    #[test]
    fn test_embedding_similarity_ignores_magnitude() {
        let corpus = vec![
            image("small", 0, vec![0.01, 0.0]),
            image("large", 0, vec![50.0, 0.0]),
        ];
        let results = search_default(&SearchQuery::embedding(vec![3.0, 0.0]), &corpus).unwrap();
        assert_relative_eq!(results[0].score, 1.0, epsilon = 1e-9);
        assert_relative_eq!(results[1].score, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_combined_score_weights_both_signals() {
        let mut img = described("a", 0, "dog on beach");
        img.embedding = vec![1.0, 0.0];
        let index = HybridSearchIndex::new(0.4, 0.6);
        let query = SearchQuery::text("dog cat").with_embedding(vec![1.0, 0.0]);
        let results = search(&index, &query, &[img], None).unwrap();
        assert_relative_eq!(results[0].score, 0.4 * 0.5 + 0.6 * 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_embedding_can_rescue_keyword_miss() {
        let mut miss = described("semantic", 0, "puppy by the sea");
        miss.embedding = vec![1.0, 0.0];
        let mut hit = described("literal", 0, "dog drawing");
        hit.embedding = vec![0.0, 1.0];
        let query = SearchQuery::text("dog").with_embedding(vec![1.0, 0.0]);
        let results = search_default(&query, &[miss, hit]).unwrap();
        assert_eq!(ids(&results), vec!["semantic", "literal"]);
    }

    #[test]
    fn test_image_dimension_mismatch() {
        let corpus = vec![image("a", 0, vec![1.0, 0.0, 0.0])];
        let err = search_default(&SearchQuery::embedding(vec![1.0, 0.0]), &corpus).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::DimensionMismatch { expected: 2, found: 3, .. }
        ));
    }

    #[test]
    fn test_missing_image_embedding_is_dimension_mismatch() {
        let corpus = vec![image("none", 0, vec![]), image("ok", 0, vec![1.0, 0.0])];
        let err = search_default(&SearchQuery::embedding(vec![1.0, 0.0]), &corpus).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::DimensionMismatch {
                subject: "none".to_string(),
                expected: 2,
                found: 0
            }
        );
    }

    #[test]
    fn test_zero_query_embedding_is_degenerate() {
        let query = SearchQuery::text("dog").with_embedding(vec![0.0, 0.0]);
        let err = search_default(&query, &[]).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::DegenerateEmbedding {
                subject: "query".to_string()
            }
        );
    }

    #[test]
    fn test_zero_image_embedding_is_degenerate() {
        let corpus = vec![image("blank", 0, vec![0.0, 0.0])];
        let err = search_default(&SearchQuery::embedding(vec![1.0, 0.0]), &corpus).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::DegenerateEmbedding { subject } if subject == "blank"
        ));
    }

    #[test]
    fn test_embedding_query_over_empty_corpus() {
        let results = search_default(&SearchQuery::embedding(vec![1.0, 0.0]), &[]).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let corpus = vec![image("a", 0, vec![1.0, 0.0])];
        let index = HybridSearchIndex::default();
        for query in [SearchQuery::text("dog"), SearchQuery::embedding(vec![1.0, 0.0])] {
            let err = index.search(&query, &corpus, None, &token).unwrap_err();
            assert_eq!(err, AnalysisError::Cancelled);
        }
    }

    #[test]
    fn test_deterministic() {
        let corpus = vec![
            described("a", 3, "beach party"),
            described("b", 1, "party"),
            described("c", 2, "beach"),
        ];
        let q = SearchQuery::text("beach party");
        let first = search_default(&q, &corpus).unwrap();
        assert_eq!(first, search_default(&q, &corpus).unwrap());
    }
}
