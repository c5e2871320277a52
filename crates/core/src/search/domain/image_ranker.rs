use crate::search::domain::search_query::{SearchQuery, SearchResult};
use crate::shared::analysis_error::AnalysisError;
use crate::shared::cancellation::CancellationToken;
use crate::shared::gallery_image::GalleryImage;

/// Domain interface for relevance ranking of images against a query.
///
/// Results are ordered by descending score and never include images with a
/// non-positive score. `top_k` bounds the number of results when given.
pub trait ImageRanker: Send + Sync {
    fn search(
        &self,
        query: &SearchQuery,
        corpus: &[GalleryImage],
        top_k: Option<usize>,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, AnalysisError>;
}
