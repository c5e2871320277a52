use crate::clustering::domain::person_cluster::PersonCluster;
use crate::shared::analysis_error::AnalysisError;
use crate::shared::cancellation::CancellationToken;
use crate::shared::gallery_image::FaceWithContext;

/// Domain interface for grouping faces by identity.
///
/// Implementations must return a partition of the input: every face lands
/// in exactly one cluster. Membership must not depend on input order.
pub trait FaceClusterer: Send + Sync {
    fn cluster(
        &self,
        faces: &[FaceWithContext<'_>],
        cancel: &CancellationToken,
    ) -> Result<Vec<PersonCluster>, AnalysisError>;
}
