/// Identity clustering by cosine similarity of face embeddings.
///
/// Single-linkage agglomeration: any pair above the threshold is linked and
/// links are closed transitively through a disjoint-set forest, so the resulting
/// partition is the set of connected components of the similarity graph.
use crate::clustering::domain::face_clusterer::FaceClusterer;
use crate::clustering::domain::person_cluster::PersonCluster;
use crate::clustering::infrastructure::face_forest::FaceForest;
use crate::shared::analysis_error::AnalysisError;
use crate::shared::cancellation::CancellationToken;
use crate::shared::constants::DEFAULT_CLUSTER_THRESHOLD;
use crate::shared::embedding::EmbeddingMatrix;
use crate::shared::gallery_image::FaceWithContext;

pub struct EmbeddingFaceClusterer {
    threshold: f64,
}

impl EmbeddingFaceClusterer {
    /// Faces link when their similarity is strictly greater than `threshold`.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for EmbeddingFaceClusterer {
    fn default() -> Self {
        Self::new(DEFAULT_CLUSTER_THRESHOLD)
    }
}

impl FaceClusterer for EmbeddingFaceClusterer {
    fn cluster(
        &self,
        faces: &[FaceWithContext<'_>],
        cancel: &CancellationToken,
    ) -> Result<Vec<PersonCluster>, AnalysisError> {
        if faces.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<&[f32]> = faces.iter().map(|f| f.identity_embedding).collect();
        let embeddings = EmbeddingMatrix::from_rows(&rows, |i| faces[i].key().to_string())?;

        let mut forest = FaceForest::new(faces.iter().map(FaceWithContext::key).collect());
        let n = forest.len();
        let mut merges = 0usize;

        for i in 0..n {
            cancel.check()?;
            let similarities = embeddings.similarities_after(i);
            for (offset, &similarity) in similarities.iter().enumerate() {
                if similarity > self.threshold && forest.merge(i, i + 1 + offset) {
                    merges += 1;
                }
            }
        }

        let groups = forest.into_groups();
        log::debug!(
            "Clustered {n} faces ({}-dim) into {} persons ({merges} merges, threshold {})",
            embeddings.dim(),
            groups.len(),
            self.threshold
        );

        Ok(groups
            .into_iter()
            .enumerate()
            .map(|(i, members)| PersonCluster {
                cluster_id: format!("person-{i}"),
                member_faces: members,
            })
            .collect())
    }
}
