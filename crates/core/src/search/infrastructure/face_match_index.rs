/// Finds photos containing a given person from a reference face embedding
/// (for example a selfie run through the embedding collaborator).
///
/// Each image is scored by its best-matching face.
use serde::{Deserialize, Serialize};

use crate::shared::analysis_error::AnalysisError;
use crate::shared::cancellation::CancellationToken;
use crate::shared::constants::{DEFAULT_FACE_MATCH_LIMIT, DEFAULT_FACE_MATCH_THRESHOLD};
use crate::shared::embedding::{check_dimension, unit_vector, EmbeddingMatrix};
use crate::shared::gallery_image::{FaceWithContext, GalleryImage};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceMatch {
    pub image_id: String,
    pub face_id: String,
    pub similarity: f64,
    /// Similarity as a 0-100 percentage for display.
    pub confidence_percent: u8,
}

pub struct FaceMatchIndex {
    threshold: f64,
    limit: usize,
}

impl FaceMatchIndex {
    pub fn new(threshold: f64, limit: usize) -> Self {
        Self { threshold, limit }
    }

    /// Images whose best face similarity to `reference` exceeds the
    /// threshold, most similar first, newer photos first on ties.
    pub fn find_matches(
        &self,
        reference: &[f32],
        corpus: &[GalleryImage],
        cancel: &CancellationToken,
    ) -> Result<Vec<FaceMatch>, AnalysisError> {
        let reference_unit = unit_vector(reference, "reference")?;

        let faces: Vec<FaceWithContext> =
            corpus.iter().flat_map(FaceWithContext::from_image).collect();
        for view in &faces {
            check_dimension(
                reference.len(),
                view.identity_embedding,
                &view.key().to_string(),
            )?;
        }
        let rows: Vec<&[f32]> = faces.iter().map(|f| f.identity_embedding).collect();
        let embeddings = EmbeddingMatrix::from_rows(&rows, |i| faces[i].key().to_string())?;
        let similarities = embeddings.similarities_to(&reference_unit.view());

        let mut matches: Vec<(usize, i64, FaceMatch)> = Vec::new();
        let mut offset = 0;
        for (position, image) in corpus.iter().enumerate() {
            cancel.check()?;

            let face_count = image.faces.len();
            let best = (offset..offset + face_count).fold(None, |best: Option<usize>, i| {
                match best {
                    Some(b) if similarities[b] >= similarities[i] => Some(b),
                    _ => Some(i),
                }
            });
            offset += face_count;

            if let Some(i) = best {
                let similarity = similarities[i];
                if similarity > self.threshold {
                    matches.push((
                        position,
                        image.capture_timestamp,
                        FaceMatch {
                            image_id: image.id.clone(),
                            face_id: faces[i].face.id.clone(),
                            similarity,
                            confidence_percent: to_percent(similarity),
                        },
                    ));
                }
            }
        }

        matches.sort_by(|a, b| {
            b.2.similarity
                .total_cmp(&a.2.similarity)
                .then_with(|| b.1.cmp(&a.1))
                .then_with(|| a.0.cmp(&b.0))
        });
        matches.truncate(self.limit);
        Ok(matches.into_iter().map(|(_, _, m)| m).collect())
    }
}

impl Default for FaceMatchIndex {
    fn default() -> Self {
        Self::new(DEFAULT_FACE_MATCH_THRESHOLD, DEFAULT_FACE_MATCH_LIMIT)
    }
}

fn to_percent(similarity: f64) -> u8 {
    (similarity.clamp(0.0, 1.0) * 100.0).round() as u8
}
