use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::shared::gallery_image::{FaceKey, FaceWithContext};

/// One inferred identity: the set of faces judged to belong to the same person.
///
/// Cluster ids are generated per call; key off membership when comparing
/// results of separate runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonCluster {
    pub cluster_id: String,
    pub member_faces: BTreeSet<FaceKey>,
}

/// Presentation-ready view of a cluster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub person_id: String,
    pub name: String,
    pub faces: Vec<FaceKey>,
    pub image_ids: Vec<String>,
    /// Highest-confidence member face, used as the person's thumbnail.
    pub avatar: Option<FaceKey>,
}

impl PersonCluster {
    pub fn len(&self) -> usize {
        self.member_faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_faces.is_empty()
    }

    /// Distinct images containing at least one member face, always derived
    /// from membership.
    pub fn member_image_ids(&self) -> BTreeSet<&str> {
        self.member_faces
            .iter()
            .map(|k| k.image_id.as_str())
            .collect()
    }

    /// Builds summaries ordered by how many photos each person appears in.
    ///
    /// Persons are named `Person 1`, `Person 2`, ... in that order. Equal
    /// photo counts keep the order of `clusters`.
    pub fn summarize(
        clusters: &[PersonCluster],
        faces: &[FaceWithContext<'_>],
    ) -> Vec<PersonSummary> {
        let confidence: HashMap<FaceKey, f64> = faces
            .iter()
            .map(|f| (f.key(), f.face.confidence))
            .collect();

        let mut ordered: Vec<&PersonCluster> = clusters.iter().collect();
        ordered.sort_by_key(|c| Reverse(c.member_image_ids().len()));

        ordered
            .into_iter()
            .enumerate()
            .map(|(i, cluster)| PersonSummary {
                person_id: cluster.cluster_id.clone(),
                name: format!("Person {}", i + 1),
                faces: cluster.member_faces.iter().cloned().collect(),
                image_ids: cluster
                    .member_image_ids()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                avatar: pick_avatar(cluster, &confidence),
            })
            .collect()
    }
}

fn pick_avatar(cluster: &PersonCluster, confidence: &HashMap<FaceKey, f64>) -> Option<FaceKey> {
    let mut best: Option<(&FaceKey, f64)> = None;
    for key in &cluster.member_faces {
        let Some(&c) = confidence.get(key) else {
            continue;
        };
        if best.map_or(true, |(_, bc)| c > bc) {
            best = Some((key, c));
        }
    }
    best.map(|(k, _)| k.clone())
}
