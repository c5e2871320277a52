pub mod embedding_face_clusterer;
pub mod face_forest;
