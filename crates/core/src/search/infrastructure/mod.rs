pub mod face_match_index;
pub mod hybrid_search_index;
pub mod keyword_scorer;
