/// Cosine similarity a face pair must exceed to be linked into one person.
pub const DEFAULT_CLUSTER_THRESHOLD: f64 = 0.6;

pub const DEFAULT_KEYWORD_WEIGHT: f64 = 0.4;
pub const DEFAULT_EMBEDDING_WEIGHT: f64 = 0.6;

/// Max gap between consecutive photos of one event (4 hours).
pub const DEFAULT_EVENT_WINDOW_MINUTES: u64 = 4 * 60;

pub const DEFAULT_COLLAGE_COLUMNS: usize = 3;
pub const DEFAULT_COLLAGE_ROWS: usize = 2;

/// Crop window size relative to the anchor face box.
pub const DEFAULT_FACE_CROP_SCALE: f64 = 1.5;

pub const DEFAULT_FACE_MATCH_THRESHOLD: f64 = 0.6;
pub const DEFAULT_FACE_MATCH_LIMIT: usize = 6;

pub const SETTINGS_DIR_NAME: &str = "GalleryInsight";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
