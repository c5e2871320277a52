use serde::{Deserialize, Serialize};

/// Where one photo sits on the canvas, in normalized `[0, 1]` coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollageCell {
    pub image_id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CollageCell {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_within_canvas(&self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width >= 0.0
            && self.height >= 0.0
            && self.x + self.width <= 1.0
            && self.y + self.height <= 1.0
    }
}

/// Placed cells in input order.
///
/// Ids beyond the grid capacity are not an error: they are left out of
/// `cells` and listed in `dropped_image_ids` so the caller can tell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollageLayout {
    pub columns: usize,
    pub rows: usize,
    pub cells: Vec<CollageCell>,
    pub dropped_image_ids: Vec<String>,
}
