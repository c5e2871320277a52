use serde::{Deserialize, Serialize};

use crate::collage::domain::collage_layout::{CollageCell, CollageLayout};
use crate::shared::analysis_error::AnalysisError;
use crate::shared::constants::{
    DEFAULT_COLLAGE_COLUMNS, DEFAULT_COLLAGE_ROWS, DEFAULT_FACE_CROP_SCALE,
};
use crate::shared::gallery_image::{BoundingBox, GalleryImage};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollageOptions {
    pub columns: usize,
    /// Grid rows; capacity is `columns * rows`.
    pub rows: usize,
    /// Crop window size relative to the anchor face.
    pub face_crop_scale: f64,
    /// Replace the grid cell with a crop around the most confident face.
    pub recenter_on_faces: bool,
}

impl CollageOptions {
    pub fn with_columns(columns: usize) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    pub fn capacity(&self) -> usize {
        self.columns.saturating_mul(self.rows)
    }
}

impl Default for CollageOptions {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLLAGE_COLUMNS,
            rows: DEFAULT_COLLAGE_ROWS,
            face_crop_scale: DEFAULT_FACE_CROP_SCALE,
            recenter_on_faces: true,
        }
    }
}

/// Packs photos into a fixed grid, cropping each around its main face.
pub struct CollagePlanner {
    options: CollageOptions,
}

impl CollagePlanner {
    pub fn new(options: CollageOptions) -> Self {
        Self { options }
    }

    /// Lays out `image_ids` in order, row-major.
    ///
    /// `resolve` looks up each id; ids it cannot resolve, and images
    /// without faces, keep their plain grid cell.
    pub fn layout<'a, F>(
        &self,
        image_ids: &[String],
        resolve: F,
    ) -> Result<CollageLayout, AnalysisError>
    where
        F: Fn(&str) -> Option<&'a GalleryImage>,
    {
        let CollageOptions { columns, rows, .. } = self.options;
        if columns < 1 {
            return Err(AnalysisError::InvalidColumnCount(columns));
        }
        if rows < 1 {
            return Err(AnalysisError::InvalidRowCount(rows));
        }

        let capacity = self.options.capacity();
        let placed = image_ids.len().min(capacity);

        let cells: Vec<CollageCell> = image_ids[..placed]
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let base = self.grid_cell(i, id);
                match resolve(id) {
                    Some(image) if self.options.recenter_on_faces => self.recenter(base, image),
                    _ => base,
                }
            })
            .collect();

        let dropped_image_ids = image_ids[placed..].to_vec();
        if !dropped_image_ids.is_empty() {
            log::debug!(
                "Collage capacity {capacity} reached, dropped {} images",
                dropped_image_ids.len()
            );
        }

        Ok(CollageLayout {
            columns,
            rows,
            cells,
            dropped_image_ids,
        })
    }

    fn grid_cell(&self, index: usize, image_id: &str) -> CollageCell {
        let columns = self.options.columns as f64;
        let rows = self.options.rows as f64;
        let col = (index % self.options.columns) as f64;
        let row = (index / self.options.columns) as f64;

        let x = col / columns;
        let y = row / rows;
        CollageCell {
            image_id: image_id.to_string(),
            x,
            y,
            width: (1.0 / columns).min(1.0 - x),
            height: (1.0 / rows).min(1.0 - y),
        }
    }

    fn recenter(&self, base: CollageCell, image: &GalleryImage) -> CollageCell {
        let Some(face) = image.primary_face() else {
            return base;
        };
        let b = face.bounding_box;
        if ![b.x, b.y, b.width, b.height].iter().all(|v| v.is_finite()) {
            log::warn!("Ignoring non-finite face box {} in image {}", face.id, image.id);
            return base;
        }
        let (x, y, width, height) = crop_window(&b, self.options.face_crop_scale);
        CollageCell {
            x,
            y,
            width,
            height,
            ..base
        }
    }
}

impl Default for CollagePlanner {
    fn default() -> Self {
        Self::new(CollageOptions::default())
    }
}

/// Crop window around a face, scaled by `scale` and kept inside the unit
/// square. The face center always lies inside the returned window.
fn crop_window(face: &BoundingBox, scale: f64) -> (f64, f64, f64, f64) {
    let face = face.clamped_to_unit();
    let (cx, cy) = face.center();
    let w = (face.width * scale).max(0.0);
    let h = (face.height * scale).max(0.0);

    let x = (cx - w / 2.0).clamp(0.0, 1.0);
    let y = (cy - h / 2.0).clamp(0.0, 1.0);
    (x, y, (1.0 - x).min(w), (1.0 - y).min(h))
}
