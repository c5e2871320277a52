use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized face rectangle: `x, y, width, height` in `[0, 1]`, top-left origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Intersects the box with the unit square.
    ///
    /// Detectors occasionally report boxes that spill past the image edge;
    /// the visible part is what matters for cropping.
    pub fn clamped_to_unit(&self) -> BoundingBox {
        if self.is_within_unit() {
            return *self;
        }
        let x1 = self.x.clamp(0.0, 1.0);
        let y1 = self.y.clamp(0.0, 1.0);
        let x2 = (self.x + self.width).clamp(0.0, 1.0);
        let y2 = (self.y + self.height).clamp(0.0, 1.0);
        BoundingBox {
            x: x1,
            y: y1,
            width: (x2 - x1).max(0.0),
            height: (y2 - y1).max(0.0),
        }
    }

    fn is_within_unit(&self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width >= 0.0
            && self.height >= 0.0
            && self.x + self.width <= 1.0
            && self.y + self.height <= 1.0
    }
}

/// A face found by the detection collaborator inside one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceDetection {
    /// Unique within the owning image only.
    pub id: String,
    pub bounding_box: BoundingBox,
    pub confidence: f64,
    /// Per-face identity embedding. Takes precedence over the image embedding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timestamp")]
    pub capture_timestamp: i64,
    #[serde(default)]
    pub faces: Vec<FaceDetection>,
    #[serde(default)]
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub description: String,
}

impl GalleryImage {
    /// Highest-confidence face; the earliest one wins ties.
    pub fn primary_face(&self) -> Option<&FaceDetection> {
        self.faces.iter().fold(None, |best, face| match best {
            Some(b) if b.confidence >= face.confidence => Some(b),
            _ => Some(face),
        })
    }
}

/// Globally unique face identifier: face ids only need to be unique per image.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceKey {
    pub image_id: String,
    pub face_id: String,
}

impl FaceKey {
    pub fn new(image_id: impl Into<String>, face_id: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            face_id: face_id.into(),
        }
    }
}

impl fmt::Display for FaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.image_id, self.face_id)
    }
}

/// A face together with its owning image and resolved identity embedding.
///
/// Built once from the collection and shared by every engine that needs
/// per-face data, so the embedding fallback rule lives in one place.
#[derive(Clone, Copy, Debug)]
pub struct FaceWithContext<'a> {
    pub face: &'a FaceDetection,
    pub image_id: &'a str,
    pub capture_timestamp: i64,
    pub identity_embedding: &'a [f32],
}

impl<'a> FaceWithContext<'a> {
    pub fn from_image(image: &'a GalleryImage) -> Vec<FaceWithContext<'a>> {
        image
            .faces
            .iter()
            .map(|face| FaceWithContext {
                face,
                image_id: &image.id,
                capture_timestamp: image.capture_timestamp,
                identity_embedding: face.embedding.as_deref().unwrap_or(&image.embedding),
            })
            .collect()
    }

    pub fn key(&self) -> FaceKey {
        FaceKey::new(self.image_id, &self.face.id)
    }
}
