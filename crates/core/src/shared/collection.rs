use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::shared::gallery_image::{FaceWithContext, GalleryImage};

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("failed to read collection {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed collection: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate image id: {0}")]
    DuplicateImageId(String),
}

/// Accepted on-disk shapes: a bare array or an object with an `images` field.
#[derive(Deserialize)]
#[serde(untagged)]
enum CollectionFile {
    Bare(Vec<GalleryImage>),
    Wrapped { images: Vec<GalleryImage> },
}

/// Immutable snapshot of the caller's photo collection.
///
/// Engines only ever borrow from it. Callers that mutate their live
/// collection concurrently must hand the engines a separate snapshot.
#[derive(Clone, Debug, Default)]
pub struct Collection {
    images: Vec<GalleryImage>,
    index: HashMap<String, usize>,
}

impl Collection {
    pub fn new(images: Vec<GalleryImage>) -> Result<Self, CollectionError> {
        let mut index = HashMap::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            if index.insert(image.id.clone(), i).is_some() {
                return Err(CollectionError::DuplicateImageId(image.id.clone()));
            }
        }
        Ok(Self { images, index })
    }

    pub fn load(path: &Path) -> Result<Self, CollectionError> {
        let file = File::open(path).map_err(|source| CollectionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, CollectionError> {
        let images = match serde_json::from_reader(reader)? {
            CollectionFile::Bare(images) => images,
            CollectionFile::Wrapped { images } => images,
        };
        let collection = Self::new(images)?;
        log::debug!("Loaded collection with {} images", collection.len());
        Ok(collection)
    }

    pub fn images(&self) -> &[GalleryImage] {
        &self.images
    }

    pub fn get(&self, id: &str) -> Option<&GalleryImage> {
        self.index.get(id).map(|&i| &self.images[i])
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn image_ids(&self) -> Vec<String> {
        self.images.iter().map(|img| img.id.clone()).collect()
    }

    /// Every face in collection order, paired with its owning image.
    pub fn faces(&self) -> Vec<FaceWithContext<'_>> {
        self.images
            .iter()
            .flat_map(FaceWithContext::from_image)
            .collect()
    }
}
