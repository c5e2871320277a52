use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collage::domain::collage_planner::CollageOptions;
use crate::shared::constants::*;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write settings {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Tunable parameters for every analysis, persisted as JSON.
///
/// Missing fields fall back to their defaults so older settings files keep
/// loading after new knobs are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisSettings {
    pub cluster_threshold: f64,
    pub keyword_weight: f64,
    pub embedding_weight: f64,
    pub event_window_minutes: u64,
    /// Offset used when naming events by local weekday and time of day.
    pub utc_offset_minutes: i32,
    pub collage_columns: usize,
    pub collage_rows: usize,
    pub face_crop_scale: f64,
    pub recenter_on_faces: bool,
    pub face_match_threshold: f64,
    pub face_match_limit: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            cluster_threshold: DEFAULT_CLUSTER_THRESHOLD,
            keyword_weight: DEFAULT_KEYWORD_WEIGHT,
            embedding_weight: DEFAULT_EMBEDDING_WEIGHT,
            event_window_minutes: DEFAULT_EVENT_WINDOW_MINUTES,
            utc_offset_minutes: 0,
            collage_columns: DEFAULT_COLLAGE_COLUMNS,
            collage_rows: DEFAULT_COLLAGE_ROWS,
            face_crop_scale: DEFAULT_FACE_CROP_SCALE,
            recenter_on_faces: true,
            face_match_threshold: DEFAULT_FACE_MATCH_THRESHOLD,
            face_match_limit: DEFAULT_FACE_MATCH_LIMIT,
        }
    }
}

impl AnalysisSettings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Loads from the platform config directory, falling back to defaults
    /// when the file is absent or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring settings at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(write_err)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(-1.0..=1.0).contains(&self.cluster_threshold) {
            return Err(SettingsError::Invalid(format!(
                "clusterThreshold must be between -1.0 and 1.0, got {}",
                self.cluster_threshold
            )));
        }
        if !(-1.0..=1.0).contains(&self.face_match_threshold) {
            return Err(SettingsError::Invalid(format!(
                "faceMatchThreshold must be between -1.0 and 1.0, got {}",
                self.face_match_threshold
            )));
        }
        let weight_ok = |w: f64| w.is_finite() && w >= 0.0;
        if !weight_ok(self.keyword_weight) || !weight_ok(self.embedding_weight) {
            return Err(SettingsError::Invalid(
                "search weights must be finite and non-negative".to_string(),
            ));
        }
        if self.collage_columns == 0 || self.collage_rows == 0 {
            return Err(SettingsError::Invalid(format!(
                "collage grid must be at least 1x1, got {}x{}",
                self.collage_columns, self.collage_rows
            )));
        }
        if !self.face_crop_scale.is_finite() || self.face_crop_scale <= 0.0 {
            return Err(SettingsError::Invalid(format!(
                "faceCropScale must be positive, got {}",
                self.face_crop_scale
            )));
        }
        if FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).is_none() {
            return Err(SettingsError::Invalid(format!(
                "utcOffsetMinutes out of range: {}",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    pub fn event_window(&self) -> Duration {
        Duration::from_secs(self.event_window_minutes.saturating_mul(60))
    }

    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }

    pub fn collage_options(&self) -> CollageOptions {
        CollageOptions {
            columns: self.collage_columns,
            rows: self.collage_rows,
            face_crop_scale: self.face_crop_scale,
            recenter_on_faces: self.recenter_on_faces,
        }
    }
}
