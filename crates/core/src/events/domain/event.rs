use serde::{Deserialize, Serialize};

/// A maximal run of photos with no internal gap longer than the time window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_id: String,
    pub name: String,
    /// Chronological; equal timestamps keep input order.
    pub image_ids: Vec<String>,
    /// Timestamp of the earliest member, ms since epoch.
    pub representative_timestamp: i64,
    pub last_timestamp: i64,
}

impl Event {
    pub fn len(&self) -> usize {
        self.image_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image_ids.is_empty()
    }

    pub fn duration_ms(&self) -> i64 {
        self.last_timestamp - self.representative_timestamp
    }
}
