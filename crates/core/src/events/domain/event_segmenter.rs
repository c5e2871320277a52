use std::time::Duration;

use crate::events::domain::event::Event;
use crate::events::domain::event_namer::EventNamer;
use crate::shared::constants::DEFAULT_EVENT_WINDOW_MINUTES;
use crate::shared::gallery_image::GalleryImage;

/// Splits a photo set into events wherever consecutive photos are at least
/// the time window apart.
///
/// The gap is measured between consecutive photos, not from the start of
/// the current event, so a long sequence of closely spaced photos stays one
/// event however long it runs in total.
pub struct EventSegmenter {
    time_window: Duration,
    namer: EventNamer,
}

impl EventSegmenter {
    pub fn new(time_window: Duration, namer: EventNamer) -> Self {
        Self { time_window, namer }
    }

    pub fn with_window(time_window: Duration) -> Self {
        Self::new(time_window, EventNamer::default())
    }

    pub fn segment(&self, images: &[GalleryImage]) -> Vec<Event> {
        let mut sorted: Vec<&GalleryImage> = images.iter().collect();
        // Stable: equal timestamps keep input order.
        sorted.sort_by_key(|img| img.capture_timestamp);

        let window_ms = i128::try_from(self.time_window.as_millis()).unwrap_or(i128::MAX);
        let mut runs: Vec<Vec<&GalleryImage>> = Vec::new();
        let mut previous: Option<i64> = None;

        for image in sorted {
            let ts = image.capture_timestamp;
            let starts_new =
                previous.map_or(true, |prev| (ts as i128 - prev as i128) >= window_ms);
            match runs.last_mut() {
                Some(run) if !starts_new => run.push(image),
                _ => runs.push(vec![image]),
            }
            previous = Some(ts);
        }

        let events: Vec<Event> = runs
            .into_iter()
            .enumerate()
            .map(|(i, run)| self.build_event(i, &run))
            .collect();
        log::debug!(
            "Segmented {} images into {} events (window {}s)",
            images.len(),
            events.len(),
            self.time_window.as_secs()
        );
        events
    }

    fn build_event(&self, index: usize, run: &[&GalleryImage]) -> Event {
        let first = run.first().map_or(0, |img| img.capture_timestamp);
        let last = run.last().map_or(first, |img| img.capture_timestamp);
        Event {
            event_id: format!("event-{}", index + 1),
            name: self.namer.name(first),
            image_ids: run.iter().map(|img| img.id.clone()).collect(),
            representative_timestamp: first,
            last_timestamp: last,
        }
    }
}

impl Default for EventSegmenter {
    fn default() -> Self {
        Self::with_window(Duration::from_secs(DEFAULT_EVENT_WINDOW_MINUTES * 60))
    }
}
