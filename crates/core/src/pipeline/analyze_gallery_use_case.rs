use std::time::Instant;

use serde::Serialize;

use crate::clustering::domain::face_clusterer::FaceClusterer;
use crate::clustering::domain::person_cluster::{PersonCluster, PersonSummary};
use crate::clustering::infrastructure::embedding_face_clusterer::EmbeddingFaceClusterer;
use crate::collage::domain::collage_layout::CollageLayout;
use crate::collage::domain::collage_planner::CollagePlanner;
use crate::events::domain::event::Event;
use crate::events::domain::event_namer::EventNamer;
use crate::events::domain::event_segmenter::EventSegmenter;
use crate::pipeline::analysis_logger::AnalysisLogger;
use crate::shared::analysis_error::AnalysisError;
use crate::shared::cancellation::CancellationToken;
use crate::shared::collection::Collection;
use crate::shared::settings::AnalysisSettings;

/// Everything the gallery views need from one pass over a collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryReport {
    pub image_count: usize,
    pub people: Vec<PersonSummary>,
    pub events: Vec<Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collage: Option<CollageLayout>,
}

/// Runs people clustering, event segmentation and an optional collage
/// against one collection snapshot, timing each stage.
pub struct AnalyzeGalleryUseCase {
    clusterer: Box<dyn FaceClusterer>,
    segmenter: EventSegmenter,
    planner: CollagePlanner,
    logger: Box<dyn AnalysisLogger>,
}

impl AnalyzeGalleryUseCase {
    pub fn new(
        clusterer: Box<dyn FaceClusterer>,
        segmenter: EventSegmenter,
        planner: CollagePlanner,
        logger: Box<dyn AnalysisLogger>,
    ) -> Self {
        Self {
            clusterer,
            segmenter,
            planner,
            logger,
        }
    }

    pub fn from_settings(settings: &AnalysisSettings, logger: Box<dyn AnalysisLogger>) -> Self {
        Self::new(
            Box::new(EmbeddingFaceClusterer::new(settings.cluster_threshold)),
            EventSegmenter::new(settings.event_window(), EventNamer::new(settings.utc_offset())),
            CollagePlanner::new(settings.collage_options()),
            logger,
        )
    }

    /// Analyzes `collection`. A collage is only laid out when
    /// `collage_ids` is given.
    pub fn execute(
        &mut self,
        collection: &Collection,
        collage_ids: Option<&[String]>,
        cancel: &CancellationToken,
    ) -> Result<GalleryReport, AnalysisError> {
        let total_stages = if collage_ids.is_some() { 3 } else { 2 };

        let start = Instant::now();
        let faces = collection.faces();
        let clusters = self.clusterer.cluster(&faces, cancel)?;
        let people = PersonCluster::summarize(&clusters, &faces);
        self.logger.timing("clustering", elapsed_ms(start));
        self.logger.metric("faces", faces.len() as f64);
        self.logger.metric("people", people.len() as f64);
        self.logger.progress(1, total_stages);

        cancel.check()?;
        let start = Instant::now();
        let events = self.segmenter.segment(collection.images());
        self.logger.timing("events", elapsed_ms(start));
        self.logger.metric("events", events.len() as f64);
        self.logger.progress(2, total_stages);

        let collage = match collage_ids {
            Some(ids) => {
                cancel.check()?;
                let start = Instant::now();
                let layout = self.planner.layout(ids, |id| collection.get(id))?;
                self.logger.timing("collage", elapsed_ms(start));
                self.logger
                    .metric("collage_dropped", layout.dropped_image_ids.len() as f64);
                self.logger.progress(3, total_stages);
                Some(layout)
            }
            None => None,
        };

        self.logger.info(&format!(
            "Analyzed {} images: {} people, {} events",
            collection.len(),
            people.len(),
            events.len()
        ));
        self.logger.summary();

        Ok(GalleryReport {
            image_count: collection.len(),
            people,
            events,
            collage,
        })
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analysis_logger::NullAnalysisLogger;
    use crate::shared::gallery_image::test_support::portrait;
    use crate::shared::gallery_image::GalleryImage;
    use std::sync::{Arc, Mutex};

    const HOUR_MS: i64 = 3_600_000;

    #[derive(Clone, Default)]
    struct RecordingLogger {
        stages: Arc<Mutex<Vec<String>>>,
    }

    impl AnalysisLogger for RecordingLogger {
        fn progress(&mut self, _current: usize, _total: usize) {}
        fn timing(&mut self, stage: &str, _duration_ms: f64) {
            self.stages.lock().unwrap().push(stage.to_string());
        }
        fn metric(&mut self, _name: &str, _value: f64) {}
        fn info(&mut self, _message: &str) {}
    }

    fn at(mut image: GalleryImage, ts: i64) -> GalleryImage {
        image.capture_timestamp = ts;
        image
    }

    fn sample_collection() -> Collection {
        Collection::new(vec![
            at(portrait("alice-1", vec![1.0, 0.0]), 0),
            at(portrait("alice-2", vec![0.95, 0.05]), HOUR_MS),
            at(portrait("bob-1", vec![0.0, 1.0]), 10 * HOUR_MS),
        ])
        .unwrap()
    }

    fn use_case() -> AnalyzeGalleryUseCase {
        AnalyzeGalleryUseCase::from_settings(
            &AnalysisSettings::default(),
            Box::new(NullAnalysisLogger),
        )
    }

    #[test]
    fn test_report_without_collage() {
        let collection = sample_collection();
        let report = use_case()
            .execute(&collection, None, &CancellationToken::new())
            .unwrap();

        assert_eq!(report.image_count, 3);
        assert_eq!(report.people.len(), 2);
        assert_eq!(report.people[0].name, "Person 1");
        assert_eq!(report.people[0].image_ids, vec!["alice-1", "alice-2"]);
        assert_eq!(report.people[1].image_ids, vec!["bob-1"]);

        assert_eq!(report.events.len(), 2);
        assert_eq!(report.events[0].image_ids, vec!["alice-1", "alice-2"]);
        assert!(report.collage.is_none());
    }

    #[test]
    fn test_report_with_collage() {
        let collection = sample_collection();
        let ids = vec!["bob-1".to_string(), "missing".to_string()];
        let report = use_case()
            .execute(&collection, Some(&ids), &CancellationToken::new())
            .unwrap();

        let collage = report.collage.unwrap();
        assert_eq!(collage.cells.len(), 2);
        assert_eq!(collage.cells[0].image_id, "bob-1");
        assert!(collage.dropped_image_ids.is_empty());
    }

    #[test]
    fn test_each_stage_is_timed() {
        let logger = RecordingLogger::default();
        let stages = Arc::clone(&logger.stages);
        let mut use_case =
            AnalyzeGalleryUseCase::from_settings(&AnalysisSettings::default(), Box::new(logger));

        let ids = vec!["alice-1".to_string()];
        use_case
            .execute(&sample_collection(), Some(&ids), &CancellationToken::new())
            .unwrap();

        assert_eq!(*stages.lock().unwrap(), vec!["clustering", "events", "collage"]);
    }

    #[test]
    fn test_invalid_collage_settings_fail() {
        let settings = AnalysisSettings {
            collage_columns: 0,
            ..AnalysisSettings::default()
        };
        let mut use_case =
            AnalyzeGalleryUseCase::from_settings(&settings, Box::new(NullAnalysisLogger));
        let ids = vec!["alice-1".to_string()];
        let err = use_case
            .execute(&sample_collection(), Some(&ids), &CancellationToken::new())
            .unwrap_err();
        assert_eq!(err, AnalysisError::InvalidColumnCount(0));
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let err = use_case()
            .execute(&sample_collection(), None, &token)
            .unwrap_err();
        assert_eq!(err, AnalysisError::Cancelled);
    }

    #[test]
    fn test_concurrent_runs_over_one_snapshot_agree() {
        let collection = sample_collection();
        let cancel = CancellationToken::new();

        let reports: Vec<GalleryReport> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| use_case().execute(&collection, None, &cancel)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect()
        });

        for report in &reports[1..] {
            assert_eq!(report, &reports[0]);
        }
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = use_case()
            .execute(&sample_collection(), None, &CancellationToken::new())
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["imageCount"], 3);
        assert!(json.get("collage").is_none());
    }
}
