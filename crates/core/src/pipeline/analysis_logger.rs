use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for analysis orchestration events.
///
/// Decouples use cases from specific output mechanisms so the CLI, tests
/// and embedding applications can each observe stage timings without
/// touching the orchestration code.
pub trait AnalysisLogger: Send {
    /// Report stage-level progress.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named analysis stage took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. cluster count, dropped images).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-analysis summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullAnalysisLogger;

impl AnalysisLogger for NullAnalysisLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger that records per-stage timings and metrics and reports them
/// through the `log` facade.
pub struct LogAnalysisLogger {
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    stages_done: usize,
    messages: Vec<String>,
}

impl LogAnalysisLogger {
    pub fn new() -> Self {
        Self {
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            stages_done: 0,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Analysis summary ({} stages, {:.1}ms total):",
            self.stages_done, elapsed_ms
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let total_ms: f64 = self.timings[stage].iter().sum();
            lines.push(format!("  {stage:10}: {total_ms:8.2}ms"));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            let values = &self.metrics[name];
            let last = values.last().copied().unwrap_or_default();
            lines.push(format!("  {name}: {last}"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl Default for LogAnalysisLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisLogger for LogAnalysisLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.stages_done = current;
        log::debug!("Analysis stage {current}/{total} complete");
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullAnalysisLogger;
        logger.progress(1, 3);
        logger.timing("clustering", 5.0);
        logger.metric("persons", 3.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = LogAnalysisLogger::new();
        logger.timing("clustering", 20.0);
        logger.timing("clustering", 30.0);
        logger.timing("events", 5.0);

        let clustering = logger.timings_for("clustering").unwrap();
        assert_eq!(clustering, &[20.0, 30.0]);
        assert_eq!(logger.timings_for("events").unwrap(), &[5.0]);
        assert!(logger.timings_for("collage").is_none());
    }

    #[test]
    fn test_metric_records_values() {
        let mut logger = LogAnalysisLogger::new();
        logger.metric("persons", 3.0);
        logger.metric("persons", 4.0);
        assert_eq!(logger.metrics_for("persons").unwrap(), &[3.0, 4.0]);
    }

    #[test]
    fn test_summary_lists_stages_and_metrics() {
        let mut logger = LogAnalysisLogger::new();
        logger.progress(2, 3);
        logger.timing("clustering", 12.5);
        logger.timing("events", 1.0);
        logger.metric("events", 4.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Analysis summary (2 stages"));
        assert!(summary.contains("clustering"));
        assert!(summary.contains("events: 4"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(LogAnalysisLogger::new().summary_string().is_none());
    }

    #[test]
    fn test_info_stores_messages() {
        let mut logger = LogAnalysisLogger::new();
        logger.info("hello world");
        assert_eq!(logger.messages(), &["hello world".to_string()]);
    }
}
