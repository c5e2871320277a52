use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;

use gallery_insight_core::clustering::domain::face_clusterer::FaceClusterer;
use gallery_insight_core::clustering::domain::person_cluster::PersonCluster;
use gallery_insight_core::clustering::infrastructure::embedding_face_clusterer::{
    EmbeddingFaceClusterer,
};
use gallery_insight_core::collage::domain::collage_planner::CollagePlanner;
use gallery_insight_core::events::domain::event_namer::EventNamer;
use gallery_insight_core::events::domain::event_segmenter::EventSegmenter;
use gallery_insight_core::pipeline::analysis_logger::LogAnalysisLogger;
use gallery_insight_core::pipeline::analyze_gallery_use_case::AnalyzeGalleryUseCase;
use gallery_insight_core::search::domain::image_ranker::ImageRanker;
use gallery_insight_core::search::domain::search_query::SearchQuery;
use gallery_insight_core::search::infrastructure::face_match_index::FaceMatchIndex;
use gallery_insight_core::search::infrastructure::hybrid_search_index::HybridSearchIndex;
use gallery_insight_core::shared::cancellation::CancellationToken;
use gallery_insight_core::shared::collection::Collection;
use gallery_insight_core::shared::settings::AnalysisSettings;

/// People, events, search and collages for a local photo collection.
#[derive(Parser)]
#[command(name = "gallery-insight")]
struct Cli {
    /// Collection JSON file (array of images or `{ "images": [...] }`).
    #[arg(long)]
    input: PathBuf,

    /// Settings file (defaults to the platform config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Abort the analysis after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Group faces into people.
    People {
        /// Cosine similarity two faces must exceed to be the same person.
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Split the collection into time-based events.
    Events {
        /// Largest gap between consecutive photos of one event.
        #[arg(long)]
        window_minutes: Option<u64>,
    },
    /// Rank photos against a text query and optional query embedding.
    Search {
        text: String,

        /// JSON array holding the query embedding.
        #[arg(long)]
        embedding_file: Option<PathBuf>,

        /// Return at most this many results.
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Find photos of the person whose face embedding is given.
    Identify {
        /// JSON array holding the reference face embedding.
        #[arg(long)]
        embedding_file: PathBuf,

        /// Return at most this many photos.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Lay out a face-aware collage grid.
    Collage {
        #[arg(long)]
        columns: Option<usize>,

        /// Image ids in placement order (defaults to the whole collection).
        ids: Vec<String>,
    },
    /// People, events and optionally a collage in one pass.
    Report {
        /// Include a collage of the collection in its stored order.
        #[arg(long)]
        collage: bool,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut settings = match &cli.config {
        Some(path) => AnalysisSettings::load_from(path)?,
        None => AnalysisSettings::load(),
    };
    apply_overrides(&mut settings, &cli.command);
    settings.validate()?;

    let collection = Collection::load(&cli.input)?;
    log::info!(
        "Loaded {} images from {}",
        collection.len(),
        cli.input.display()
    );

    let cancel = match cli.timeout_ms {
        Some(ms) => CancellationToken::with_timeout(Duration::from_millis(ms)),
        None => CancellationToken::new(),
    };

    match cli.command {
        Command::People { .. } => {
            let faces = collection.faces();
            let clusters =
                EmbeddingFaceClusterer::new(settings.cluster_threshold).cluster(&faces, &cancel)?;
            print_json(&PersonCluster::summarize(&clusters, &faces))
        }
        Command::Events { .. } => {
            let namer = EventNamer::new(settings.utc_offset());
            let segmenter = EventSegmenter::new(settings.event_window(), namer);
            print_json(&segmenter.segment(collection.images()))
        }
        Command::Search {
            text,
            embedding_file,
            top_k,
        } => {
            let mut query = SearchQuery::text(text);
            if let Some(path) = embedding_file {
                query = query.with_embedding(read_embedding(&path)?);
            }
            let index = HybridSearchIndex::new(settings.keyword_weight, settings.embedding_weight);
            print_json(&index.search(&query, collection.images(), top_k, &cancel)?)
        }
        Command::Identify { embedding_file, .. } => {
            let reference = read_embedding(&embedding_file)?;
            let index =
                FaceMatchIndex::new(settings.face_match_threshold, settings.face_match_limit);
            print_json(&index.find_matches(&reference, collection.images(), &cancel)?)
        }
        Command::Collage { ids, .. } => {
            let ids = if ids.is_empty() {
                collection.image_ids()
            } else {
                ids
            };
            let planner = CollagePlanner::new(settings.collage_options());
            print_json(&planner.layout(&ids, |id| collection.get(id))?)
        }
        Command::Report { collage } => {
            let collage_ids = collage.then(|| collection.image_ids());
            let mut use_case =
                AnalyzeGalleryUseCase::from_settings(&settings, Box::new(LogAnalysisLogger::new()));
            print_json(&use_case.execute(&collection, collage_ids.as_deref(), &cancel)?)
        }
    }
}

/// Per-command flags take precedence over the settings file.
fn apply_overrides(settings: &mut AnalysisSettings, command: &Command) {
    match command {
        Command::People {
            threshold: Some(t),
        } => settings.cluster_threshold = *t,
        Command::Events {
            window_minutes: Some(m),
        } => settings.event_window_minutes = *m,
        Command::Identify { limit: Some(n), .. } => settings.face_match_limit = *n,
        Command::Collage {
            columns: Some(c), ..
        } => settings.collage_columns = *c,
        _ => {}
    }
}

fn read_embedding(path: &Path) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("Cannot read embedding file {}: {e}", path.display()))?;
    let embedding: Vec<f32> = serde_json::from_str(&json)
        .map_err(|e| format!("Invalid embedding in {}: {e}", path.display()))?;
    Ok(embedding)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if let Some(config) = &cli.config {
        if !config.exists() {
            return Err(format!("Settings file not found: {}", config.display()).into());
        }
    }
    if cli.timeout_ms == Some(0) {
        return Err("--timeout-ms must be positive".into());
    }
    match &cli.command {
        Command::Search {
            embedding_file: Some(path),
            ..
        }
        | Command::Identify {
            embedding_file: path,
            ..
        } if !path.exists() => {
            Err(format!("Embedding file not found: {}", path.display()).into())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_search_command() {
        let cli = parse(&[
            "gallery-insight",
            "--input",
            "photos.json",
            "search",
            "dog on beach",
            "--top-k",
            "5",
        ]);
        match cli.command {
            Command::Search { text, top_k, embedding_file } => {
                assert_eq!(text, "dog on beach");
                assert_eq!(top_k, Some(5));
                assert!(embedding_file.is_none());
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_collage_ids_are_positional() {
        let cli = parse(&[
            "gallery-insight",
            "--input",
            "p.json",
            "collage",
            "--columns",
            "2",
            "a",
            "b",
        ]);
        match cli.command {
            Command::Collage { columns, ids } => {
                assert_eq!(columns, Some(2));
                assert_eq!(ids, vec!["a", "b"]);
            }
            _ => panic!("expected collage command"),
        }
    }

    #[test]
    fn test_identify_requires_embedding_file() {
        assert!(Cli::try_parse_from(["gallery-insight", "--input", "p.json", "identify"]).is_err());
    }

    #[test]
    fn test_overrides_replace_settings() {
        let mut settings = AnalysisSettings::default();
        apply_overrides(&mut settings, &Command::People { threshold: Some(0.8) });
        apply_overrides(&mut settings, &Command::Events { window_minutes: Some(30) });
        apply_overrides(
            &mut settings,
            &Command::Collage {
                columns: Some(4),
                ids: Vec::new(),
            },
        );
        assert_eq!(settings.cluster_threshold, 0.8);
        assert_eq!(settings.event_window_minutes, 30);
        assert_eq!(settings.collage_columns, 4);
    }

    #[test]
    fn test_absent_flags_keep_settings() {
        let mut settings = AnalysisSettings::default();
        apply_overrides(&mut settings, &Command::People { threshold: None });
        assert_eq!(settings, AnalysisSettings::default());
    }

    #[test]
    fn test_missing_input_rejected() {
        let cli = parse(&["gallery-insight", "--input", "/nonexistent/photos.json", "report"]);
        assert!(validate(&cli).is_err());
    }
}
