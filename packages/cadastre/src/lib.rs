//! Cadastral Property Statement Analysis Library
//!
//! Ingests a batch of heterogeneous property statement documents ("relevés
//! de propriété", PDF or HTML), drives an external per-document extraction
//! service, and reconciles the noisy, duplicated output into a canonical,
//! deduplicated hierarchy of lots grouped by cadastral section and plan.
//!
//! # Pipeline
//!
//! ```text
//! documents → [extraction, sequential, all-or-nothing]
//!           → [section/plan filter]
//!           → [grouping + deduplication + quote-part merging]
//!           → consolidated lot list → synthesis / export
//! ```
//!
//! Extraction and synthesis are external AI collaborators behind traits; the
//! stages in between are pure functions over in-memory data, rebuilt from
//! scratch on every run.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cadastre::{AnalysisPipeline, AnalysisRequest, GeminiClient, GeminiCredentials, RunLog, SourceDocument};
//!
//! let client = GeminiClient::new(GeminiCredentials::new(api_key));
//! let pipeline = AnalysisPipeline::new(client.clone(), client);
//!
//! let documents = vec![SourceDocument::from_path("releve_1.pdf")?];
//! let request = AnalysisRequest::new("CN").with_plan_filter("032, 44");
//!
//! let mut log = RunLog::new();
//! let report = pipeline.analyze(&documents, &request, &mut log).await?;
//! cadastre::export::write_xlsx(&report.lots, "analyse.xlsx")?;
//! ```
//!
//! # Modules
//!
//! - [`types`] - Wire records, consolidated lots, source documents
//! - [`normalize`] - Canonical comparison keys and owner-set signatures
//! - [`pipeline`] - Filter, aggregation, orchestration, coordination, prompts
//! - [`traits`] - Collaborator seams ([`Extractor`], [`Synthesizer`])
//! - [`ai`] - Gemini reference collaborator
//! - [`export`] - Tabular export of the consolidated lot list
//! - [`security`] - Credential handling
//! - [`testing`] - Mock collaborators for tests

pub mod ai;
pub mod error;
pub mod export;
pub mod normalize;
pub mod pipeline;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{AiError, AiResult, PipelineError, Result};
pub use traits::{extractor::Extractor, synthesizer::Synthesizer};
pub use types::{
    document::{DocumentContent, SourceDocument},
    lot::{AggregationResult, ConsolidatedLot, LotGroup, Owner},
    record::{OwnersField, RawOwner, RawRecord},
};

// Re-export the pipeline stages and coordinator
pub use pipeline::{
    aggregate, filter_records, flatten_lots, parse_plan_filter, run_extraction, AnalysisPipeline,
    AnalysisReport, AnalysisRequest, ExtractionRun, NullObserver, RunLog, RunObserver, RunState,
    SynthesisOutcome,
};

// Re-export normalization primitives
pub use normalize::{canonicalize_owners, normalize_lot_key, normalize_plan, normalize_section};

// Re-export the Gemini collaborator and its credentials
pub use ai::GeminiClient;
pub use security::{GeminiCredentials, SecretString};

// Re-export export helpers
pub use export::{build_export_table, export_filename, to_csv, write_xlsx, ExportTable};

// Re-export testing utilities
pub use testing::{MockExtractor, MockExtractorCall, MockSynthesizer};
