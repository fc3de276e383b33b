//! The analysis pipeline - the core of the library.
//!
//! Stages, in flow order:
//! - sequential per-document extraction with all-or-nothing failure
//!   ([`orchestrator`])
//! - section/plan filtering ([`filter`])
//! - grouping, deduplication, and quote-part merging ([`aggregate`])
//! - end-to-end coordination with status/diagnostics ([`coordinator`])
//!
//! [`prompts`] holds the French prompt templates for the AI collaborators.

pub mod aggregate;
pub mod coordinator;
pub mod filter;
pub mod orchestrator;
pub mod prompts;

pub use aggregate::{aggregate, flatten_lots};
pub use coordinator::{AnalysisPipeline, AnalysisReport, AnalysisRequest, SynthesisOutcome};
pub use filter::{filter_records, parse_plan_filter};
pub use orchestrator::{
    run_extraction, ExtractionRun, NullObserver, RunLog, RunObserver, RunState,
};
pub use prompts::{format_extraction_prompt, format_synthesis_prompt};
