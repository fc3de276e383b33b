//! Sequential multi-document extraction driving.
//!
//! One collaborator call per document, strictly in order, never concurrently.
//! The batch is all-or-nothing: the first per-document failure aborts the run,
//! discards everything accumulated so far, and surfaces a single error naming
//! the offending document. There are no retries and no cancellation.

use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::traits::extractor::Extractor;
use crate::types::document::SourceDocument;
use crate::types::record::RawRecord;

/// Observer for progress, status, and diagnostics during a run.
///
/// Implementations receive the user-facing French strings; `tracing` events
/// are emitted alongside for operational logging. All methods default to
/// no-ops so observers implement only what they need.
pub trait RunObserver: Send {
    /// A one-line user-facing status (replaces the previous one).
    fn on_status(&mut self, _status: &str) {}

    /// About to process document `index` (0-based) of `total`.
    fn on_progress(&mut self, _index: usize, _total: usize, _document: &str) {}

    /// A diagnostic log line (appended to the running log).
    fn on_diagnostic(&mut self, _message: &str) {}
}

/// Observer that ignores everything.
pub struct NullObserver;

impl RunObserver for NullObserver {}

/// Observer that records the latest status and every diagnostic line.
#[derive(Debug, Default)]
pub struct RunLog {
    /// Latest status line.
    pub status: String,

    /// Diagnostic lines in emission order.
    pub lines: Vec<String>,
}

impl RunLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The full diagnostic log as one newline-separated block.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

impl RunObserver for RunLog {
    fn on_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    fn on_diagnostic(&mut self, message: &str) {
        self.lines.push(message.to_string());
    }
}

/// Explicit state of one extraction batch.
#[derive(Debug, PartialEq)]
pub enum RunState {
    /// No document processed yet.
    Idle,

    /// Processing document `index` (0-based) of `total`.
    Running { index: usize, total: usize },

    /// Document `index` failed; the accumulator has been discarded.
    Failed {
        index: usize,
        document: String,
        reason: String,
    },

    /// Every document processed; `records` holds the full accumulation.
    Completed { records: Vec<RawRecord> },
}

/// Driver state for one extraction batch.
///
/// Transitions: `Idle → Running(index) → … → Failed(index, reason)` or
/// `Completed(records)`. Kept separate from the async driving loop so the
/// all-or-nothing contract is testable without any collaborator involved.
#[derive(Debug)]
pub struct ExtractionRun {
    state: RunState,
    accumulated: Vec<RawRecord>,
}

impl ExtractionRun {
    /// Create a run in the `Idle` state.
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            accumulated: Vec::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Number of records accumulated so far (zero after a failure).
    pub fn accumulated_len(&self) -> usize {
        match &self.state {
            RunState::Completed { records } => records.len(),
            _ => self.accumulated.len(),
        }
    }

    /// Move to `Running` for the given document index.
    pub fn advance(&mut self, index: usize, total: usize) {
        self.state = RunState::Running { index, total };
    }

    /// Append one document's records to the accumulator, preserving order.
    pub fn accept(&mut self, records: Vec<RawRecord>) {
        self.accumulated.extend(records);
    }

    /// Record a failure: the run is over and the accumulator is discarded.
    pub fn fail(&mut self, document: impl Into<String>, reason: impl Into<String>) {
        let index = match self.state {
            RunState::Running { index, .. } => index,
            _ => 0,
        };
        self.accumulated.clear();
        self.state = RunState::Failed {
            index,
            document: document.into(),
            reason: reason.into(),
        };
    }

    /// Finish the run, moving the accumulation into the `Completed` state.
    pub fn complete(&mut self) {
        let records = std::mem::take(&mut self.accumulated);
        self.state = RunState::Completed { records };
    }

    /// The accumulated records, if the run completed.
    pub fn into_records(self) -> Option<Vec<RawRecord>> {
        match self.state {
            RunState::Completed { records } => Some(records),
            _ => None,
        }
    }
}

impl Default for ExtractionRun {
    fn default() -> Self {
        Self::new()
    }
}

/// Run extraction over `documents` sequentially, one collaborator call per
/// document, and return the concatenated raw records.
///
/// Before each call the observer receives a progress event
/// `(index, total, document name)`. On success the per-document record count
/// is logged; on failure the batch aborts immediately with
/// [`PipelineError::Extraction`] naming the document, and nothing accumulated
/// is ever handed downstream.
pub async fn run_extraction<E: Extractor + ?Sized>(
    extractor: &E,
    documents: &[SourceDocument],
    section: &str,
    observer: &mut dyn RunObserver,
) -> Result<Vec<RawRecord>> {
    let mut run = ExtractionRun::new();
    let total = documents.len();

    for (index, document) in documents.iter().enumerate() {
        run.advance(index, total);
        observer.on_progress(index, total, &document.name);
        observer.on_diagnostic(&format!(
            "--- Traitement du fichier ({}/{}): {} ---",
            index + 1,
            total,
            document.name
        ));
        info!(document = %document.name, index = index + 1, total, "extraction du document");

        match extractor.extract(document, section).await {
            Ok(records) => {
                observer.on_diagnostic(&format!("✓ {} lots bruts extraits", records.len()));
                debug!(document = %document.name, count = records.len(), "document extrait");
                run.accept(records);
            }
            Err(source) => {
                observer.on_diagnostic(&format!(
                    "✗ Erreur sur le fichier {}: {}",
                    document.name, source
                ));
                warn!(document = %document.name, error = %source, "échec de l'extraction, lot abandonné");
                run.fail(&document.name, source.to_string());
                return Err(PipelineError::Extraction {
                    document: document.name.clone(),
                    source,
                });
            }
        }
    }

    run.complete();
    Ok(run.into_records().unwrap_or_default())
}
