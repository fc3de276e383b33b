//! End-to-end analysis coordination.
//!
//! Composes the pipeline: sequential extraction → section/plan filter →
//! grouping/deduplication → flatten → synthesis. Owns the single in-flight
//! flag: one run per pipeline at a time, results rebuilt from scratch on
//! every run.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{PipelineError, Result};
use crate::pipeline::aggregate::{aggregate, flatten_lots};
use crate::pipeline::filter::filter_records;
use crate::pipeline::orchestrator::{run_extraction, RunObserver};
use crate::traits::extractor::Extractor;
use crate::traits::synthesizer::Synthesizer;
use crate::types::document::SourceDocument;
use crate::types::lot::{AggregationResult, ConsolidatedLot};

/// Filters for one analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Cadastral section to search for (mandatory, e.g. "CN").
    pub section: String,

    /// Optional comma-separated plan whitelist (e.g. "32, 044"); empty means
    /// no plan filtering.
    pub plan_filter: String,
}

impl AnalysisRequest {
    /// Create a request for a section, with no plan filter.
    pub fn new(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            plan_filter: String::new(),
        }
    }

    /// Set the plan whitelist.
    pub fn with_plan_filter(mut self, plan_filter: impl Into<String>) -> Self {
        self.plan_filter = plan_filter.into();
        self
    }
}

/// Outcome of the synthesis step of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisOutcome {
    /// No lots survived filtering; synthesis was not attempted.
    Skipped,

    /// Free-text commentary from the synthesis collaborator.
    Completed(String),

    /// Synthesis failed; the consolidated lots of the run remain valid and
    /// exportable.
    Failed(String),
}

/// Everything produced by one analysis run.
#[derive(Debug)]
pub struct AnalysisReport {
    /// Identifier of this run.
    pub run_id: Uuid,

    /// Raw records across all documents, before filtering.
    pub raw_count: usize,

    /// Records that survived the section/plan filter.
    pub filtered_count: usize,

    /// Groups in first-insertion order.
    pub groups: AggregationResult,

    /// Flattened consolidated lots, in display order.
    pub lots: Vec<ConsolidatedLot>,

    /// What happened to the synthesis step.
    pub synthesis: SynthesisOutcome,
}

/// Coordinates the full analysis pipeline over a set of documents.
///
/// Only one run may be in flight at a time; a second concurrent `analyze`
/// fails with [`PipelineError::RunInProgress`]. The extraction and synthesis
/// collaborators are injected; the engine stages in between are pure.
pub struct AnalysisPipeline<E, S> {
    extractor: E,
    synthesizer: S,
    in_flight: AtomicBool,
}

impl<E: Extractor, S: Synthesizer> AnalysisPipeline<E, S> {
    /// Create a pipeline over the given collaborators.
    pub fn new(extractor: E, synthesizer: S) -> Self {
        Self {
            extractor,
            synthesizer,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Get a reference to the extraction collaborator.
    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Get a reference to the synthesis collaborator.
    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    /// Run extraction, filtering, aggregation, and synthesis over `documents`.
    ///
    /// Extraction failures abort the run before any stage sees partial data.
    /// A synthesis failure is recorded in the report without invalidating the
    /// consolidated lots.
    pub async fn analyze(
        &self,
        documents: &[SourceDocument],
        request: &AnalysisRequest,
        observer: &mut dyn RunObserver,
    ) -> Result<AnalysisReport> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        let run_id = Uuid::new_v4();

        observer.on_diagnostic("Début de l'analyse...");
        info!(%run_id, documents = documents.len(), section = %request.section, "début de l'analyse");

        let raw = {
            let mut phase = ExtractionPhaseObserver {
                inner: &mut *observer,
            };
            run_extraction(&self.extractor, documents, &request.section, &mut phase).await?
        };
        let raw_count = raw.len();

        observer.on_status("2/3: Filtrage, dédoublonnage et agrégation des données...");
        observer.on_diagnostic("--- PHASE 2: FILTRAGE ET AGRÉGATION ---");
        observer.on_diagnostic(&format!("Total des lots extraits: {raw_count}"));

        let filtered = filter_records(raw, &request.section, &request.plan_filter);
        let filtered_count = filtered.len();
        observer.on_diagnostic(&format!("Lots après filtrage: {filtered_count}"));

        let groups = aggregate(filtered);
        observer.on_diagnostic(&format!("Groupes agrégés: {}", groups.len()));

        let lots = flatten_lots(&groups);
        observer.on_diagnostic(&format!("Lots uniques finaux: {}", lots.len()));

        let synthesis = if lots.is_empty() {
            observer.on_status("Aucune donnée trouvée correspondant aux filtres.");
            SynthesisOutcome::Skipped
        } else {
            observer.on_status(&format!(
                "Extraction terminée. {} lots uniques trouvés.",
                lots.len()
            ));
            observer.on_status("3/3: Génération de la synthèse par IA...");
            match self.synthesizer.synthesize(&lots).await {
                Ok(text) => {
                    observer.on_status("Analyse terminée.");
                    SynthesisOutcome::Completed(text)
                }
                Err(source) => {
                    let error = PipelineError::Synthesis(source);
                    observer.on_diagnostic(&format!("✗ {error}"));
                    warn!(%run_id, error = %error, "échec de la synthèse");
                    SynthesisOutcome::Failed(error.to_string())
                }
            }
        };

        info!(%run_id, lots = lots.len(), groups = groups.len(), "analyse terminée");
        Ok(AnalysisReport {
            run_id,
            raw_count,
            filtered_count,
            groups,
            lots,
            synthesis,
        })
    }

    /// Re-run only the synthesis step over an existing lot list.
    pub async fn synthesize(&self, lots: &[ConsolidatedLot]) -> Result<String> {
        self.synthesizer
            .synthesize(lots)
            .await
            .map_err(PipelineError::Synthesis)
    }
}

/// Adapter that turns orchestrator progress events into the per-file phase-1
/// status lines, forwarding everything else untouched.
struct ExtractionPhaseObserver<'a> {
    inner: &'a mut dyn RunObserver,
}

impl RunObserver for ExtractionPhaseObserver<'_> {
    fn on_status(&mut self, status: &str) {
        self.inner.on_status(status);
    }

    fn on_progress(&mut self, index: usize, total: usize, document: &str) {
        self.inner.on_status(&format!(
            "1/3: Extraction des données du fichier {document} ({}/{total})",
            index + 1
        ));
        self.inner.on_progress(index, total, document);
    }

    fn on_diagnostic(&mut self, message: &str) {
        self.inner.on_diagnostic(message);
    }
}

/// RAII guard over the single in-flight flag.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| PipelineError::RunInProgress)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
