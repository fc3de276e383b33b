//! Mock collaborators for testing without network or AI calls.
//!
//! These are useful for testing applications built on the pipeline as well
//! as the pipeline itself: canned per-document records, failure injection,
//! and call tracking for assertions.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AiError, AiResult};
use crate::traits::extractor::Extractor;
use crate::traits::synthesizer::Synthesizer;
use crate::types::document::SourceDocument;
use crate::types::lot::ConsolidatedLot;
use crate::types::record::RawRecord;

/// Record of a call made to [`MockExtractor`].
#[derive(Debug, Clone)]
pub struct MockExtractorCall {
    /// Document name the extractor was called with.
    pub document: String,

    /// Section the extractor was asked for.
    pub section: String,
}

/// Extraction collaborator returning canned records per document name.
#[derive(Default)]
pub struct MockExtractor {
    records: Arc<RwLock<HashMap<String, Vec<RawRecord>>>>,
    fail_documents: Arc<RwLock<Vec<String>>>,
    delay: Option<Duration>,
    calls: Arc<RwLock<Vec<MockExtractorCall>>>,
}

impl MockExtractor {
    /// Create a mock returning no records for every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Canned records for a document name.
    pub fn with_records(self, document: impl Into<String>, records: Vec<RawRecord>) -> Self {
        self.records.write().unwrap().insert(document.into(), records);
        self
    }

    /// Make extraction fail for a document name.
    pub fn fail_document(self, document: impl Into<String>) -> Self {
        self.fail_documents.write().unwrap().push(document.into());
        self
    }

    /// Delay every call (for exercising the in-flight guard).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// All calls made to this mock, in order.
    pub fn calls(&self) -> Vec<MockExtractorCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, document: &SourceDocument, section: &str) -> AiResult<Vec<RawRecord>> {
        self.calls.write().unwrap().push(MockExtractorCall {
            document: document.name.clone(),
            section: section.to_string(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self
            .fail_documents
            .read()
            .unwrap()
            .contains(&document.name)
        {
            return Err(AiError::Api("panne simulée du service d'extraction".into()));
        }

        Ok(self
            .records
            .read()
            .unwrap()
            .get(&document.name)
            .cloned()
            .unwrap_or_default())
    }
}

/// Synthesis collaborator returning canned text.
#[derive(Default)]
pub struct MockSynthesizer {
    response: Option<String>,
    should_fail: bool,
    calls: Arc<RwLock<Vec<usize>>>,
}

impl MockSynthesizer {
    /// Create a mock producing a default report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose every call fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Canned response text.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    /// Lot counts of every call made to this mock, in order.
    pub fn calls(&self) -> Vec<usize> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(&self, lots: &[ConsolidatedLot]) -> AiResult<String> {
        self.calls.write().unwrap().push(lots.len());

        if self.should_fail {
            return Err(AiError::Api("panne simulée du service de synthèse".into()));
        }

        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| format!("Synthèse de {} lots.", lots.len())))
    }
}
