//! Extraction collaborator seam.

use async_trait::async_trait;

use crate::error::AiResult;
use crate::types::document::SourceDocument;
use crate::types::record::RawRecord;

/// External per-document extraction service.
///
/// Given one source document and the cadastral section being searched,
/// returns the raw candidate rows found in that document. Implementations
/// must either return structured records or fail; shape quirks of the
/// underlying service (code fences around the JSON array, a single top-level
/// object instead of a sequence) are normalized before this boundary is
/// crossed.
///
/// The orchestrator calls this once per document, sequentially, and treats
/// any error as fatal for the whole batch.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract raw records from `document` for the given section.
    async fn extract(&self, document: &SourceDocument, section: &str) -> AiResult<Vec<RawRecord>>;
}
