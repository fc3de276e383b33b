//! Typed errors for the analysis pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Display messages are the
//! user-facing French strings shown by the product surface.

use thiserror::Error;

/// Errors surfaced by the external AI collaborators (extraction, synthesis).
#[derive(Debug, Error)]
pub enum AiError {
    /// The collaborator returned an empty body.
    #[error("l'IA n'a pas retourné de données")]
    EmptyResponse,

    /// The collaborator returned text that is not valid JSON for the
    /// expected record shape.
    #[error("la réponse de l'IA n'est pas un JSON valide: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Transport or API-level failure.
    #[error("erreur de l'API: {0}")]
    Api(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors that abort or degrade an analysis run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A document's content could not be obtained.
    #[error("échec de lecture du fichier {document}")]
    DocumentRead {
        /// Name of the offending document.
        document: String,
        #[source]
        source: std::io::Error,
    },

    /// Extraction failed for one document. The whole batch is discarded:
    /// partial results are never handed to the downstream stages.
    #[error("échec du traitement du fichier {document}")]
    Extraction {
        /// Name of the offending document.
        document: String,
        #[source]
        source: AiError,
    },

    /// Synthesis failed. The already-computed consolidated lot list remains
    /// valid and exportable.
    #[error("échec de la synthèse: {0}")]
    Synthesis(#[source] AiError),

    /// Spreadsheet generation failed. In-memory state is untouched and the
    /// export can be retried.
    #[error("échec de l'export: {0}")]
    Export(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An analysis was started while another one was still active.
    #[error("une analyse est déjà en cours")]
    RunInProgress,
}

impl PipelineError {
    /// The document this error concerns, when it is a per-document failure.
    pub fn document(&self) -> Option<&str> {
        match self {
            PipelineError::DocumentRead { document, .. }
            | PipelineError::Extraction { document, .. } => Some(document),
            _ => None,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for collaborator calls.
pub type AiResult<T> = std::result::Result<T, AiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_error_names_document() {
        let err = PipelineError::Extraction {
            document: "releve_12.pdf".to_string(),
            source: AiError::EmptyResponse,
        };
        assert_eq!(err.document(), Some("releve_12.pdf"));
        assert!(err.to_string().contains("releve_12.pdf"));
    }

    #[test]
    fn test_synthesis_error_has_no_document() {
        let err = PipelineError::Synthesis(AiError::EmptyResponse);
        assert_eq!(err.document(), None);
    }
}
