//! Source documents handed to the extraction collaborator.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::PipelineError;

/// Content of a source document, in the shape the extraction collaborator
/// consumes it.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentContent {
    /// PDF bytes, base64-encoded for inline transport.
    PdfBase64(String),
    /// HTML (or plain text) source, passed through verbatim.
    Html(String),
}

impl DocumentContent {
    /// MIME type advertised to the collaborator.
    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentContent::PdfBase64(_) => "application/pdf",
            DocumentContent::Html(_) => "text/html",
        }
    }
}

/// A named document queued for analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    /// File name shown in progress and error messages.
    pub name: String,

    /// The document content.
    pub content: DocumentContent,
}

impl SourceDocument {
    /// Create a PDF document from already-encoded base64 content.
    pub fn pdf(name: impl Into<String>, base64_content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: DocumentContent::PdfBase64(base64_content.into()),
        }
    }

    /// Create an HTML document from its source text.
    pub fn html(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: DocumentContent::Html(source.into()),
        }
    }

    /// Load a document from disk.
    ///
    /// `.pdf` files are read as bytes and base64-encoded; anything else is
    /// read as HTML text. Read failures surface as
    /// [`PipelineError::DocumentRead`] naming the file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);

        if is_pdf {
            let bytes = std::fs::read(path).map_err(|source| PipelineError::DocumentRead {
                document: name.clone(),
                source,
            })?;
            Ok(Self::pdf(name, STANDARD.encode(bytes)))
        } else {
            let text =
                std::fs::read_to_string(path).map_err(|source| PipelineError::DocumentRead {
                    document: name.clone(),
                    source,
                })?;
            Ok(Self::html(name, text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_types() {
        assert_eq!(
            DocumentContent::PdfBase64(String::new()).mime_type(),
            "application/pdf"
        );
        assert_eq!(
            DocumentContent::Html(String::new()).mime_type(),
            "text/html"
        );
    }

    #[test]
    fn test_from_path_html() {
        let dir = std::env::temp_dir();
        let path = dir.join("cadastre_test_releve.html");
        std::fs::write(&path, "<table><tr><td>CN</td></tr></table>").unwrap();

        let document = SourceDocument::from_path(&path).unwrap();
        assert_eq!(document.name, "cadastre_test_releve.html");
        assert!(matches!(document.content, DocumentContent::Html(ref s) if s.contains("CN")));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_from_path_pdf_is_base64() {
        let dir = std::env::temp_dir();
        let path = dir.join("cadastre_test_releve.pdf");
        std::fs::write(&path, b"%PDF-1.4 fake").unwrap();

        let document = SourceDocument::from_path(&path).unwrap();
        match document.content {
            DocumentContent::PdfBase64(ref data) => {
                assert_eq!(STANDARD.decode(data).unwrap(), b"%PDF-1.4 fake");
            }
            _ => panic!("expected PDF content"),
        }

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_from_path_missing_file_names_document() {
        let err = SourceDocument::from_path("/nonexistent/releve_99.html").unwrap_err();
        assert_eq!(err.document(), Some("releve_99.html"));
    }
}
