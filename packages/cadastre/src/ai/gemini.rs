//! Gemini implementation of the extraction and synthesis collaborators.
//!
//! A reference implementation over the Generative Language REST API. One
//! client implements both [`Extractor`] and [`Synthesizer`], each with its
//! own model: document extraction wants the stronger model at low
//! temperature with a JSON response contract, synthesis is free text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AiError, AiResult};
use crate::pipeline::prompts::{format_extraction_prompt, format_synthesis_prompt};
use crate::security::credentials::GeminiCredentials;
use crate::traits::extractor::Extractor;
use crate::traits::synthesizer::Synthesizer;
use crate::types::document::{DocumentContent, SourceDocument};
use crate::types::lot::ConsolidatedLot;
use crate::types::record::RawRecord;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_EXTRACTION_MODEL: &str = "gemini-3-pro-preview";
const DEFAULT_SYNTHESIS_MODEL: &str = "gemini-3-flash-preview";

/// Gemini-backed collaborator implementing both extraction and synthesis.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    credentials: GeminiCredentials,
    extraction_model: String,
    synthesis_model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a client from credentials.
    pub fn new(credentials: GeminiCredentials) -> Self {
        let base_url = credentials
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            client: Client::new(),
            credentials,
            extraction_model: DEFAULT_EXTRACTION_MODEL.to_string(),
            synthesis_model: DEFAULT_SYNTHESIS_MODEL.to_string(),
            base_url,
        }
    }

    /// Override the extraction model.
    pub fn with_extraction_model(mut self, model: impl Into<String>) -> Self {
        self.extraction_model = model.into();
        self
    }

    /// Override the synthesis model.
    pub fn with_synthesis_model(mut self, model: impl Into<String>) -> Self {
        self.synthesis_model = model.into();
        self
    }

    /// Issue one generateContent call and return the concatenated candidate
    /// text.
    async fn generate(&self, model: &str, request: &GenerateRequest) -> AiResult<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.credentials.api_key.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| AiError::Api(Box::new(e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api(format!("Gemini HTTP {status}: {body}").into()));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AiError::Api(Box::new(e)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl Extractor for GeminiClient {
    async fn extract(&self, document: &SourceDocument, section: &str) -> AiResult<Vec<RawRecord>> {
        let prompt = format_extraction_prompt(&document.name, section);

        let mut parts = vec![Part::text(prompt)];
        match &document.content {
            DocumentContent::PdfBase64(data) => {
                parts.push(Part::inline(document.content.mime_type(), data.clone()));
            }
            DocumentContent::Html(source) => {
                parts.push(Part::text(source.clone()));
            }
        }

        let request = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: Some("application/json".to_string()),
            },
        };

        let text = self.generate(&self.extraction_model, &request).await?;
        parse_records(&clean_json_fences(&text))
    }
}

#[async_trait]
impl Synthesizer for GeminiClient {
    async fn synthesize(&self, lots: &[ConsolidatedLot]) -> AiResult<String> {
        let prompt = format_synthesis_prompt(lots);

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                response_mime_type: None,
            },
        };

        self.generate(&self.synthesis_model, &request).await
    }
}

/// Strip markdown code fences wrapped around a JSON payload.
fn clean_json_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse the extraction payload, coercing a single top-level object into a
/// one-element sequence.
fn parse_records(json: &str) -> AiResult<Vec<RawRecord>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn inline(mime_type: impl Into<String>, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,

    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_json_fences() {
        assert_eq!(clean_json_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(clean_json_fences("  [1] "), "[1]");
        assert_eq!(clean_json_fences("```\n{}\n```"), "{}");
    }

    #[test]
    fn test_parse_records_array() {
        let json = r#"[{"Le numéro de lot": "15"}, {"Le numéro de lot": "16"}]"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_records_coerces_single_object() {
        let json = r#"{"Le numéro de lot": "15"}"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].lot_number.as_deref(), Some("15"));
    }

    #[test]
    fn test_parse_records_rejects_invalid_json() {
        assert!(matches!(
            parse_records("pas du json"),
            Err(AiError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_fenced_response_roundtrip() {
        let fenced = "```json\n[{\"Le numéro de lot\": \"15\"}]\n```";
        let records = parse_records(&clean_json_fences(fenced)).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_request_serialization_uses_camel_case() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::inline("application/pdf", "QUJD".to_string())],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: Some("application/json".to_string()),
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "application/pdf"
        );
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_response_text_extraction_shape() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "[{"}, {"text": "}]"}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.clone())
            .collect();
        assert_eq!(text, "[{}]");
    }
}
