
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::GeminiConfig;
use crate::services::{EmbeddingService, GenerationService};
use crate::{PdfChatError, Result};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Blocking client for the Gemini embedding and generation APIs.
///
/// Remote failures are fatal to the current operation: there is no retry,
/// no backoff, and no degraded fallback.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    base_url: Url,
    api_key: String,
    embedding_model: String,
    generation_model: String,
    temperature: f32,
    batch_size: u32,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    content: Content,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationSettings,
}

#[derive(Debug, Serialize)]
struct GenerationSettings {
    temperature: f32,
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
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

impl GeminiClient {
    #[inline]
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| PdfChatError::Config(format!("invalid Gemini base URL: {}", e)))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            embedding_model: config.embedding_model.clone(),
            generation_model: config.generation_model.clone(),
            temperature: config.temperature,
            batch_size: config.batch_size,
            agent,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    /// Build the URL for a model action, with the credential as a query
    /// parameter the way the hosted API expects it.
    fn endpoint(&self, model: &str, action: &str) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("/v1beta/models/{}:{}", model, action))
            .map_err(|e| PdfChatError::Config(format!("failed to build request URL: {}", e)))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn post_json<B: Serialize>(
        &self,
        url: &Url,
        body: &B,
        wrap: fn(String) -> PdfChatError,
    ) -> Result<String> {
        let payload = serde_json::to_string(body)
            .map_err(|e| wrap(format!("failed to serialize request: {}", e)))?;

        // The key rides in the query string, so log the path only.
        debug!("POST {} ({} bytes)", url.path(), payload.len());

        self.agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(&payload)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| wrap(describe_request_error(&e)))
    }

    fn user_content(text: &str) -> Content {
        Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }

    fn embed_request(&self, text: &str) -> EmbedRequest {
        EmbedRequest {
            model: format!("models/{}", self.embedding_model),
            content: Content {
                role: None,
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
        }
    }
}

impl EmbeddingService for GeminiClient {
    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Embedding single text ({} chars)", text.len());

        let url = self.endpoint(&self.embedding_model, "embedContent")?;
        let response_text =
            self.post_json(&url, &self.embed_request(text), PdfChatError::Embedding)?;

        let response: EmbedResponse = serde_json::from_str(&response_text).map_err(|e| {
            PdfChatError::Embedding(format!("failed to parse embedding response: {}", e))
        })?;

        debug!(
            "Received embedding with {} dimensions",
            response.embedding.values.len()
        );
        Ok(response.embedding.values)
    }

    #[inline]
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding {} texts", texts.len());
        let url = self.endpoint(&self.embedding_model, "batchEmbedContents")?;

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size as usize) {
            let request = BatchEmbedRequest {
                requests: batch.iter().map(|t| self.embed_request(t)).collect(),
            };

            let response_text = self.post_json(&url, &request, PdfChatError::Embedding)?;
            let response: BatchEmbedResponse =
                serde_json::from_str(&response_text).map_err(|e| {
                    PdfChatError::Embedding(format!(
                        "failed to parse batch embedding response: {}",
                        e
                    ))
                })?;

            if response.embeddings.len() != batch.len() {
                return Err(PdfChatError::Embedding(format!(
                    "mismatch between request and response counts: {} vs {}",
                    batch.len(),
                    response.embeddings.len()
                )));
            }

            vectors.extend(response.embeddings.into_iter().map(|e| e.values));
        }

        debug!("Received {} embeddings", vectors.len());
        Ok(vectors)
    }
}

impl GenerationService for GeminiClient {
    #[inline]
    fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Generating answer for prompt ({} chars)", prompt.len());

        let url = self.endpoint(&self.generation_model, "generateContent")?;
        let request = GenerateRequest {
            contents: vec![Self::user_content(prompt)],
            generation_config: GenerationSettings {
                temperature: self.temperature,
            },
        };

        let response_text = self.post_json(&url, &request, PdfChatError::Generation)?;
        let response: GenerateResponse = serde_json::from_str(&response_text).map_err(|e| {
            PdfChatError::Generation(format!("failed to parse generation response: {}", e))
        })?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| PdfChatError::Generation("service returned no candidates".to_string()))?;

        let answer: String = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();

        if answer.is_empty() {
            return Err(PdfChatError::Generation(
                "service returned an empty answer".to_string(),
            ));
        }

        Ok(answer)
    }
}

fn describe_request_error(error: &ureq::Error) -> String {
    match error {
        ureq::Error::StatusCode(code) => format!("service returned HTTP {}", code),
        ureq::Error::Timeout(_) => "request timed out".to_string(),
        other => format!("request failed: {}", other),
    }
}
