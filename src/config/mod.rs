
use std::env;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::chunking::ChunkingConfig;
use crate::{PdfChatError, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_EMBEDDING_MODEL: &str = "embedding-001";
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-pro";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_INDEX_DIR: &str = "vector_index";

// Gemini caps batchEmbedContents at 100 requests per call.
const MAX_BATCH_SIZE: u32 = 100;

/// Application configuration, constructed once at startup and passed by
/// reference into every component that needs it. Never ambient global state.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub chunking: ChunkingConfig,
    /// Directory holding the persisted vector index. Fully replaced on every
    /// successful processing run.
    pub index_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    #[inline]
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Connection settings for the hosted embedding/generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub generation_model: String,
    pub temperature: f32,
    pub batch_size: u32,
}

impl Default for GeminiConfig {
    #[inline]
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            batch_size: 16,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GOOGLE_API_KEY must be set")]
    MissingApiKey,
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Invalid batch size: {0} (must be between 1 and {MAX_BATCH_SIZE})")]
    InvalidBatchSize(u32),
    #[error("Invalid temperature: {0} (must be between 0.0 and 1.0)")]
    InvalidTemperature(f32),
    #[error("Invalid chunk size: {0} (must be greater than zero)")]
    InvalidChunkSize(usize),
    #[error("Chunk overlap ({overlap}) must be strictly less than chunk size ({chunk_size})")]
    OverlapTooLarge { overlap: usize, chunk_size: usize },
    #[error("Invalid value for {0}: {1}")]
    InvalidEnvValue(&'static str, String),
}

impl Config {
    /// Load configuration from the process environment (and a `.env` file if
    /// present). The service credential is the single required value; its
    /// absence is fatal to startup.
    #[inline]
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("GOOGLE_API_KEY").map_err(|_| ConfigError::MissingApiKey)?;

        let config = Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env("PORT", 3000)?,
            },
            gemini: GeminiConfig {
                api_key,
                base_url: env::var("GEMINI_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
                embedding_model: env::var("GEMINI_EMBEDDING_MODEL")
                    .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
                generation_model: env::var("GEMINI_MODEL")
                    .unwrap_or_else(|_| DEFAULT_GENERATION_MODEL.to_string()),
                temperature: DEFAULT_TEMPERATURE,
                batch_size: parse_env("GEMINI_BATCH_SIZE", 16)?,
            },
            chunking: ChunkingConfig {
                chunk_size: parse_env("CHUNK_SIZE", 10_000)?,
                overlap: parse_env("CHUNK_OVERLAP", 1_000)?,
            },
            index_dir: PathBuf::from(
                env::var("INDEX_DIR").unwrap_or_else(|_| DEFAULT_INDEX_DIR.to_string()),
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges and cross-field constraints.
    #[inline]
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.gemini.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if Url::parse(&self.gemini.base_url).is_err() {
            return Err(ConfigError::InvalidBaseUrl(self.gemini.base_url.clone()));
        }
        if self.gemini.batch_size == 0 || self.gemini.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidBatchSize(self.gemini.batch_size));
        }
        if !(0.0..=1.0).contains(&self.gemini.temperature) {
            return Err(ConfigError::InvalidTemperature(self.gemini.temperature));
        }
        if self.chunking.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunking.chunk_size));
        }
        if self.chunking.overlap >= self.chunking.chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                overlap: self.chunking.overlap,
                chunk_size: self.chunking.chunk_size,
            });
        }
        Ok(())
    }
}

impl From<ConfigError> for PdfChatError {
    #[inline]
    fn from(e: ConfigError) -> Self {
        PdfChatError::Config(e.to_string())
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidEnvValue(name, raw).into()),
        Err(_) => Ok(default),
    }
}
