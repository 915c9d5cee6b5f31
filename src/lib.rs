use thiserror::Error;

pub type Result<T> = std::result::Result<T, PdfChatError>;

#[derive(Error, Debug)]
pub enum PdfChatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document extraction error: {0}")]
    Extraction(String),

    #[error("Embedding service error: {0}")]
    Embedding(String),

    #[error("Generation service error: {0}")]
    Generation(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("No document index found at {0}; upload and process documents first")]
    MissingIndex(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod chunking;
pub mod config;
pub mod extract;
pub mod gemini;
pub mod index;
pub mod pipeline;
pub mod server;
pub mod services;
