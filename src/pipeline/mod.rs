use tracing::{debug, info};

use crate::chunking::chunk_text;
use crate::config::Config;
use crate::extract::{UploadedDocument, extract_text};
use crate::index::VectorIndex;
use crate::services::{EmbeddingService, GenerationService};
use crate::{PdfChatError, Result};

/// Number of nearest chunks forwarded to the generation service.
pub const RETRIEVAL_K: usize = 4;

/// Fixed instruction prefixed to every rendered prompt. If the retrieved
/// context does not answer the question, the model is permitted to fall back
/// on its general knowledge.
pub const ANSWER_INSTRUCTION: &str = "As an AI assistant, you must answer the query from the \
    user from the retrieved content, if no relevant information is available, answer the \
    question by using your knowledge about the topic";

/// Render the single prompt sent to the generation service. The chat history
/// slot is wired through but always empty in current use.
#[inline]
pub fn render_prompt(context: &str, chat_history: &str, question: &str) -> String {
    format!(
        "{} Combine the chat history{} and follow-up question into a standalone question to \
         answer from the {}. Follow-up question: {}",
        ANSWER_INSTRUCTION, chat_history, context, question
    )
}

/// Run the full processing pipeline for one upload: extract, chunk, embed,
/// persist. Returns the number of chunks indexed.
#[inline]
pub async fn process_documents(
    config: &Config,
    embedder: &dyn EmbeddingService,
    documents: &[UploadedDocument],
) -> Result<usize> {
    info!("Processing {} uploaded documents", documents.len());

    let text = extract_text(documents)?;
    if text.trim().is_empty() {
        return Err(PdfChatError::Extraction(
            "no text could be extracted from the uploaded documents".to_string(),
        ));
    }

    index_text(config, embedder, &text).await
}

/// Chunk and embed extracted text, then persist a fresh index.
///
/// Every embedding is computed before the index is touched, so a failed
/// remote call aborts the run with the previous index intact; the persist
/// step itself fully replaces the prior index (last write wins).
#[inline]
pub async fn index_text(
    config: &Config,
    embedder: &dyn EmbeddingService,
    text: &str,
) -> Result<usize> {
    let chunks = chunk_text(text, &config.chunking);
    debug!("Split {} characters into {} chunks", text.len(), chunks.len());

    let vectors = embedder.embed_batch(&chunks)?;

    VectorIndex::build(&config.index_dir, &chunks, &vectors).await?;

    info!("Indexed {} chunks", chunks.len());
    Ok(chunks.len())
}

/// Answer a question against the persisted index: embed the question,
/// retrieve the nearest chunks, render the prompt, generate.
#[inline]
pub async fn answer_question(
    config: &Config,
    embedder: &dyn EmbeddingService,
    generator: &dyn GenerationService,
    question: &str,
) -> Result<String> {
    info!("Answering question ({} chars)", question.len());

    let query_vector = embedder.embed(question)?;

    let index = VectorIndex::open(&config.index_dir).await?;
    let hits = index.search(&query_vector, RETRIEVAL_K).await?;
    debug!("Retrieved {} chunks for context", hits.len());

    let context = hits
        .iter()
        .map(|hit| hit.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let prompt = render_prompt(&context, "", question);
    generator.generate(&prompt)
}
