use crate::Result;

/// Capability to turn text into a fixed-dimension embedding vector.
///
/// The pipeline only depends on this seam, so tests can substitute a
/// deterministic in-process implementation for the remote service.
pub trait EmbeddingService: Send + Sync {
    /// Embed a single text (used for queries).
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts (used for indexing). Implementations must
    /// return exactly one vector per input, in input order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Capability to synthesize an answer from a rendered prompt.
pub trait GenerationService: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String>;
}
