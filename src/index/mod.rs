#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::{
    Connection,
    query::{ExecutableQuery, QueryBase},
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{PdfChatError, Result};

const TABLE_NAME: &str = "chunks";

/// Persisted similarity index over (chunk text, embedding vector) pairs.
///
/// Exactly one index exists at a time at a fixed path; `build` fully
/// replaces any previous generation. The on-disk layout belongs to LanceDB
/// and is never inspected here. Loading trusts local storage.
pub struct VectorIndex {
    connection: Connection,
}

/// One retrieved chunk, ranked by increasing distance from the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub content: String,
    pub chunk_index: u32,
    pub distance: f32,
}

impl VectorIndex {
    /// Build a fresh index from chunks and their embedding vectors,
    /// replacing whatever index previously existed at `path`.
    ///
    /// All vectors must already be computed: the single write below is the
    /// only persist step, so an embedding failure upstream never leaves a
    /// partial index behind.
    #[inline]
    pub async fn build(path: &Path, chunks: &[String], vectors: &[Vec<f32>]) -> Result<Self> {
        if chunks.is_empty() {
            return Err(PdfChatError::Index("no chunks to index".to_string()));
        }
        if chunks.len() != vectors.len() {
            return Err(PdfChatError::Index(format!(
                "chunk and vector counts differ: {} vs {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let dimension = vectors[0].len();
        if dimension == 0 {
            return Err(PdfChatError::Index("embedding vectors are empty".to_string()));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(PdfChatError::Index(format!(
                "inconsistent embedding dimensions: expected {}, got {}",
                dimension,
                bad.len()
            )));
        }

        // Last write wins: drop the previous generation before writing.
        if path.exists() {
            std::fs::remove_dir_all(path).map_err(|e| {
                PdfChatError::Index(format!("failed to remove previous index: {}", e))
            })?;
        }

        let connection = connect(path).await?;

        let schema = index_schema(dimension);
        let table = connection
            .create_empty_table(TABLE_NAME, Arc::clone(&schema))
            .execute()
            .await
            .map_err(|e| PdfChatError::Index(format!("failed to create table: {}", e)))?;

        let batch = build_record_batch(&schema, dimension, chunks, vectors)?;
        let reader = RecordBatchIterator::new(std::iter::once(Ok(batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| PdfChatError::Index(format!("failed to write index: {}", e)))?;

        info!(
            "Persisted index of {} chunks ({} dimensions) at {}",
            chunks.len(),
            dimension,
            path.display()
        );

        Ok(Self { connection })
    }

    /// Open a previously persisted index. A missing index is a fatal
    /// condition for the query, never an empty result.
    #[inline]
    pub async fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PdfChatError::MissingIndex(path.display().to_string()));
        }

        let connection = connect(path).await?;

        let table_names = connection
            .table_names()
            .execute()
            .await
            .map_err(|e| PdfChatError::Index(format!("failed to list tables: {}", e)))?;

        if !table_names.contains(&TABLE_NAME.to_string()) {
            return Err(PdfChatError::MissingIndex(path.display().to_string()));
        }

        debug!("Opened index at {}", path.display());
        Ok(Self { connection })
    }

    /// Return the `k` chunks nearest to the query vector, ranked by
    /// increasing distance.
    #[inline]
    pub async fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        debug!("Searching index for {} nearest chunks", k);

        let table = self
            .connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| PdfChatError::Index(format!("failed to open table: {}", e)))?;

        let mut stream = table
            .vector_search(query)
            .map_err(|e| PdfChatError::Index(format!("failed to create search: {}", e)))?
            .column("vector")
            .limit(k)
            .execute()
            .await
            .map_err(|e| PdfChatError::Index(format!("failed to execute search: {}", e)))?;

        let mut results = Vec::new();
        while let Some(batch) = stream
            .try_next()
            .await
            .map_err(|e| PdfChatError::Index(format!("failed to read result stream: {}", e)))?
        {
            results.extend(parse_search_batch(&batch)?);
        }

        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!("Search returned {} chunks", results.len());
        Ok(results)
    }
}

async fn connect(path: &Path) -> Result<Connection> {
    lancedb::connect(&path.display().to_string())
        .execute()
        .await
        .map_err(|e| PdfChatError::Index(format!("failed to connect to index storage: {}", e)))
}

fn index_schema(dimension: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, false)),
                dimension as i32,
            ),
            false,
        ),
        Field::new("content", DataType::Utf8, false),
        Field::new("chunk_index", DataType::UInt32, false),
    ]))
}

fn build_record_batch(
    schema: &Arc<Schema>,
    dimension: usize,
    chunks: &[String],
    vectors: &[Vec<f32>],
) -> Result<RecordBatch> {
    let ids: Vec<String> = chunks.iter().map(|_| Uuid::new_v4().to_string()).collect();
    let contents: Vec<&str> = chunks.iter().map(String::as_str).collect();
    let chunk_indices: Vec<u32> = (0..chunks.len() as u32).collect();

    let mut flat_values = Vec::with_capacity(chunks.len() * dimension);
    for vector in vectors {
        flat_values.extend_from_slice(vector);
    }
    let values = Float32Array::from(flat_values);
    let item_field = Arc::new(Field::new("item", DataType::Float32, false));
    let vector_array =
        FixedSizeListArray::try_new(item_field, dimension as i32, Arc::new(values), None)
            .map_err(|e| PdfChatError::Index(format!("failed to create vector array: {}", e)))?;

    RecordBatch::try_new(
        Arc::clone(schema),
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(contents)),
            Arc::new(UInt32Array::from(chunk_indices)),
        ],
    )
    .map_err(|e| PdfChatError::Index(format!("failed to create record batch: {}", e)))
}

fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<ScoredChunk>> {
    let contents = batch
        .column_by_name("content")
        .ok_or_else(|| PdfChatError::Index("missing content column".to_string()))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| PdfChatError::Index("invalid content column type".to_string()))?;

    let chunk_indices = batch
        .column_by_name("chunk_index")
        .ok_or_else(|| PdfChatError::Index("missing chunk_index column".to_string()))?
        .as_any()
        .downcast_ref::<UInt32Array>()
        .ok_or_else(|| PdfChatError::Index("invalid chunk_index column type".to_string()))?;

    let distances = batch
        .column_by_name("_distance")
        .map(|col| col.as_any().downcast_ref::<Float32Array>());

    let mut results = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let distance = distances
            .flatten()
            .map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

        results.push(ScoredChunk {
            content: contents.value(row).to_string(),
            chunk_index: chunk_indices.value(row),
            distance,
        });
    }

    Ok(results)
}
