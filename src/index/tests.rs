use super::*;
use tempfile::TempDir;

fn one_hot(dimension: usize, hot: usize) -> Vec<f32> {
    let mut v = vec![0.0; dimension];
    v[hot] = 1.0;
    v
}

fn sample_chunks() -> Vec<String> {
    vec![
        "first chunk about installation".to_string(),
        "second chunk about configuration".to_string(),
        "third chunk about troubleshooting".to_string(),
        "fourth chunk about uninstalling".to_string(),
    ]
}

fn sample_vectors() -> Vec<Vec<f32>> {
    (0..4).map(|i| one_hot(8, i)).collect()
}

#[tokio::test]
async fn build_and_search_round_trip() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("index");

    let index = VectorIndex::build(&path, &sample_chunks(), &sample_vectors())
        .await
        .expect("build should succeed");

    let results = index
        .search(&one_hot(8, 2), 2)
        .await
        .expect("search should succeed");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].content, "third chunk about troubleshooting");
    assert_eq!(results[0].chunk_index, 2);
    assert!(results[0].distance < results[1].distance);
}

#[tokio::test]
async fn open_after_build_sees_the_same_data() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("index");

    VectorIndex::build(&path, &sample_chunks(), &sample_vectors())
        .await
        .expect("build should succeed");

    let reopened = VectorIndex::open(&path).await.expect("open should succeed");
    let results = reopened
        .search(&one_hot(8, 0), 1)
        .await
        .expect("search should succeed");

    assert_eq!(results[0].content, "first chunk about installation");
}

#[tokio::test]
async fn missing_path_is_a_missing_index_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("never-built");

    let err = VectorIndex::open(&path)
        .await
        .expect_err("open should fail without an index");
    assert!(matches!(err, PdfChatError::MissingIndex(_)));
}

#[tokio::test]
async fn directory_without_table_is_a_missing_index_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let err = VectorIndex::open(temp_dir.path())
        .await
        .expect_err("open should fail on an empty directory");
    assert!(matches!(err, PdfChatError::MissingIndex(_)));
}

#[tokio::test]
async fn build_rejects_empty_input() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("index");

    let err = VectorIndex::build(&path, &[], &[])
        .await
        .expect_err("empty input should be rejected");
    assert!(matches!(err, PdfChatError::Index(_)));
    assert!(!path.exists(), "no index should be written on failure");
}

#[tokio::test]
async fn build_rejects_count_mismatch() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("index");

    let err = VectorIndex::build(&path, &sample_chunks(), &sample_vectors()[..2])
        .await
        .expect_err("count mismatch should be rejected");
    assert!(matches!(err, PdfChatError::Index(_)));
}

#[tokio::test]
async fn build_rejects_inconsistent_dimensions() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("index");

    let mut vectors = sample_vectors();
    vectors[3] = one_hot(4, 1);

    let err = VectorIndex::build(&path, &sample_chunks(), &vectors)
        .await
        .expect_err("dimension mismatch should be rejected");
    assert!(matches!(err, PdfChatError::Index(_)));
}

#[tokio::test]
async fn rebuild_fully_replaces_previous_index() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("index");

    VectorIndex::build(&path, &sample_chunks(), &sample_vectors())
        .await
        .expect("first build should succeed");

    let replacement_chunks = vec![
        "entirely new content".to_string(),
        "more new content".to_string(),
    ];
    let replacement_vectors = vec![one_hot(8, 5), one_hot(8, 6)];

    let index = VectorIndex::build(&path, &replacement_chunks, &replacement_vectors)
        .await
        .expect("rebuild should succeed");

    // Even asking for more results than the new index holds must not
    // resurface anything from the first generation.
    let results = index
        .search(&one_hot(8, 2), 10)
        .await
        .expect("search should succeed");

    assert_eq!(results.len(), 2);
    for result in &results {
        assert!(result.content.contains("new content"));
    }
}
