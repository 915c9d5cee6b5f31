use tracing::debug;

use crate::{PdfChatError, Result};

/// One uploaded document, held in memory for the duration of a single
/// processing request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub data: Vec<u8>,
}

/// Extract the text of every uploaded PDF and concatenate it into a single
/// string, in upload order, with no separator between pages or documents.
///
/// A document that is not a valid PDF fails the whole call; there is no
/// partial-success aggregation. An empty collection yields an empty string.
#[inline]
pub fn extract_text(documents: &[UploadedDocument]) -> Result<String> {
    let mut combined = String::new();

    for document in documents {
        let text = pdf_extract::extract_text_from_mem(&document.data).map_err(|e| {
            PdfChatError::Extraction(format!("failed to read {}: {}", document.name, e))
        })?;

        debug!(
            "Extracted {} characters from {} ({} bytes)",
            text.len(),
            document.name,
            document.data.len()
        );

        combined.push_str(&text);
    }

    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collection_yields_empty_text() {
        let text = extract_text(&[]).expect("empty input should succeed");
        assert!(text.is_empty());
    }

    #[test]
    fn malformed_document_fails_the_request() {
        let documents = vec![UploadedDocument {
            name: "notes.pdf".to_string(),
            data: b"this is not a pdf".to_vec(),
        }];

        let err = extract_text(&documents).expect_err("garbage bytes should fail");
        match err {
            PdfChatError::Extraction(message) => {
                assert!(message.contains("notes.pdf"), "error should name the file");
            }
            other => panic!("expected extraction error, got {:?}", other),
        }
    }
}
