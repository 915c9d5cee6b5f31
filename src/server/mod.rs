use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::PdfChatError;
use crate::config::Config;
use crate::extract::UploadedDocument;
use crate::gemini::GeminiClient;
use crate::pipeline;

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared state for the HTTP handlers: the configuration built at startup
/// and the remote-service client, both constructed exactly once.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gemini: Arc<GeminiClient>,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub status: &'static str,
    pub chunks_indexed: usize,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// A handler failure mapped to a status code and a JSON error body. Every
/// pipeline failure surfaces to the page as a readable message, never as a
/// crashed request.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<PdfChatError> for ApiError {
    #[inline]
    fn from(e: PdfChatError) -> Self {
        let status = match &e {
            PdfChatError::Extraction(_) => StatusCode::BAD_REQUEST,
            PdfChatError::MissingIndex(_) => StatusCode::NOT_FOUND,
            PdfChatError::Embedding(_) | PdfChatError::Generation(_) => StatusCode::BAD_GATEWAY,
            PdfChatError::Config(_)
            | PdfChatError::Index(_)
            | PdfChatError::Io(_)
            | PdfChatError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    #[inline]
    fn into_response(self) -> Response {
        error!("Request failed ({}): {}", self.status, self.message);
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Create the application router.
#[inline]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/api/health", get(health))
        .route("/api/process", post(process))
        .route("/api/ask", post(ask))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Process trigger: extract, chunk, embed and index the uploaded documents.
/// Runs to completion before responding; the page shows a busy indicator in
/// the meantime.
async fn process(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, ApiError> {
    let mut documents = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed upload: {}", e)))?
    {
        if field.name() != Some("documents") {
            continue;
        }

        let name = field
            .file_name()
            .unwrap_or("uploaded.pdf")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read {}: {}", name, e)))?
            .to_vec();

        if data.is_empty() {
            continue;
        }
        documents.push(UploadedDocument { name, data });
    }

    if documents.is_empty() {
        return Err(ApiError::bad_request("upload at least one PDF document"));
    }

    info!("Process trigger with {} documents", documents.len());
    let chunks_indexed =
        pipeline::process_documents(&state.config, state.gemini.as_ref(), &documents).await?;

    Ok(Json(ProcessResponse {
        status: "Done",
        chunks_indexed,
    }))
}

/// Question trigger: retrieve the nearest chunks and generate an answer.
async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::bad_request("question must not be empty"));
    }

    info!("Question trigger");
    let answer = pipeline::answer_question(
        &state.config,
        state.gemini.as_ref(),
        state.gemini.as_ref(),
        question,
    )
    .await?;

    Ok(Json(AskResponse { answer }))
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Chat with PDF</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 720px;
            margin: 0 auto;
            padding: 40px 20px;
            color: #222;
        }
        h1 { margin-bottom: 4px; }
        section {
            border: 1px solid #ddd;
            border-radius: 8px;
            padding: 16px 20px;
            margin: 20px 0;
        }
        button {
            padding: 6px 16px;
            cursor: pointer;
        }
        #question { width: 70%; padding: 6px; }
        #process-status { margin-left: 12px; color: #555; }
        #answer {
            margin-top: 16px;
            padding: 12px;
            background: #f6f6f6;
            border-radius: 6px;
            white-space: pre-wrap;
        }
        #answer:empty { display: none; }
    </style>
</head>
<body>
    <h1>Chat with PDF</h1>

    <section>
        <h2>Menu</h2>
        <p>Upload your PDF Files and Click on the Submit &amp; Process Button</p>
        <input type="file" id="documents" multiple accept="application/pdf">
        <button id="process">Submit &amp; Process</button>
        <span id="process-status"></span>
    </section>

    <section>
        <h2>Ask a Question from the PDF Files</h2>
        <form id="ask-form">
            <input type="text" id="question" placeholder="Type your question">
            <button type="submit">Ask</button>
        </form>
        <div id="answer"></div>
    </section>

    <script>
        const processButton = document.getElementById('process');
        const processStatus = document.getElementById('process-status');
        const askForm = document.getElementById('ask-form');
        const questionInput = document.getElementById('question');
        const answerBox = document.getElementById('answer');

        processButton.addEventListener('click', async () => {
            const files = document.getElementById('documents').files;
            if (!files.length) {
                processStatus.textContent = 'Choose at least one PDF first.';
                return;
            }

            processStatus.textContent = 'Processing...';
            processButton.disabled = true;

            const form = new FormData();
            for (const file of files) {
                form.append('documents', file);
            }

            try {
                const resp = await fetch('/api/process', { method: 'POST', body: form });
                const body = await resp.json();
                processStatus.textContent = resp.ok ? 'Done' : body.error;
            } catch (err) {
                processStatus.textContent = String(err);
            } finally {
                processButton.disabled = false;
            }
        });

        askForm.addEventListener('submit', async (event) => {
            event.preventDefault();
            const question = questionInput.value.trim();
            if (!question) {
                return;
            }

            answerBox.textContent = '...';
            try {
                const resp = await fetch('/api/ask', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ question })
                });
                const body = await resp.json();
                answerBox.textContent = resp.ok ? 'Reply: ' + body.answer : body.error;
            } catch (err) {
                answerBox.textContent = String(err);
            }
        });
    </script>
</body>
</html>
"#;
