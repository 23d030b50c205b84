//! HTTP handlers for the PDF Toolbox API.

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, info};

use pdftoolbox_core::{execute, InputDocument, Operation, TransformRequest};

use crate::delivery::{inline_response, DeliveryMode};
use crate::error::ApiError;
use crate::models::{HealthResponse, UpdateResponse, UserPatch, UserRecord};
use crate::policy;
use crate::state::AppState;

/// `GET /`
pub async fn root() -> &'static str {
    "PDF Toolbox API is running"
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "pdftoolbox-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /user/{id}` — fetch (and lazily normalize) a user record.
/// Unknown ids read as a zero-valued record, never an error.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserRecord>, ApiError> {
    let record = state.store.get(&id).await?;
    Ok(Json(record))
}

/// `POST /user/{id}` — partial update over the enumerated patch fields.
/// The body is parsed here rather than by an extractor so malformed JSON
/// and unknown fields both get the structured 400 error shape.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<UpdateResponse>, ApiError> {
    let patch: UserPatch = serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidRequest(format!("invalid patch body: {e}")))?;
    state.store.upsert(&id, &patch).await?;
    info!("updated user {id}");
    Ok(Json(UpdateResponse { success: true }))
}

/// `POST /process` — submit a transform request.
///
/// Multipart form: one or more `file` parts, `tool`, `userId`, and an
/// optional `delivery` preference. Control flow: parse → authorize →
/// transform (bounded) → charge usage → deliver.
pub async fn process(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = ProcessForm::read(multipart).await?;

    let tool = form
        .tool
        .ok_or_else(|| ApiError::InvalidRequest("missing 'tool' field".into()))?;
    let user_id = form
        .user_id
        .ok_or_else(|| ApiError::InvalidRequest("missing 'userId' field".into()))?;
    let operation = Operation::parse(&tool)?;

    info!(
        "process request: user={user_id} tool={operation} files={}",
        form.inputs.len()
    );

    let record = state.store.get(&user_id).await?;
    policy::authorize(&record).map_err(ApiError::from)?;

    let request = TransformRequest {
        operation,
        inputs: form.inputs,
    };

    // lopdf work is CPU-bound; run it off the async threads under the
    // configured bound. Input buffers are owned by the task and dropped
    // on every exit path. A timed-out task is not cancelled: it finishes
    // on the blocking pool and its result is dropped, so a burst of
    // timed-out requests still occupies blocking threads.
    let result = tokio::time::timeout(
        Duration::from_millis(state.timeout_ms),
        tokio::task::spawn_blocking(move || execute(request)),
    )
    .await
    .map_err(|_| ApiError::Timeout(state.timeout_ms))?
    .map_err(|e| ApiError::Internal(format!("transform task failed: {e}")))??;

    // Exactly one charge per successful transform; failures above never
    // reach this line.
    let record = state.store.charge_usage(&user_id).await?;
    info!("user {user_id} now at {} transforms", record.count);

    match form.delivery {
        DeliveryMode::Inline => inline_response(result),
        DeliveryMode::Persisted => {
            Ok(Json(state.artifacts.persist(result).await?).into_response())
        }
    }
}

/// `GET /files/{name}` — retrieve a persisted artifact.
pub async fn get_artifact(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let (content_type, bytes) = state.artifacts.open(&name).await?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Parsed `/process` form fields.
struct ProcessForm {
    inputs: Vec<InputDocument>,
    tool: Option<String>,
    user_id: Option<String>,
    delivery: DeliveryMode,
}

impl ProcessForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let bad_body =
            |e: axum::extract::multipart::MultipartError| ApiError::InvalidRequest(format!("malformed multipart body: {e}"));

        let mut form = ProcessForm {
            inputs: Vec::new(),
            tool: None,
            user_id: None,
            delivery: DeliveryMode::Inline,
        };

        while let Some(field) = multipart.next_field().await.map_err(bad_body)? {
            match field.name().unwrap_or("") {
                "file" | "files" | "files[]" => {
                    let filename = field
                        .file_name()
                        .filter(|n| !n.is_empty())
                        .unwrap_or("upload.pdf")
                        .to_string();
                    let bytes = field.bytes().await.map_err(bad_body)?;
                    form.inputs.push(InputDocument {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
                "tool" => form.tool = Some(field.text().await.map_err(bad_body)?),
                "userId" => form.user_id = Some(field.text().await.map_err(bad_body)?),
                "delivery" => {
                    form.delivery = DeliveryMode::parse(&field.text().await.map_err(bad_body)?)?;
                }
                other => debug!("ignoring multipart field '{other}'"),
            }
        }

        Ok(form)
    }
}
