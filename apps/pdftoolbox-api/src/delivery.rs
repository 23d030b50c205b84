//! Result delivery: inline bytes or a persisted, retrievable artifact.

use std::path::{Path, PathBuf};

use axum::http::header;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use pdftoolbox_core::{bundle_archive, TransformOutput, TransformResult};

use crate::error::ApiError;
use crate::models::ProcessedResponse;

/// How the caller wants the output back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// Bytes straight back in the response body (the historical default).
    #[default]
    Inline,
    /// Written to the artifact store, response carries a download path.
    Persisted,
}

impl DeliveryMode {
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value.trim().to_lowercase().as_str() {
            "" | "inline" => Ok(DeliveryMode::Inline),
            "persisted" | "download" => Ok(DeliveryMode::Persisted),
            other => Err(ApiError::InvalidRequest(format!(
                "unknown delivery mode '{other}', expected 'inline' or 'persisted'"
            ))),
        }
    }
}

/// Send the result directly: `application/pdf` for single documents,
/// `application/zip` for bundles.
pub fn inline_response(result: TransformResult) -> Result<Response, ApiError> {
    let (content_type, filename, bytes) = match result.output {
        TransformOutput::Single { filename, bytes } => ("application/pdf", filename, bytes),
        TransformOutput::Archive { filename, entries } => {
            ("application/zip", filename, bundle_archive(&entries)?)
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Content store for persisted artifacts.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the result under a collision-resistant generated name and
    /// return the retrieval reference. The write is fully awaited before
    /// the reference is composed, so a returned download path always
    /// points at a flushed artifact.
    pub async fn persist(&self, result: TransformResult) -> Result<ProcessedResponse, ApiError> {
        let kind = result.output.kind().to_string();
        let slug = result.operation.slug();

        let (ext, bytes) = match result.output {
            TransformOutput::Single { bytes, .. } => ("pdf", bytes),
            TransformOutput::Archive { entries, .. } => ("zip", bundle_archive(&entries)?),
        };
        let name = format!("{slug}-{}.{ext}", Uuid::new_v4());

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        tokio::fs::write(self.dir.join(&name), &bytes)
            .await
            .map_err(|e| ApiError::Storage(e.to_string()))?;

        tracing::info!("persisted artifact {name} ({} bytes)", bytes.len());

        Ok(ProcessedResponse {
            kind,
            message: result.message,
            download: format!("/files/{name}"),
        })
    }

    /// Read a persisted artifact back. Names never contain path
    /// separators, so anything that looks like traversal is rejected
    /// before touching the filesystem.
    pub async fn open(&self, name: &str) -> Result<(&'static str, Vec<u8>), ApiError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(ApiError::InvalidRequest("invalid artifact name".into()));
        }

        let content_type = match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some("pdf") => "application/pdf",
            Some("zip") => "application/zip",
            _ => "application/octet-stream",
        };

        match tokio::fs::read(self.dir.join(name)).await {
            Ok(bytes) => Ok((content_type, bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ApiError::ArtifactNotFound(name.to_string()))
            }
            Err(e) => Err(ApiError::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdftoolbox_core::{ArchiveEntry, Operation};

    fn single_result() -> TransformResult {
        TransformResult {
            operation: Operation::Compress,
            message: "Re-encoded test.pdf".into(),
            output: TransformOutput::Single {
                filename: "Compress_PDF.pdf".into(),
                bytes: b"%PDF-1.5 fake".to_vec(),
            },
        }
    }

    fn archive_result() -> TransformResult {
        TransformResult {
            operation: Operation::Split,
            message: "Split test.pdf into 2 pages".into(),
            output: TransformOutput::Archive {
                filename: "Split_PDF.zip".into(),
                entries: vec![
                    ArchiveEntry {
                        name: "page-1.pdf".into(),
                        bytes: b"one".to_vec(),
                    },
                    ArchiveEntry {
                        name: "page-2.pdf".into(),
                        bytes: b"two".to_vec(),
                    },
                ],
            },
        }
    }

    #[test]
    fn delivery_mode_parses_known_values() {
        assert_eq!(DeliveryMode::parse("inline").unwrap(), DeliveryMode::Inline);
        assert_eq!(DeliveryMode::parse("").unwrap(), DeliveryMode::Inline);
        assert_eq!(
            DeliveryMode::parse("Persisted").unwrap(),
            DeliveryMode::Persisted
        );
        assert!(DeliveryMode::parse("email").is_err());
    }

    #[tokio::test]
    async fn persisted_single_is_on_disk_before_response() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let response = store.persist(single_result()).await.unwrap();
        assert_eq!(response.kind, "single-document");

        let name = response.download.strip_prefix("/files/").unwrap();
        assert!(name.starts_with("compress-") && name.ends_with(".pdf"));

        // The download reference must point at fully flushed bytes.
        let on_disk = std::fs::read(dir.path().join(name)).unwrap();
        assert_eq!(on_disk, b"%PDF-1.5 fake");
    }

    #[tokio::test]
    async fn persisted_archive_is_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let response = store.persist(archive_result()).await.unwrap();
        assert_eq!(response.kind, "archive");

        let name = response.download.strip_prefix("/files/").unwrap();
        assert!(name.starts_with("split-") && name.ends_with(".zip"));

        let (content_type, bytes) = store.open(name).await.unwrap();
        assert_eq!(content_type, "application/zip");
        assert_eq!(&bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn generated_names_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let a = store.persist(single_result()).await.unwrap();
        let b = store.persist(single_result()).await.unwrap();
        assert_ne!(a.download, b.download);
    }

    #[tokio::test]
    async fn open_rejects_traversal_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        assert!(store.open("../users.json").await.is_err());
        assert!(store.open("a/b.pdf").await.is_err());
    }

    #[tokio::test]
    async fn open_missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        assert!(matches!(
            store.open("merge-0000.pdf").await,
            Err(ApiError::ArtifactNotFound(_))
        ));
    }
}
