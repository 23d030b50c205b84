//! Transform dispatch.
//!
//! A request is validated, executed, and turned into a single uniform
//! result regardless of whether the operation produced one document or a
//! bundle of them. Failures abort the whole request; a partial merge is
//! never returned.

use lopdf::Document;

use crate::compress::reencode_document;
use crate::error::TransformError;
use crate::merge::merge_documents;
use crate::operation::Operation;
use crate::split::split_into_pages;

/// One uploaded document: opaque bytes plus the name the client gave it.
#[derive(Debug, Clone)]
pub struct InputDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A named operation over an ordered sequence of inputs.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub operation: Operation,
    pub inputs: Vec<InputDocument>,
}

/// One member of an archive output.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// The engine's output: a single document or an ordered bundle.
#[derive(Debug, Clone)]
pub enum TransformOutput {
    Single { filename: String, bytes: Vec<u8> },
    Archive { filename: String, entries: Vec<ArchiveEntry> },
}

impl TransformOutput {
    /// Content-kind tag carried in persisted-delivery responses.
    pub fn kind(&self) -> &'static str {
        match self {
            TransformOutput::Single { .. } => "single-document",
            TransformOutput::Archive { .. } => "archive",
        }
    }
}

/// Result of a completed transform, immutable once produced.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub operation: Operation,
    pub output: TransformOutput,
    pub message: String,
}

/// Validate and run a transform request.
pub fn execute(request: TransformRequest) -> Result<TransformResult, TransformError> {
    validate(&request)?;

    match request.operation {
        Operation::Merge => run_merge(request),
        Operation::Split => run_split(request),
        Operation::Compress => run_compress(request),
    }
}

/// Fail closed before touching any document bytes.
fn validate(request: &TransformRequest) -> Result<(), TransformError> {
    if request.inputs.is_empty() {
        return Err(TransformError::InvalidRequest(
            "no input documents given".into(),
        ));
    }
    if request.operation == Operation::Merge && request.inputs.len() < 2 {
        return Err(TransformError::InvalidRequest(format!(
            "merge requires at least 2 documents, got {}",
            request.inputs.len()
        )));
    }
    Ok(())
}

fn run_merge(request: TransformRequest) -> Result<TransformResult, TransformError> {
    let buffers: Vec<Vec<u8>> = request.inputs.into_iter().map(|d| d.bytes).collect();
    let count = buffers.len();

    let merged = merge_documents(&buffers)?;
    let pages = page_count(&merged)?;

    Ok(TransformResult {
        operation: Operation::Merge,
        message: format!("Merged {count} documents into a {pages}-page PDF"),
        output: TransformOutput::Single {
            filename: Operation::Merge.attachment_name(),
            bytes: merged,
        },
    })
}

// Split and Compress operate on the first input; extra uploads are ignored.

fn run_split(request: TransformRequest) -> Result<TransformResult, TransformError> {
    let first = &request.inputs[0];
    let pages = split_into_pages(&first.bytes)?;

    let entries: Vec<ArchiveEntry> = pages
        .into_iter()
        .enumerate()
        .map(|(i, bytes)| ArchiveEntry {
            name: format!("page-{}.pdf", i + 1),
            bytes,
        })
        .collect();

    Ok(TransformResult {
        operation: Operation::Split,
        message: format!("Split {} into {} pages", first.filename, entries.len()),
        output: TransformOutput::Archive {
            filename: Operation::Split.attachment_name(),
            entries,
        },
    })
}

fn run_compress(request: TransformRequest) -> Result<TransformResult, TransformError> {
    let first = &request.inputs[0];
    let bytes = reencode_document(&first.bytes)?;

    Ok(TransformResult {
        operation: Operation::Compress,
        message: format!(
            "Re-encoded {}; output size is not guaranteed to shrink",
            first.filename
        ),
        output: TransformOutput::Single {
            filename: Operation::Compress.attachment_name(),
            bytes,
        },
    })
}

/// Page count of a serialized PDF.
pub fn page_count(bytes: &[u8]) -> Result<u32, TransformError> {
    let doc = Document::load_mem(bytes).map_err(|e| TransformError::CorruptInput(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::pdf_with_pages;

    fn input(name: &str, bytes: Vec<u8>) -> InputDocument {
        InputDocument {
            filename: name.to_string(),
            bytes,
        }
    }

    #[test]
    fn merge_with_one_input_is_invalid_even_when_valid_pdf() {
        let request = TransformRequest {
            operation: Operation::Merge,
            inputs: vec![input("a.pdf", pdf_with_pages(2, "A"))],
        };
        assert!(matches!(
            execute(request),
            Err(TransformError::InvalidRequest(_))
        ));
    }

    #[test]
    fn zero_inputs_is_invalid_for_every_operation() {
        for op in [Operation::Merge, Operation::Split, Operation::Compress] {
            let request = TransformRequest {
                operation: op,
                inputs: vec![],
            };
            assert!(matches!(
                execute(request),
                Err(TransformError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn merge_produces_single_document_result() {
        let request = TransformRequest {
            operation: Operation::Merge,
            inputs: vec![
                input("a.pdf", pdf_with_pages(2, "A")),
                input("b.pdf", pdf_with_pages(3, "B")),
            ],
        };
        let result = execute(request).unwrap();
        assert_eq!(result.output.kind(), "single-document");
        match result.output {
            TransformOutput::Single { filename, bytes } => {
                assert_eq!(filename, "Merge_PDF.pdf");
                assert_eq!(page_count(&bytes).unwrap(), 5);
            }
            other => panic!("expected single output, got {other:?}"),
        }
    }

    #[test]
    fn split_produces_numbered_archive_entries() {
        let request = TransformRequest {
            operation: Operation::Split,
            inputs: vec![input("doc.pdf", pdf_with_pages(3, "S"))],
        };
        let result = execute(request).unwrap();
        match result.output {
            TransformOutput::Archive { filename, entries } => {
                assert_eq!(filename, "Split_PDF.zip");
                let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
                assert_eq!(names, ["page-1.pdf", "page-2.pdf", "page-3.pdf"]);
            }
            other => panic!("expected archive output, got {other:?}"),
        }
    }

    #[test]
    fn split_ignores_extra_inputs() {
        let request = TransformRequest {
            operation: Operation::Split,
            inputs: vec![
                input("first.pdf", pdf_with_pages(2, "F")),
                input("ignored.pdf", pdf_with_pages(9, "I")),
            ],
        };
        let result = execute(request).unwrap();
        match result.output {
            TransformOutput::Archive { entries, .. } => assert_eq!(entries.len(), 2),
            other => panic!("expected archive output, got {other:?}"),
        }
    }

    #[test]
    fn split_of_empty_document_is_empty_archive() {
        let request = TransformRequest {
            operation: Operation::Split,
            inputs: vec![input("empty.pdf", pdf_with_pages(0, "E"))],
        };
        let result = execute(request).unwrap();
        match result.output {
            TransformOutput::Archive { entries, .. } => assert!(entries.is_empty()),
            other => panic!("expected archive output, got {other:?}"),
        }
    }

    #[test]
    fn compress_round_trips_page_count() {
        let request = TransformRequest {
            operation: Operation::Compress,
            inputs: vec![input("doc.pdf", pdf_with_pages(4, "C"))],
        };
        let result = execute(request).unwrap();
        match result.output {
            TransformOutput::Single { bytes, .. } => {
                assert_eq!(page_count(&bytes).unwrap(), 4);
            }
            other => panic!("expected single output, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_input_aborts_whole_merge() {
        let request = TransformRequest {
            operation: Operation::Merge,
            inputs: vec![
                input("good.pdf", pdf_with_pages(2, "G")),
                input("bad.pdf", b"broken".to_vec()),
            ],
        };
        assert!(matches!(
            execute(request),
            Err(TransformError::CorruptInput(_))
        ));
    }
}
