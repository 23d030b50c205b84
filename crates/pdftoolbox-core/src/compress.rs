//! "Compress" — a structural re-encode.
//!
//! This operation parses the document and writes it back out with stream
//! compression applied. It is not a size-reduction algorithm and makes no
//! promise of a smaller output; the behavior is kept deliberately, matching
//! what the product has always shipped.

use lopdf::Document;

use crate::error::TransformError;

/// Re-serialize a document unchanged apart from stream-level re-encoding.
pub fn reencode_document(bytes: &[u8]) -> Result<Vec<u8>, TransformError> {
    let mut doc =
        Document::load_mem(bytes).map_err(|e| TransformError::CorruptInput(e.to_string()))?;
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| TransformError::OperationFailed(format!("failed to re-save PDF: {e}")))?;
    Ok(out)
}
