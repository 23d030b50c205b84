//! PDF split.
//!
//! Produces one single-page document per source page, in source order.
//! A zero-page source yields an empty list, not an error.

use lopdf::Document;

use crate::error::TransformError;

/// Split a document into its pages.
///
/// Each output is built by cloning the source and deleting every other
/// page (in reverse so page numbers stay stable), then pruning the
/// orphaned objects. Returned buffers are in source page order.
pub fn split_into_pages(bytes: &[u8]) -> Result<Vec<Vec<u8>>, TransformError> {
    let doc = Document::load_mem(bytes).map_err(|e| TransformError::CorruptInput(e.to_string()))?;
    let total = doc.get_pages().len() as u32;

    let mut outputs = Vec::with_capacity(total as usize);
    for keep in 1..=total {
        outputs.push(extract_page(&doc, keep, total)?);
    }
    Ok(outputs)
}

fn extract_page(doc: &Document, keep: u32, total: u32) -> Result<Vec<u8>, TransformError> {
    let mut single = doc.clone();

    for page in (1..=total).rev() {
        if page != keep {
            single.delete_pages(&[page]);
        }
    }

    single.prune_objects();
    single.compress();

    let mut out = Vec::new();
    single.save_to(&mut out).map_err(|e| {
        TransformError::OperationFailed(format!("failed to save page {keep}: {e}"))
    })?;
    Ok(out)
}
