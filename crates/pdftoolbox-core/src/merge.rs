//! PDF merge.
//!
//! Concatenates the pages of every input document, in input order, into a
//! single output document. Each source's internal page order is copied
//! verbatim; pages are never reordered or deduplicated.

use std::collections::BTreeMap;

use lopdf::{Document, Object, ObjectId};

use crate::error::TransformError;

/// Merge the given documents into one PDF.
///
/// The first document becomes the destination; every subsequent document
/// has its object ids shifted past the destination's current maximum and
/// its objects copied over, then its pages are appended to the page tree.
pub fn merge_documents(inputs: &[Vec<u8>]) -> Result<Vec<u8>, TransformError> {
    let mut sources = Vec::with_capacity(inputs.len());
    for (index, bytes) in inputs.iter().enumerate() {
        let doc = Document::load_mem(bytes).map_err(|e| {
            TransformError::CorruptInput(format!("document {} failed to parse: {}", index + 1, e))
        })?;
        sources.push(doc);
    }

    let mut sources = sources.into_iter();
    let mut dest = sources
        .next()
        .ok_or_else(|| TransformError::InvalidRequest("no input documents".into()))?;
    let mut next_free_id = dest.max_id;
    let mut page_order = page_ids_in_order(&dest);

    for source in sources {
        let source_pages = page_ids_in_order(&source);
        let offset = next_free_id;

        let mut shifted = BTreeMap::new();
        for (old_id, object) in source.objects.into_iter() {
            shifted.insert((old_id.0 + offset, old_id.1), shift_refs(object, offset));
        }
        dest.objects.extend(shifted);

        for (num, gen) in source_pages {
            page_order.push((num + offset, gen));
        }

        next_free_id = (source.max_id + offset).max(next_free_id);
    }

    rewrite_page_tree(&mut dest, &page_order)?;
    dest.max_id = next_free_id;
    dest.compress();

    let mut out = Vec::new();
    dest.save_to(&mut out)
        .map_err(|e| TransformError::OperationFailed(format!("failed to save merged PDF: {e}")))?;
    Ok(out)
}

/// Page object ids in the document's own page order.
fn page_ids_in_order(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Recursively shift every object reference by `offset`.
fn shift_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference((num, gen)) => Object::Reference((num + offset, gen)),
        Object::Array(items) => {
            Object::Array(items.into_iter().map(|o| shift_refs(o, offset)).collect())
        }
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = shift_refs(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = shift_refs(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Point the destination's root Pages node at the combined page list.
fn rewrite_page_tree(doc: &mut Document, pages: &[ObjectId]) -> Result<(), TransformError> {
    let structural = |what: &str| TransformError::CorruptInput(format!("malformed catalog: {what}"));

    let catalog_id = doc
        .trailer
        .get(b"Root")
        .map_err(|_| structural("trailer has no Root"))?
        .as_reference()
        .map_err(|_| structural("Root is not a reference"))?;

    let pages_id = doc
        .objects
        .get(&catalog_id)
        .ok_or_else(|| structural("catalog object missing"))?
        .as_dict()
        .map_err(|_| structural("catalog is not a dictionary"))?
        .get(b"Pages")
        .map_err(|_| structural("catalog has no Pages"))?
        .as_reference()
        .map_err(|_| structural("Pages is not a reference"))?;

    match doc.objects.get_mut(&pages_id) {
        Some(Object::Dictionary(pages_dict)) => {
            let kids: Vec<Object> = pages.iter().map(|&id| Object::Reference(id)).collect();
            pages_dict.set("Kids", Object::Array(kids));
            pages_dict.set("Count", Object::Integer(pages.len() as i64));
            Ok(())
        }
        _ => Err(structural("Pages node is not a dictionary")),
    }
}
