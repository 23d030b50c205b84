//! Zip bundling for multi-document outputs.
//!
//! Member order in the archive equals production order, so `page-1.pdf`
//! through `page-N.pdf` come out exactly as the split produced them.

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::engine::ArchiveEntry;
use crate::error::TransformError;

/// Write the entries into a zip container, preserving order.
pub fn bundle_archive(entries: &[ArchiveEntry]) -> Result<Vec<u8>, TransformError> {
    let archive_err =
        |what: &str, e: zip::result::ZipError| TransformError::OperationFailed(format!("{what}: {e}"));

    let mut buf = Vec::new();
    {
        let mut writer = ZipWriter::new(Cursor::new(&mut buf));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in entries {
            writer
                .start_file(entry.name.as_str(), options)
                .map_err(|e| archive_err("failed to open archive member", e))?;
            writer.write_all(&entry.bytes).map_err(|e| {
                TransformError::OperationFailed(format!("failed to write archive member: {e}"))
            })?;
        }

        writer
            .finish()
            .map_err(|e| archive_err("failed to finalize archive", e))?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::ZipArchive;

    #[test]
    fn bundle_preserves_member_order() {
        let entries = vec![
            ArchiveEntry {
                name: "page-1.pdf".into(),
                bytes: b"one".to_vec(),
            },
            ArchiveEntry {
                name: "page-2.pdf".into(),
                bytes: b"two".to_vec(),
            },
            ArchiveEntry {
                name: "page-3.pdf".into(),
                bytes: b"three".to_vec(),
            },
        ];

        let zipped = bundle_archive(&entries).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(zipped)).unwrap();
        assert_eq!(archive.len(), 3);
        for (i, expected) in ["page-1.pdf", "page-2.pdf", "page-3.pdf"].iter().enumerate() {
            let member = archive.by_index(i).unwrap();
            assert_eq!(&member.name(), expected);
        }
    }

    #[test]
    fn bundle_of_nothing_is_a_valid_empty_archive() {
        let zipped = bundle_archive(&[]).unwrap();
        let archive = ZipArchive::new(Cursor::new(zipped)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
