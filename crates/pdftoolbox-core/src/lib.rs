//! PDF Toolbox transform engine.
//!
//! Loads uploaded PDF documents, dispatches a named operation (merge,
//! split, compress) and produces either a single output document or an
//! ordered archive bundle. Built on lopdf for page-level load/copy/save.

pub mod archive;
pub mod compress;
pub mod engine;
pub mod error;
pub mod merge;
pub mod operation;
pub mod split;

pub use archive::bundle_archive;
pub use engine::{
    execute, page_count, ArchiveEntry, InputDocument, TransformOutput, TransformRequest,
    TransformResult,
};
pub use error::TransformError;
pub use operation::{Operation, PLANNED_TOOLS};
