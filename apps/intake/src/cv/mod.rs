//! Resume intake: upload, text extraction, structuring and page previews.

pub mod handlers;
pub mod ingest;
pub mod records;
