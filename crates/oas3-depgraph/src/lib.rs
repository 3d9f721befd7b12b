#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]

pub mod extractor;
pub mod ui;
