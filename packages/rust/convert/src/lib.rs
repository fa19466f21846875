//! Chapter document conversion.
//!
//! This crate provides:
//! - [`flatten_content`]: nested verse content to plain text
//! - [`extract_verses`]: a chapter document to sorted [`VerseRecord`]s
//!
//! [`VerseRecord`]: bibledata_shared::VerseRecord

pub mod extract;
pub mod flatten;

pub use extract::{extract_verses, normalize};
pub use flatten::flatten_content;
