//! Shared types, error model, and configuration for bibledata.
//!
//! This crate is the foundation depended on by all other bibledata crates.
//! It provides:
//! - [`BibleDataError`], the unified error type
//! - Domain types ([`VerseRecord`], [`TranslationTarget`]) and the book canon
//! - Configuration ([`AppConfig`], config loading)

pub mod canon;
pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use canon::{BOOKS, Book, Testament, find_book, select_books, total_chapters};
pub use config::{
    ApiConfig, AppConfig, CopySourceConfig, OutputConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{BibleDataError, Result};
pub use types::{TranslationTarget, VerseRecord};
