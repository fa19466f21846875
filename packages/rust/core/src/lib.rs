//! Pipeline orchestration for bibledata.
//!
//! This crate ties fetching, verse extraction and chapter writing together
//! into the `download` and `copy` workflows, plus `verify` for checking a
//! written tree.

pub mod copy;
pub mod pipeline;
pub mod verify;
pub mod writer;

pub use copy::{CopyConfig, CopyReport, copy_translation, resolve_bundle_dir};
pub use pipeline::{
    DownloadConfig, DownloadReport, ProgressReporter, SilentProgress, download_all,
    download_translation,
};
pub use verify::{VerifyIssue, VerifyReport, verify_tree};
