//! Local copy pipeline: dataset on disk → extract verses → chapter files.
//!
//! The source is a directory of per-book subdirectories, each holding
//! `{chapter}.json` chapter documents in the API's shape.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use bibledata_convert::extract_verses;
use bibledata_shared::{BibleDataError, Result, find_book};

use crate::pipeline::ProgressReporter;
use crate::writer;

/// Configuration for converting one local translation dataset.
#[derive(Debug, Clone)]
pub struct CopyConfig {
    /// Directory of per-book subdirectories.
    pub source_dir: PathBuf,
    /// Bundle root the translation folder is written under.
    pub target_root: PathBuf,
    /// Output folder name (e.g. `cu1`).
    pub folder: String,
}

/// Outcome of a copy run.
#[derive(Debug, Clone)]
pub struct CopyReport {
    /// `{target_root}/{folder}`.
    pub target_dir: PathBuf,
    /// Book directories visited.
    pub books: usize,
    /// Chapter files read.
    pub processed: usize,
    /// Chapter files written.
    pub converted: usize,
    /// Chapter files holding no usable verses (no file written).
    pub empty: usize,
    /// Chapter files that failed to read, parse or write, plus book
    /// directories that could not be listed.
    pub failed: usize,
    /// `(BOOK/chapter, error)` for each failure, or `(BOOK, error)` for an
    /// unlisted book directory.
    pub failures: Vec<(String, String)>,
    pub elapsed: Duration,
}

/// Pick the bundle directory: the first existing candidate, otherwise the
/// first candidate, which is created.
pub fn resolve_bundle_dir(candidates: &[PathBuf]) -> Result<PathBuf> {
    if let Some(existing) = candidates.iter().find(|c| c.is_dir()) {
        debug!(path = %existing.display(), "using existing bundle directory");
        return Ok(existing.clone());
    }

    let first = candidates
        .first()
        .ok_or_else(|| BibleDataError::config("no bundle directory candidates configured"))?;

    std::fs::create_dir_all(first).map_err(|e| BibleDataError::io(first, e))?;
    info!(path = %first.display(), "created bundle directory");
    Ok(first.clone())
}

/// Convert every chapter file of a local dataset into the bundle layout.
///
/// A missing source directory is the only fatal error. Files that fail or
/// yield no verses are logged and counted, and the run continues.
#[instrument(skip_all, fields(source = %config.source_dir.display(), folder = %config.folder))]
pub fn copy_translation(
    config: &CopyConfig,
    progress: &dyn ProgressReporter,
) -> Result<CopyReport> {
    let start = Instant::now();

    if !config.source_dir.is_dir() {
        return Err(BibleDataError::not_found(&config.source_dir));
    }

    let target_dir = config.target_root.join(&config.folder);
    std::fs::create_dir_all(&target_dir).map_err(|e| BibleDataError::io(&target_dir, e))?;

    // Collect first so progress has a total.
    let book_dirs = writer::sorted_subdirs(&config.source_dir)?;
    let book_count = book_dirs.len();
    let (books, unlisted) = list_books(book_dirs);
    let total: usize = books.iter().map(|(_, files)| files.len()).sum();

    info!(
        books = book_count,
        files = total,
        target = %target_dir.display(),
        "starting copy"
    );
    progress.phase(&format!(
        "Converting {} → {}/",
        config.source_dir.display(),
        config.folder
    ));

    let mut report = CopyReport {
        target_dir,
        books: book_count,
        processed: 0,
        converted: 0,
        empty: 0,
        failed: unlisted.len(),
        failures: unlisted,
        elapsed: Duration::ZERO,
    };

    for (book_id, files) in &books {
        info!(book = %book_id, chapters = files.len(), "processing book");
        progress.book_started(book_id, files.len());

        for (chapter, path) in files {
            report.processed += 1;
            let label = format!("{book_id}/{chapter}");

            match convert_file(path) {
                Ok(verses) if verses.is_empty() => {
                    warn!(chapter = %label, "no verses found");
                    report.empty += 1;
                }
                Ok(verses) => {
                    match writer::write_chapter(
                        &config.target_root,
                        &config.folder,
                        book_id,
                        *chapter,
                        &verses,
                    ) {
                        Ok(_) => report.converted += 1,
                        Err(e) => {
                            warn!(chapter = %label, error = %e, "failed to write chapter");
                            report.failed += 1;
                            report.failures.push((label.clone(), e.to_string()));
                        }
                    }
                }
                Err(e) => {
                    warn!(chapter = %label, error = %e, "failed to process chapter file");
                    report.failed += 1;
                    report.failures.push((label.clone(), e.to_string()));
                }
            }

            progress.chapter_done(&label, report.processed, total);
        }
    }

    report.elapsed = start.elapsed();
    progress.finish();

    info!(
        processed = report.processed,
        converted = report.converted,
        empty = report.empty,
        failed = report.failed,
        "copy complete"
    );

    Ok(report)
}

type BookFiles = (String, Vec<(u32, PathBuf)>);

/// Chapter files of each book directory. A directory that cannot be listed
/// is logged and returned as a `(BOOK, error)` failure instead.
fn list_books(book_dirs: Vec<PathBuf>) -> (Vec<BookFiles>, Vec<(String, String)>) {
    let mut books = Vec::with_capacity(book_dirs.len());
    let mut failures = Vec::new();

    for book_dir in book_dirs {
        let book_id = writer::dir_name(&book_dir);
        if find_book(&book_id).is_none() {
            debug!(book = %book_id, "book directory is not a canonical id, copying as-is");
        }
        match writer::chapter_files(&book_dir) {
            Ok(files) => books.push((book_id, files)),
            Err(e) => {
                warn!(book = %book_id, error = %e, "failed to list book directory");
                failures.push((book_id, e.to_string()));
            }
        }
    }

    (books, failures)
}

fn convert_file(path: &Path) -> Result<Vec<bibledata_shared::VerseRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| BibleDataError::io(path, e))?;
    let doc: Value = serde_json::from_str(&content)
        .map_err(|e| BibleDataError::parse(format!("{}: {e}", path.display())))?;
    Ok(extract_verses(&doc))
}
