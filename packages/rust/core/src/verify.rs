//! Consistency check of a written chapter tree.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use bibledata_shared::{BibleDataError, Result, VerseRecord, find_book};

use crate::writer;

/// A problem found in one chapter file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyIssue {
    pub path: PathBuf,
    pub message: String,
}

/// Summary of a verify run.
#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub translations: usize,
    pub books: usize,
    pub chapters: usize,
    pub verses: usize,
    pub issues: Vec<VerifyIssue>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn issue(&mut self, path: &Path, message: impl Into<String>) {
        self.issues.push(VerifyIssue {
            path: path.to_path_buf(),
            message: message.into(),
        });
    }
}

/// Walk `{root}/{folder}/{BOOK}/{n}.json` and check every chapter file.
///
/// Only a missing or unreadable root is an error. Directories that cannot be
/// listed below it are reported as issues and the walk continues.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn verify_tree(root: &Path) -> Result<VerifyReport> {
    if !root.is_dir() {
        return Err(BibleDataError::not_found(root));
    }

    let mut report = VerifyReport::default();

    for translation_dir in writer::sorted_subdirs(root)? {
        verify_translation(&mut report, &translation_dir);
    }

    info!(
        translations = report.translations,
        books = report.books,
        chapters = report.chapters,
        verses = report.verses,
        issues = report.issues.len(),
        "verify complete"
    );

    Ok(report)
}

fn verify_translation(report: &mut VerifyReport, translation_dir: &Path) {
    report.translations += 1;

    match writer::sorted_subdirs(translation_dir) {
        Ok(book_dirs) => {
            for book_dir in book_dirs {
                verify_book(report, &book_dir);
            }
        }
        Err(e) => {
            warn!(path = %translation_dir.display(), error = %e, "cannot list translation");
            report.issue(translation_dir, e.to_string());
        }
    }
}

fn verify_book(report: &mut VerifyReport, book_dir: &Path) {
    report.books += 1;
    let book_id = writer::dir_name(book_dir);
    let book = find_book(&book_id);
    if book.is_none() {
        report.issue(book_dir, format!("'{book_id}' is not a canonical book id"));
    }

    let files = match writer::chapter_files(book_dir) {
        Ok(files) => files,
        Err(e) => {
            warn!(path = %book_dir.display(), error = %e, "cannot list book");
            report.issue(book_dir, e.to_string());
            return;
        }
    };

    for (chapter, path) in files {
        report.chapters += 1;

        if let Some(book) = book.filter(|b| chapter == 0 || chapter > b.chapters) {
            let message = format!(
                "{} has chapters 1..={}, found {chapter}",
                book.id, book.chapters
            );
            report.issue(&path, message);
        }

        match writer::read_chapter(&path) {
            Ok(verses) => {
                report.verses += verses.len();
                for message in check_verses(&verses) {
                    report.issue(&path, message);
                }
            }
            Err(e) => report.issue(&path, e.to_string()),
        }
    }
}

/// Invariant violations within one chapter's verse list.
fn check_verses(verses: &[VerseRecord]) -> Vec<String> {
    let mut problems = Vec::new();

    if verses.is_empty() {
        problems.push("chapter has no verses".to_string());
    }

    for v in verses {
        if v.verse == 0 {
            problems.push("verse number 0".to_string());
        }
        // Same blank rule the extractor applies.
        if v.text.trim().is_empty() {
            problems.push(format!("verse {} has empty text", v.verse));
        }
    }

    for pair in verses.windows(2) {
        if pair[1].verse <= pair[0].verse {
            problems.push(format!(
                "verse {} follows verse {} (must be strictly ascending)",
                pair[1].verse, pair[0].verse
            ));
        }
    }

    problems
}
