//! Download pipeline: remote API → extract verses → chapter files.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use bibledata_convert::extract_verses;
use bibledata_fetcher::ChapterFetcher;
use bibledata_shared::{BibleDataError, Book, Result, TranslationTarget, total_chapters};

use crate::writer;

/// Configuration for downloading one translation.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Root of the bundled data tree.
    pub output_root: PathBuf,
    /// API translation and the folder it is written to.
    pub translation: TranslationTarget,
    /// Books to fetch, in order.
    pub books: Vec<&'static Book>,
}

/// Outcome of downloading one translation.
#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub translation: TranslationTarget,
    /// `{output_root}/{folder}`.
    pub output_dir: PathBuf,
    /// Chapters written.
    pub downloaded: usize,
    /// Chapters fetched but holding no usable verses (no file written).
    pub empty: usize,
    /// Chapters that failed to download, decode or write.
    pub failed: usize,
    /// `(BOOK/chapter, error)` for each failure.
    pub failures: Vec<(String, String)>,
    pub elapsed: Duration,
}

impl DownloadReport {
    /// Chapters that did not produce a file.
    pub fn skipped(&self) -> usize {
        self.empty + self.failed
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before the chapters of a book are processed.
    fn book_started(&self, book_id: &str, chapters: usize);
    /// Called after each chapter, whatever its outcome.
    fn chapter_done(&self, label: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn finish(&self);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn book_started(&self, _book_id: &str, _chapters: usize) {}
    fn chapter_done(&self, _label: &str, _current: usize, _total: usize) {}
    fn finish(&self) {}
}

/// Download every chapter of the selected books for one translation.
///
/// Requests are made one at a time with the fetcher's fixed delay after
/// each. A chapter that fails or yields no verses is logged and counted;
/// the run always continues with the next chapter.
#[instrument(
    skip_all,
    fields(translation = %config.translation.api_id, folder = %config.translation.folder)
)]
pub async fn download_translation(
    config: &DownloadConfig,
    fetcher: &ChapterFetcher,
    progress: &dyn ProgressReporter,
) -> Result<DownloadReport> {
    let start = Instant::now();
    let api_id = config.translation.api_id.as_str();
    let folder = config.translation.folder.as_str();

    std::fs::create_dir_all(&config.output_root)
        .map_err(|e| BibleDataError::io(&config.output_root, e))?;

    let total = total_chapters(config.books.iter().copied());
    let delay = fetcher.request_delay();

    info!(
        books = config.books.len(),
        chapters = total,
        delay_ms = delay.as_millis(),
        output = %config.output_root.display(),
        "starting download"
    );
    progress.phase(&format!("Downloading {api_id} → {folder}/"));

    let mut report = DownloadReport {
        translation: config.translation.clone(),
        output_dir: config.output_root.join(folder),
        downloaded: 0,
        empty: 0,
        failed: 0,
        failures: Vec::new(),
        elapsed: Duration::ZERO,
    };

    let mut current = 0;
    for book in &config.books {
        info!(book = book.name, id = book.id, chapters = book.chapters, "downloading book");
        progress.book_started(book.id, book.chapters as usize);

        for chapter in 1..=book.chapters {
            current += 1;
            let label = format!("{}/{chapter}", book.id);

            match fetcher.fetch_chapter(api_id, book.id, chapter).await {
                Ok(doc) => {
                    let verses = extract_verses(&doc);
                    if verses.is_empty() {
                        warn!(chapter = %label, "no verses found in response");
                        report.empty += 1;
                    } else {
                        match writer::write_chapter(
                            &config.output_root,
                            folder,
                            book.id,
                            chapter,
                            &verses,
                        ) {
                            Ok(_) => report.downloaded += 1,
                            Err(e) => {
                                warn!(chapter = %label, error = %e, "failed to write chapter");
                                report.failed += 1;
                                report.failures.push((label.clone(), e.to_string()));
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(chapter = %label, error = %e, "failed to download chapter");
                    report.failed += 1;
                    report.failures.push((label.clone(), e.to_string()));
                }
            }

            progress.chapter_done(&label, current, total);

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    report.elapsed = start.elapsed();
    progress.finish();

    info!(
        downloaded = report.downloaded,
        empty = report.empty,
        failed = report.failed,
        elapsed_ms = report.elapsed.as_millis(),
        "download complete"
    );

    Ok(report)
}

/// Download each translation in turn.
pub async fn download_all(
    output_root: &std::path::Path,
    translations: &[TranslationTarget],
    books: &[&'static Book],
    fetcher: &ChapterFetcher,
    progress: &dyn ProgressReporter,
) -> Result<Vec<DownloadReport>> {
    let mut reports = Vec::with_capacity(translations.len());

    for translation in translations {
        let config = DownloadConfig {
            output_root: output_root.to_path_buf(),
            translation: translation.clone(),
            books: books.to_vec(),
        };
        reports.push(download_translation(&config, fetcher, progress).await?);
    }

    Ok(reports)
}
