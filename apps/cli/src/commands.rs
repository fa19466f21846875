//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use bibledata_core::{
    CopyConfig, ProgressReporter, copy_translation, download_all, resolve_bundle_dir,
    verify_tree,
};
use bibledata_fetcher::ChapterFetcher;
use bibledata_shared::{
    AppConfig, TranslationTarget, init_config, load_config, load_config_from, select_books,
    total_chapters,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// bibledata: fetch and convert Bible text for the app bundle.
#[derive(Parser)]
#[command(
    name = "bibledata",
    version,
    about = "Download or convert Bible chapters into the app's bundled {verse, text} JSON layout.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.bibledata/bibledata.toml).
    #[arg(long, global = true, env = "BIBLEDATA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Download translations chapter by chapter from the remote API.
    Download {
        /// Output root (defaults to `output.dir` from config).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Translation as API_ID or API_ID:FOLDER; repeatable. Defaults to config.
        #[arg(short, long = "translation")]
        translations: Vec<TranslationTarget>,

        /// Only these book IDs (e.g. GEN); repeatable. Defaults to all 66.
        #[arg(short, long = "book")]
        books: Vec<String>,
    },

    /// Convert a local dataset of chapter documents into the bundle layout.
    Copy {
        /// Source directory of per-book subdirectories.
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Bundle directory (skips the configured candidates).
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// Output folder name inside the bundle.
        #[arg(short, long)]
        folder: Option<String>,
    },

    /// Check a written tree: sorted unique verses, canonical books, parseable files.
    Verify {
        /// Tree root (defaults to `output.dir` from config).
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "bibledata=info",
        1 => "bibledata=debug",
        _ => "bibledata=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Download {
            out,
            translations,
            books,
        } => cmd_download(config_path, out, translations, &books).await,
        Command::Copy {
            source,
            target,
            folder,
        } => cmd_copy(config_path, source, target, folder).await,
        Command::Verify { dir } => cmd_verify(config_path, dir).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path).await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_download(
    config_path: Option<&Path>,
    out: Option<PathBuf>,
    translations: Vec<TranslationTarget>,
    book_ids: &[String],
) -> Result<()> {
    let config = resolve_config(config_path)?;

    let output_root = out.unwrap_or_else(|| PathBuf::from(&config.output.dir));
    let translations = if translations.is_empty() {
        config.translations.clone()
    } else {
        translations
    };
    if translations.is_empty() {
        return Err(eyre!("no translations configured; pass --translation API_ID[:FOLDER]"));
    }
    let books = select_books(book_ids)?;

    let fetcher = ChapterFetcher::new(&config.api)?;

    info!(
        api = %config.api.base_url,
        output = %output_root.display(),
        translations = translations.len(),
        books = books.len(),
        "downloading Bible data"
    );

    println!("Downloading Bible data to: {}", output_root.display());
    println!("API:          {}", config.api.base_url);
    println!(
        "Translations: {}",
        translations
            .iter()
            .map(|t| t.api_id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let reporter = CliProgress::new(total_chapters(books.iter().copied()));
    let reports = download_all(&output_root, &translations, &books, &fetcher, &reporter).await?;

    println!();
    for report in &reports {
        println!(
            "  {} → {}/: {} downloaded, {} empty, {} failed ({:.1}s)",
            report.translation.api_id,
            report.translation.folder,
            report.downloaded,
            report.empty,
            report.failed,
            report.elapsed.as_secs_f64()
        );
        for (chapter, error) in &report.failures {
            println!("      {chapter}: {error}");
        }
    }
    println!();
    println!("  Files saved to: {}", output_root.display());
    println!();

    Ok(())
}

async fn cmd_copy(
    config_path: Option<&Path>,
    source: Option<PathBuf>,
    target: Option<PathBuf>,
    folder: Option<String>,
) -> Result<()> {
    let config = resolve_config(config_path)?;

    let source_dir = source.unwrap_or_else(|| PathBuf::from(&config.copy.source_dir));
    let folder = folder.unwrap_or_else(|| config.copy.folder.clone());

    // Check the source before creating any bundle directory.
    if !source_dir.is_dir() {
        return Err(eyre!("source directory not found: {}", source_dir.display()));
    }

    let target_root = match target {
        Some(t) => t,
        None => {
            let candidates: Vec<PathBuf> =
                config.copy.bundle_candidates.iter().map(PathBuf::from).collect();
            resolve_bundle_dir(&candidates)?
        }
    };

    info!(
        source = %source_dir.display(),
        target = %target_root.display(),
        folder = %folder,
        "copying local dataset"
    );

    println!("Copying from: {}", source_dir.display());
    println!("Target:       {}", target_root.join(&folder).display());

    let copy_config = CopyConfig {
        source_dir,
        target_root,
        folder,
    };

    // Total is unknown until the source tree is listed.
    let reporter = CliProgress::new(0);
    let report = copy_translation(&copy_config, &reporter)?;

    println!();
    println!("  Conversion complete!");
    println!("  Books:     {}", report.books);
    println!("  Processed: {}", report.processed);
    println!("  Converted: {}", report.converted);
    println!("  Empty:     {}", report.empty);
    println!("  Failed:    {}", report.failed);
    for (chapter, error) in &report.failures {
        println!("      {chapter}: {error}");
    }
    println!("  Target:    {}", report.target_dir.display());
    println!("  Time:      {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_verify(config_path: Option<&Path>, dir: Option<PathBuf>) -> Result<()> {
    let root = match dir {
        Some(d) => d,
        None => PathBuf::from(resolve_config(config_path)?.output.dir),
    };

    info!(root = %root.display(), "verifying chapter tree");
    let report = verify_tree(&root)?;

    println!();
    println!("  Translations: {}", report.translations);
    println!("  Books:        {}", report.books);
    println!("  Chapters:     {}", report.chapters);
    println!("  Verses:       {}", report.verses);
    println!("  Issues:       {}", report.issues.len());
    for issue in &report.issues {
        println!("      {}: {}", issue.path.display(), issue.message);
    }
    println!();

    if !report.is_clean() {
        return Err(eyre!("{} issue(s) found under {}", report.issues.len(), root.display()));
    }

    Ok(())
}

async fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = init_config(config_path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
        bar.set_style(style);
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar.reset();
        self.bar.set_message(name.to_string());
    }

    fn book_started(&self, book_id: &str, chapters: usize) {
        self.bar.set_message(format!("{book_id} ({chapters} chapters)"));
    }

    fn chapter_done(&self, label: &str, current: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(current as u64);
        self.bar.set_message(label.to_string());
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
