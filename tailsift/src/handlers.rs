use anyhow::{Context, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tailsift_core::extract::{
    ExtractError, ExtractOptions, ExtractionSummary, ProgressCallback, ProgressEvent,
    execute_extraction,
};
use tailsift_core::report::ReportFormat;
use tailsift_core::stats::StatsSnapshot;
use tracing::Level;

/// Expand a leading `~` in a user-supplied path
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Resolve the project directory argument, failing if it is not a directory
pub fn resolve_project_dir(raw: &str) -> anyhow::Result<PathBuf> {
    let path = expand_path(raw);
    if !path.is_dir() {
        return Err(anyhow!(
            "Project directory {} does not exist",
            path.display()
        ));
    }
    Ok(path)
}

/// Translate parsed arguments into extraction options
pub fn options_from_matches(matches: &ArgMatches) -> anyhow::Result<ExtractOptions> {
    let project_dir = matches
        .get_one::<String>("PROJECT_DIR")
        .context("PROJECT_DIR is required")?;
    let mut options = ExtractOptions::new(resolve_project_dir(project_dir)?);

    if let Some(output) = matches.get_one::<String>("output") {
        options.output = expand_path(output);
    }
    if let Some(format) = matches.get_one::<String>("format") {
        options.format = ReportFormat::from_str(format)
            .ok_or_else(|| anyhow!("Unsupported report format '{}'", format))?;
    }
    if let Some(runtime) = matches.get_one::<String>("php-path") {
        options.runtime_path = expand_path(runtime);
    }
    if let Some(threads) = matches.get_one::<usize>("threads") {
        options.workers = (*threads).max(1);
    }
    options.execute_dynamic = matches.get_flag("execute-php");
    options.verbose = !matches.get_flag("quiet");

    Ok(options)
}

pub fn init_tracing(quiet: bool) {
    let level = if quiet { Level::WARN } else { Level::INFO };
    // A subscriber may already be installed (tests); keep it
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Console line for a progress event, if it warrants one
pub fn describe_event(event: &ProgressEvent) -> Option<String> {
    match event {
        ProgressEvent::Started {
            root,
            output,
            execution_enabled,
        } => Some(format!(
            "{} Starting Tailwind component extraction from: {}\n{} Output will be saved to: {}\n{} PHP execution: {}",
            "→".blue(),
            root.display().to_string().bright_white(),
            "→".blue(),
            output.display().to_string().bright_white(),
            "→".blue(),
            if *execution_enabled {
                "Enabled".green()
            } else {
                "Disabled".yellow()
            }
        )),
        ProgressEvent::ExecutionDisabled { runtime, reason } => Some(format!(
            "{} PHP executable not usable at {} ({}). PHP execution will be disabled.",
            "⚠ WARNING".yellow().bold(),
            runtime.display(),
            reason
        )),
        ProgressEvent::FilesDiscovered {
            dynamic_pages,
            markup_files,
        } => Some(format!(
            "{} Found {} PHP files and {} HTML files",
            "✓".green().bold(),
            dynamic_pages.to_string().cyan(),
            markup_files.to_string().cyan()
        )),
        ProgressEvent::ElementsFound {
            path,
            origin,
            count,
        } => Some(format!(
            "  {} Found {} elements from {} {}",
            "•".cyan(),
            count,
            origin.verb(),
            path
        )),
        ProgressEvent::FileFailed { path, reason } => Some(format!(
            "  {} Error processing {}: {}",
            "✗".red().bold(),
            path,
            reason
        )),
        ProgressEvent::CleanedUp { path } => Some(format!(
            "{} Cleaned up temporary directory: {}",
            "✓".green(),
            path.display()
        )),
        ProgressEvent::FileProcessed { .. } => None,
    }
}

/// End-of-run summary as printed to the console
pub fn summary_lines(summary: &ExtractionSummary) -> Vec<String> {
    let stats = &summary.stats;
    let mut lines = vec![
        format!(
            "Extraction complete in {:.2} seconds",
            summary.elapsed.as_secs_f64()
        ),
        format!("Total elements found: {}", stats.elements_found),
        format!("Unique elements saved: {}", stats.unique_elements),
        format!("Duplicate elements skipped: {}", stats.duplicate_elements),
    ];

    if stats.execution_errors > 0 {
        lines.push(format!(
            "Note: {} PHP execution errors occurred during processing",
            stats.execution_errors
        ));
    }

    if !summary.catalog.is_empty() {
        lines.push("Elements by category:".to_string());
        for (category, count) in summary.catalog.counts() {
            lines.push(format!("  {}: {}", category.title(), count));
        }
    }

    lines.push(format!("Results saved to: {}", summary.output.display()));
    lines
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_summary(summary: &ExtractionSummary) {
    println!();
    print_divider();
    println!("{}", "  EXTRACTION COMPLETE".green().bold());
    print_divider();
    for line in summary_lines(summary) {
        println!("{}", line);
    }
    println!();
}

fn print_statistics(stats: &StatsSnapshot) {
    println!("Files scanned: {}", stats.files_scanned);
    println!("Total elements found: {}", stats.elements_found);
    println!("Unique elements: {}", stats.unique_elements);
    println!("Duplicate elements: {}", stats.duplicate_elements);
    if stats.execution_errors > 0 {
        println!("PHP execution errors: {}", stats.execution_errors);
    }
}

/// Spinner plus a lock so worker lines never interleave
struct Console {
    spinner: ProgressBar,
    lock: Mutex<()>,
    processed: AtomicUsize,
}

impl Console {
    fn new(show_spinner: bool) -> Self {
        let spinner = if show_spinner {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                spinner.set_style(style);
            }
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        } else {
            ProgressBar::hidden()
        };

        Self {
            spinner,
            lock: Mutex::new(()),
            processed: AtomicUsize::new(0),
        }
    }

    fn line(&self, message: &str) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.spinner.is_hidden() {
            println!("{}", message);
        } else {
            self.spinner.println(message);
        }
    }

    fn handle(&self, event: ProgressEvent) {
        if let ProgressEvent::FileProcessed { ref path } = event {
            let done = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
            self.spinner
                .set_message(format!("Processed {} files (last: {})", done, path));
        }
        if let Some(message) = describe_event(&event) {
            self.line(&message);
        }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

pub async fn handle_extract(matches: &ArgMatches) {
    let quiet = matches.get_flag("quiet");
    init_tracing(quiet);

    let options = match options_from_matches(matches) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    let console = Arc::new(Console::new(!quiet));
    let sink = console.clone();
    let progress_callback: ProgressCallback = Arc::new(move |event| sink.handle(event));

    let result = execute_extraction(options, Some(progress_callback)).await;
    console.finish();

    match result {
        Ok(summary) => print_summary(&summary),
        Err(ExtractError::ReportWrite { path, source, stats }) => {
            print_statistics(&stats);
            eprintln!(
                "{} Failed to write report to {}: {}",
                "✗".red().bold(),
                path.display(),
                source
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{} Extraction failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}
