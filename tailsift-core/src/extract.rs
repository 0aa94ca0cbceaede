// Extraction pipeline: discover files, scan them on a bounded worker pool, write the catalog

use crate::catalog::Catalog;
use crate::report::{self, ReportFormat};
use crate::stats::{Counter, RunStatistics, StatsSnapshot};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tailsift_scanner::fragment::{self, Fragment, FragmentOrigin};
use tailsift_scanner::{
    AcceptedElement, Admission, Candidate, DedupIndex, Document, Fingerprint, PageRuntime,
    ScanError, SourceFile, SourceKind, classify, discover, scan,
};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub const DEFAULT_OUTPUT: &str = "tailwind_components.txt";
pub const DEFAULT_RUNTIME: &str = "php";
pub const DEFAULT_WORKERS: usize = 4;

/// Options for configuring an extraction run
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub root: PathBuf,
    pub output: PathBuf,
    pub format: ReportFormat,
    /// Also run dynamic pages through `runtime_path` and scan their output
    pub execute_dynamic: bool,
    pub runtime_path: PathBuf,
    /// Worker pool size; 0 is treated as 1
    pub workers: usize,
    /// Emit per-file progress events
    pub verbose: bool,
}

impl ExtractOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            format: ReportFormat::Text,
            execute_dynamic: false,
            runtime_path: PathBuf::from(DEFAULT_RUNTIME),
            workers: DEFAULT_WORKERS,
            verbose: true,
        }
    }
}

/// Progress notifications sent to the caller while a run is in flight
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started {
        root: PathBuf,
        output: PathBuf,
        execution_enabled: bool,
    },
    ExecutionDisabled {
        runtime: PathBuf,
        reason: String,
    },
    FilesDiscovered {
        dynamic_pages: usize,
        markup_files: usize,
    },
    ElementsFound {
        path: String,
        origin: FragmentOrigin,
        count: usize,
    },
    FileFailed {
        path: String,
        reason: String,
    },
    FileProcessed {
        path: String,
    },
    CleanedUp {
        path: PathBuf,
    },
}

/// Callback for reporting extraction progress
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Project directory {} does not exist", .0.display())]
    MissingRoot(PathBuf),

    #[error("Discovery failed: {0}")]
    Discovery(#[from] ScanError),

    #[error("Worker pool closed: {0}")]
    Pool(#[from] tokio::sync::AcquireError),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Failed to render report: {0}")]
    Render(#[from] serde_json::Error),

    #[error("Failed to write report to {}: {source}", .path.display())]
    ReportWrite {
        path: PathBuf,
        source: std::io::Error,
        stats: StatsSnapshot,
    },
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct ExtractionSummary {
    pub root: PathBuf,
    /// Absolute path of the written report
    pub output: PathBuf,
    pub stats: StatsSnapshot,
    pub catalog: Catalog,
    pub execution_enabled: bool,
    pub elapsed: Duration,
}

/// State shared by every unit of work
struct Harvest {
    root: PathBuf,
    index: DedupIndex,
    stats: RunStatistics,
    catalog: Mutex<Catalog>,
    progress: Option<ProgressCallback>,
    verbose: bool,
}

impl Harvest {
    fn new(root: PathBuf, progress: Option<ProgressCallback>, verbose: bool) -> Self {
        Self {
            root,
            index: DedupIndex::new(),
            stats: RunStatistics::new(),
            catalog: Mutex::new(Catalog::new()),
            progress,
            verbose,
        }
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(ref callback) = self.progress {
            callback(event);
        }
    }

    fn emit_verbose(&self, event: ProgressEvent) {
        if self.verbose {
            self.emit(event);
        }
    }

    fn relative(&self, path: &Path) -> String {
        report::relative_display(&self.root, path)
    }

    /// Admit `candidate` if its structure is new. Accepted elements are
    /// cleaned, classified and appended to the catalog.
    ///
    /// The catalog lock is held across the index check, so catalog order is
    /// acceptance order. Locks are always taken catalog first, then index.
    fn try_accept(&self, candidate: Candidate<'_>) -> Admission {
        let fingerprint = Fingerprint::of_element(candidate.element);
        let mut catalog = self.catalog.lock().unwrap_or_else(PoisonError::into_inner);
        let admission = self.index.check_and_insert(fingerprint);

        match admission {
            Admission::Duplicate => self.stats.increment(Counter::DuplicateElements),
            Admission::Accepted => {
                catalog.push(AcceptedElement::new(
                    fingerprint,
                    classify(candidate.element),
                    candidate.source.to_path_buf(),
                    candidate.element.cleaned(),
                ));
                self.stats.increment(Counter::UniqueElements);
            }
        }

        admission
    }

    /// Parse one fragment and run every candidate through the index.
    /// Returns the number of candidates found.
    fn scan_fragment(&self, source: &Path, fragment: &Fragment) -> usize {
        let document = Document::parse(&fragment.markup);
        let candidates = scan(&document, source);

        for candidate in &candidates {
            self.try_accept(*candidate);
        }

        self.stats.add(Counter::ElementsFound, candidates.len());
        debug!(
            "{} candidates from {} ({:?})",
            candidates.len(),
            source.display(),
            fragment.origin
        );
        candidates.len()
    }

    fn take_catalog(&self) -> Catalog {
        std::mem::take(&mut *self.catalog.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Process one source file. Every failure is absorbed here.
async fn process_unit(harvest: Arc<Harvest>, runtime: Option<Arc<PageRuntime>>, file: SourceFile) {
    let relative = harvest.relative(&file.path);
    let mut fragments = Vec::new();

    match tokio::fs::read(&file.path).await {
        Ok(bytes) => fragments.push(match file.kind {
            SourceKind::Markup => fragment::markup_fragment(&bytes),
            SourceKind::DynamicPage => fragment::static_fragment(&bytes),
        }),
        Err(e) => {
            warn!("Failed to read {}: {}", file.path.display(), e);
            harvest.emit_verbose(ProgressEvent::FileFailed {
                path: relative.clone(),
                reason: e.to_string(),
            });
        }
    }

    if file.kind == SourceKind::DynamicPage
        && let Some(runtime) = runtime.as_deref()
    {
        match runtime.render(&file.path).await {
            Ok(markup) => {
                harvest.stats.increment(Counter::PhpFilesExecuted);
                fragments.push(Fragment::new(FragmentOrigin::Execution, markup));
            }
            Err(e) => {
                harvest.stats.increment(Counter::ExecutionErrors);
                warn!("{}", e);
                harvest.emit_verbose(ProgressEvent::FileFailed {
                    path: relative.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    // Static and executed output are scanned as separate documents
    for fragment in fragments {
        if fragment.is_blank() {
            continue;
        }

        let origin = fragment.origin;
        let worker = harvest.clone();
        let source = file.path.clone();

        match tokio::task::spawn_blocking(move || worker.scan_fragment(&source, &fragment)).await {
            Ok(0) => {}
            Ok(count) => harvest.emit_verbose(ProgressEvent::ElementsFound {
                path: relative.clone(),
                origin,
                count,
            }),
            Err(e) => {
                warn!("Scanning {} failed: {}", relative, e);
                harvest.emit_verbose(ProgressEvent::FileFailed {
                    path: relative.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    harvest.emit(ProgressEvent::FileProcessed { path: relative });
}

async fn run_pipeline(
    harvest: &Arc<Harvest>,
    runtime: Option<Arc<PageRuntime>>,
    workers: usize,
    output: &Path,
    format: ReportFormat,
) -> Result<PathBuf, ExtractError> {
    let root = harvest.root.clone();
    let discovered = tokio::task::spawn_blocking(move || discover(&root)).await??;

    harvest.stats.add(Counter::FilesScanned, discovered.files_scanned);
    harvest.stats.add(Counter::PhpFilesFound, discovered.dynamic_pages.len());
    harvest.stats.add(Counter::HtmlFilesFound, discovered.markup_files.len());

    info!(
        "Found {} PHP files and {} HTML files",
        discovered.dynamic_pages.len(),
        discovered.markup_files.len()
    );
    harvest.emit_verbose(ProgressEvent::FilesDiscovered {
        dynamic_pages: discovered.dynamic_pages.len(),
        markup_files: discovered.markup_files.len(),
    });

    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut handles = Vec::with_capacity(discovered.total());

    for file in discovered.into_work_queue() {
        // A unit is only spawned once it holds a permit, so units start in queue order
        let permit = semaphore.clone().acquire_owned().await?;
        let harvest = harvest.clone();
        let runtime = runtime.clone();

        handles.push(tokio::spawn(async move {
            let _permit = permit;
            process_unit(harvest, runtime, file).await;
        }));
    }

    for result in futures::future::join_all(handles).await {
        if let Err(e) = result {
            warn!("Worker task failed: {}", e);
        }
    }

    write_report(harvest, output, format).await
}

async fn write_report(
    harvest: &Harvest,
    output: &Path,
    format: ReportFormat,
) -> Result<PathBuf, ExtractError> {
    let stats = harvest.stats.snapshot();

    let rendered = {
        let catalog = harvest.catalog.lock().unwrap_or_else(PoisonError::into_inner);
        let data = report::gather_report_data(&harvest.root, stats.clone(), &catalog);
        report::render_report(&data, format)?
    };

    tokio::fs::write(output, rendered)
        .await
        .map_err(|source| ExtractError::ReportWrite {
            path: output.to_path_buf(),
            source,
            stats: stats.clone(),
        })?;

    info!(
        "Saved {} unique elements to {}",
        stats.unique_elements,
        output.display()
    );

    Ok(std::path::absolute(output).unwrap_or_else(|_| output.to_path_buf()))
}

/// Execute an extraction run with the given options.
///
/// Only a missing project directory fails before any work starts. Per-file
/// problems end up in the statistics. The execution scratch directory is
/// removed before returning, whether or not the run succeeded.
pub async fn execute_extraction(
    options: ExtractOptions,
    progress_callback: Option<ProgressCallback>,
) -> Result<ExtractionSummary, ExtractError> {
    let ExtractOptions {
        root,
        output,
        format,
        execute_dynamic,
        runtime_path,
        workers,
        verbose,
    } = options;

    let started = Instant::now();

    let root = match tokio::fs::canonicalize(&root).await {
        Ok(path) if path.is_dir() => path,
        _ => return Err(ExtractError::MissingRoot(root)),
    };

    let runtime = if execute_dynamic {
        match PageRuntime::probe(&runtime_path).await {
            Ok(runtime) => {
                debug!("Executing pages with {}", runtime.executable().display());
                Some(Arc::new(runtime))
            }
            Err(e) => {
                warn!("{}. PHP execution will be disabled.", e);
                if let Some(ref callback) = progress_callback {
                    callback(ProgressEvent::ExecutionDisabled {
                        runtime: runtime_path.clone(),
                        reason: e.to_string(),
                    });
                }
                None
            }
        }
    } else {
        None
    };
    let execution_enabled = runtime.is_some();

    info!(
        "Starting extraction of {} with {} workers (execution {})",
        root.display(),
        workers.max(1),
        if execution_enabled { "enabled" } else { "disabled" }
    );

    let harvest = Arc::new(Harvest::new(root.clone(), progress_callback, verbose));

    harvest.emit_verbose(ProgressEvent::Started {
        root: root.clone(),
        output: output.clone(),
        execution_enabled,
    });

    let result = run_pipeline(&harvest, runtime.clone(), workers, &output, format).await;

    if let Some(runtime) = runtime {
        match runtime.cleanup() {
            Ok(Some(path)) => {
                debug!("Cleaned up scratch directory {}", path.display());
                harvest.emit_verbose(ProgressEvent::CleanedUp { path });
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to clean up scratch directory: {}", e),
        }
    }

    let output = result?;

    Ok(ExtractionSummary {
        root,
        output,
        stats: harvest.stats.snapshot(),
        catalog: harvest.take_catalog(),
        execution_enabled,
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;
    use tailsift_scanner::{Category, Element};

    fn button(class: String) -> Element {
        Element::new("button").with_attribute("class", class)
    }

    fn submit(harvest: &Harvest, element: &Element) -> Admission {
        harvest.try_accept(Candidate {
            element,
            source: Path::new("/srv/site/index.html"),
        })
    }

    #[test]
    fn test_catalog_follows_acceptance_order() {
        let harvest = Harvest::new(PathBuf::from("/srv/site"), None, false);
        for class in ["btn-a", "btn-b", "btn-a", "btn-c", "btn-b"] {
            submit(&harvest, &button(class.to_string()));
        }

        let catalog = harvest.take_catalog();
        let classes: Vec<&str> = catalog
            .get(Category::Buttons)
            .unwrap()
            .elements
            .iter()
            .filter_map(|accepted| accepted.element.class_value())
            .collect();
        assert_eq!(classes, vec!["btn-a", "btn-b", "btn-c"]);
    }

    #[test]
    fn test_concurrent_accepts_keep_index_and_catalog_in_step() {
        let harvest = Arc::new(Harvest::new(PathBuf::from("/srv/site"), None, false));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let harvest = harvest.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        submit(&harvest, &button(format!("btn-{}", i)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = harvest.stats.snapshot();
        assert_eq!(stats.unique_elements, 50);
        assert_eq!(stats.duplicate_elements, 350);
        assert_eq!(harvest.index.len(), 50);

        let catalog = harvest.take_catalog();
        let fingerprints: HashSet<Fingerprint> = catalog.fingerprints().collect();
        assert_eq!(catalog.len(), 50);
        assert_eq!(fingerprints.len(), 50);
        assert!(fingerprints.iter().all(|fp| harvest.index.contains(fp)));
    }
}
