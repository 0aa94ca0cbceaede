// File discovery: walk a project tree and partition it into dynamic pages and markup files

use crate::error::{Result, ScanError};
use ignore::WalkBuilder;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directories that never contain hand-written templates
pub const SKIP_DIRS: &[&str] = &["node_modules", "vendor", "uploads", "cache", ".git", "log", "logs"];

/// Files above this size are skipped silently (5 MiB)
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

const DYNAMIC_EXTENSIONS: &[&str] = &[".php"];
const MARKUP_EXTENSIONS: &[&str] = &[".html", ".htm", ".tpl"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Markup,
    DynamicPage,
}

impl SourceKind {
    /// Classify a file by name. Returns `None` for unsupported extensions.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if DYNAMIC_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            Some(SourceKind::DynamicPage)
        } else if MARKUP_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            Some(SourceKind::Markup)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub size: u64,
}

/// Result of walking a project tree
#[derive(Debug, Default, Clone)]
pub struct DiscoveredFiles {
    pub dynamic_pages: Vec<SourceFile>,
    pub markup_files: Vec<SourceFile>,
    /// Every file that passed the hidden/size filters, whatever its extension
    pub files_scanned: usize,
}

impl DiscoveredFiles {
    /// Dynamic pages first, then markup files, in discovery order
    pub fn into_work_queue(self) -> Vec<SourceFile> {
        let mut queue = self.dynamic_pages;
        queue.extend(self.markup_files);
        queue
    }

    pub fn total(&self) -> usize {
        self.dynamic_pages.len() + self.markup_files.len()
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn is_skipped_dir(name: &str) -> bool {
    is_hidden(name) || SKIP_DIRS.contains(&name)
}

/// Walk `root` and collect the files worth scanning.
///
/// Directories in [`SKIP_DIRS`] or starting with `.` are pruned. Hidden files,
/// files over [`MAX_FILE_SIZE`] and files whose size cannot be read are skipped
/// without counting. Entries are visited sorted by name.
pub fn discover(root: &Path) -> Result<DiscoveredFiles> {
    if !root.is_dir() {
        return Err(ScanError::WalkError(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            // Never prune the root itself
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir && is_skipped_dir(&entry.file_name().to_string_lossy()))
        })
        .build();

    let mut discovered = DiscoveredFiles::default();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.depth() == 0 || entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if is_hidden(&name) {
            continue;
        }

        // Follows symlinks; a vanished file is a skip, not an error
        let size = match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => continue,
        };
        if size > MAX_FILE_SIZE {
            debug!("Skipping oversized file {} ({} bytes)", entry.path().display(), size);
            continue;
        }

        discovered.files_scanned += 1;

        let Some(kind) = SourceKind::from_file_name(&name) else {
            continue;
        };

        let file = SourceFile {
            path: entry.path().to_path_buf(),
            kind,
            size,
        };
        match kind {
            SourceKind::DynamicPage => discovered.dynamic_pages.push(file),
            SourceKind::Markup => discovered.markup_files.push(file),
        }
    }

    debug!(
        "Discovered {} dynamic pages and {} markup files ({} files scanned)",
        discovered.dynamic_pages.len(),
        discovered.markup_files.len(),
        discovered.files_scanned
    );

    Ok(discovered)
}
