// Execution mode: run a dynamic page through an external runtime and capture its output

use crate::error::{Result, ScanError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

/// Hard limit for a single page execution (and for the startup probe)
pub const EXECUTION_TIMEOUT: Duration = Duration::from_secs(5);

/// What came back from one subprocess run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Completed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    TimedOut,
}

/// External runtime used to render dynamic pages.
///
/// Owns a scratch directory handed to every subprocess as `TMPDIR`. Call
/// [`PageRuntime::cleanup`] when the run is over; dropping the runtime also
/// removes it.
#[derive(Debug)]
pub struct PageRuntime {
    executable: PathBuf,
    timeout: Duration,
    scratch_path: PathBuf,
    scratch: Mutex<Option<TempDir>>,
}

impl PageRuntime {
    /// Check that `executable` can be launched (`--version`) and set up the
    /// scratch directory. Any failure here means execution mode stays off.
    pub async fn probe(executable: impl Into<PathBuf>) -> Result<Self> {
        let executable = executable.into();
        let unavailable = |reason: String| ScanError::RuntimeUnavailable {
            runtime: executable.clone(),
            reason,
        };

        let child = Command::new(&executable)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| unavailable(e.to_string()))?;

        match tokio::time::timeout(EXECUTION_TIMEOUT, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                debug!(
                    "Runtime {} reports: {}",
                    executable.display(),
                    String::from_utf8_lossy(&output.stdout).trim()
                );
            }
            Ok(Err(e)) => return Err(unavailable(e.to_string())),
            Err(_) => return Err(unavailable("version check timed out".to_string())),
        }

        let scratch = tempfile::Builder::new()
            .prefix("tailsift_extract_")
            .tempdir()?;
        debug!("Created scratch directory {}", scratch.path().display());

        Ok(Self {
            executable,
            timeout: EXECUTION_TIMEOUT,
            scratch_path: scratch.path().to_path_buf(),
            scratch: Mutex::new(Some(scratch)),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_path
    }

    /// Fixed server-style variables for `page`
    pub fn synthetic_environment(&self, page: &Path) -> Vec<(&'static str, String)> {
        let script_name = page
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let document_root = page
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        vec![
            ("REQUEST_URI", "/".to_string()),
            ("SCRIPT_NAME", script_name),
            ("DOCUMENT_ROOT", document_root),
            ("SERVER_NAME", "localhost".to_string()),
            ("HTTP_HOST", "localhost".to_string()),
            ("TMPDIR", self.scratch_path.display().to_string()),
        ]
    }

    /// Run `page` once. Only launch and I/O problems are errors here; exit
    /// status and timeouts are reported in the outcome.
    pub async fn run(&self, page: &Path) -> Result<ExecutionOutcome> {
        if !tokio::fs::try_exists(page).await.unwrap_or(false) {
            return Err(ScanError::MissingPage(page.to_path_buf()));
        }

        let child = Command::new(&self.executable)
            .arg(page)
            .envs(self.synthetic_environment(page))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // On timeout the child is dropped, which kills it
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                Ok(ExecutionOutcome::Completed {
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            Err(_) => Ok(ExecutionOutcome::TimedOut),
        }
    }

    /// Run `page` and return its stdout as markup. Non-zero exit and timeout
    /// are errors.
    pub async fn render(&self, page: &Path) -> Result<String> {
        match self.run(page).await? {
            ExecutionOutcome::Completed {
                code: Some(0),
                stdout,
                ..
            } => Ok(stdout),
            ExecutionOutcome::Completed { code, stderr, .. } => Err(ScanError::ExecutionFailed {
                page: page.to_path_buf(),
                code,
                stderr: stderr.trim().to_string(),
            }),
            ExecutionOutcome::TimedOut => Err(ScanError::ExecutionTimeout {
                page: page.to_path_buf(),
                timeout: self.timeout,
            }),
        }
    }

    /// Remove the scratch directory. Returns the removed path, or `None` if
    /// it was already cleaned up.
    pub fn cleanup(&self) -> Result<Option<PathBuf>> {
        let scratch = self
            .scratch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match scratch {
            Some(dir) => {
                let path = dir.path().to_path_buf();
                dir.close().map_err(|e| {
                    warn!("Failed to clean up scratch directory {}: {}", path.display(), e);
                    ScanError::IoError(e)
                })?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }
}
