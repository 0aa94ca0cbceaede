use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Walk error: {0}")]
    WalkError(String),

    #[error("Page not found: {}", .0.display())]
    MissingPage(PathBuf),

    #[error("Runtime '{}' is unavailable: {reason}", .runtime.display())]
    RuntimeUnavailable { runtime: PathBuf, reason: String },

    #[error("Execution of {} exited with {}: {stderr}", .page.display(), exit_label(.code))]
    ExecutionFailed {
        page: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Execution of {} timed out after {}s", .page.display(), .timeout.as_secs_f32())]
    ExecutionTimeout { page: PathBuf, timeout: Duration },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
