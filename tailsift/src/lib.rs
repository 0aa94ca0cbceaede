pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub mod commands;
pub mod handlers;

// Re-export extraction functionality from tailsift-core
pub use tailsift_core::extract::{
    ExtractOptions, ExtractionSummary, ProgressCallback, ProgressEvent, execute_extraction,
};
