use colored::Colorize;

pub mod catalog;
pub mod extract;
pub mod report;
pub mod stats;

pub use catalog::{Catalog, CategoryGroup};
pub use extract::{
    ExtractError, ExtractOptions, ExtractionSummary, ProgressCallback, ProgressEvent,
    execute_extraction,
};
pub use report::ReportFormat;
pub use stats::{Counter, RunStatistics, StatsSnapshot};

const BANNER: &str = r#"
  ╔══════════════════════════════════════════════════════╗
  ║  ▀█▀ ▄▀█ █ █   █▀ █ █▀▀ ▀█▀                          ║
  ║   █  █▀█ █ █▄▄ ▄█ █ █▀   █                           ║
  ║                                                      ║
  ║  Tailwind component extractor                        ║
  ╚══════════════════════════════════════════════════════╝"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "version".bright_black(),
        env!("CARGO_PKG_VERSION").bright_white()
    );
}
