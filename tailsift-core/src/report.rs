// Report generation from a finished catalog

use crate::catalog::Catalog;
use crate::stats::StatsSnapshot;
use serde::{Deserialize, Serialize};
use std::path::Path;

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub project: String,
    pub extracted_at: String,
    pub generated_by: String,
    pub stats: StatsSnapshot,
    pub categories: Vec<CategorySection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySection {
    pub category: String,
    pub display_name: String,
    pub elements: Vec<ElementEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementEntry {
    pub source: String,
    pub fingerprint: String,
    pub html: String,
}

/// Extraction timestamp in `YYYY-MM-DD HH:MM:SS` (UTC)
pub fn extraction_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn current_user() -> String {
    std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_else(|_| "current_user".to_string())
}

/// `path` relative to `root` with forward slashes; falls back to the full path
pub fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

pub fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}

pub fn gather_report_data(root: &Path, stats: StatsSnapshot, catalog: &Catalog) -> ReportData {
    let categories = catalog
        .groups()
        .iter()
        .filter(|group| !group.elements.is_empty())
        .map(|group| CategorySection {
            category: group.category.as_str().to_string(),
            display_name: group.category.display_name(),
            elements: group
                .elements
                .iter()
                .map(|el| ElementEntry {
                    source: relative_display(root, &el.source),
                    fingerprint: el.fingerprint.to_hex(),
                    html: el.to_html(),
                })
                .collect(),
        })
        .collect();

    ReportData {
        project: project_name(root),
        extracted_at: extraction_timestamp(),
        generated_by: current_user(),
        stats,
        categories,
    }
}

pub fn generate_text_report(data: &ReportData) -> String {
    let mut report = String::new();

    // Header
    report.push_str(&format!("TAILWIND COMPONENTS FROM {}\n", data.project));
    report.push_str(&"=".repeat(RULE_WIDTH));
    report.push_str("\n\n");
    report.push_str(&format!("Extraction Date: {}\n", data.extracted_at));
    report.push_str(&format!("Generated by: {}\n\n", data.generated_by));

    // Statistics
    let stats = &data.stats;
    report.push_str(&format!("Files scanned: {}\n", stats.files_scanned));
    report.push_str(&format!("PHP files found: {}\n", stats.php_files_found));
    report.push_str(&format!("PHP files executed: {}\n", stats.php_files_executed));
    report.push_str(&format!("HTML files found: {}\n", stats.html_files_found));
    report.push_str(&format!("Total elements found: {}\n", stats.elements_found));
    report.push_str(&format!("Unique elements: {}\n", stats.unique_elements));
    report.push_str(&format!("Duplicate elements: {}\n\n", stats.duplicate_elements));

    if stats.execution_errors > 0 {
        report.push_str(&format!(
            "Note: {} PHP execution errors occurred during processing.\n\n",
            stats.execution_errors
        ));
    }

    // Categories
    for section in &data.categories {
        report.push_str(&format!(
            "\n{} ({} elements)\n",
            section.display_name,
            section.elements.len()
        ));
        report.push_str(&"-".repeat(RULE_WIDTH));
        report.push_str("\n\n");

        for (idx, entry) in section.elements.iter().enumerate() {
            report.push_str(&format!("Element #{} from {}\n", idx + 1, entry.source));
            report.push_str("```html\n");
            report.push_str(&entry.html);
            report.push_str("\n```\n\n");
        }
    }

    report
}

pub fn generate_json_report(data: &ReportData) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Tailsift",
                "version": env!("CARGO_PKG_VERSION"),
                "project": data.project,
                "extracted_at": data.extracted_at,
                "generated_by": data.generated_by,
                "format": "json"
            },
            "summary": data.stats,
            "categories": data.categories
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn render_report(data: &ReportData, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(data)),
        ReportFormat::Json => generate_json_report(data),
    }
}
