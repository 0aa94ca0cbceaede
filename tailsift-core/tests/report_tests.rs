// Tests for report generation

use std::path::{Path, PathBuf};
use tailsift_core::catalog::Catalog;
use tailsift_core::report::{
    CategorySection, ElementEntry, ReportData, ReportFormat, gather_report_data,
    generate_json_report, generate_text_report, project_name, relative_display, render_report,
};
use tailsift_core::stats::StatsSnapshot;
use tailsift_scanner::{AcceptedElement, Category, Element, Fingerprint, MarkupNode};

fn sample_stats() -> StatsSnapshot {
    StatsSnapshot {
        files_scanned: 3,
        php_files_found: 1,
        php_files_executed: 0,
        html_files_found: 2,
        elements_found: 4,
        unique_elements: 3,
        duplicate_elements: 1,
        execution_errors: 0,
    }
}

fn sample_data(stats: StatsSnapshot) -> ReportData {
    ReportData {
        project: "site".to_string(),
        extracted_at: "2024-01-02 03:04:05".to_string(),
        generated_by: "tester".to_string(),
        stats,
        categories: vec![
            CategorySection {
                category: "buttons".to_string(),
                display_name: "BUTTONS".to_string(),
                elements: vec![ElementEntry {
                    source: "index.html".to_string(),
                    fingerprint: "ab".repeat(32),
                    html: "<button class=\"btn\">Go</button>".to_string(),
                }],
            },
            CategorySection {
                category: "cards".to_string(),
                display_name: "CARDS".to_string(),
                elements: vec![
                    ElementEntry {
                        source: "pages/a.php".to_string(),
                        fingerprint: "cd".repeat(32),
                        html: "<div class=\"card\"></div>".to_string(),
                    },
                    ElementEntry {
                        source: "pages/b.php".to_string(),
                        fingerprint: "ef".repeat(32),
                        html: "<div class=\"card p-4\"></div>".to_string(),
                    },
                ],
            },
        ],
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert!(matches!(ReportFormat::from_str("text"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("txt"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("JSON"), Some(ReportFormat::Json)));
    assert!(ReportFormat::from_str("markdown").is_none());
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_layout() {
    let report = generate_text_report(&sample_data(sample_stats()));

    let expected = format!(
        "TAILWIND COMPONENTS FROM site\n\
         {rule}\n\
         \n\
         Extraction Date: 2024-01-02 03:04:05\n\
         Generated by: tester\n\
         \n\
         Files scanned: 3\n\
         PHP files found: 1\n\
         PHP files executed: 0\n\
         HTML files found: 2\n\
         Total elements found: 4\n\
         Unique elements: 3\n\
         Duplicate elements: 1\n\
         \n\
         \n\
         BUTTONS (1 elements)\n\
         {dash}\n\
         \n\
         Element #1 from index.html\n\
         ```html\n\
         <button class=\"btn\">Go</button>\n\
         ```\n\
         \n\
         \n\
         CARDS (2 elements)\n\
         {dash}\n\
         \n\
         Element #1 from pages/a.php\n\
         ```html\n\
         <div class=\"card\"></div>\n\
         ```\n\
         \n\
         Element #2 from pages/b.php\n\
         ```html\n\
         <div class=\"card p-4\"></div>\n\
         ```\n\
         \n",
        rule = "=".repeat(60),
        dash = "-".repeat(60),
    );

    assert_eq!(report, expected);
}

#[test]
fn test_text_report_execution_note() {
    let mut stats = sample_stats();
    stats.execution_errors = 2;
    let report = generate_text_report(&sample_data(stats));

    assert!(report.contains(
        "Duplicate elements: 1\n\nNote: 2 PHP execution errors occurred during processing.\n\n\nBUTTONS"
    ));
}

#[test]
fn test_text_report_without_note() {
    let report = generate_text_report(&sample_data(sample_stats()));
    assert!(!report.contains("Note:"));
}

#[test]
fn test_text_report_no_categories() {
    let mut data = sample_data(StatsSnapshot::default());
    data.categories.clear();
    let report = generate_text_report(&data);

    assert!(report.ends_with("Duplicate elements: 0\n\n"));
    assert!(!report.contains("elements)"));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let json = generate_json_report(&sample_data(sample_stats())).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let report = &value["report"];
    assert_eq!(report["metadata"]["project"], "site");
    assert_eq!(report["metadata"]["format"], "json");
    assert_eq!(report["summary"]["unique_elements"], 3);
    assert_eq!(report["summary"]["duplicate_elements"], 1);

    let categories = report["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0]["category"], "buttons");
    assert_eq!(categories[1]["elements"][1]["source"], "pages/b.php");
}

#[test]
fn test_render_report_dispatches_on_format() {
    let data = sample_data(sample_stats());
    let text = render_report(&data, ReportFormat::Text).unwrap();
    let json = render_report(&data, ReportFormat::Json).unwrap();

    assert!(text.starts_with("TAILWIND COMPONENTS FROM site\n"));
    assert!(json.trim_start().starts_with('{'));
}

// ============================================================================
// Report Data Tests
// ============================================================================

#[test]
fn test_gather_report_data_from_catalog() {
    let root = PathBuf::from("/srv/site");
    let button = Element::new("button")
        .with_attribute("class", "btn")
        .with_child(MarkupNode::Text("Go".to_string()));
    let nav = Element::new("nav").with_attribute("class", "flex");

    let mut catalog = Catalog::new();
    catalog.push(AcceptedElement::new(
        Fingerprint::of_element(&nav),
        Category::Navbars,
        root.join("partials/nav.html"),
        nav.clone(),
    ));
    catalog.push(AcceptedElement::new(
        Fingerprint::of_element(&button),
        Category::Buttons,
        root.join("index.html"),
        button.clone(),
    ));

    let data = gather_report_data(&root, sample_stats(), &catalog);

    assert_eq!(data.project, "site");
    assert_eq!(data.categories.len(), 2);
    assert_eq!(data.categories[0].display_name, "NAVBARS");
    assert_eq!(data.categories[0].elements[0].source, "partials/nav.html");
    assert_eq!(
        data.categories[1].elements[0].html,
        "<button class=\"btn\">Go</button>"
    );
    assert_eq!(
        data.categories[1].elements[0].fingerprint,
        Fingerprint::of_element(&button).to_hex()
    );
}

#[test]
fn test_relative_display() {
    let root = Path::new("/srv/site");
    assert_eq!(relative_display(root, Path::new("/srv/site/a/b.html")), "a/b.html");
    assert_eq!(relative_display(root, Path::new("/elsewhere/c.html")), "/elsewhere/c.html");
}

#[test]
fn test_project_name() {
    assert_eq!(project_name(Path::new("/srv/site")), "site");
}
