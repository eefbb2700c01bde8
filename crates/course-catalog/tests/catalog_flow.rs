use std::sync::Arc;

use course_catalog::pdf::normalize_whitespace;
use course_catalog::{course_tools, parser, CourseCatalog, PrerequisiteLookup};

const CATALOG_TEXT: &str = "Department of Aerospace Engineering\n\n\
AE201A: Flight   Mechanics (3-0-0-9)\nPrerequisite: AE200.  Study of aircraft performance.\n\n\
AE202: Aerodynamics\n(3-0-2-10)\nIntro to potential flow.\n\
AE499: Project   (0-0-0-9) Prerequisite: Consent of instructor\n";

fn ingest(dir: &std::path::Path) -> std::path::PathBuf {
    let text = normalize_whitespace(CATALOG_TEXT);
    let records = parser::parse_courses(&text);
    let path = dir.join("ae_courses.json");
    CourseCatalog::save(&path, &records).expect("save should succeed");
    path
}

#[test]
fn parse_save_load_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let path = ingest(dir.path());

    let catalog = Arc::new(CourseCatalog::load(&path).expect("load should succeed"));
    let codes: Vec<&str> = catalog.records().iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["AE201A", "AE202", "AE499"]);
    assert_eq!(catalog.records()[0].title, "Flight Mechanics");
    assert_eq!(
        catalog.records()[0].description,
        "Prerequisite: AE200. Study of aircraft performance."
    );

    let lookup = PrerequisiteLookup::new(Arc::clone(&catalog));
    assert_eq!(
        lookup.lookup(" ae201a "),
        "The prerequisites mentioned for AE201A are: Prerequisite: AE200. Study of aircraft performance."
    );
    assert!(lookup.lookup("AE499").contains("Prerequisite: Consent of instructor"));
    assert!(lookup.lookup("ae202").starts_with("No explicit prerequisites"));
    assert_eq!(
        lookup.lookup("ae777"),
        "Sorry, I could not find a course with the code AE777."
    );
}

#[test]
fn absent_catalog_still_answers() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = CourseCatalog::load_or_empty(&dir.path().join("ae_courses.json"));
    let tools = course_tools(PrerequisiteLookup::new(Arc::new(catalog)));

    assert_eq!(
        tools.call("course_prerequisite_checker", "AE201A").as_deref(),
        Some("Sorry, the course data is not available.")
    );
}
