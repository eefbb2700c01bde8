/// File-backed course catalog.
///
/// The catalog is a pretty-printed JSON array of `CourseRecord`s. It is written once per
/// ingest run and loaded read-only by every consumer; nothing patches it in place.
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::CatalogError;
use crate::model::CourseRecord;

#[derive(Debug, Clone, Default)]
pub struct CourseCatalog {
    records: Vec<CourseRecord>,
}

impl CourseCatalog {
    pub fn new(records: Vec<CourseRecord>) -> Self {
        Self { records }
    }

    /// Load the catalog from `path`. Fails with `NotFound` when the file is absent.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let records: Vec<CourseRecord> =
            serde_json::from_str(&content).map_err(|source| CatalogError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { records })
    }

    /// Load the catalog, or fall back to an empty one so lookups can still answer.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(catalog) => {
                info!(path = %path.display(), courses = catalog.len(), "course catalog loaded");
                catalog
            }
            Err(e) => {
                warn!(error = %e, "course catalog unavailable, prerequisite lookups will report missing data");
                Self::default()
            }
        }
    }

    /// Write `records` to `path` as UTF-8 JSON with four-space indentation.
    pub fn save(path: &Path, records: &[CourseRecord]) -> Result<(), CatalogError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        records.serialize(&mut ser)?;
        buf.push(b'\n');

        let mut file = std::fs::File::create(path).map_err(|source| CatalogError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        file.write_all(&buf).map_err(|source| CatalogError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn records(&self) -> &[CourseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record whose code equals `code` exactly.
    pub fn find(&self, code: &str) -> Option<&CourseRecord> {
        self.records.iter().find(|r| r.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<CourseRecord> {
        vec![
            CourseRecord {
                code: "AE201A".to_string(),
                title: "Flight Mechanics".to_string(),
                credits: "3-0-0-9".to_string(),
                description: "Prerequisite: AE200. Stability – “static” and dynamic.".to_string(),
            },
            CourseRecord {
                code: "AE202".to_string(),
                title: String::new(),
                credits: "3-0-2-10".to_string(),
                description: String::new(),
            },
        ]
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ae_courses.json");

        CourseCatalog::save(&path, &sample()).unwrap();
        let loaded = CourseCatalog::load(&path).unwrap();
        assert_eq!(loaded.records(), sample().as_slice());
    }

    #[test]
    fn save_keeps_non_ascii_and_indents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ae_courses.json");

        CourseCatalog::save(&path, &sample()).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Stability – “static”"));
        assert!(!raw.contains("\\u"));
        assert!(raw.contains("\n        \"code\": \"AE201A\""));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = CourseCatalog::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn malformed_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ae_courses.json");
        std::fs::write(&path, r#"[{"code": "AE201A"}]"#).unwrap();

        let err = CourseCatalog::load(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { .. }));
    }

    #[test]
    fn load_or_empty_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = CourseCatalog::load_or_empty(&dir.path().join("absent.json"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn find_returns_first_duplicate() {
        let mut records = sample();
        records.push(CourseRecord {
            code: "AE201A".to_string(),
            title: "Shadow entry".to_string(),
            credits: "1".to_string(),
            description: String::new(),
        });
        let catalog = CourseCatalog::new(records);
        assert_eq!(catalog.find("AE201A").unwrap().title, "Flight Mechanics");
        assert!(catalog.find("ae201a").is_none());
    }
}
