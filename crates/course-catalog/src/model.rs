use serde::{Deserialize, Serialize};

/// One course entry from the department catalog (e.g. "AE201A: Flight Mechanics").
///
/// Field order matches the on-disk catalog layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Course code, e.g. "AE201A". Always matches `AE\d{3}[A-Z]?`.
    pub code: String,
    /// Course title with embedded newlines collapsed.
    pub title: String,
    /// Credit token kept verbatim, e.g. "3-0-0-9" (lecture-tutorial-lab-credits).
    pub credits: String,
    /// Free-text description; may mention prerequisites.
    pub description: String,
}

impl CourseRecord {
    /// Text used when the record is indexed for retrieval.
    pub fn index_text(&self) -> String {
        format!("{}: {} - {}", self.code, self.title, self.description)
    }

    pub fn mentions_prerequisite(&self) -> bool {
        self.description.to_lowercase().contains("prerequisite")
    }
}
