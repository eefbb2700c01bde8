/// Prerequisite lookup over the loaded course catalog.
///
/// Every outcome, including an unknown code or a missing catalog, is a reply for the
/// user rather than an error. Prerequisite detection is a substring heuristic on the
/// description; course codes are not extracted from it.
use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::store::CourseCatalog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrerequisiteAnswer {
    CatalogUnavailable,
    Listed { code: String, description: String },
    NotListed { code: String },
    UnknownCourse { code: String },
}

impl fmt::Display for PrerequisiteAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CatalogUnavailable => write!(f, "Sorry, the course data is not available."),
            Self::Listed { code, description } => {
                write!(f, "The prerequisites mentioned for {code} are: {description}")
            }
            Self::NotListed { code } => write!(
                f,
                "No explicit prerequisites are listed in the description for {code}. \
                 It's best to check the UG Manual or with the instructor."
            ),
            Self::UnknownCourse { code } => {
                write!(f, "Sorry, I could not find a course with the code {code}.")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrerequisiteLookup {
    catalog: Arc<CourseCatalog>,
}

impl PrerequisiteLookup {
    pub const TOOL_NAME: &'static str = "course_prerequisite_checker";
    pub const TOOL_DESCRIPTION: &'static str =
        "Looks up the prerequisites for a given course code. Use this tool when a user asks \
         for the prerequisites of a specific course. The input must be a valid course code, \
         for example: 'AE201A'.";

    pub fn new(catalog: Arc<CourseCatalog>) -> Self {
        Self { catalog }
    }

    pub fn check(&self, course_code: &str) -> PrerequisiteAnswer {
        info!(course_code, "prerequisite lookup");

        if self.catalog.is_empty() {
            return PrerequisiteAnswer::CatalogUnavailable;
        }

        let code = course_code.trim().to_uppercase();
        match self.catalog.find(&code) {
            Some(course) if course.mentions_prerequisite() => PrerequisiteAnswer::Listed {
                code,
                description: course.description.clone(),
            },
            Some(_) => PrerequisiteAnswer::NotListed { code },
            None => PrerequisiteAnswer::UnknownCourse { code },
        }
    }

    pub fn lookup(&self, course_code: &str) -> String {
        self.check(course_code).to_string()
    }
}
