/// Parser for course-catalog text extracted from the department PDF.
///
/// The catalog is a flat run of course blocks:
/// `CODE: Title (credits) description ... NEXTCODE: ...`
///
/// A block header is a course code, a colon, a title running up to the first
/// parenthesized credit token. The description runs until the next `CODE:` followed
/// by whitespace, or end of text. Matching is single-pass, left to right and never
/// backtracks over a previous block, so malformed entries are kept as-is.
use std::collections::HashSet;
use std::fmt;

use regex::Regex;

use crate::model::CourseRecord;

const HEADER_PATTERN: &str = r"(?s)(AE\d{3}[A-Z]?):\s*(.*?)\(([\d\-]+)\)";
const BOUNDARY_PATTERN: &str = r"AE\d{3}[A-Z]?:\s";

/// Parse normalized catalog text into course records, in document order.
///
/// Returns an empty `Vec` when nothing matches; callers decide whether to warn.
pub fn parse_courses(text: &str) -> Vec<CourseRecord> {
    let header_re = Regex::new(HEADER_PATTERN).expect("valid regex");
    let boundary_re = Regex::new(BOUNDARY_PATTERN).expect("valid regex");

    let mut records = Vec::new();
    let mut pos = 0;

    while let Some(caps) = header_re.captures_at(text, pos) {
        let body_start = caps.get(0).map_or(text.len(), |m| m.end());
        let body_end = boundary_re
            .find_at(text, body_start)
            .map_or(text.len(), |m| m.start());

        records.push(CourseRecord {
            code: caps[1].trim().to_string(),
            title: caps[2].trim().replace('\n', " "),
            credits: caps[3].trim().to_string(),
            description: collapse_whitespace(&text[body_start..body_end]),
        });

        pos = body_end;
    }

    records
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Something in a parsed record that suggests a PDF layout irregularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    MalformedCredits(String),
    EmptyTitle,
    EmptyDescription,
    DuplicateCode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogIssue {
    pub index: usize,
    pub code: String,
    pub kind: IssueKind,
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::MalformedCredits(credits) => {
                write!(f, "{} (#{}): malformed credits '{credits}'", self.code, self.index)
            }
            IssueKind::EmptyTitle => write!(f, "{} (#{}): empty title", self.code, self.index),
            IssueKind::EmptyDescription => {
                write!(f, "{} (#{}): empty description", self.code, self.index)
            }
            IssueKind::DuplicateCode => {
                write!(f, "{} (#{}): duplicate code, lookups use the first entry", self.code, self.index)
            }
        }
    }
}

/// Report records that look like parse artifacts. Records are never dropped or edited.
pub fn audit(records: &[CourseRecord]) -> Vec<CatalogIssue> {
    let credits_re = Regex::new(r"^\d+(-\d+)*$").expect("valid regex");
    let mut seen = HashSet::new();
    let mut issues = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let mut push = |kind| {
            issues.push(CatalogIssue {
                index,
                code: record.code.clone(),
                kind,
            })
        };

        if !credits_re.is_match(&record.credits) {
            push(IssueKind::MalformedCredits(record.credits.clone()));
        }
        if record.title.is_empty() {
            push(IssueKind::EmptyTitle);
        }
        if record.description.is_empty() {
            push(IssueKind::EmptyDescription);
        }
        if !seen.insert(record.code.as_str()) {
            push(IssueKind::DuplicateCode);
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_two_courses() {
        let text = "AE201A: Flight Mechanics (3-0-0-9) Prerequisite: AE200. Study of ... \
                    AE202: Aerodynamics (3-0-2-10) Intro to ...";
        let records = parse_courses(text);

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            CourseRecord {
                code: "AE201A".to_string(),
                title: "Flight Mechanics".to_string(),
                credits: "3-0-0-9".to_string(),
                description: "Prerequisite: AE200. Study of ...".to_string(),
            }
        );
        assert_eq!(records[1].code, "AE202");
        assert_eq!(records[1].title, "Aerodynamics");
        assert_eq!(records[1].credits, "3-0-2-10");
        assert_eq!(records[1].description, "Intro to ...");
    }

    #[test]
    fn count_and_order_follow_the_document() {
        let codes = ["AE311", "AE102", "AE699A", "AE201", "AE450B"];
        let text: String = codes
            .iter()
            .enumerate()
            .map(|(i, code)| format!("{code}: Course {i}\n(3-0-0-9)\nBody of course {i}.\n"))
            .collect();

        let records = parse_courses(&text);
        let parsed: Vec<&str> = records.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(parsed, codes);
        assert_eq!(records[2].description, "Body of course 2.");
    }

    #[test]
    fn newlines_and_runs_are_normalized() {
        let text = "AE321: Gas Dynamics\nand Propulsion (3-1-0-11)\n  Compressible\n\tflow,   shocks.\n";
        let records = parse_courses(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Gas Dynamics and Propulsion");
        assert_eq!(records[0].description, "Compressible flow, shocks.");
    }

    #[test]
    fn back_to_back_headers_keep_empty_description() {
        let text = "AE100: Intro (1-0-0-2) AE101: Seminar (0-0-1-1) Weekly talks.";
        let records = parse_courses(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, "AE100");
        assert_eq!(records[0].description, "");
        assert_eq!(records[1].description, "Weekly talks.");
    }

    #[test]
    fn code_mentions_without_header_colon_stay_in_description() {
        let text = "AE401: Aeroelasticity (3-0-0-9) Builds on AE301 and AE302 concepts.";
        let records = parse_courses(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "Builds on AE301 and AE302 concepts.");
    }

    #[test]
    fn no_match_yields_empty() {
        assert!(parse_courses("").is_empty());
        assert!(parse_courses("Department of Aerospace Engineering\nUG Template").is_empty());
        assert!(parse_courses("AE201A: Title without credits").is_empty());
    }

    #[test]
    fn leading_text_is_skipped() {
        let text = "Course Template 2024\nAE210: Structures (3-0-0-9) Beams.";
        let records = parse_courses(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "AE210");
    }

    #[test]
    fn non_ascii_survives() {
        let text = "AE330: Turbulence – Theory (3-0-0-9) Kolmogorov’s cascade, Δx scales.";
        let records = parse_courses(text);
        assert_eq!(records[0].title, "Turbulence – Theory");
        assert_eq!(records[0].description, "Kolmogorov’s cascade, Δx scales.");
    }

    #[test]
    fn audit_flags_suspicious_records() {
        let records = vec![
            CourseRecord {
                code: "AE201".to_string(),
                title: "Flight Mechanics".to_string(),
                credits: "3-0-0-9".to_string(),
                description: "Fine.".to_string(),
            },
            CourseRecord {
                code: "AE202".to_string(),
                title: String::new(),
                credits: "3--0".to_string(),
                description: String::new(),
            },
            CourseRecord {
                code: "AE201".to_string(),
                title: "Flight Mechanics".to_string(),
                credits: "9".to_string(),
                description: "Repeated.".to_string(),
            },
        ];

        let issues = audit(&records);
        let kinds: Vec<(usize, &IssueKind)> = issues.iter().map(|i| (i.index, &i.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (1, &IssueKind::MalformedCredits("3--0".to_string())),
                (1, &IssueKind::EmptyTitle),
                (1, &IssueKind::EmptyDescription),
                (2, &IssueKind::DuplicateCode),
            ]
        );
        assert_eq!(issues[0].to_string(), "AE202 (#1): malformed credits '3--0'");
    }

    #[test]
    fn parse_real_catalog() {
        let path = std::env::var("COURSE_PDF_PATH")
            .unwrap_or_else(|_| "./data/AE-template.pdf".to_string());
        let path = std::path::Path::new(&path);
        if !path.exists() {
            eprintln!("skipping parse_real_catalog: {} not found", path.display());
            return;
        }
        let text = crate::pdf::extract(path).expect("extraction should succeed");
        let records = parse_courses(&text);
        assert!(records.len() > 10, "expected >10 courses");
        assert!(records.iter().all(|r| r.code.starts_with("AE")));
    }
}
