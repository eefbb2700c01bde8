/// PDF text extraction for catalog and manual documents.
///
/// Text is pulled page by page with pdf-extract and joined with a newline. The only
/// cleanup is whitespace collapsing; hyphenation, column reflow and page-break
/// artifacts are left for the parser to tolerate.
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::error::CatalogError;

pub fn extract(path: &Path) -> Result<String, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|e| CatalogError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| {
        CatalogError::Read {
            path: path.to_path_buf(),
            message: format!("not a readable pdf: {e}"),
        }
    })?;
    debug!(path = %path.display(), pages = pages.len(), "extracted pdf text");

    Ok(normalize_whitespace(&pages.join("\n")))
}

/// Collapse runs of spaces and runs of newlines to a single character each.
pub fn normalize_whitespace(text: &str) -> String {
    let spaces = Regex::new(r" {2,}").expect("valid regex");
    let newlines = Regex::new(r"\n{2,}").expect("valid regex");
    let text = spaces.replace_all(text, " ");
    newlines.replace_all(&text, "\n").into_owned()
}
