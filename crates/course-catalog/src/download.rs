/// Idempotent PDF download: an existing file at the destination is never re-fetched.
use std::path::Path;

use tracing::info;

use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    AlreadyPresent,
    Downloaded { bytes: usize },
}

pub async fn download_pdf(
    http: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<DownloadOutcome, CatalogError> {
    if dest.exists() {
        info!(path = %dest.display(), "pdf already present, skipping download");
        return Ok(DownloadOutcome::AlreadyPresent);
    }

    info!(url, "downloading pdf");
    let resp = http
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| CatalogError::Download(format!("{url}: {e}")))?;
    let body = resp
        .bytes()
        .await
        .map_err(|e| CatalogError::Download(format!("{url}: reading body: {e}")))?;

    tokio::fs::write(dest, &body)
        .await
        .map_err(|source| CatalogError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
    info!(path = %dest.display(), bytes = body.len(), "pdf downloaded");

    Ok(DownloadOutcome::Downloaded { bytes: body.len() })
}
