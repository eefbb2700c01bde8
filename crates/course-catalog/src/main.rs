use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use course_catalog::download::download_pdf;
use course_catalog::{parser, pdf, CatalogError, CourseCatalog};

const DEFAULT_COURSE_PDF_URL: &str = "https://www.iitk.ac.in/doaa/data/template/AE-template.pdf";

/// Batch ingest for the department course catalog and UG manual.
#[derive(Debug, Parser)]
#[command(name = "catalog-ingest", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download the course template PDF (if missing), parse it, and save the catalog JSON.
    Courses {
        #[arg(long, env = "COURSE_PDF_URL", default_value = DEFAULT_COURSE_PDF_URL)]
        url: String,
        #[arg(long, env = "COURSE_PDF_PATH", default_value = "AE-template.pdf")]
        pdf: PathBuf,
        #[arg(long, env = "COURSE_CATALOG_PATH", default_value = "ae_courses.json")]
        output: PathBuf,
    },
    /// Extract the UG manual PDF into whitespace-normalized plain text.
    Manual {
        #[arg(long, env = "MANUAL_PDF_PATH", default_value = "ug_manual.pdf")]
        pdf: PathBuf,
        #[arg(long, env = "MANUAL_TEXT_PATH", default_value = "ug_manual.txt")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    match Cli::parse().command {
        Commands::Courses { url, pdf, output } => ingest_courses(&url, pdf, output).await,
        Commands::Manual { pdf, output } => ingest_manual(pdf, output),
    }
}

async fn ingest_courses(url: &str, pdf_path: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let http = reqwest::Client::builder()
        .user_agent("campus-companion/catalog-ingest")
        .build()?;
    download_pdf(&http, url, &pdf_path).await?;

    info!(path = %pdf_path.display(), "parsing course pdf");
    let text = pdf::extract(&pdf_path)?;
    let records = parser::parse_courses(&text);
    if records.is_empty() {
        warn!(path = %pdf_path.display(), "no course entries matched, catalog will be empty");
    }

    for issue in parser::audit(&records) {
        warn!(%issue, "suspicious catalog entry");
    }

    CourseCatalog::save(&output, &records)?;
    info!(
        courses = records.len(),
        path = %output.display(),
        "course catalog saved"
    );
    Ok(())
}

fn ingest_manual(pdf_path: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    info!(path = %pdf_path.display(), "parsing UG manual");
    let text = pdf::extract(&pdf_path)?;

    std::fs::write(&output, &text).map_err(|source| CatalogError::Write {
        path: output.clone(),
        source,
    })?;
    info!(
        chars = text.chars().count(),
        path = %output.display(),
        "manual text saved"
    );
    Ok(())
}
