use companion_common::error::CommonError;
use companion_common::openai::OpenAiClientError;
use course_catalog::CatalogError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("model error: {0}")]
    Llm(#[from] OpenAiClientError),

    #[error("{0} must not be empty")]
    EmptyInput(&'static str),
}
