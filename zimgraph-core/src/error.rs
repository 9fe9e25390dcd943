use thiserror::Error;
use zimgraph_archive::ArchiveError;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Worker task failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Redirect loop starting at '{0}'")]
    RedirectLoop(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
