pub mod model;
pub mod repository;

use anyhow::{Context, Result};
use log::info;
use posave_common::ServerConfig;
use repository::DocumentRepository;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to replace data file: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("write task aborted: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Makes sure the directory that will hold the document exists.
pub async fn initialize_store(config: &ServerConfig) -> Result<DocumentRepository> {
    let repository = DocumentRepository::new(&config.data_file);
    let dir = repository.data_dir();
    if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
        info!("Creating data directory {dir:?}");
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create data directory: {dir:?}"))?;
    }
    info!("Document store ready at {:?}", repository.data_file());
    Ok(repository)
}
