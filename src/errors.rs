use thiserror::Error;
use uuid::Uuid;

// --- Domain/Infrastructure Errors ---

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Document backend error: {0}")]
    BackendError(#[from] anyhow::Error), // Wrap Anyhow errors from the DB layer

    #[error("Corrupt document data: {0}")]
    DataCorruption(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File upload failed: {0}")]
    UploadFailed(String), // Pass specific reason

    #[error("Storage backend error: {0}")]
    BackendError(#[from] anyhow::Error), // Wrap Anyhow errors from the storage layer
}

// --- Store Layer Error ---

/// Errors surfaced by store operations to the UI layer.
///
/// Backend failures propagate here instead of being logged and discarded;
/// the store's busy flags clear on every path and failed operations leave
/// local state unchanged.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Post not found with ID: {0}")]
    PostNotFound(Uuid),

    #[error("No post is selected for comment operations")]
    NoPostSelected,

    #[error("No comment is marked for editing")]
    NoEditTarget,

    #[error("Selected post {0} is not loaded")]
    PostNotLoaded(Uuid),

    #[error("Could not access post data")]
    Repository(#[from] RepoError),

    #[error("Could not store post media")]
    Storage(#[from] StorageError),
}

// --- Resource Bootstrap Error ---

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Failed to build table schema element: {0}")]
    Schema(#[from] aws_smithy_types::error::operation::BuildError),

    #[error("Resource setup failed: {0}")]
    Backend(#[from] anyhow::Error),
}
