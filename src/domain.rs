use crate::errors::{RepoError, StorageError};
use crate::models::{Comment, PageCursor, Post, PostPage};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait defining operations for storing and retrieving post documents.
#[async_trait]
pub trait PostRepository: Send + Sync + 'static {
    // Send+Sync+'static required for Arc<dyn>

    /// Creates a new post document.
    async fn create(&self, post: &Post) -> Result<(), RepoError>;

    /// Retrieves a post by its unique ID.
    /// Returns Ok(None) if the post is not found.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Fetches one feed page ordered by creation time descending, starting
    /// strictly after `cursor` when one is given.
    async fn page(&self, cursor: Option<&PageCursor>, limit: u32) -> Result<PostPage, RepoError>;

    /// Replaces the whole comments array on a post document.
    async fn replace_comments(&self, post_id: Uuid, comments: &[Comment])
    -> Result<(), RepoError>;

    /// Replaces the whole likers array on a post document.
    async fn replace_likes(&self, post_id: Uuid, likes: &[Uuid]) -> Result<(), RepoError>;
}

/// Trait defining operations for storing uploaded media blobs.
#[async_trait]
pub trait FileStorage: Send + Sync + 'static {
    /// Uploads the blob and returns the URL it can be retrieved from.
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<String, StorageError>;
}
