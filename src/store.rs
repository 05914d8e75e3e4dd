use crate::domain::{FileStorage, PostRepository};
use crate::errors::StoreError;
use crate::models::{Comment, ImageUpload, NewPost, PageCursor, Post, UserSnapshot};
use crate::session::Session;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory mirror of remote feed state plus the shared compose fields.
///
/// Owned by [`PostStore`]; every write goes through a store method and other
/// components read it through [`PostStore::state`]. Busy flags are set true
/// before and false after each async operation; there is no stored error
/// state, failures reach callers through `Result`.
#[derive(Debug, Default)]
pub struct PostFeedState {
    pub loading: bool,
    pub loading_posts: bool,
    pub loading_post: bool,
    pub post_list: Vec<Post>,
    pub single_post: Option<Post>,
    pub cursor: Option<PageCursor>,
    pub no_more_posts: bool,
    pub comment_draft: String,
    pub selected_post_id: Option<Uuid>,
    pub edit_comment_id: Option<Uuid>,
    pub tagged_users: Vec<UserSnapshot>,
    pub description_image_ids: Vec<String>,
}

/// Mutation applied to the selected post's comment array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    /// Prepend a new comment built from the current draft text.
    Add,
    /// Rewrite the comment matching the stored edit target.
    Edit,
    /// Remove the comment with the given id.
    Delete(Uuid),
}

/// Post/comment store: performs all persistence against the document and
/// blob backends and re-synchronizes the local mirror after each write.
pub struct PostStore {
    repo: Arc<dyn PostRepository>,
    storage: Arc<dyn FileStorage>,
    session: Arc<Session>,
    page_size: u32,
    state: PostFeedState,
}

impl PostStore {
    pub fn new(
        repo: Arc<dyn PostRepository>,
        storage: Arc<dyn FileStorage>,
        session: Arc<Session>,
        page_size: u32,
    ) -> Self {
        Self {
            repo,
            storage,
            session,
            page_size,
            state: PostFeedState::default(),
        }
    }

    /// Read-only view of the store's state for the UI layer.
    pub fn state(&self) -> &PostFeedState {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // --- Compose-state accessors ---

    pub fn set_comment_draft(&mut self, text: impl Into<String>) {
        self.state.comment_draft = text.into();
    }

    pub fn set_selected_post(&mut self, post_id: Option<Uuid>) {
        self.state.selected_post_id = post_id;
    }

    pub fn set_edit_target(&mut self, comment_id: Option<Uuid>) {
        self.state.edit_comment_id = comment_id;
    }

    /// Adds a user to the compose tag list if not already present.
    pub fn tag_user(&mut self, user: UserSnapshot) {
        let is_present = self
            .state
            .tagged_users
            .iter()
            .any(|tagged| tagged.user_id == user.user_id);
        if !is_present {
            self.state.tagged_users.push(user);
        }
    }

    pub fn remove_tag(&mut self, user_id: Uuid) {
        self.state
            .tagged_users
            .retain(|tagged| tagged.user_id != user_id);
    }

    // --- Persistence operations ---

    /// Uploads the post image, then writes the post document merging the
    /// caller-supplied fields with the compose state and the session user's
    /// snapshot. Does not touch the local list; callers refetch the feed.
    pub async fn create_post(&mut self, details: NewPost) -> Result<Post, StoreError> {
        self.state.loading = true;
        let result = self.create_post_inner(details).await;
        self.state.loading = false;
        result
    }

    async fn create_post_inner(&mut self, details: NewPost) -> Result<Post, StoreError> {
        let NewPost {
            title,
            description,
            slug,
            image,
        } = details;

        let created_at = Utc::now();
        let image_key = format!("posts/{}", created_at.timestamp_millis());
        let content_type = resolve_content_type(&image);
        let image_url = self.storage.upload(&image_key, image.data, content_type).await?;

        let author = self.session.user().clone();
        let post = Post {
            post_id: Uuid::new_v4(),
            title,
            description,
            slug,
            image_url,
            description_image_ids: self.state.description_image_ids.clone(),
            tagged_users: self.state.tagged_users.clone(),
            comments: Vec::new(),
            likes: Vec::new(),
            created_at,
            updated_at: created_at,
            created_by: author.user_id,
            author,
        };
        self.repo.create(&post).await?;

        tracing::info!(post_id = %post.post_id, "Post created successfully");
        Ok(post)
    }

    /// Fetches the next feed page and appends it to the local list.
    ///
    /// No-op once the terminal "no more posts" flag is set. An empty page
    /// sets that flag; a non-empty page advances the cursor to its last
    /// document.
    pub async fn fetch_next_page(&mut self) -> Result<(), StoreError> {
        if self.state.no_more_posts {
            return Ok(());
        }
        self.state.loading_posts = true;
        let result = self.fetch_next_page_inner().await;
        self.state.loading_posts = false;
        result
    }

    async fn fetch_next_page_inner(&mut self) -> Result<(), StoreError> {
        let page = self
            .repo
            .page(self.state.cursor.as_ref(), self.page_size)
            .await?;

        if page.posts.is_empty() {
            tracing::debug!("Feed: reached the end of the post stream");
            self.state.no_more_posts = true;
        } else {
            tracing::debug!(count = page.posts.len(), "Feed: appending fetched page");
            self.state.post_list.extend(page.posts);
            self.state.cursor = page.next;
        }
        Ok(())
    }

    /// Fetches one post by id into the single-post slot.
    pub async fn fetch_single_post(&mut self, post_id: Uuid) -> Result<(), StoreError> {
        self.state.loading_post = true;
        let result = self.fetch_single_post_inner(post_id).await;
        self.state.loading_post = false;
        result
    }

    async fn fetch_single_post_inner(&mut self, post_id: Uuid) -> Result<(), StoreError> {
        match self.repo.get_by_id(post_id).await? {
            Some(post) => {
                self.state.single_post = Some(post);
                Ok(())
            }
            None => {
                tracing::warn!(%post_id, "No such post document");
                Err(StoreError::PostNotFound(post_id))
            }
        }
    }

    /// Applies a comment mutation to the selected post.
    ///
    /// Builds the updated comment array from the loaded single post, writes
    /// the whole array back to the parent document (last write wins), mirrors
    /// it into the local list, then re-fetches the single post.
    pub async fn manage_comments(&mut self, action: CommentAction) -> Result<(), StoreError> {
        let post_id = self
            .state
            .selected_post_id
            .ok_or(StoreError::NoPostSelected)?;
        let current = match &self.state.single_post {
            Some(post) if post.post_id == post_id => post.comments.clone(),
            _ => return Err(StoreError::PostNotLoaded(post_id)),
        };

        let now = Utc::now();
        let updated = match action {
            CommentAction::Add => {
                let mut comments = Vec::with_capacity(current.len() + 1);
                comments.push(Comment {
                    comment_id: Uuid::new_v4(),
                    user_id: self.session.user_id(),
                    text: self.state.comment_draft.clone(),
                    created_at: now,
                    updated_at: now,
                });
                comments.extend(current);
                comments
            }
            CommentAction::Edit => {
                let target = self.state.edit_comment_id.ok_or(StoreError::NoEditTarget)?;
                let mut comments = current;
                for comment in &mut comments {
                    // Identity and creation time survive the edit.
                    if comment.comment_id == target {
                        comment.text = self.state.comment_draft.clone();
                        comment.updated_at = now;
                    }
                }
                comments
            }
            CommentAction::Delete(comment_id) => {
                let mut comments = current;
                comments.retain(|comment| comment.comment_id != comment_id);
                comments
            }
        };

        self.repo.replace_comments(post_id, &updated).await?;
        if let Some(post) = self
            .state
            .post_list
            .iter_mut()
            .find(|post| post.post_id == post_id)
        {
            post.comments = updated;
        }
        self.fetch_single_post(post_id).await
    }

    /// Toggles the session user's id in a post's likers array and writes the
    /// array back, mirroring the change into the local list.
    pub async fn toggle_like(&mut self, post_id: Uuid) -> Result<(), StoreError> {
        let user_id = self.session.user_id();
        let mut likes = self
            .state
            .post_list
            .iter()
            .find(|post| post.post_id == post_id)
            .ok_or(StoreError::PostNotFound(post_id))?
            .likes
            .clone();

        match likes.iter().position(|id| *id == user_id) {
            Some(index) => {
                likes.remove(index);
            }
            None => likes.push(user_id),
        }

        self.repo.replace_likes(post_id, &likes).await?;
        if let Some(post) = self
            .state
            .post_list
            .iter_mut()
            .find(|post| post.post_id == post_id)
        {
            post.likes = likes;
        }
        Ok(())
    }
}

fn resolve_content_type(image: &ImageUpload) -> Option<String> {
    image.content_type.clone().or_else(|| {
        image
            .filename
            .as_deref()
            .and_then(|name| mime_guess::from_path(name).first_raw())
            .map(|s| s.to_string())
    })
}
