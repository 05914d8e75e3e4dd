#![allow(dead_code)] // each test binary uses a subset of these helpers

use async_trait::async_trait;
use chrono::{Duration, Utc};
use feed_store::domain::{FileStorage, PostRepository};
use feed_store::errors::{RepoError, StorageError};
use feed_store::models::{Comment, PageCursor, Post, PostPage, UserSnapshot};
use feed_store::session::Session;
use feed_store::store::PostStore;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TEST_PAGE_SIZE: u32 = 5;

/// In-memory `PostRepository` over a mutable document set. Pages exactly
/// like the backend: newest first, resuming strictly after the cursor's
/// document. Counts calls so tests can assert what reached the backend.
pub struct InMemoryPostRepository {
    posts: Mutex<Vec<Post>>,
    pub page_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
    fail_next: AtomicBool,
}

impl InMemoryPostRepository {
    pub fn new(posts: Vec<Post>) -> Arc<Self> {
        Arc::new(Self {
            posts: Mutex::new(posts),
            page_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
        })
    }

    /// Makes the next repository call fail with a backend error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Snapshot of the remote document set.
    pub fn documents(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    fn check_fail(&self) -> Result<(), RepoError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(RepoError::BackendError(anyhow::anyhow!(
                "injected backend failure"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, post: &Post) -> Result<(), RepoError> {
        self.check_fail()?;
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.posts.lock().unwrap().push(post.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        self.check_fail()?;
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|post| post.post_id == id)
            .cloned())
    }

    async fn page(&self, cursor: Option<&PageCursor>, limit: u32) -> Result<PostPage, RepoError> {
        self.check_fail()?;
        self.page_calls.fetch_add(1, Ordering::SeqCst);

        let mut ordered = self.posts.lock().unwrap().clone();
        ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let start = match cursor {
            Some(cursor) => ordered
                .iter()
                .position(|post| post.post_id == cursor.post_id())
                .map(|index| index + 1)
                .unwrap_or(ordered.len()),
            None => 0,
        };
        let posts: Vec<Post> = ordered
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();
        let next = posts
            .last()
            .map(|last| PageCursor::new(last.created_at, last.post_id));
        Ok(PostPage { posts, next })
    }

    async fn replace_comments(
        &self,
        post_id: Uuid,
        comments: &[Comment],
    ) -> Result<(), RepoError> {
        self.check_fail()?;
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(post) = self
            .posts
            .lock()
            .unwrap()
            .iter_mut()
            .find(|post| post.post_id == post_id)
        {
            post.comments = comments.to_vec();
        }
        Ok(())
    }

    async fn replace_likes(&self, post_id: Uuid, likes: &[Uuid]) -> Result<(), RepoError> {
        self.check_fail()?;
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(post) = self
            .posts
            .lock()
            .unwrap()
            .iter_mut()
            .find(|post| post.post_id == post_id)
        {
            post.likes = likes.to_vec();
        }
        Ok(())
    }
}

/// `FileStorage` that records uploads and hands back deterministic URLs.
#[derive(Default)]
pub struct RecordingFileStorage {
    pub uploads: Mutex<Vec<RecordedUpload>>,
}

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub key: String,
    pub bytes: usize,
    pub content_type: Option<String>,
}

#[async_trait]
impl FileStorage for RecordingFileStorage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<String, StorageError> {
        self.uploads.lock().unwrap().push(RecordedUpload {
            key: key.to_string(),
            bytes: data.len(),
            content_type,
        });
        Ok(format!("https://media.test/{key}"))
    }
}

pub fn user(first_name: &str) -> UserSnapshot {
    UserSnapshot {
        user_id: Uuid::new_v4(),
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        profile_photo: format!("https://media.test/{}.png", first_name.to_lowercase()),
    }
}

pub fn post_by(author: &UserSnapshot, title: &str, minutes_ago: i64) -> Post {
    let created_at = Utc::now() - Duration::minutes(minutes_ago);
    Post {
        post_id: Uuid::new_v4(),
        title: title.to_string(),
        description: format!("{title} description"),
        slug: title.to_lowercase().replace(' ', "-"),
        image_url: format!("https://media.test/posts/{title}.png"),
        description_image_ids: vec![],
        tagged_users: vec![],
        comments: vec![],
        likes: vec![],
        created_at,
        updated_at: created_at,
        created_by: author.user_id,
        author: author.clone(),
    }
}

pub fn comment_by(author: &UserSnapshot, text: &str, minutes_ago: i64) -> Comment {
    let created_at = Utc::now() - Duration::minutes(minutes_ago);
    Comment {
        comment_id: Uuid::new_v4(),
        user_id: author.user_id,
        text: text.to_string(),
        created_at,
        updated_at: created_at,
    }
}

/// Store wired to the in-memory backends, returning handles for assertions.
pub fn store_with(
    posts: Vec<Post>,
    session_user: UserSnapshot,
) -> (
    PostStore,
    Arc<InMemoryPostRepository>,
    Arc<RecordingFileStorage>,
) {
    feed_store::telemetry::init_tracing();
    let repo = InMemoryPostRepository::new(posts);
    let storage = Arc::new(RecordingFileStorage::default());
    let session = Arc::new(Session::new(session_user));
    let store = PostStore::new(repo.clone(), storage.clone(), session, TEST_PAGE_SIZE);
    (store, repo, storage)
}
