use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Denormalized user fields embedded into posts and comments so the UI can
/// render an author without a join at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub profile_photo: String,
}

/// A single comment on a post.
///
/// Comments live as a whole array on the parent post document and are only
/// ever written back as a whole array. `comment_id` is the stable identity
/// across edits; `created_at` never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub comment_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A feed post document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub post_id: Uuid,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub image_url: String,
    pub description_image_ids: Vec<String>,
    pub tagged_users: Vec<UserSnapshot>,
    pub comments: Vec<Comment>,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub author: UserSnapshot,
}

/// Caller-supplied fields for a new post submission.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub slug: String,
    pub image: ImageUpload,
}

/// Raw image payload attached to a post submission.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

/// Opaque continuation marker for the feed listing.
///
/// Identifies the last document of the previously fetched page; the next
/// page starts strictly after it in creation-time-descending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    created_at: DateTime<Utc>,
    post_id: Uuid,
}

impl PageCursor {
    pub fn new(created_at: DateTime<Utc>, post_id: Uuid) -> Self {
        Self {
            created_at,
            post_id,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn post_id(&self) -> Uuid {
        self.post_id
    }
}

/// One page of the feed listing plus the cursor for the next request.
///
/// `next` is `None` exactly when the page came back empty.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub next: Option<PageCursor>,
}
