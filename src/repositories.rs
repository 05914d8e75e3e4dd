use crate::{
    domain::PostRepository,
    errors::RepoError,
    models::{Comment, PageCursor, Post, PostPage, UserSnapshot},
};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::{Client as DynamoDbClient, types::AttributeValue};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{self, info};
use uuid::Uuid;

/// GSI serving the feed listing query, keyed on the constant `feed`
/// partition with `created_at` as the range key.
pub(crate) const FEED_INDEX: &str = "feed-created-index";

/// Partition value shared by every post so the feed index holds one ordered
/// stream of documents.
pub(crate) const FEED_PARTITION: &str = "feed";

#[derive(Debug, Clone)]
pub struct DynamoDbPostRepository {
    client: DynamoDbClient,
    table_name: String, // Store the table name
}

impl DynamoDbPostRepository {
    /// Creates a new repository instance configured for a specific table.
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        info!(%table_name, "Initializing DynamoDbPostRepository");
        Self { client, table_name }
    }
}

#[async_trait]
impl PostRepository for DynamoDbPostRepository {
    /// Stores a `Post` in the DynamoDB table using PutItem.
    async fn create(&self, post: &Post) -> Result<(), RepoError> {
        self.client
            .put_item()
            .table_name(&self.table_name) // Use stored table name
            .set_item(Some(post_to_item(post)))
            .send()
            .await
            .context(format!(
                "DynamoDB (table: {}): Failed to put post (id: {})",
                self.table_name, post.post_id
            ))
            .map_err(RepoError::BackendError)?; // Map anyhow::Error -> RepoError
        Ok(())
    }

    /// Retrieves a `Post` from DynamoDB using GetItem.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let id_str = id.to_string();
        let resp = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("post_id", AttributeValue::S(id_str.clone()))
            .send()
            .await
            .context(format!(
                "DynamoDB (table: {}): Failed to get post (id: {})",
                self.table_name, id_str
            ))
            .map_err(RepoError::BackendError)?;

        match resp.item {
            Some(item) => match item_to_post(&item) {
                Some(post) => Ok(Some(post)),
                None => {
                    tracing::error!(post_id = %id_str, table_name = %self.table_name, "DynamoDB: Retrieved item but failed to parse into Post");
                    // Return a RepoError indicating data inconsistency
                    Err(RepoError::DataCorruption(format!(
                        "Failed to parse post data retrieved from DynamoDB table '{}' for id {}",
                        self.table_name, id_str
                    )))
                }
            },
            None => Ok(None), // Item not found is not an error
        }
    }

    /// Fetches one feed page via the feed GSI, newest first. The cursor is
    /// rebuilt into an ExclusiveStartKey so the query resumes strictly after
    /// the last document of the previous page.
    async fn page(&self, cursor: Option<&PageCursor>, limit: u32) -> Result<PostPage, RepoError> {
        tracing::debug!(
            table_name = %self.table_name,
            limit,
            has_cursor = cursor.is_some(),
            "DynamoDB: Querying feed page"
        );

        let mut request_builder = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(FEED_INDEX)
            .key_condition_expression("#feed = :feed")
            .expression_attribute_names("#feed", "feed")
            .expression_attribute_values(":feed", AttributeValue::S(FEED_PARTITION.to_string()))
            .scan_index_forward(false)
            .limit(limit as i32);

        if let Some(cursor) = cursor {
            request_builder = request_builder.set_exclusive_start_key(Some(cursor_key(cursor)));
        }

        let resp = request_builder
            .send()
            .await
            .context(format!(
                "DynamoDB: Failed to query feed page from table '{}'",
                self.table_name
            ))
            .map_err(RepoError::BackendError)?;

        let mut posts: Vec<Post> = Vec::new();
        for item in resp.items() {
            match item_to_post(item) {
                Some(post) => posts.push(post),
                None => {
                    let item_id = item.get("post_id").and_then(|v| v.as_s().ok());
                    tracing::error!(item.id = ?item_id, table_name = %self.table_name, "DynamoDB: Failed to parse item from feed query into Post");
                    // Fail fast if data in the table is corrupt
                    return Err(RepoError::DataCorruption(format!(
                        "DynamoDB: Failed to parse item {:?} during feed query of table '{}'",
                        item_id, self.table_name
                    )));
                }
            }
        }

        let next = posts
            .last()
            .map(|last| PageCursor::new(last.created_at, last.post_id));

        tracing::debug!(
            table_name = %self.table_name,
            count = posts.len(),
            "DynamoDB: Feed page query complete"
        );
        Ok(PostPage { posts, next })
    }

    /// Overwrites the comments array on a post document using UpdateItem.
    async fn replace_comments(
        &self,
        post_id: Uuid,
        comments: &[Comment],
    ) -> Result<(), RepoError> {
        let id_str = post_id.to_string();
        tracing::debug!(post_id = %id_str, table_name = %self.table_name, count = comments.len(), "DynamoDB: Replacing comments array");

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("post_id", AttributeValue::S(id_str.clone()))
            .update_expression("SET #comments = :comments")
            .expression_attribute_names("#comments", "comments")
            .expression_attribute_values(
                ":comments",
                AttributeValue::L(comments.iter().map(comment_to_attr).collect()),
            )
            .send()
            .await
            .context(format!(
                "DynamoDB (table: {}): Failed to replace comments on post (id: {})",
                self.table_name, id_str
            ))
            .map_err(RepoError::BackendError)?;
        Ok(())
    }

    /// Overwrites the likers array on a post document using UpdateItem.
    async fn replace_likes(&self, post_id: Uuid, likes: &[Uuid]) -> Result<(), RepoError> {
        let id_str = post_id.to_string();
        tracing::debug!(post_id = %id_str, table_name = %self.table_name, count = likes.len(), "DynamoDB: Replacing likes array");

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("post_id", AttributeValue::S(id_str.clone()))
            .update_expression("SET #likes = :likes")
            .expression_attribute_names("#likes", "likes")
            .expression_attribute_values(
                ":likes",
                AttributeValue::L(
                    likes
                        .iter()
                        .map(|id| AttributeValue::S(id.to_string()))
                        .collect(),
                ),
            )
            .send()
            .await
            .context(format!(
                "DynamoDB (table: {}): Failed to replace likes on post (id: {})",
                self.table_name, id_str
            ))
            .map_err(RepoError::BackendError)?;
        Ok(())
    }
}

// --- Item conversion helpers ---
// Remain internal to this module; timestamps are stored as epoch millis so
// the feed index range key sorts numerically.

fn millis_attr(ts: DateTime<Utc>) -> AttributeValue {
    AttributeValue::N(ts.timestamp_millis().to_string())
}

fn attr_millis(value: &AttributeValue) -> Option<DateTime<Utc>> {
    let millis: i64 = value.as_n().ok()?.parse().ok()?;
    DateTime::from_timestamp_millis(millis)
}

fn snapshot_to_attr(user: &UserSnapshot) -> AttributeValue {
    AttributeValue::M(HashMap::from([
        (
            "user_id".to_string(),
            AttributeValue::S(user.user_id.to_string()),
        ),
        (
            "first_name".to_string(),
            AttributeValue::S(user.first_name.clone()),
        ),
        (
            "last_name".to_string(),
            AttributeValue::S(user.last_name.clone()),
        ),
        (
            "profile_photo".to_string(),
            AttributeValue::S(user.profile_photo.clone()),
        ),
    ]))
}

fn attr_to_snapshot(value: &AttributeValue) -> Option<UserSnapshot> {
    let map = value.as_m().ok()?;
    Some(UserSnapshot {
        user_id: Uuid::parse_str(map.get("user_id")?.as_s().ok()?).ok()?,
        first_name: map.get("first_name")?.as_s().ok()?.to_string(),
        last_name: map.get("last_name")?.as_s().ok()?.to_string(),
        profile_photo: map.get("profile_photo")?.as_s().ok()?.to_string(),
    })
}

fn comment_to_attr(comment: &Comment) -> AttributeValue {
    AttributeValue::M(HashMap::from([
        (
            "comment_id".to_string(),
            AttributeValue::S(comment.comment_id.to_string()),
        ),
        (
            "user_id".to_string(),
            AttributeValue::S(comment.user_id.to_string()),
        ),
        ("text".to_string(), AttributeValue::S(comment.text.clone())),
        ("created_at".to_string(), millis_attr(comment.created_at)),
        ("updated_at".to_string(), millis_attr(comment.updated_at)),
    ]))
}

fn attr_to_comment(value: &AttributeValue) -> Option<Comment> {
    let map = value.as_m().ok()?;
    Some(Comment {
        comment_id: Uuid::parse_str(map.get("comment_id")?.as_s().ok()?).ok()?,
        user_id: Uuid::parse_str(map.get("user_id")?.as_s().ok()?).ok()?,
        text: map.get("text")?.as_s().ok()?.to_string(),
        created_at: attr_millis(map.get("created_at")?)?,
        updated_at: attr_millis(map.get("updated_at")?)?,
    })
}

fn post_to_item(post: &Post) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    item.insert(
        "post_id".to_string(),
        AttributeValue::S(post.post_id.to_string()),
    );
    // Constant partition attribute feeding the listing GSI.
    item.insert(
        "feed".to_string(),
        AttributeValue::S(FEED_PARTITION.to_string()),
    );
    item.insert("title".to_string(), AttributeValue::S(post.title.clone()));
    item.insert(
        "description".to_string(),
        AttributeValue::S(post.description.clone()),
    );
    item.insert("slug".to_string(), AttributeValue::S(post.slug.clone()));
    item.insert(
        "image_url".to_string(),
        AttributeValue::S(post.image_url.clone()),
    );
    item.insert(
        "description_image_ids".to_string(),
        AttributeValue::L(
            post.description_image_ids
                .iter()
                .map(|id| AttributeValue::S(id.clone()))
                .collect(),
        ),
    );
    item.insert(
        "tagged_users".to_string(),
        AttributeValue::L(post.tagged_users.iter().map(snapshot_to_attr).collect()),
    );
    item.insert(
        "comments".to_string(),
        AttributeValue::L(post.comments.iter().map(comment_to_attr).collect()),
    );
    item.insert(
        "likes".to_string(),
        AttributeValue::L(
            post.likes
                .iter()
                .map(|id| AttributeValue::S(id.to_string()))
                .collect(),
        ),
    );
    item.insert("created_at".to_string(), millis_attr(post.created_at));
    item.insert("updated_at".to_string(), millis_attr(post.updated_at));
    item.insert(
        "created_by".to_string(),
        AttributeValue::S(post.created_by.to_string()),
    );
    item.insert("author".to_string(), snapshot_to_attr(&post.author));
    item
}

// Helper function to convert a DynamoDB item map to a Post struct.
fn item_to_post(item: &HashMap<String, AttributeValue>) -> Option<Post> {
    // Use flat_map style for conciseness and early exit on None/Err
    let post_id = item
        .get("post_id")?
        .as_s()
        .ok()
        .and_then(|s| Uuid::parse_str(s).ok())?;
    let title = item.get("title")?.as_s().ok()?.to_string();
    let description = item.get("description")?.as_s().ok()?.to_string();
    let slug = item.get("slug")?.as_s().ok()?.to_string();
    let image_url = item.get("image_url")?.as_s().ok()?.to_string();
    let description_image_ids = item
        .get("description_image_ids")?
        .as_l()
        .ok()?
        .iter()
        .map(|v| v.as_s().ok().map(|s| s.to_string()))
        .collect::<Option<Vec<_>>>()?;
    let tagged_users = item
        .get("tagged_users")?
        .as_l()
        .ok()?
        .iter()
        .map(attr_to_snapshot)
        .collect::<Option<Vec<_>>>()?;
    let comments = item
        .get("comments")?
        .as_l()
        .ok()?
        .iter()
        .map(attr_to_comment)
        .collect::<Option<Vec<_>>>()?;
    let likes = item
        .get("likes")?
        .as_l()
        .ok()?
        .iter()
        .map(|v| v.as_s().ok().and_then(|s| Uuid::parse_str(s).ok()))
        .collect::<Option<Vec<_>>>()?;
    let created_at = attr_millis(item.get("created_at")?)?;
    let updated_at = attr_millis(item.get("updated_at")?)?;
    let created_by = item
        .get("created_by")?
        .as_s()
        .ok()
        .and_then(|s| Uuid::parse_str(s).ok())?;
    let author = attr_to_snapshot(item.get("author")?)?;

    Some(Post {
        post_id,
        title,
        description,
        slug,
        image_url,
        description_image_ids,
        tagged_users,
        comments,
        likes,
        created_at,
        updated_at,
        created_by,
        author,
    })
}

// ExclusiveStartKey for the feed GSI: both index keys plus the table key.
fn cursor_key(cursor: &PageCursor) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            "feed".to_string(),
            AttributeValue::S(FEED_PARTITION.to_string()),
        ),
        ("created_at".to_string(), millis_attr(cursor.created_at())),
        (
            "post_id".to_string(),
            AttributeValue::S(cursor.post_id().to_string()),
        ),
    ])
}
