use crate::errors::StoreError;
use crate::models::{Comment, Post};
use crate::store::{CommentAction, PostStore};
use crate::validate;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// Distance from the document bottom, in pixels, at which scrolling triggers
/// the next page fetch.
const SCROLL_FETCH_MARGIN: f64 = 10.0;

/// Window geometry sampled by the UI layer on scroll events. The crate owns
/// no window handle; the embedding UI forwards these on every scroll.
#[derive(Debug, Clone, Copy)]
pub struct ViewportMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ViewportMetrics {
    fn near_bottom(&self) -> bool {
        self.scroll_top + self.viewport_height >= self.document_height - SCROLL_FETCH_MARGIN
    }
}

/// Presentation adapter over [`PostStore`] for the post list screen.
///
/// Tracks per-post expand/collapse flags keyed by post id, drives
/// infinite-scroll paging, and manages the single shared comment-compose
/// form used for both adding and editing comments on the selected post. All
/// persistence is delegated to the store.
pub struct PostListViewModel {
    store: PostStore,
    expanded: HashMap<Uuid, bool>,
    comment_box_visible: bool,
    validate_on_input: bool,
    comment_error: Option<String>,
}

impl PostListViewModel {
    pub fn new(store: PostStore) -> Self {
        Self {
            store,
            expanded: HashMap::new(),
            comment_box_visible: false,
            validate_on_input: false,
            comment_error: None,
        }
    }

    pub fn store(&self) -> &PostStore {
        &self.store
    }

    /// Mutable store access for operations outside this screen's scope
    /// (post submission and tagging flows).
    pub fn store_mut(&mut self) -> &mut PostStore {
        &mut self.store
    }

    pub fn posts(&self) -> &[Post] {
        &self.store.state().post_list
    }

    // --- Expand/collapse ---

    pub fn is_expanded(&self, post_id: Uuid) -> bool {
        self.expanded.get(&post_id).copied().unwrap_or(false)
    }

    pub fn toggle_description(&mut self, post_id: Uuid) {
        let expanded = self.expanded.entry(post_id).or_insert(false);
        *expanded = !*expanded;
    }

    pub fn button_text(&self, post_id: Uuid) -> &'static str {
        if self.is_expanded(post_id) {
            "Show less..."
        } else {
            "Show more..."
        }
    }

    // --- Infinite scroll ---

    /// Fetches the next page when the viewport is near the document bottom
    /// and no page fetch is already in flight. Returns whether a fetch ran.
    pub async fn handle_scroll(&mut self, metrics: ViewportMetrics) -> Result<bool, StoreError> {
        if !metrics.near_bottom() || self.store.state().loading_posts {
            return Ok(false);
        }
        self.store.fetch_next_page().await?;
        Ok(true)
    }

    // --- Comment compose form ---

    pub fn comment_box_visible(&self) -> bool {
        self.comment_box_visible
    }

    pub fn comment_text(&self) -> &str {
        &self.store.state().comment_draft
    }

    pub fn comment_error(&self) -> Option<&str> {
        self.comment_error.as_deref()
    }

    /// Flips comment-box visibility. Opening it for a post clears any edit
    /// target, loads that post into the single-post slot, selects it, and
    /// resets the draft, error message, and validation trigger.
    pub async fn toggle_comment_box(&mut self, post_id: Option<Uuid>) -> Result<(), StoreError> {
        self.comment_box_visible = !self.comment_box_visible;
        if let Some(id) = post_id {
            self.store.set_edit_target(None);
            self.store.fetch_single_post(id).await?;
        }
        self.store.set_selected_post(post_id);
        self.store.set_comment_draft(String::new());
        self.comment_error = None;
        self.validate_on_input = false;
        Ok(())
    }

    pub fn set_comment_text(&mut self, text: impl Into<String>) {
        self.store.set_comment_draft(text);
        self.validate();
    }

    /// Re-runs draft validation once a submission attempt has armed it.
    pub fn validate(&mut self) {
        if self.validate_on_input {
            self.comment_error = validate::validate_comment(self.comment_text());
        }
    }

    /// Validates the draft and submits it, dispatching an edit when an edit
    /// target is stored and an add otherwise. Returns false when validation
    /// blocked the submission.
    pub async fn submit_comment(&mut self) -> Result<bool, StoreError> {
        self.validate_on_input = true;
        self.validate();
        if self.comment_error.is_some() {
            return Ok(false);
        }

        let action = if self.store.state().edit_comment_id.is_some() {
            CommentAction::Edit
        } else {
            CommentAction::Add
        };
        self.store.manage_comments(action).await?;

        self.store.set_comment_draft(String::new());
        self.store.set_edit_target(None);
        self.comment_error = None;
        self.validate_on_input = false;
        Ok(true)
    }

    pub async fn delete_comment(&mut self, comment_id: Uuid) -> Result<(), StoreError> {
        self.store
            .manage_comments(CommentAction::Delete(comment_id))
            .await
    }

    /// Loads an existing comment into the form and marks it as the edit
    /// target; the next submission rewrites it in place.
    pub fn begin_edit(&mut self, comment: &Comment) {
        self.store.set_comment_draft(comment.text.clone());
        self.store.set_edit_target(Some(comment.comment_id));
    }

    // --- Timestamps ---

    /// Relative age of an upload for display next to the post.
    pub fn upload_age(&self, created_at: DateTime<Utc>) -> String {
        relative_age(created_at, Utc::now())
    }
}

/// Coarse relative-age phrase in the style of feed UIs.
fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then);
    let seconds = delta.num_seconds();
    if seconds < 45 {
        return "a few seconds ago".to_string();
    }
    if seconds < 90 {
        return "a minute ago".to_string();
    }
    let minutes = delta.num_minutes();
    if minutes < 45 {
        return format!("{minutes} minutes ago");
    }
    if minutes < 90 {
        return "an hour ago".to_string();
    }
    let hours = delta.num_hours();
    if hours < 22 {
        return format!("{hours} hours ago");
    }
    if hours < 36 {
        return "a day ago".to_string();
    }
    let days = delta.num_days();
    if days < 26 {
        return format!("{days} days ago");
    }
    if days < 45 {
        return "a month ago".to_string();
    }
    if days < 320 {
        return format!("{} months ago", days / 30);
    }
    if days < 548 {
        return "a year ago".to_string();
    }
    format!("{} years ago", days / 365)
}
