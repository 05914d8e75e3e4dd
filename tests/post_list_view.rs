mod common;

use common::{comment_by, post_by, store_with, user};
use feed_store::view_model::{PostListViewModel, ViewportMetrics};
use uuid::Uuid;

fn metrics(scroll_top: f64, viewport_height: f64, document_height: f64) -> ViewportMetrics {
    ViewportMetrics {
        scroll_top,
        viewport_height,
        document_height,
    }
}

#[tokio::test]
async fn scrolling_far_from_the_bottom_fetches_nothing() {
    let author = user("Ada");
    let posts = (0..3).map(|i| post_by(&author, &format!("p{i}"), i)).collect();
    let (store, repo, _) = store_with(posts, author);
    let mut view = PostListViewModel::new(store);

    let fetched = view.handle_scroll(metrics(0.0, 600.0, 2000.0)).await.unwrap();
    assert!(!fetched);
    assert_eq!(repo.page_calls(), 0);
}

#[tokio::test]
async fn scrolling_near_the_bottom_fetches_the_next_page() {
    let author = user("Ada");
    let posts = (0..3).map(|i| post_by(&author, &format!("p{i}"), i)).collect();
    let (store, repo, _) = store_with(posts, author);
    let mut view = PostListViewModel::new(store);

    // Exactly at the trigger margin counts as near the bottom.
    let fetched = view
        .handle_scroll(metrics(1390.0, 600.0, 2000.0))
        .await
        .unwrap();
    assert!(fetched);
    assert_eq!(repo.page_calls(), 1);
    assert_eq!(view.posts().len(), 3);
}

#[tokio::test]
async fn expand_state_is_keyed_by_post_id() {
    let author = user("Ada");
    let posts: Vec<_> = (0..2).map(|i| post_by(&author, &format!("p{i}"), i)).collect();
    let first = posts[0].post_id;
    let second = posts[1].post_id;
    let (store, _, _) = store_with(posts, author);
    let mut view = PostListViewModel::new(store);

    assert!(!view.is_expanded(first));
    assert_eq!(view.button_text(first), "Show more...");

    view.toggle_description(first);
    assert!(view.is_expanded(first));
    assert!(!view.is_expanded(second), "flags do not bleed across posts");
    assert_eq!(view.button_text(first), "Show less...");

    view.toggle_description(first);
    assert!(!view.is_expanded(first));
}

#[tokio::test]
async fn opening_the_comment_box_selects_and_loads_the_post() {
    let author = user("Ada");
    let seeded = post_by(&author, "discussed", 10);
    let post_id = seeded.post_id;
    let (store, _, _) = store_with(vec![seeded], author);
    let mut view = PostListViewModel::new(store);

    view.toggle_comment_box(Some(post_id)).await.unwrap();
    assert!(view.comment_box_visible());
    assert_eq!(view.store().state().selected_post_id, Some(post_id));
    assert_eq!(
        view.store()
            .state()
            .single_post
            .as_ref()
            .map(|post| post.post_id),
        Some(post_id)
    );
    assert_eq!(view.comment_text(), "");
    assert_eq!(view.comment_error(), None);

    view.toggle_comment_box(None).await.unwrap();
    assert!(!view.comment_box_visible());
    assert_eq!(view.store().state().selected_post_id, None);
}

#[tokio::test]
async fn empty_draft_submission_is_blocked_without_a_backend_write() {
    let author = user("Ada");
    let seeded = post_by(&author, "discussed", 10);
    let post_id = seeded.post_id;
    let (store, repo, _) = store_with(vec![seeded], author);
    let mut view = PostListViewModel::new(store);
    view.toggle_comment_box(Some(post_id)).await.unwrap();

    let submitted = view.submit_comment().await.unwrap();
    assert!(!submitted);
    assert!(view.comment_error().is_some());
    assert_eq!(repo.write_calls(), 0);

    // Typing valid text re-validates immediately and clears the message.
    view.set_comment_text("Looks great");
    assert_eq!(view.comment_error(), None);

    let submitted = view.submit_comment().await.unwrap();
    assert!(submitted);
    assert_eq!(repo.write_calls(), 1);
    assert_eq!(view.comment_text(), "", "draft resets after submission");
    let comments = &repo.documents()[0].comments;
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text, "Looks great");
}

#[tokio::test]
async fn begin_edit_then_submit_rewrites_in_place() {
    let author = user("Ada");
    let mine = comment_by(&author, "typo'd commnet", 30);
    let mut seeded = post_by(&author, "discussed", 60);
    seeded.comments = vec![mine.clone()];
    let post_id = seeded.post_id;
    let (store, repo, _) = store_with(vec![seeded], author);
    let mut view = PostListViewModel::new(store);
    view.toggle_comment_box(Some(post_id)).await.unwrap();

    view.begin_edit(&mine);
    assert_eq!(view.comment_text(), "typo'd commnet");

    view.set_comment_text("typo'd comment");
    let submitted = view.submit_comment().await.unwrap();
    assert!(submitted);

    let comments = &repo.documents()[0].comments;
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment_id, mine.comment_id);
    assert_eq!(comments[0].created_at, mine.created_at);
    assert_eq!(comments[0].text, "typo'd comment");
    assert_eq!(
        view.store().state().edit_comment_id,
        None,
        "edit target clears after submission"
    );
}

#[tokio::test]
async fn delete_flows_through_to_the_selected_post() {
    let author = user("Ada");
    let doomed = comment_by(&author, "delete me", 5);
    let mut seeded = post_by(&author, "discussed", 60);
    seeded.comments = vec![doomed.clone()];
    let post_id = seeded.post_id;
    let (store, repo, _) = store_with(vec![seeded], author);
    let mut view = PostListViewModel::new(store);
    view.toggle_comment_box(Some(post_id)).await.unwrap();

    view.delete_comment(doomed.comment_id).await.unwrap();
    assert!(repo.documents()[0].comments.is_empty());
}

#[test]
fn tagging_dedupes_and_untags_by_user_id() {
    let author = user("Ada");
    let tagged = user("Grace");
    let (store, _, _) = store_with(vec![], author);
    let mut view = PostListViewModel::new(store);

    view.store_mut().tag_user(tagged.clone());
    view.store_mut().tag_user(tagged.clone());
    assert_eq!(view.store().state().tagged_users, vec![tagged.clone()]);

    view.store_mut().remove_tag(tagged.user_id);
    assert!(view.store().state().tagged_users.is_empty());
}

#[test]
fn unknown_post_ids_read_as_collapsed() {
    let author = user("Ada");
    let (store, _, _) = store_with(vec![], author);
    let view = PostListViewModel::new(store);
    assert!(!view.is_expanded(Uuid::new_v4()));
}
