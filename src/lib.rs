//! Client-side state layer for a social feed: paginated post listing,
//! comment create/edit/delete, like toggling, and post submission with image
//! upload, backed by DynamoDB documents and S3 blobs.

pub mod aws_clients;
pub mod config;
pub mod domain;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod session;
pub mod startup;
pub mod storage;
pub mod store;
pub mod telemetry;
pub mod validate;
pub mod view_model;

use std::sync::Arc;

/// Wires the production store from configuration: one shared SDK config, the
/// DynamoDB post repository, and S3-backed media storage.
///
/// The embedding application owns the [`config::Config`] and the signed-in
/// [`session::Session`]; dev environments can call
/// [`startup::init_resources`] first to create the backing resources.
pub async fn build_post_store(
    config: &config::Config,
    session: session::Session,
) -> store::PostStore {
    let sdk_config = aws_clients::create_sdk_config(config).await;
    let repo = repositories::DynamoDbPostRepository::new(
        aws_clients::create_dynamodb_client(&sdk_config),
        config.posts_table.clone(),
    );
    let storage = storage::S3FileStorage::new(
        aws_clients::create_s3_client(&sdk_config),
        config.media_bucket.clone(),
        config.aws_region.clone(),
        config.media_base_url.clone(),
    );
    store::PostStore::new(
        Arc::new(repo),
        Arc::new(storage),
        Arc::new(session),
        config.page_size,
    )
}
