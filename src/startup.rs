use crate::config::Config;
use crate::errors::SetupError;
use crate::repositories::{FEED_INDEX, FEED_PARTITION};
use aws_sdk_dynamodb::{
    Client as DynamoDbClient,
    error::SdkError as DynamoSdkError,
    types::{
        AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement, KeyType,
        Projection, ProjectionType, ScalarAttributeType,
    },
};
use aws_sdk_s3::{
    Client as S3Client,
    error::SdkError as S3SdkError,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
};
use tracing;

/// Creates the posts table if it doesn't exist.
///
/// The table uses `post_id` as the partition key; the feed GSI indexes the
/// constant `feed` attribute against `created_at` so the listing query can
/// read posts newest-first. PayPerRequest billing keeps the GSI free of
/// throughput settings.
async fn create_posts_table_if_not_exists(
    client: &DynamoDbClient,
    table_name: &str,
) -> Result<(), SetupError> {
    let result = client
        .create_table()
        .table_name(table_name)
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("post_id")
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(FEED_PARTITION)
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("created_at")
                .attribute_type(ScalarAttributeType::N)
                .build()?,
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("post_id")
                .key_type(KeyType::Hash)
                .build()?,
        )
        .global_secondary_indexes(
            GlobalSecondaryIndex::builder()
                .index_name(FEED_INDEX)
                .key_schema(
                    KeySchemaElement::builder()
                        .attribute_name(FEED_PARTITION)
                        .key_type(KeyType::Hash)
                        .build()?,
                )
                .key_schema(
                    KeySchemaElement::builder()
                        .attribute_name("created_at")
                        .key_type(KeyType::Range)
                        .build()?,
                )
                .projection(
                    Projection::builder()
                        .projection_type(ProjectionType::All)
                        .build(),
                )
                .build()?,
        )
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await;

    match result {
        Ok(_) => {
            tracing::info!(
                "Startup: Table '{}' created successfully or setup initiated.",
                table_name
            );
            Ok(())
        }
        Err(e) => {
            if let DynamoSdkError::ServiceError(service_err) = &e {
                if service_err.err().is_resource_in_use_exception() {
                    tracing::info!(
                        "Startup: Table '{}' already exists, no action needed.",
                        table_name
                    );
                    return Ok(());
                }
            }
            let context = format!("Startup: Failed to create DynamoDB table '{}'", table_name);
            tracing::error!("{}: {}", context, e);
            Err(SetupError::Backend(anyhow::Error::new(e).context(context)))
        }
    }
}

/// Ensures the media bucket exists, creating it with the correct location
/// constraint if needed.
async fn ensure_media_bucket_exists(
    client: &S3Client,
    bucket_name: &str,
    region_str: &str,
) -> Result<(), SetupError> {
    let bucket_config = if region_str != "us-east-1" {
        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region_str))
                .build(),
        )
    } else {
        None
    };

    let mut create_bucket_req_builder = client.create_bucket().bucket(bucket_name);
    if let Some(config) = bucket_config {
        create_bucket_req_builder = create_bucket_req_builder.create_bucket_configuration(config);
    }

    match create_bucket_req_builder.send().await {
        Ok(_) => {
            tracing::info!(
                "Startup: Media bucket '{}' created or already exists.",
                bucket_name
            );
            Ok(())
        }
        Err(sdk_err) => {
            if let S3SdkError::ServiceError(service_err) = &sdk_err {
                let code = service_err.err().meta().code();
                if code == Some("BucketAlreadyOwnedByYou") || code == Some("BucketAlreadyExists") {
                    tracing::info!("Startup: Media bucket '{}' already exists.", bucket_name);
                    return Ok(());
                }
            }
            let context = format!("Startup: Failed to create media bucket '{}'", bucket_name);
            tracing::error!("{}: {}", context, sdk_err);
            Err(SetupError::Backend(
                anyhow::Error::new(sdk_err).context(context),
            ))
        }
    }
}

/// Initializes required backend resources (posts table, media bucket) for
/// dev/test environments. Production resources come from IaC; this tolerates
/// already-existing resources.
pub async fn init_resources(
    db_client: &DynamoDbClient,
    s3_client: &S3Client,
    config: &Config,
) -> Result<(), SetupError> {
    tracing::info!("Startup: Initializing backend resources...");
    create_posts_table_if_not_exists(db_client, &config.posts_table).await?;
    ensure_media_bucket_exists(s3_client, &config.media_bucket, &config.aws_region).await?;
    tracing::info!("Startup: Backend resource initialization complete.");
    Ok(())
}
