use tracing::{error, info, span, Level};

use crate::{
    adapters::ObjectStore,
    connection::DEFAULT_REGION,
    model::{
        error::{Error, Result},
        object::Bucket,
    },
};

/// Buckets in the order the service returns them.
pub fn list_buckets(store: &dyn ObjectStore) -> Result<Vec<Bucket>> {
    let span = span!(Level::INFO, "list_buckets", context = "list_buckets");
    let _e = span.enter();
    info!("called");

    store.list_buckets()
}

pub fn list_bucket_names(store: &dyn ObjectStore) -> Result<Vec<String>> {
    Ok(list_buckets(store)?.into_iter().map(|b| b.name).collect())
}

pub fn bucket_exists(store: &dyn ObjectStore, bucket: &str) -> Result<bool> {
    store.bucket_exists(bucket)
}

/// Creates `bucket` in the default region.
///
/// The existence check and the create are two separate calls, so a bucket
/// created by someone else in between surfaces as `Error::Storage` from the
/// service rather than `Error::BucketAlreadyExists`.
pub fn create_bucket(store: &dyn ObjectStore, bucket: &str) -> Result<()> {
    let span = span!(Level::INFO, "create_bucket", context = "create_bucket");
    let _e = span.enter();
    info!(bucket = bucket, "called");

    if store.bucket_exists(bucket)? {
        let err = Error::BucketAlreadyExists(bucket.to_string());
        error!(error_message=%err, error_group="create_bucket");
        return Err(err);
    }

    store.make_bucket(bucket, DEFAULT_REGION)
}

/// Deletes `bucket`. Same check-then-act caveat as [`create_bucket`].
pub fn delete_bucket(store: &dyn ObjectStore, bucket: &str) -> Result<()> {
    let span = span!(Level::INFO, "delete_bucket", context = "delete_bucket");
    let _e = span.enter();
    info!(bucket = bucket, "called");

    if !store.bucket_exists(bucket)? {
        let err = Error::BucketDoesntExist(bucket.to_string());
        error!(error_message=%err, error_group="delete_bucket");
        return Err(err);
    }

    store.remove_bucket(bucket)
}
