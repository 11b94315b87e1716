use std::path::Path;

use crate::model::{
    error::Result,
    object::{Bucket, ObjectRecord},
};

pub mod mock;
pub mod s3;

/// The slice of an S3-compatible client the helpers rely on.
///
/// "Absent" is reported through `bool`/`Option` rather than an error, except
/// for listing a missing bucket which is `Error::BucketDoesntExist`.
pub trait ObjectStore {
    fn list_buckets(&self) -> Result<Vec<Bucket>>;

    fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    fn make_bucket(&self, bucket: &str, region: &str) -> Result<()>;

    fn remove_bucket(&self, bucket: &str) -> Result<()>;

    fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectRecord>>;

    fn stat_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectRecord>>;

    fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Writes the object to `path`, returning the number of bytes written.
    /// Nothing is created at `path` when the object is absent.
    fn fget_object(&self, bucket: &str, key: &str, path: &Path) -> Result<Option<u64>>;

    fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str)
        -> Result<()>;

    fn remove_object(&self, bucket: &str, key: &str) -> Result<()>;
}
