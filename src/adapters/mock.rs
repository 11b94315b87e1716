use std::{cell::RefCell, collections::BTreeMap, io::Write, path::Path};

use time::OffsetDateTime;

use crate::{
    adapters,
    model::{
        error::{Error, Result},
        object::{Bucket, ObjectRecord},
    },
    util,
};

struct MockObject {
    body: Vec<u8>,
    content_type: String,
    last_modified: OffsetDateTime,
}

struct MockBucket {
    creation_date: OffsetDateTime,
    objects: BTreeMap<String, MockObject>,
}

/// In-memory store. Like the real handle it is not thread-safe.
#[derive(Default)]
pub struct MockClient {
    buckets: RefCell<BTreeMap<String, MockBucket>>,
    offline: bool,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails as if the service were unreachable.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Default::default()
        }
    }

    fn check_online(&self, call: &str) -> Result<()> {
        if self.offline {
            let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
            return Err(Error::storage(format!("failed to {}: service unreachable", call), io));
        }

        Ok(())
    }

    fn with_bucket<T>(
        &self,
        bucket: &str,
        f: impl FnOnce(&mut MockBucket) -> Result<T>,
    ) -> Result<T> {
        let mut buckets = self.buckets.borrow_mut();
        match buckets.get_mut(bucket) {
            Some(b) => f(b),
            None => Err(Error::BucketDoesntExist(bucket.to_string())),
        }
    }
}

impl adapters::ObjectStore for MockClient {
    fn list_buckets(&self) -> Result<Vec<Bucket>> {
        self.check_online("list_buckets")?;

        Ok(self
            .buckets
            .borrow()
            .iter()
            .map(|(name, b)| Bucket {
                name: name.clone(),
                creation_date: Some(b.creation_date),
            })
            .collect())
    }

    fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        self.check_online("head_bucket")?;

        Ok(self.buckets.borrow().contains_key(bucket))
    }

    fn make_bucket(&self, bucket: &str, _region: &str) -> Result<()> {
        self.check_online("create_bucket")?;

        let mut buckets = self.buckets.borrow_mut();
        if buckets.contains_key(bucket) {
            return Err(Error::storage_message(format!(
                "failed to create_bucket at: {}, BucketAlreadyOwnedByYou",
                bucket
            )));
        }

        buckets.insert(
            bucket.to_string(),
            MockBucket {
                creation_date: OffsetDateTime::now_utc(),
                objects: BTreeMap::new(),
            },
        );

        Ok(())
    }

    fn remove_bucket(&self, bucket: &str) -> Result<()> {
        self.check_online("delete_bucket")?;

        let mut buckets = self.buckets.borrow_mut();
        match buckets.get(bucket) {
            None => Err(Error::storage_message(format!(
                "failed to delete_bucket at: {}, NoSuchBucket",
                bucket
            ))),
            Some(b) if !b.objects.is_empty() => Err(Error::storage_message(format!(
                "failed to delete_bucket at: {}, BucketNotEmpty",
                bucket
            ))),
            Some(_) => {
                buckets.remove(bucket);
                Ok(())
            }
        }
    }

    fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectRecord>> {
        self.check_online("list_objects")?;

        self.with_bucket(bucket, |b| {
            Ok(b.objects
                .iter()
                .map(|(key, o)| {
                    let mut record = ObjectRecord::new(bucket, key, o.body.len() as u64);
                    record.last_modified = Some(o.last_modified);
                    record
                })
                .collect())
        })
    }

    fn stat_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectRecord>> {
        self.check_online("head_object")?;

        self.with_bucket(bucket, |b| {
            Ok(b.objects.get(key).map(|o| {
                let mut record = ObjectRecord::new(bucket, key, o.body.len() as u64);
                record.content_type = Some(o.content_type.clone());
                record.last_modified = Some(o.last_modified);
                record
            }))
        })
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        self.check_online("get_object")?;

        self.with_bucket(bucket, |b| Ok(b.objects.get(key).map(|o| o.body.clone())))
    }

    fn fget_object(&self, bucket: &str, key: &str, path: &Path) -> Result<Option<u64>> {
        let body = match self.get_object(bucket, key)? {
            None => return Ok(None),
            Some(body) => body,
        };

        let mut staged = util::object::stage_destination(path)?;
        staged.write_all(&body).map_err(|err| {
            Error::storage(format!("failed to write file: {}", path.display()), err)
        })?;
        staged.persist(path).map_err(|err| {
            Error::storage(format!("failed to persist file: {}", path.display()), err.error)
        })?;

        Ok(Some(body.len() as u64))
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        self.check_online("put_object")?;

        self.with_bucket(bucket, |b| {
            b.objects.insert(
                key.to_string(),
                MockObject {
                    body,
                    content_type: content_type.to_string(),
                    last_modified: OffsetDateTime::now_utc(),
                },
            );
            Ok(())
        })
    }

    fn remove_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.check_online("delete_object")?;

        // S3 treats deleting a missing key as success
        self.with_bucket(bucket, |b| {
            b.objects.remove(key);
            Ok(())
        })
    }
}
