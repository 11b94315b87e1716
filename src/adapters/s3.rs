use std::path::Path;

use aws_sdk_s3::{
    error::{DisplayErrorContext, SdkError},
    operation::get_object::GetObjectOutput,
    primitives::{ByteStream, DateTime},
    types::{BucketLocationConstraint, CreateBucketConfiguration},
};
use time::OffsetDateTime;
use tokio::{io::AsyncWriteExt, runtime::Runtime};
use tracing::error;

use crate::{
    adapters,
    connection::DEFAULT_REGION,
    model::{
        error::{Error, Result},
        object::{Bucket, ObjectRecord},
    },
    util,
};

/// Blocking handle over `aws_sdk_s3::Client`.
///
/// Owns a current-thread runtime; not meant to be shared across threads.
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    runtime: Runtime,
}

impl S3Client {
    pub fn new(inner: aws_sdk_s3::Client, runtime: Runtime) -> Self {
        Self { inner, runtime }
    }

    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    fn send_get_object(&self, bucket: &str, key: &str) -> Result<Option<GetObjectOutput>> {
        let req = self.inner.get_object().bucket(bucket).key(key);

        match util::poll::poll_until_ready(&self.runtime, req.send()) {
            Ok(o) => Ok(Some(o)),
            Err(err) => {
                if let Some(svc_err) = err.as_service_error() {
                    if svc_err.is_no_such_key() {
                        return Ok(None);
                    }
                }
                if is_not_found_status(&err) {
                    return Ok(None);
                }

                Err(storage_error("get_object", key, err))
            }
        }
    }
}

fn to_offset_date_time(dt: &DateTime) -> Option<OffsetDateTime> {
    let nanos = dt.secs() as i128 * 1_000_000_000 + dt.subsec_nanos() as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}

fn is_not_found_status<E>(err: &SdkError<E>) -> bool {
    err.raw_response()
        .map(|res| res.status().as_u16() == 404)
        .unwrap_or(false)
}

fn storage_error<E>(call: &str, target: &str, err: SdkError<E>) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    error!(error_message=%DisplayErrorContext(&err), error_group=call);
    Error::storage(
        format!("failed to {} at: {}, {}", call, target, DisplayErrorContext(&err)),
        err,
    )
}

impl adapters::ObjectStore for S3Client {
    fn list_buckets(&self) -> Result<Vec<Bucket>> {
        let lb = util::poll::poll_until_ready(&self.runtime, self.inner.list_buckets().send())
            .map_err(|err| storage_error("list_buckets", "", err))?;

        let buckets = lb
            .buckets()
            .iter()
            .map(|b| Bucket {
                name: b.name().unwrap_or("").to_string(),
                creation_date: b.creation_date().and_then(to_offset_date_time),
            })
            .collect();

        Ok(buckets)
    }

    fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        let req = self.inner.head_bucket().bucket(bucket);

        match util::poll::poll_until_ready(&self.runtime, req.send()) {
            Ok(_) => Ok(true),
            Err(err) => {
                let not_found = err
                    .as_service_error()
                    .map(|svc_err| svc_err.is_not_found())
                    .unwrap_or(false);
                if not_found || is_not_found_status(&err) {
                    return Ok(false);
                }

                Err(storage_error("head_bucket", bucket, err))
            }
        }
    }

    fn make_bucket(&self, bucket: &str, region: &str) -> Result<()> {
        let mut req = self.inner.create_bucket().bucket(bucket);

        // us-east-1 is the implicit location and S3 rejects it as a constraint
        if region != DEFAULT_REGION {
            req = req.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        util::poll::poll_until_ready(&self.runtime, req.send())
            .map_err(|err| storage_error("create_bucket", bucket, err))?;

        Ok(())
    }

    fn remove_bucket(&self, bucket: &str) -> Result<()> {
        let req = self.inner.delete_bucket().bucket(bucket);

        util::poll::poll_until_ready(&self.runtime, req.send())
            .map_err(|err| storage_error("delete_bucket", bucket, err))?;

        Ok(())
    }

    fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectRecord>> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self.inner.list_objects_v2().bucket(bucket);

            if let Some(tok) = continuation_token {
                req = req.continuation_token(tok);
            }

            let lo = match util::poll::poll_until_ready(&self.runtime, req.send()) {
                Ok(lo) => lo,
                Err(err) => {
                    if let Some(svc_err) = err.as_service_error() {
                        if svc_err.is_no_such_bucket() {
                            return Err(Error::BucketDoesntExist(bucket.to_string()));
                        }
                    }

                    return Err(storage_error("list_objects", bucket, err));
                }
            };

            for o in lo.contents() {
                let key = o.key().unwrap_or("");
                let mut record = ObjectRecord::new(bucket, key, o.size().unwrap_or(0) as u64);
                record.etag = o.e_tag().map(|tag| tag.to_string());
                record.last_modified = o.last_modified().and_then(to_offset_date_time);

                objects.push(record);
            }

            continuation_token = lo.next_continuation_token().map(|tok| tok.to_string());
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(objects)
    }

    fn stat_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectRecord>> {
        let req = self.inner.head_object().bucket(bucket).key(key);

        let ho = match util::poll::poll_until_ready(&self.runtime, req.send()) {
            Err(err) => {
                if let Some(svc_err) = err.as_service_error() {
                    if svc_err.is_not_found() {
                        return Ok(None);
                    }
                }
                if is_not_found_status(&err) {
                    return Ok(None);
                }

                return Err(storage_error("head_object", key, err));
            }
            Ok(ho) => ho,
        };

        let mut record = ObjectRecord::new(bucket, key, ho.content_length().unwrap_or(0) as u64);
        record.content_type = ho.content_type().map(|ct| ct.to_string());
        record.etag = ho.e_tag().map(|tag| tag.to_string());
        record.last_modified = ho.last_modified().and_then(to_offset_date_time);
        if let Some(metadata) = ho.metadata() {
            record.metadata = metadata
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
        }

        Ok(Some(record))
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let o = match self.send_get_object(bucket, key)? {
            None => return Ok(None),
            Some(o) => o,
        };

        let bytes = util::poll::poll_until_ready(&self.runtime, o.body.collect()).map_err(|err| {
            error!(error_message=%err, error_group="collect_body");
            Error::storage(format!("failed to collect body: {}", key), err)
        })?;

        Ok(Some(bytes.into_bytes().to_vec()))
    }

    fn fget_object(&self, bucket: &str, key: &str, path: &Path) -> Result<Option<u64>> {
        let o = match self.send_get_object(bucket, key)? {
            None => return Ok(None),
            Some(o) => o,
        };

        let (file, staged_path) = util::object::stage_destination(path)?.into_parts();

        let written = util::poll::poll_until_ready(&self.runtime, async move {
            let mut body: ByteStream = o.body;
            let mut file = tokio::fs::File::from_std(file);

            let mut written = 0u64;
            while let Some(chunk) = body.try_next().await.map_err(|err| {
                Error::storage(format!("failed to read body: {}", key), err)
            })? {
                file.write_all(&chunk).await.map_err(|err| {
                    Error::storage(format!("failed to write file: {}", path.display()), err)
                })?;
                written += chunk.len() as u64;
            }

            file.flush().await.map_err(|err| {
                Error::storage(format!("failed to flush file: {}", path.display()), err)
            })?;

            Ok::<u64, Error>(written)
        })
        .inspect_err(|err| error!(error_message=%err, error_group="fget_object"))?;

        // the temporary file is deleted on drop if the stream failed above
        staged_path.persist(path).map_err(|err| {
            error!(error_message=%err, error_group="fget_object");
            Error::storage(format!("failed to persist file: {}", path.display()), err.error)
        })?;

        Ok(Some(written))
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let req = self
            .inner
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body));

        util::poll::poll_until_ready(&self.runtime, req.send())
            .map_err(|err| storage_error("put_object", key, err))?;

        Ok(())
    }

    fn remove_object(&self, bucket: &str, key: &str) -> Result<()> {
        let req = self.inner.delete_object().bucket(bucket).key(key);

        util::poll::poll_until_ready(&self.runtime, req.send())
            .map_err(|err| storage_error("delete_object", key, err))?;

        Ok(())
    }
}
