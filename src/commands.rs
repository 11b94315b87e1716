use std::path::Path;

use objectkit::{
    buckets, connection, objects, DownloadedPayload, Error, ObjectClient, ObjectStore, Result,
    S3Client, TextEncoding,
};
use tracing::{error, info, warn};

use crate::cli::{Cli, Command};

pub fn run(args: &Cli) -> Result<()> {
    match &args.command {
        Command::Connect => connect(args),
        Command::ListBuckets => list_buckets(&open_store(args)?),
        Command::CreateBucket { bucket_name } => {
            buckets::create_bucket(&open_store(args)?, bucket_name)
        }
        Command::DeleteBucket { bucket_name } => delete_bucket(&open_store(args)?, bucket_name),
        Command::GetObjects {
            bucket_name,
            object_names,
            download_dir,
            download_to_memory,
            encoding,
        } => get_objects(
            &open_store(args)?,
            bucket_name,
            object_names,
            download_dir,
            *download_to_memory,
            *encoding,
        )
        .map(|_| ()),
        Command::StatObject {
            bucket_name,
            object_name,
        } => stat_object(&open_store(args)?, bucket_name, object_name),
        Command::UploadObject {
            bucket_name,
            file,
            object_name,
        } => objects::upload_object(
            &open_store(args)?,
            bucket_name,
            file,
            object_name.as_deref(),
        ),
        Command::DeleteObject {
            bucket_name,
            object_name,
        } => objects::delete_object(&open_store(args)?, bucket_name, object_name),
    }
}

fn open_store(args: &Cli) -> Result<S3Client> {
    let endpoint = connection::build_endpoint(&args.minio_host, args.minio_port);
    connection::connect(&endpoint.address, args.credentials().as_ref(), args.secure)
}

/// Builds the facade and a second, direct connection to the same endpoint.
fn connect(args: &Cli) -> Result<()> {
    let facade = ObjectClient::connect(
        &args.minio_host,
        args.minio_port,
        args.credentials(),
        args.secure,
    )?;
    info!(client = ?facade, "facade connected");

    let endpoint = connection::build_endpoint(&args.minio_host, args.minio_port);
    connection::connect(&endpoint.address, args.credentials().as_ref(), args.secure)?;
    info!(address = %endpoint, secure = args.secure, "direct connection built");

    Ok(())
}

fn list_buckets(store: &dyn ObjectStore) -> Result<()> {
    for bucket in buckets::list_buckets(store)? {
        info!(bucket = %bucket.name, creation_date = ?bucket.creation_date, "bucket");
    }

    Ok(())
}

/// Deletes `bucket`, treating an already-missing bucket as the expected outcome.
pub fn delete_bucket(store: &dyn ObjectStore, bucket: &str) -> Result<()> {
    let names = buckets::list_bucket_names(store)?;
    if !names.iter().any(|name| name == bucket) {
        info!(bucket = bucket, "bucket doesn't exist, expecting an error");
    }

    match buckets::delete_bucket(store, bucket) {
        Ok(()) => {
            info!(bucket = bucket, "bucket deleted");
            Ok(())
        }
        Err(err @ Error::BucketDoesntExist(_)) => {
            warn!(error_message=%err, "got expected error");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Downloads the named objects (all objects when none are named), skipping
/// names that are not in the bucket.
pub fn get_objects(
    store: &dyn ObjectStore,
    bucket: &str,
    object_names: &[String],
    download_dir: &Path,
    to_memory: bool,
    encoding: TextEncoding,
) -> Result<Vec<DownloadedPayload>> {
    let names = if object_names.is_empty() {
        objects::list_object_names(store, bucket)?
    } else {
        object_names.to_vec()
    };

    let mut downloaded = Vec::with_capacity(names.len());
    for name in names {
        if !objects::object_exists(store, bucket, &name)? {
            error!(bucket = bucket, key = %name, "object doesn't exist");
            continue;
        }

        let payload = if to_memory {
            objects::download_to_memory(store, bucket, &name, encoding)?
        } else {
            objects::download_to_dir(store, bucket, &name, download_dir)?
        };
        info!(key = %name, payload = ?payload, "downloaded");

        downloaded.push(payload);
    }

    Ok(downloaded)
}

fn stat_object(store: &dyn ObjectStore, bucket: &str, key: &str) -> Result<()> {
    let stats = objects::get_object_stats(store, bucket, key)?;
    info!(
        bucket_name = %stats.bucket_name,
        object_name = %stats.object_name,
        size = stats.size,
        content_type = ?stats.content_type,
        etag = ?stats.etag,
        is_dir = stats.is_dir,
        last_modified_readable = ?stats.last_modified_readable(),
        last_modified_int = ?stats.last_modified_int(),
        metadata = ?stats.metadata,
        "stats"
    );

    Ok(())
}
