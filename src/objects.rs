use std::path::{Path, PathBuf};

use tracing::{error, info, span, Level};

use crate::{
    adapters::ObjectStore,
    model::{
        error::{Error, Result},
        object::{DownloadedPayload, ObjectRecord, TextEncoding},
    },
    util,
};

pub fn list_objects(store: &dyn ObjectStore, bucket: &str) -> Result<Vec<ObjectRecord>> {
    let span = span!(Level::INFO, "list_objects", context = "list_objects");
    let _e = span.enter();
    info!(bucket = bucket, "called");

    store.list_objects(bucket)
}

pub fn list_object_names(store: &dyn ObjectStore, bucket: &str) -> Result<Vec<String>> {
    Ok(list_objects(store, bucket)?
        .into_iter()
        .map(|o| o.object_name)
        .collect())
}

/// Membership test against the full listing of `bucket`. One list per call.
pub fn object_exists(store: &dyn ObjectStore, bucket: &str, key: &str) -> Result<bool> {
    Ok(list_object_names(store, bucket)?.iter().any(|name| name == key))
}

pub fn get_object_stats(store: &dyn ObjectStore, bucket: &str, key: &str) -> Result<ObjectRecord> {
    let span = span!(Level::INFO, "get_object_stats", context = "get_object_stats");
    let _e = span.enter();
    info!(bucket = bucket, key = key, "called");

    store
        .stat_object(bucket, key)?
        .ok_or_else(|| missing(bucket, key, "stat_object"))
}

/// Downloads an object and decodes it by the extension of its key:
/// `txt` to text, `json` to a JSON value.
pub fn download_to_memory(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    encoding: TextEncoding,
) -> Result<DownloadedPayload> {
    let span = span!(Level::INFO, "download_to_memory", context = "download_to_memory");
    let _e = span.enter();
    info!(bucket = bucket, key = key, encoding = %encoding, "called");

    let body = store
        .get_object(bucket, key)?
        .ok_or_else(|| missing(bucket, key, "get_object"))?;

    match util::object::parse_extension_from_key(key) {
        "txt" => Ok(DownloadedPayload::Text(encoding.decode(body)?)),
        "json" => {
            let text = encoding.decode(body)?;
            let value = serde_json::from_str(&text).map_err(|err| {
                error!(error_message=%err, error_group="parse_json");
                Error::storage(format!("failed to parse json: {}/{}", bucket, key), err)
            })?;
            Ok(DownloadedPayload::Json(value))
        }
        extension => {
            let err = Error::UnsupportedDecoding {
                extension: extension.to_string(),
            };
            error!(error_message=%err, error_group="decode");
            Err(err)
        }
    }
}

/// Writes the object to `destination`, or `./{key}` when none is given.
/// An existing file is only replaced once the whole body has been written.
pub fn download_to_file(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    destination: Option<&Path>,
) -> Result<DownloadedPayload> {
    let path: PathBuf = match destination {
        Some(path) => path.to_path_buf(),
        None => util::object::default_download_path(key)?,
    };

    let span = span!(Level::INFO, "download_to_file", context = "download_to_file");
    let _e = span.enter();
    info!(bucket = bucket, key = key, path = %path.display(), "called");

    let written = store
        .fget_object(bucket, key, &path)?
        .ok_or_else(|| missing(bucket, key, "fget_object"))?;
    info!(bytes = written, "downloaded");

    Ok(DownloadedPayload::File(path))
}

/// Writes the object under `dir`, at the relative path spelled by its key.
pub fn download_to_dir(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    dir: &Path,
) -> Result<DownloadedPayload> {
    let path = util::object::download_path_in(dir, key)?;
    download_to_file(store, bucket, key, Some(&path))
}

/// Uploads a local file, keyed by its file name unless `key` is given.
/// Refuses to overwrite an existing object.
pub fn upload_object(
    store: &dyn ObjectStore,
    bucket: &str,
    local_path: &Path,
    key: Option<&str>,
) -> Result<()> {
    let key = match key {
        Some(key) => key.to_string(),
        None => util::object::parse_key_from_path(local_path)?,
    };

    let span = span!(Level::INFO, "upload_object", context = "upload_object");
    let _e = span.enter();
    info!(bucket = bucket, key = %key, path = %local_path.display(), "called");

    if object_exists(store, bucket, &key)? {
        let err = Error::object_already_exists(bucket, &key);
        error!(error_message=%err, error_group="upload_object");
        return Err(err);
    }

    let body = std::fs::read(local_path).map_err(|err| {
        error!(error_message=%err, error_group="read_file");
        Error::storage(format!("failed to read file: {}", local_path.display()), err)
    })?;
    let content_type = util::object::guess_content_type(&key);

    store.put_object(bucket, &key, body, &content_type)
}

pub fn delete_object(store: &dyn ObjectStore, bucket: &str, key: &str) -> Result<()> {
    let span = span!(Level::INFO, "delete_object", context = "delete_object");
    let _e = span.enter();
    info!(bucket = bucket, key = key, "called");

    if !object_exists(store, bucket, key)? {
        return Err(missing(bucket, key, "delete_object"));
    }

    store.remove_object(bucket, key)
}

fn missing(bucket: &str, key: &str, group: &str) -> Error {
    let err = Error::object_doesnt_exist(bucket, key);
    error!(error_message=%err, error_group=group);
    err
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use serde_json::json;

    use super::*;
    use crate::{adapters::mock::MockClient, buckets};

    fn client_with(objects: &[(&str, &[u8])]) -> MockClient {
        let client = MockClient::new();
        buckets::create_bucket(&client, "bucket").unwrap();
        for (key, body) in objects {
            client
                .put_object("bucket", key, body.to_vec(), "application/octet-stream")
                .unwrap();
        }
        client
    }

    #[test]
    fn test_list_objects() {
        let client = client_with(&[("a.txt", b"a".as_slice()), ("dir/b.json", b"{}".as_slice())]);

        let names = list_object_names(&client, "bucket").unwrap();
        assert_eq!(names, vec!["a.txt".to_string(), "dir/b.json".to_string()]);

        let records = list_objects(&client, "bucket").unwrap();
        assert!(records.iter().all(|r| r.bucket_name == "bucket"));
    }

    #[test]
    fn test_list_missing_bucket() {
        let client = MockClient::new();
        assert!(matches!(
            list_object_names(&client, "ghost"),
            Err(Error::BucketDoesntExist(_))
        ));
    }

    #[test]
    fn test_object_exists() {
        let client = client_with(&[("present.txt", b"x".as_slice())]);
        assert!(object_exists(&client, "bucket", "present.txt").unwrap());
        assert!(!object_exists(&client, "bucket", "missing.txt").unwrap());
    }

    #[test]
    fn test_get_object_stats() {
        let client = client_with(&[]);
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("upload.json");
        std::fs::write(&local, b"{\"a\":1}").unwrap();
        upload_object(&client, "bucket", &local, None).unwrap();

        let stats = get_object_stats(&client, "bucket", "upload.json").unwrap();
        assert_eq!(stats.size, 7);
        assert_eq!(stats.object_name, "upload.json");
        assert_eq!(stats.content_type.as_deref(), Some("application/json"));
        assert!(stats.last_modified_int().is_some());

        let err = get_object_stats(&client, "bucket", "nope.txt").unwrap_err();
        assert!(matches!(err, Error::ObjectDoesntExist { ref key, .. } if key == "nope.txt"));
    }

    #[test]
    fn test_download_to_memory() {
        let client = client_with(&[
            ("notes.txt", b"hello".as_slice()),
            ("data.json", b"{\"a\":1}".as_slice()),
            ("image.png", b"\x89PNG".as_slice()),
        ]);

        let text = download_to_memory(&client, "bucket", "notes.txt", TextEncoding::Utf8).unwrap();
        assert_eq!(text, DownloadedPayload::Text("hello".to_string()));

        let value = download_to_memory(&client, "bucket", "data.json", TextEncoding::Utf8).unwrap();
        assert_eq!(value, DownloadedPayload::Json(json!({"a": 1})));

        let err = download_to_memory(&client, "bucket", "image.png", TextEncoding::Utf8).unwrap_err();
        assert!(matches!(err, Error::UnsupportedDecoding { ref extension } if extension == "png"));
    }

    #[test]
    fn test_download_to_memory_failures() {
        let client = client_with(&[("broken.json", b"{not json".as_slice()), ("latin.txt", b"caf\xe9".as_slice())]);

        let err = download_to_memory(&client, "bucket", "absent.txt", TextEncoding::Utf8).unwrap_err();
        assert!(matches!(err, Error::ObjectDoesntExist { .. }));

        let err = download_to_memory(&client, "bucket", "broken.json", TextEncoding::Utf8).unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
        assert!(err.source().is_some());

        assert!(download_to_memory(&client, "bucket", "latin.txt", TextEncoding::Utf8).is_err());
        let text = download_to_memory(&client, "bucket", "latin.txt", TextEncoding::Latin1).unwrap();
        assert_eq!(text, DownloadedPayload::Text("café".to_string()));
    }

    #[test]
    fn test_upload_then_download_to_file() {
        let client = client_with(&[]);
        let dir = tempfile::tempdir().unwrap();
        let content: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let local = dir.path().join("payload.bin");
        std::fs::write(&local, &content).unwrap();

        upload_object(&client, "bucket", &local, Some("nested/payload.bin")).unwrap();

        let dest = dir.path().join("out/nested/payload.bin");
        let payload = download_to_file(&client, "bucket", "nested/payload.bin", Some(&dest)).unwrap();
        assert_eq!(payload, DownloadedPayload::File(dest.clone()));
        assert_eq!(std::fs::read(&dest).unwrap(), content);
    }

    #[test]
    fn test_download_to_file_overwrites() {
        let client = client_with(&[("a.txt", b"new".as_slice())]);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.txt");
        std::fs::write(&dest, b"old contents").unwrap();

        download_to_file(&client, "bucket", "a.txt", Some(&dest)).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn test_download_to_dir_keeps_rooted_keys_inside() {
        let client = client_with(&[
            ("/rooted/escape.txt", b"rooted".as_slice()),
            ("../up.txt", b"up".as_slice()),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");

        let payload = download_to_dir(&client, "bucket", "/rooted/escape.txt", &target).unwrap();
        assert_eq!(payload, DownloadedPayload::File(target.join("rooted/escape.txt")));
        assert_eq!(std::fs::read(target.join("rooted/escape.txt")).unwrap(), b"rooted");
        assert!(!Path::new("/rooted/escape.txt").exists());

        download_to_dir(&client, "bucket", "../up.txt", &target).unwrap();
        assert_eq!(std::fs::read(target.join("up.txt")).unwrap(), b"up");
        assert!(!dir.path().join("up.txt").exists());
    }

    #[test]
    fn test_download_missing_to_file() {
        let client = client_with(&[]);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing.txt");

        let err = download_to_file(&client, "bucket", "missing.txt", Some(&dest)).unwrap_err();
        assert!(matches!(err, Error::ObjectDoesntExist { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_upload_existing_object() {
        let client = client_with(&[("taken.txt", b"first".as_slice())]);
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("taken.txt");
        std::fs::write(&local, b"second").unwrap();

        let err = upload_object(&client, "bucket", &local, None).unwrap_err();
        assert!(matches!(err, Error::ObjectAlreadyExists { ref key, .. } if key == "taken.txt"));

        let body = download_to_memory(&client, "bucket", "taken.txt", TextEncoding::Utf8).unwrap();
        assert_eq!(body, DownloadedPayload::Text("first".to_string()));
    }

    #[test]
    fn test_upload_unreadable_file() {
        let client = client_with(&[]);
        let dir = tempfile::tempdir().unwrap();

        let err = upload_object(&client, "bucket", &dir.path().join("nope.txt"), None).unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
    }

    #[test]
    fn test_delete_object() {
        let client = client_with(&[("gone.txt", b"bye".as_slice())]);

        delete_object(&client, "bucket", "gone.txt").unwrap();
        assert!(!object_exists(&client, "bucket", "gone.txt").unwrap());

        let err = delete_object(&client, "bucket", "gone.txt").unwrap_err();
        assert!(matches!(err, Error::ObjectDoesntExist { .. }));
    }

    #[test]
    fn test_transport_failure_is_storage_error() {
        let client = MockClient::offline();
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("notes.txt");
        std::fs::write(&local, b"hello").unwrap();
        let dest = dir.path().join("out.txt");

        let errors = vec![
            list_object_names(&client, "bucket").unwrap_err(),
            object_exists(&client, "bucket", "notes.txt").unwrap_err(),
            get_object_stats(&client, "bucket", "notes.txt").unwrap_err(),
            download_to_memory(&client, "bucket", "notes.txt", TextEncoding::Utf8).unwrap_err(),
            download_to_file(&client, "bucket", "notes.txt", Some(&dest)).unwrap_err(),
            download_to_dir(&client, "bucket", "notes.txt", dir.path()).unwrap_err(),
            upload_object(&client, "bucket", &local, None).unwrap_err(),
            delete_object(&client, "bucket", "notes.txt").unwrap_err(),
        ];

        for err in errors {
            assert!(matches!(err, Error::Storage { .. }), "unexpected error: {:?}", err);
            assert!(err.source().is_some(), "no source on: {}", err);
        }
        assert!(!dest.exists());
    }
}
