use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::error::{Error, Result};

/// Text after the last `.` of the key. A key without a dot is returned whole.
pub fn parse_extension_from_key(key: &str) -> &str {
    key.rsplit('.').next().unwrap_or(key)
}

/// Final path segment of a local file, used as the default object key.
pub fn parse_key_from_path(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
        .ok_or_else(|| {
            Error::storage_message(format!(
                "failed to derive object key from: {}",
                path.display()
            ))
        })
}

/// Path for `key` under `dir`. Only the key's normal components are kept, so
/// a leading `/`, `.` or `..` never moves the result out of `dir`.
pub fn download_path_in(dir: &Path, key: &str) -> Result<PathBuf> {
    let relative: PathBuf = Path::new(key)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();

    if relative.as_os_str().is_empty() {
        return Err(Error::storage_message(format!(
            "object key has no usable file name: {}",
            key
        )));
    }

    Ok(dir.join(relative))
}

pub fn default_download_path(key: &str) -> Result<PathBuf> {
    download_path_in(Path::new("."), key)
}

pub fn guess_content_type(key: &str) -> String {
    mime_guess::from_path(key)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Creates any missing parent directories of a download destination.
pub fn prepare_destination(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| {
                Error::storage(
                    format!("failed to create directory: {}", parent.display()),
                    err,
                )
            })?;
        }
    }

    Ok(())
}

/// Temporary file in the directory of `path`. It is removed on drop unless
/// persisted over `path`, so `path` only ever holds a complete download.
pub fn stage_destination(path: &Path) -> Result<NamedTempFile> {
    prepare_destination(path)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    tempfile::Builder::new()
        .prefix(".objectkit-")
        .tempfile_in(dir)
        .map_err(|err| {
            Error::storage(
                format!("failed to create temporary file in: {}", dir.display()),
                err,
            )
        })
}
