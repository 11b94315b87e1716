use std::{collections::BTreeMap, fmt, path::PathBuf, str::FromStr};

use time::{format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime};

use crate::model::error::{Error, Result};

const READABLE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second]"
);
const COMPACT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day][hour][minute][second]");

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
    pub creation_date: Option<OffsetDateTime>,
}

/// Snapshot of an object as reported by the service. Not kept in sync afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectRecord {
    pub bucket_name: String,
    pub object_name: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<OffsetDateTime>,
    pub is_dir: bool,
    pub metadata: BTreeMap<String, String>,
}

impl ObjectRecord {
    pub fn new(bucket_name: &str, object_name: &str, size: u64) -> Self {
        Self {
            bucket_name: bucket_name.to_string(),
            object_name: object_name.to_string(),
            size,
            content_type: None,
            etag: None,
            last_modified: None,
            is_dir: object_name.ends_with('/'),
            metadata: BTreeMap::new(),
        }
    }

    /// e.g. `Tue, 04 Jun 2019 13:05:09`
    pub fn last_modified_readable(&self) -> Option<String> {
        self.last_modified?.format(READABLE_FORMAT).ok()
    }

    /// e.g. `20190604130509`
    pub fn last_modified_int(&self) -> Option<u64> {
        self.last_modified?
            .format(COMPACT_FORMAT)
            .ok()
            .and_then(|s| s.parse().ok())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DownloadedPayload {
    Text(String),
    Json(serde_json::Value),
    File(PathBuf),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Latin1,
}

impl TextEncoding {
    pub fn decode(&self, bytes: Vec<u8>) -> Result<String> {
        match self {
            TextEncoding::Utf8 => String::from_utf8(bytes)
                .map_err(|err| Error::storage("object is not valid utf-8", err)),
            TextEncoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            other => Err(format!("unsupported text encoding: {}", other)),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => f.write_str("utf-8"),
            TextEncoding::Latin1 => f.write_str("latin-1"),
        }
    }
}
