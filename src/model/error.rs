/// Errors raised by the connection, bucket and object helpers.
///
/// None of these are retried by the crate; retry policy belongs to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to connect to {address}: {message}")]
    Connection { address: String, message: String },

    #[error("bucket {0} already exists")]
    BucketAlreadyExists(String),

    #[error("bucket {0} doesn't exist")]
    BucketDoesntExist(String),

    #[error("object {bucket}/{key} already exists")]
    ObjectAlreadyExists { bucket: String, key: String },

    #[error("object {bucket}/{key} doesn't exist")]
    ObjectDoesntExist { bucket: String, key: String },

    #[error("file extension {extension} does not support download into memory")]
    UnsupportedDecoding { extension: String },

    #[error("{message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Wraps a lower-level failure, keeping it reachable through `source()`.
    pub fn storage<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn storage_message(message: impl Into<String>) -> Self {
        Error::Storage {
            message: message.into(),
            source: None,
        }
    }

    pub fn object_doesnt_exist(bucket: &str, key: &str) -> Self {
        Error::ObjectDoesntExist {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    pub fn object_already_exists(bucket: &str, key: &str) -> Self {
        Error::ObjectAlreadyExists {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::BucketDoesntExist(_) | Error::ObjectDoesntExist { .. }
        )
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Error::BucketAlreadyExists(_) | Error::ObjectAlreadyExists { .. }
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
