//! Helpers for talking to an S3-compatible object store such as MinIO:
//! connection setup, existence-checked bucket and object operations, and
//! extension-based in-memory downloads.
//!
//! All calls block. The library emits `tracing` events but never installs a
//! subscriber.

pub mod adapters;
pub mod buckets;
pub mod client;
pub mod connection;
pub mod model;
pub mod objects;
pub mod util;

pub use adapters::{mock::MockClient, s3::S3Client, ObjectStore};
pub use client::ObjectClient;
pub use model::{
    endpoint::{Credentials, Endpoint},
    error::{Error, Result},
    object::{Bucket, DownloadedPayload, ObjectRecord, TextEncoding},
};
