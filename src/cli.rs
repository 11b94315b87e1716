use std::path::PathBuf;

use clap::{Parser, Subcommand};
use objectkit::{connection::DEFAULT_PORT, Credentials, TextEncoding};

#[derive(Debug, Parser)]
#[command(name = "objectkit", version, about = "Bucket and object helpers for MinIO")]
pub struct Cli {
    /// Access key; omit both keys for anonymous access
    #[arg(long, env = "MINIO_ACCESS_KEY", requires = "secret_key")]
    pub access_key: Option<String>,

    #[arg(long, env = "MINIO_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    #[arg(long, env = "MINIO_HOST")]
    pub minio_host: String,

    #[arg(long, env = "MINIO_PORT", default_value_t = DEFAULT_PORT)]
    pub minio_port: u16,

    /// Use https
    #[arg(long)]
    pub secure: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.access_key, &self.secret_key) {
            (Some(access_key), Some(secret_key)) => Some(Credentials::new(access_key, secret_key)),
            _ => None,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect through the client facade and directly, then exit
    Connect,

    ListBuckets,

    CreateBucket {
        #[arg(long)]
        bucket_name: String,
    },

    /// Delete a bucket; a missing bucket is logged and tolerated
    DeleteBucket {
        #[arg(long)]
        bucket_name: String,
    },

    /// Download every object of a bucket, or only the named ones
    GetObjects {
        #[arg(long)]
        bucket_name: String,

        #[arg(long = "object-name")]
        object_names: Vec<String>,

        #[arg(long, default_value = "./data")]
        download_dir: PathBuf,

        #[arg(long)]
        download_to_memory: bool,

        #[arg(long, default_value = "utf-8")]
        encoding: TextEncoding,
    },

    StatObject {
        #[arg(long)]
        bucket_name: String,

        #[arg(long)]
        object_name: String,
    },

    UploadObject {
        #[arg(long)]
        bucket_name: String,

        #[arg(long)]
        file: PathBuf,

        /// Defaults to the file name
        #[arg(long)]
        object_name: Option<String>,
    },

    DeleteObject {
        #[arg(long)]
        bucket_name: String,

        #[arg(long)]
        object_name: String,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Connect => "connect",
            Command::ListBuckets => "list_buckets",
            Command::CreateBucket { .. } => "create_bucket",
            Command::DeleteBucket { .. } => "delete_bucket",
            Command::GetObjects { .. } => "get_objects",
            Command::StatObject { .. } => "stat_object",
            Command::UploadObject { .. } => "upload_object",
            Command::DeleteObject { .. } => "delete_object",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_objects() {
        let cli = Cli::try_parse_from([
            "objectkit",
            "--access-key=ak",
            "--secret-key=sk",
            "--minio-host=localhost",
            "get-objects",
            "--bucket-name=bucket",
            "--object-name=a.txt",
            "--object-name=b.json",
            "--download-to-memory",
        ])
        .unwrap();

        assert_eq!(cli.minio_host, "localhost");
        assert_eq!(cli.minio_port, 9000);
        assert_eq!(cli.credentials(), Some(Credentials::new("ak", "sk")));

        match cli.command {
            Command::GetObjects {
                bucket_name,
                object_names,
                download_dir,
                download_to_memory,
                encoding,
            } => {
                assert_eq!(bucket_name, "bucket");
                assert_eq!(object_names, vec!["a.txt", "b.json"]);
                assert_eq!(download_dir, PathBuf::from("./data"));
                assert!(download_to_memory);
                assert_eq!(encoding, TextEncoding::Utf8);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_anonymous_with_port() {
        let cli = Cli::try_parse_from([
            "objectkit",
            "--minio-host",
            "minio",
            "--minio-port",
            "9001",
            "delete-bucket",
            "--bucket-name",
            "old",
        ])
        .unwrap();

        assert_eq!(cli.minio_host, "minio");
        assert_eq!(cli.minio_port, 9001);
        assert_eq!(cli.credentials(), None);
        assert_eq!(cli.command.name(), "delete_bucket");
    }

    #[test]
    fn test_access_key_requires_secret() {
        let res = Cli::try_parse_from([
            "objectkit",
            "--access-key=ak",
            "--minio-host=localhost",
            "list-buckets",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_bad_encoding() {
        let res = Cli::try_parse_from([
            "objectkit",
            "--minio-host=localhost",
            "get-objects",
            "--bucket-name=b",
            "--encoding=ebcdic",
        ]);
        assert!(res.is_err());
    }
}
