use aws_config::{BehaviorVersion, Region};
use tracing::{error, info, span, Level};
use url::Url;

use crate::{
    adapters::s3::S3Client,
    model::{
        endpoint::{Credentials, Endpoint},
        error::{Error, Result},
    },
    util,
};

pub const DEFAULT_PORT: u16 = 9000;
pub const DEFAULT_REGION: &str = "us-east-1";

const PROVIDER_NAME: &str = "objectkit";

pub fn build_endpoint(host: &str, port: u16) -> Endpoint {
    Endpoint::new(host, port)
}

fn connection_error(address: &str, message: impl Into<String>) -> Error {
    let message = message.into();
    error!(error_message=%message, error_group="connect");
    Error::Connection {
        address: address.to_string(),
        message,
    }
}

/// Builds a client handle for `address` (`host:port`).
///
/// Passing no credentials yields an anonymous handle. Nothing is sent over the
/// network here, so an unreachable service only shows up on first use.
pub fn connect(address: &str, credentials: Option<&Credentials>, secure: bool) -> Result<S3Client> {
    let span = span!(Level::INFO, "connect", context = "connect");
    let _e = span.enter();
    info!(
        address = address,
        secure = secure,
        anonymous = credentials.is_none(),
        "called"
    );

    let scheme = if secure { "https" } else { "http" };
    let endpoint_url = format!("{}://{}", scheme, address);

    let parsed = Url::parse(&endpoint_url)
        .map_err(|err| connection_error(address, format!("invalid address: {}", err)))?;
    if parsed.host_str().map(|h| h.is_empty()).unwrap_or(true) {
        return Err(connection_error(address, "address has no host"));
    }
    if parsed.path() != "/" || parsed.query().is_some() {
        return Err(connection_error(address, "address must be of the form host:port"));
    }

    let runtime = util::poll::build_runtime()
        .map_err(|err| connection_error(address, format!("failed to start runtime: {}", err)))?;

    let loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(DEFAULT_REGION))
        .endpoint_url(&endpoint_url);

    let loader = match credentials {
        Some(creds) => loader.credentials_provider(aws_sdk_s3::config::Credentials::new(
            &creds.access_key,
            &creds.secret_key,
            None,
            None,
            PROVIDER_NAME,
        )),
        None => loader.no_credentials(),
    };

    let sdk_config = util::poll::poll_until_ready(&runtime, loader.load());
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(true)
        .build();

    info!(endpoint_url = %endpoint_url, "connected");

    Ok(S3Client::new(aws_sdk_s3::Client::from_conf(s3_config), runtime))
}
