use std::fmt;

use tracing::info;

use crate::{
    adapters::ObjectStore,
    connection,
    model::{
        endpoint::{Credentials, Endpoint},
        error::Result,
    },
};

/// Host, port, credentials and a connected handle, bundled so callers can
/// pass one value to the bucket and object helpers.
pub struct ObjectClient {
    endpoint: Endpoint,
    credentials: Option<Credentials>,
    secure: bool,
    store: Box<dyn ObjectStore>,
}

impl ObjectClient {
    /// Connects over plain http. Fails with `Error::Connection` if the handle
    /// cannot be built.
    pub fn new(host: &str, port: u16, credentials: Option<Credentials>) -> Result<Self> {
        Self::connect(host, port, credentials, false)
    }

    /// Like `new`, with the scheme chosen by `secure`.
    pub fn connect(
        host: &str,
        port: u16,
        credentials: Option<Credentials>,
        secure: bool,
    ) -> Result<Self> {
        info!(host = host, port = port, secure = secure, "initializing object client");

        let endpoint = connection::build_endpoint(host, port);
        let store = connection::connect(&endpoint.address, credentials.as_ref(), secure)?;

        let mut client = Self::with_store(endpoint, credentials, Box::new(store));
        client.secure = secure;
        Ok(client)
    }

    /// Bundles an existing store. The facade reports plain http.
    pub fn with_store(
        endpoint: Endpoint,
        credentials: Option<Credentials>,
        store: Box<dyn ObjectStore>,
    ) -> Self {
        Self {
            endpoint,
            credentials,
            secure: false,
            store,
        }
    }

    pub fn host(&self) -> &str {
        &self.endpoint.host
    }

    pub fn port(&self) -> u16 {
        self.endpoint.port
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn url(&self) -> String {
        self.endpoint.url(self.secure)
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }
}

impl fmt::Debug for ObjectClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectClient")
            .field("url", &self.url())
            .field("credentials", &self.credentials)
            .finish()
    }
}
