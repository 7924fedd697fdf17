mod credentials;
pub mod fs;
mod session;

use std::{fmt, sync::Arc};

pub use credentials::{env_provider, CredentialProvider, Credentials, PASSWORD_VAR, USER_VAR};
pub use fs::{Connector, FtpConnector, RemoteFs};
pub use session::FtpSession;

use crate::{config::TransferSpec, error::Result};

/// The remote server: where it is, who we are, and how to reach it.
/// Every call to [`Endpoint::connect`] opens a new session.
#[derive(Clone)]
pub struct Endpoint {
    host: String,
    port: u16,
    connector: Arc<dyn Connector>,
    credentials: CredentialProvider,
}

impl Endpoint {
    /// Plain FTP endpoint with credentials taken from the environment
    pub fn new<T: Into<String>>(host: T, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connector: Arc::new(FtpConnector),
            credentials: env_provider(),
        }
    }

    pub fn from_spec(spec: &TransferSpec) -> Self {
        Self::new(spec.host(), spec.port())
    }

    /// Replaces the transport used to open sessions
    #[must_use]
    pub fn with_connector<C: Connector + 'static>(mut self, connector: C) -> Self {
        self.connector = Arc::new(connector);
        self
    }

    /// Replaces the credential lookup
    #[must_use]
    pub fn with_credentials<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Credentials + Send + Sync + 'static,
    {
        self.credentials = Arc::new(provider);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Resolves the credentials through the configured provider
    pub fn credentials(&self) -> Credentials {
        (self.credentials)()
    }

    /// Opens and authenticates a new session
    pub async fn connect(&self) -> Result<Box<dyn RemoteFs>> {
        self.connect_with(&self.credentials()).await
    }

    /// Opens a new session with credentials already resolved by the caller
    pub async fn connect_with(&self, credentials: &Credentials) -> Result<Box<dyn RemoteFs>> {
        debug!("connecting to {}:{}", self.host, self.port);
        self.connector
            .connect(&self.host, self.port, credentials)
            .await
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}
