//! Remote filesystem capabilities.
//!
//! The downloader only needs a handful of operations from the server, collected in [`RemoteFs`].
//! [`Connector`] opens a fresh authenticated session for every pipeline step.

use std::path::Path;

use super::{Credentials, FtpSession};
use crate::{error::Result, protocol::DirEntry};

/// Operations on one authenticated remote session. This is `async_trait`
#[async_trait]
pub trait RemoteFs: Send {
    /// Changes the working directory of the session.
    async fn change_dir(&mut self, path: &str) -> Result<()>;

    /// Lists the entries of a directory, in the order reported by the server.
    async fn list_dir(&mut self, path: &str) -> Result<Vec<DirEntry>>;

    /// Queries the size of a file in bytes.
    async fn size(&mut self, path: &str) -> Result<u64>;

    /// Downloads `remote` into the new local file `local`.
    async fn download(&mut self, remote: &str, local: &Path) -> Result<u64>;

    /// Ends the session.
    async fn quit(&mut self) -> Result<()>;
}

/// Opens authenticated sessions. This is `async_trait`
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        host: &str,
        port: u16,
        credentials: &Credentials,
    ) -> Result<Box<dyn RemoteFs>>;
}

/// Connects over plain FTP with passive data connections and binary transfers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FtpConnector;

#[async_trait]
impl Connector for FtpConnector {
    async fn connect(
        &self,
        host: &str,
        port: u16,
        credentials: &Credentials,
    ) -> Result<Box<dyn RemoteFs>> {
        let mut session = FtpSession::connect((host, port)).await?;
        session
            .login(&credentials.user, &credentials.password)
            .await?;
        session.binary().await?;

        Ok(Box::new(session))
    }
}

#[async_trait]
impl RemoteFs for FtpSession {
    async fn change_dir(&mut self, path: &str) -> Result<()> {
        self.cwd(path).await
    }

    async fn list_dir(&mut self, path: &str) -> Result<Vec<DirEntry>> {
        self.list(path).await
    }

    async fn size(&mut self, path: &str) -> Result<u64> {
        FtpSession::size(self, path).await
    }

    async fn download(&mut self, remote: &str, local: &Path) -> Result<u64> {
        self.retrieve(remote, local).await
    }

    async fn quit(&mut self) -> Result<()> {
        FtpSession::quit(self).await
    }
}
