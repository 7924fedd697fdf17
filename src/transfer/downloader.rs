use std::{path::PathBuf, sync::Arc};

use super::{enumerate, FetchState, Fetcher, FileListing, FilterChain};
use crate::{
    client::Endpoint,
    config::TransferSpec,
    error::{Error, Result},
};

/// High-level downloader tying the enumerator and the fetcher together.
///
/// Typical use: [`check_credentials`](Self::check_credentials), then
/// [`dry_run`](Self::dry_run), then [`next`](Self::next) until it returns `None`.
pub struct Downloader {
    spec: Arc<TransferSpec>,
    endpoint: Endpoint,
    filters: FilterChain,
    fetcher: Option<Fetcher>,
}

impl Downloader {
    pub fn new(spec: TransferSpec, endpoint: Endpoint) -> Self {
        Self {
            spec: Arc::new(spec),
            endpoint,
            filters: FilterChain::new(),
            fetcher: None,
        }
    }

    pub fn spec(&self) -> &TransferSpec {
        &self.spec
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Adds a file filter, applied after the ones already registered.
    /// Takes effect at the next dry run.
    pub fn register_filter<F>(&mut self, filter: F)
    where
        F: Fn(Vec<String>) -> Vec<String> + Send + Sync + 'static,
    {
        self.filters.push(filter);
    }

    /// Listing built by the last dry run
    pub fn file_list(&self) -> Option<&FileListing> {
        self.fetcher.as_ref().map(Fetcher::listing)
    }

    /// `None` until the first dry run
    pub fn state(&self) -> Option<FetchState> {
        self.fetcher.as_ref().map(Fetcher::state)
    }

    /// Opens and closes one session with the configured credentials.
    /// Empty credentials are reported but still tried, some servers allow them.
    pub async fn check_credentials(&self) -> Result<()> {
        let credentials = self.endpoint.credentials();
        if !credentials.is_complete() {
            warn!("Failed to acquire valid (non-empty string) user and/or password.");
        }

        info!("Attempting to connect to host: {}", self.endpoint.host());
        let mut remote = self.endpoint.connect_with(&credentials).await?;
        remote.quit().await?;
        info!("No exceptions raised!");

        Ok(())
    }

    /// Enumerates the remote tree and starts a new download pass over the result.
    /// On failure the previous listing, if any, is left untouched.
    pub async fn dry_run(&mut self) -> Result<&FileListing> {
        info!("Performing dry run...");
        let listing = enumerate(&self.spec, &self.endpoint, &self.filters).await?;

        let fetcher = Fetcher::new(self.spec.clone(), self.endpoint.clone(), listing);
        Ok(self.fetcher.insert(fetcher).listing())
    }

    /// Downloads the next file of the current pass.
    ///
    /// Yields [`Error::DryRunRequired`] before the first dry run and `None` once every
    /// file has been visited.
    pub async fn next(&mut self) -> Option<Result<PathBuf>> {
        match self.fetcher.as_mut() {
            Some(fetcher) => fetcher.next().await,
            None => Some(Err(Error::DryRunRequired)),
        }
    }
}
