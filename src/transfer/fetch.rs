use std::{path::PathBuf, sync::Arc};

use super::FileListing;
use crate::{
    client::Endpoint,
    config::TransferSpec,
    error::{Error, Result},
};

/// Where a [`Fetcher`] stands in its listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// Waiting for the next call; the cursor may already be past the last entry
    Ready,
    /// A transfer is in flight. Dropping the future returned by [`Fetcher::next`] puts the
    /// fetcher back to `Ready`; the abandoned entry stays consumed.
    Advancing,
    /// Every entry has been visited
    Exhausted,
}

/// Downloads the entries of a [`FileListing`] one at a time.
///
/// The cursor only moves forward, and an entry is consumed as soon as it is taken, so a
/// failed entry is never retried. Each transfer opens its own connection and closes it
/// afterwards. To start over, enumerate again and build a new fetcher.
pub struct Fetcher {
    spec: Arc<TransferSpec>,
    endpoint: Endpoint,
    listing: FileListing,
    cursor: usize,
    state: FetchState,
}

impl Fetcher {
    pub fn new(spec: Arc<TransferSpec>, endpoint: Endpoint, listing: FileListing) -> Self {
        Self {
            spec,
            endpoint,
            listing,
            cursor: 0,
            state: FetchState::Ready,
        }
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn listing(&self) -> &FileListing {
        &self.listing
    }

    /// Number of entries taken so far
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.listing.len() - self.cursor
    }

    /// Transfers the next entry and returns its local path.
    ///
    /// Returns `None` once the listing is exhausted. An error still consumes the entry:
    /// the following call moves on to the next one.
    pub async fn next(&mut self) -> Option<Result<PathBuf>> {
        if self.state == FetchState::Exhausted {
            return None;
        }

        let Some(relative) = self.listing.files().get(self.cursor).cloned() else {
            debug!("No more files to download");
            self.state = FetchState::Exhausted;
            return None;
        };

        self.cursor += 1;
        let _advancing = Advancing::enter(&mut self.state);
        Some(fetch(&self.spec, &self.endpoint, &relative).await)
    }
}

/// Holds a fetcher in [`FetchState::Advancing`] and puts it back to `Ready` when dropped,
/// including when the transfer future is dropped before completing.
struct Advancing<'a>(&'a mut FetchState);

impl<'a> Advancing<'a> {
    fn enter(state: &'a mut FetchState) -> Self {
        *state = FetchState::Advancing;
        Self(state)
    }
}

impl Drop for Advancing<'_> {
    fn drop(&mut self) {
        *self.0 = FetchState::Ready;
    }
}

async fn fetch(spec: &TransferSpec, endpoint: &Endpoint, relative: &str) -> Result<PathBuf> {
    let source = spec.remote_path(relative);
    let destination = spec.destination(relative)?;

    if tokio::fs::try_exists(&destination).await? {
        return Err(Error::DestinationExists(destination));
    }

    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() && !tokio::fs::try_exists(parent).await? {
            info!("Creating local directory at: {}", parent.display());
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    info!(
        "Attempting download: {} -> {}",
        relative,
        destination.display()
    );

    let mut remote = endpoint.connect().await?;
    let written = remote.download(&source, &destination).await?;
    if let Err(err) = remote.quit().await {
        warn!("closing session after {} failed: {}", relative, err);
    }

    debug!("downloaded {} bytes to {}", written, destination.display());
    Ok(destination)
}
