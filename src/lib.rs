//! Incremental downloads of observation archives from FTP servers.
//!
//! A [`Downloader`] first walks the remote source directory (the dry run), producing a
//! frozen [`FileListing`], then transfers the listed files one at a time on demand.

#[macro_use]
extern crate log;
#[macro_use]
extern crate async_trait;

/// FTP client and remote filesystem abstraction
pub mod client;
pub mod config;
mod error;
/// Control channel codec
pub mod protocol;
/// Enumeration and download
pub mod transfer;

#[cfg(test)]
mod test_support;

pub use client::{Credentials, Endpoint};
pub use config::TransferSpec;
pub use error::{Error, Result};
pub use transfer::{Downloader, FetchState, Fetcher, FileListing, FilterChain};
