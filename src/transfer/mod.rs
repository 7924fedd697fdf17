//! The download pipeline: one enumeration pass, then one sequential fetch pass.

mod downloader;
mod enumerate;
mod fetch;
pub mod filters;
mod listing;

pub use downloader::Downloader;
pub use enumerate::enumerate;
pub use fetch::{FetchState, Fetcher};
pub use filters::FilterChain;
pub use listing::FileListing;
