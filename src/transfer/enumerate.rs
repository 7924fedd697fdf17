use super::{FileListing, FilterChain};
use crate::{
    client::{Endpoint, RemoteFs},
    config::TransferSpec,
    error::Result,
};

const ROOT: &str = ".";

fn megabytes(bytes: u64) -> u64 {
    bytes / 1_000_000
}

fn child_path(dir: &str, name: &str) -> String {
    if dir == ROOT {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}

/// Walks the source tree of `spec` and builds the list of files to download.
///
/// Directories are visited top-down, a directory's own files before its subdirectories, in
/// the order reported by the server. A directory whose relative path appears in the exclude
/// list is skipped along with everything beneath it. The files of each remaining directory
/// pass through `filters` before their sizes are queried.
///
/// Any remote failure aborts the walk; no partial listing is returned.
pub async fn enumerate(
    spec: &TransferSpec,
    endpoint: &Endpoint,
    filters: &FilterChain,
) -> Result<FileListing> {
    info!("Connecting to host: {}", endpoint.host());
    let mut remote = endpoint.connect().await?;

    info!("Moving to directory: {}", spec.source_root());
    remote.change_dir(spec.source_root()).await?;

    let listing = walk(&mut *remote, spec, filters).await?;
    remote.quit().await?;

    info!(
        "Total: {} files to be downloaded ({} MB)",
        listing.len(),
        megabytes(listing.total_size())
    );
    Ok(listing)
}

async fn walk(
    remote: &mut dyn RemoteFs,
    spec: &TransferSpec,
    filters: &FilterChain,
) -> Result<FileListing> {
    let mut files = Vec::new();
    let mut total_size = 0;
    let mut pending = vec![ROOT.to_owned()];

    while let Some(dir) = pending.pop() {
        if spec.is_excluded(&dir) {
            info!("Skipping directory: {}", dir);
            continue;
        }

        let entries = remote.list_dir(&dir).await?;

        // reversed so the first subdirectory is popped first
        pending.extend(
            entries
                .iter()
                .rev()
                .filter(|entry| entry.is_dir())
                .map(|entry| child_path(&dir, &entry.name)),
        );

        let candidates: Vec<String> = entries
            .iter()
            .filter(|entry| entry.is_file())
            .map(|entry| child_path(&dir, &entry.name))
            .collect();

        if candidates.is_empty() {
            info!("No files found in directory: {}", dir);
            continue;
        }

        let retained = filters.apply(candidates);

        let mut size = 0;
        for file in &retained {
            size += remote.size(file).await?;
        }

        info!(
            "Added {} files ({} MB) from directory: {}",
            retained.len(),
            megabytes(size),
            dir
        );

        files.extend(retained);
        total_size += size;
    }

    Ok(FileListing::new(files, total_size))
}
