//! FTP harvester.
//!
//! Downloads every file below a remote directory that is not yet present locally.
//! Credentials come from the `FTP_USER` and `FTP_PASS` environment variables.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn, LevelFilter};

use ftp_harvest::{
    transfer::filters::{with_extension, year_after},
    Downloader, Endpoint, Error, TransferSpec,
};

/// Download observation archives from an FTP server.
///
/// Settings are read from the YAML file given with --config; command line flags override them.
#[derive(Parser, Debug)]
#[command(name = "ftp-harvest")]
#[command(version)]
struct Cli {
    /// YAML file with host, source, target and exclude keys.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address of the remote server.
    #[arg(long)]
    host: Option<String>,

    /// Port of the remote server.
    #[arg(long)]
    port: Option<u16>,

    /// Server-side directory containing the data.
    #[arg(long)]
    source: Option<String>,

    /// Local directory receiving the data.
    #[arg(long)]
    target: Option<PathBuf>,

    /// Directories, relative to the source, to leave out. Replaces the configured list.
    #[arg(long, num_args = 1..)]
    exclude: Option<Vec<String>>,

    /// Mirror the remote directory layout instead of putting every file in the target.
    #[arg(long)]
    preserve_structure: bool,

    /// Only keep files whose name ends in a year after this one.
    #[arg(long, value_name = "YEAR")]
    after_year: Option<i32>,

    /// Only keep files with this extension.
    #[arg(long, value_name = "EXT")]
    extension: Option<String>,

    /// List what would be downloaded and stop.
    #[arg(long)]
    dry_run: bool,

    /// Log files that already exist locally and carry on instead of stopping.
    #[arg(long)]
    keep_going: bool,
}

impl Cli {
    fn transfer_spec(&self) -> anyhow::Result<TransferSpec> {
        let mut spec = match &self.config {
            Some(path) => TransferSpec::load(path)?,
            None => TransferSpec::new(
                self.host.clone().context("--host is required without --config")?,
                self.source
                    .clone()
                    .context("--source is required without --config")?,
            ),
        };

        if let Some(host) = &self.host {
            spec = spec.with_host(host.as_str());
        }
        if let Some(port) = self.port {
            spec = spec.with_port(port);
        }
        if let Some(source) = &self.source {
            spec = spec.with_source(source.as_str());
        }
        if let Some(target) = &self.target {
            spec = spec.with_target(target.as_path());
        }
        if let Some(exclude) = &self.exclude {
            spec = spec.with_exclude(exclude.iter().map(String::as_str));
        }
        if self.preserve_structure {
            spec = spec.with_preserve_structure(true);
        }

        Ok(spec)
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let spec = cli.transfer_spec()?;
    let endpoint = Endpoint::from_spec(&spec);
    let mut downloader = Downloader::new(spec, endpoint);

    if let Some(year) = cli.after_year {
        downloader.register_filter(year_after(year));
    }
    if let Some(extension) = &cli.extension {
        downloader.register_filter(with_extension(extension.as_str()));
    }

    downloader.check_credentials().await?;
    let listing = downloader.dry_run().await?;
    if cli.dry_run {
        for file in listing {
            println!("{file}");
        }
        return Ok(());
    }

    let mut downloaded = 0;
    let mut skipped = 0;
    while let Some(result) = downloader.next().await {
        match result {
            Ok(path) => {
                downloaded += 1;
                info!("Downloaded {}", path.display());
            }
            Err(err @ Error::DestinationExists(_)) if cli.keep_going => {
                skipped += 1;
                warn!("{}", err);
            }
            Err(err) => return Err(err.into()),
        }
    }

    info!("Finished: {} downloaded, {} skipped", downloaded, skipped);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error!("{:#}", err);
        std::process::exit(1);
    }
}
