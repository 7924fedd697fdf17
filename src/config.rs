//! Transfer configuration.
//!
//! A YAML document such as
//!
//! ```yaml
//! host: my.cmems-du.eu
//! source: Core/INSITU_GLO_TS_REP_OBSERVATIONS_013_001_b/CORIOLIS-GLOBAL-EasyCORA-OBS
//! target: in_situ_downloaded
//! exclude:
//!   - arctic
//!   - baltic
//! ```
//!
//! is loaded once into a [`TransferSpec`], which stays unchanged for the rest of the run.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 21;

/// What to download, from where, and where to put it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransferSpec {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(rename = "source")]
    source_root: String,
    #[serde(rename = "target", default = "default_target")]
    target_root: PathBuf,
    #[serde(default, deserialize_with = "null_as_empty")]
    exclude: Vec<String>,
    #[serde(default)]
    preserve_structure: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_target() -> PathBuf {
    PathBuf::from(".")
}

// `exclude:` with no entries is null in YAML
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl TransferSpec {
    pub fn new<H: Into<String>, S: Into<String>>(host: H, source_root: S) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            source_root: source_root.into(),
            target_root: default_target(),
            exclude: vec![],
            preserve_structure: false,
        }
    }

    pub fn from_yaml_str(document: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(document)?)
    }

    /// Reads and parses a YAML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("{}: {}", path.display(), err)))?;

        Self::from_yaml_str(&document)
    }

    #[must_use]
    pub fn with_host<T: Into<String>>(mut self, host: T) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_source<T: Into<String>>(mut self, source_root: T) -> Self {
        self.source_root = source_root.into();
        self
    }

    #[must_use]
    pub fn with_target<T: Into<PathBuf>>(mut self, target_root: T) -> Self {
        self.target_root = target_root.into();
        self
    }

    #[must_use]
    pub fn with_exclude<I, T>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.exclude = exclude.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_preserve_structure(mut self, preserve_structure: bool) -> Self {
        self.preserve_structure = preserve_structure;
        self
    }

    /// The server we would like to connect to.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The server-side directory containing data to be downloaded.
    pub fn source_root(&self) -> &str {
        &self.source_root
    }

    /// The client-side directory receiving the downloaded data.
    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    /// Directories, relative to the source root, left out of the download.
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Whether the remote directory layout is mirrored locally.
    pub fn preserve_structure(&self) -> bool {
        self.preserve_structure
    }

    /// Returns `true` if the relative directory path is listed verbatim in `exclude`.
    /// No pattern matching: `arctic` does not exclude `arctic_v2`.
    #[must_use]
    pub fn is_excluded(&self, relative_dir: &str) -> bool {
        self.exclude.iter().any(|entry| entry == relative_dir)
    }

    /// Server-side path of a listing entry
    pub fn remote_path(&self, relative: &str) -> String {
        let root = self.source_root.trim_end_matches('/');
        if root.is_empty() && !self.source_root.starts_with('/') {
            relative.to_owned()
        } else {
            format!("{root}/{relative}")
        }
    }

    /// Local path a listing entry is downloaded to.
    /// Fails with [`Error::UnsafePath`] unless `relative` is made of plain names only.
    pub fn destination(&self, relative: &str) -> Result<PathBuf> {
        let path = Path::new(relative);
        let plain = !relative.is_empty()
            && path
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !plain {
            return Err(Error::UnsafePath(relative.to_owned()));
        }

        if self.preserve_structure {
            Ok(self.target_root.join(path))
        } else {
            let name = relative.rsplit('/').next().unwrap_or(relative);
            Ok(self.target_root.join(name))
        }
    }
}
