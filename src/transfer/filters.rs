//! File filters applied during enumeration.
//!
//! A filter receives the candidate files of one remote directory, as paths relative to the
//! source root, and returns the files to keep. Filters run in registration order.

/// A boxed filter function
pub type Filter = Box<dyn Fn(Vec<String>) -> Vec<String> + Send + Sync>;

/// Ordered list of filters
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filter to the end of the chain
    pub fn push<F>(&mut self, filter: F)
    where
        F: Fn(Vec<String>) -> Vec<String> + Send + Sync + 'static,
    {
        self.filters.push(Box::new(filter));
    }

    /// Runs the candidates through every filter in order
    pub fn apply(&self, files: Vec<String>) -> Vec<String> {
        self.filters.iter().fold(files, |files, filter| filter(files))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("len", &self.filters.len())
            .finish()
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Year encoded at the end of the file stem, e.g. `GL_PR_PF_2019.nc` -> 2019
fn stem_year(path: &str) -> Option<i32> {
    let name = file_name(path);
    let stem = name.split('.').next().unwrap_or(name);
    let digits = stem.get(stem.len().checked_sub(4)?..)?;

    if digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

/// Keeps files whose stem ends in a year strictly after `year`.
/// Files without a trailing year are dropped.
pub fn year_after(year: i32) -> impl Fn(Vec<String>) -> Vec<String> + Send + Sync + 'static {
    move |files| {
        let before = files.len();
        let kept: Vec<String> = files
            .into_iter()
            .filter(|file| stem_year(file).is_some_and(|y| y > year))
            .collect();

        info!(
            "Removed {} files with date not > {}",
            before - kept.len(),
            year
        );
        kept
    }
}

/// Keeps files with the given extension, e.g. `nc` or `tar.gz`
pub fn with_extension<T: Into<String>>(
    extension: T,
) -> impl Fn(Vec<String>) -> Vec<String> + Send + Sync + 'static {
    let suffix = format!(".{}", extension.into().trim_start_matches('.'));
    move |files| {
        files
            .into_iter()
            .filter(|file| file_name(file).ends_with(&suffix))
            .collect()
    }
}
