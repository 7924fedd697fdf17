/// Remote files selected by one enumeration, relative to the source root.
///
/// A listing is frozen: enumerating again produces a new listing instead of updating this one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileListing {
    files: Vec<String>,
    total_size: u64,
}

impl FileListing {
    pub fn new(files: Vec<String>, total_size: u64) -> Self {
        Self { files, total_size }
    }

    /// Relative paths in download order
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Sum of the sizes reported by the server, in bytes
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.files.iter()
    }
}

impl<'a> IntoIterator for &'a FileListing {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
