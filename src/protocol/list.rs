/// Kind of a remote directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Links, devices and anything else the walker does not follow
    Other,
}

/// One line of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
}

impl DirEntry {
    pub fn file<T: Into<String>>(name: T, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size: Some(size),
        }
    }

    pub fn directory<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size: None,
        }
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Returns `true` for a single path segment: not empty, not `.` or `..`, no separator.
#[must_use]
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}

/// Parses the body of a `LIST` response in Unix `ls -l` format.
/// Lines that cannot be understood are dropped, and so are entries whose name is not a
/// plain path segment.
pub fn parse_list(body: &str) -> Vec<DirEntry> {
    body.lines()
        .filter_map(parse_line)
        .filter(|entry| is_plain_name(&entry.name))
        .collect()
}

fn parse_line(line: &str) -> Option<DirEntry> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with("total ") {
        return None;
    }

    let kind = match line.chars().next()? {
        'd' => EntryKind::Directory,
        '-' => EntryKind::File,
        _ => EntryKind::Other,
    };

    // perms links owner group size month day time name; some servers omit the group
    let (size, name) = split_fields(line, 8)
        .and_then(|(fields, name)| Some((fields[4].parse::<u64>().ok()?, name)))
        .or_else(|| {
            split_fields(line, 7)
                .and_then(|(fields, name)| Some((fields[3].parse::<u64>().ok()?, name)))
        })?;

    Some(DirEntry {
        name: name.to_owned(),
        kind,
        size: (kind == EntryKind::File).then_some(size),
    })
}

fn split_fields(line: &str, count: usize) -> Option<(Vec<&str>, &str)> {
    let mut fields = Vec::with_capacity(count);
    let mut rest = line;

    for _ in 0..count {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace)?;
        fields.push(&rest[..end]);
        rest = &rest[end..];
    }

    // exactly one separator before the name, names may start with spaces
    let name = rest.strip_prefix(' ').unwrap_or(rest);
    if name.is_empty() {
        None
    } else {
        Some((fields, name))
    }
}
