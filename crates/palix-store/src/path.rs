use crate::error::{StoreError, StoreResult};

/// A location inside a tree store: an ordered list of name segments.
///
/// The empty path is the store root. Segments are never empty, `.` or `..`,
/// and never contain `/`, `\` or NUL, so a `StorePath` cannot name anything
/// outside the tree it is resolved against.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a `/`-separated path. Empty and `.` segments are dropped, so
    /// `"a//b/./c/"` and `"a/b/c"` are the same path.
    pub fn parse(path: &str) -> StoreResult<Self> {
        let mut segments = Vec::new();
        for segment in path.split('/') {
            if segment.is_empty() || segment == "." {
                continue;
            }
            validate_segment(segment).map_err(|reason| StoreError::invalid_path(path, reason))?;
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Build from individual segments, validating each.
    pub fn from_segments<I, S>(segments: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        for segment in &segments {
            if segment.is_empty() {
                return Err(StoreError::invalid_path(segments.join("/"), "empty segment"));
            }
            validate_segment(segment)
                .map_err(|reason| StoreError::invalid_path(segments.join("/"), reason))?;
        }
        Ok(Self { segments })
    }

    /// Append one segment.
    pub fn join(&self, segment: &str) -> StoreResult<Self> {
        if segment.is_empty() {
            return Err(StoreError::invalid_path(segment, "empty segment"));
        }
        validate_segment(segment).map_err(|reason| StoreError::invalid_path(segment, reason))?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// Append every segment of `other`.
    pub fn concat(&self, other: &StorePath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Parent path, `None` for the root.
    pub fn parent(&self) -> Option<StorePath> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// The first `len` segments of this path.
    pub fn ancestor(&self, len: usize) -> StorePath {
        Self {
            segments: self.segments[..len.min(self.segments.len())].to_vec(),
        }
    }

    /// The path relative to `prefix`, or `None` if `prefix` is not a prefix.
    pub fn strip_prefix(&self, prefix: &StorePath) -> Option<StorePath> {
        self.segments
            .strip_prefix(prefix.segments.as_slice())
            .map(|rest| Self {
                segments: rest.to_vec(),
            })
    }

    /// Segments joined by `/`, with no leading separator.
    pub fn to_relative_string(&self) -> String {
        self.segments.join("/")
    }

    /// Every ancestor from the first segment down to the path itself.
    pub fn prefixes(&self) -> impl Iterator<Item = StorePath> + '_ {
        (1..=self.segments.len()).map(move |n| self.ancestor(n))
    }
}

impl std::fmt::Display for StorePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

fn validate_segment(segment: &str) -> Result<(), &'static str> {
    if segment == ".." {
        return Err("parent directory segment");
    }
    if segment == "." {
        return Err("current directory segment");
    }
    if segment.contains('/') {
        return Err("segment contains '/'");
    }
    if segment.contains('\\') {
        return Err("segment contains '\\'");
    }
    if segment.contains('\0') {
        return Err("segment contains NUL");
    }
    Ok(())
}
