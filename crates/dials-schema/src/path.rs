//! Dotted paths addressing leaves and folders within a mounted schema.

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// Separator placed between folder names and the leaf name in a path.
pub const SEPARATOR: char = '.';

/// A dotted key such as `camera.fov`.
///
/// Paths are formed by joining ancestor folder names and the leaf name with
/// [`SEPARATOR`]. Because names never contain the separator, every segment of
/// a path is exactly one authored name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(String);

impl Path {
    /// The empty path, addressing the implicit root folder.
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// True for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Append one name to this path.
    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}{}{}", self.0, SEPARATOR, name))
        }
    }

    /// The final segment: the authored name of the leaf or folder.
    pub fn leaf_name(&self) -> &str {
        self.0
            .rsplit_once(SEPARATOR)
            .map_or(self.0.as_str(), |(_, name)| name)
    }

    /// The enclosing folder path, or `None` for root and top-level names.
    pub fn parent(&self) -> Option<Self> {
        self.0
            .rsplit_once(SEPARATOR)
            .map(|(parent, _)| Self(parent.to_string()))
    }

    /// Iterate over the path's segments from outermost to innermost.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Number of segments (root = 0).
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// True when `self` lies strictly inside the folder at `folder`.
    pub fn is_within(&self, folder: &Self) -> bool {
        if folder.is_root() {
            return !self.is_root();
        }
        self.0.len() > folder.0.len()
            && self.0.starts_with(folder.0.as_str())
            && self.0[folder.0.len()..].starts_with(SEPARATOR)
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Path {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Path {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for Path {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
