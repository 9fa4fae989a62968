// Node references as accepted at the API boundary.
//
// `"51"` and `"c51"` name a chapter by its global index; anything else is a path.

use std::fmt;

use super::grammar;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// A chapter's book-wide index.
    GlobalIndex(u32),
    /// A normalized path (not yet checked against any store).
    Path(String),
}

impl Reference {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix('c').unwrap_or(trimmed);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = digits.parse() {
                return Self::GlobalIndex(index);
            }
        }
        Self::Path(grammar::normalize(trimmed))
    }

    pub fn as_path(&self) -> Option<&str> {
        match self {
            Self::Path(path) => Some(path),
            Self::GlobalIndex(_) => None,
        }
    }
}

impl From<&str> for Reference {
    fn from(input: &str) -> Self {
        Self::parse(input)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GlobalIndex(index) => write!(f, "c{index}"),
            Self::Path(path) => f.write_str(path),
        }
    }
}
