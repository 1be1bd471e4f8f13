use std::fmt;

/// Platform username compared without regard to case. Both platforms treat
/// `Magnus` and `magnus` as the same account.
#[derive(Clone, Debug)]
pub struct CaseInsensitiveString {
    original: String,
    folded: String,
}

impl CaseInsensitiveString {
    pub fn as_str(&self) -> &str {
        &self.original
    }

    pub fn matches(&self, other: &str) -> bool {
        self.folded == other.to_lowercase()
    }
}

impl From<&str> for CaseInsensitiveString {
    fn from(s: &str) -> Self {
        Self {
            original: s.to_string(),
            folded: s.to_lowercase(),
        }
    }
}

impl PartialEq for CaseInsensitiveString {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for CaseInsensitiveString {}

impl PartialEq<str> for CaseInsensitiveString {
    fn eq(&self, other: &str) -> bool {
        self.matches(other)
    }
}

impl PartialEq<&str> for CaseInsensitiveString {
    fn eq(&self, other: &&str) -> bool {
        self.matches(other)
    }
}

impl fmt::Display for CaseInsensitiveString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}
