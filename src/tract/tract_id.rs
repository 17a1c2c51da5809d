use std::fmt;
use std::sync::Arc;

/// Stable key for a census tract.
/// Keeps the original GEOID text (with leading zeros) but avoids repeated owned Strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TractId(Arc<str>);

impl TractId {
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    /// The GEOID text.
    #[inline] pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for TractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TractId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
