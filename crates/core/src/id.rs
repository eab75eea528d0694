//! Identifier for an optimization run.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Identifies one `optimize()` call in logs and responses.
///
/// Serializes as the bare ULID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Ulid);

impl RunId {
    /// Generate a fresh, time-ordered id.
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_string() {
        let id = RunId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json.as_str().map(str::len), Some(26));
        assert_eq!(json.as_str(), Some(id.to_string().as_str()));

        let back: RunId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
        assert_ne!(RunId::new(), id);
    }
}
