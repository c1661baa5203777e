use serde::{Deserialize, Serialize};

use std::fmt;

/// Synchronization state of a [`CatalogObject`](crate::CatalogObject).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
    /// Matches the service's copy
    Saved,

    /// Loaded from the service, then changed locally
    Modified,

    /// Never written to the service
    Unsaved,

    /// Deleted from the service; no further changes are accepted
    Deleted,
}

impl DocumentState {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentState::Saved => "saved",
            DocumentState::Modified => "modified",
            DocumentState::Unsaved => "unsaved",
            DocumentState::Deleted => "deleted",
        }
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}
