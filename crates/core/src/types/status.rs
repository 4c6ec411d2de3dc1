//! Status enums.

use serde::{Deserialize, Serialize};

/// Outcome of the most recent catalog fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    /// A fetch is in flight.
    #[default]
    Loading,
    /// The last fetch delivered a product list.
    Success,
    /// The last fetch failed; the visitor can retry by reloading.
    Error,
}

impl LoadStatus {
    /// Returns the lowercase label used in markup and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
