//! Pure resolution of where a conf file lives and who owns it.
//!
//! Nothing in this module performs I/O: callers gather the inputs (run state,
//! installation record, current file ownership) and the resolvers combine
//! them with a fixed precedence expressed through [`precedence::Precedence`].
pub mod ownership;
pub mod path;
pub mod precedence;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfError;

/// Which layer of a conf directory a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Vendor defaults (`<category>/default/`).
    Default,
    /// Local customizations (`<category>/local/`).
    Local,
    /// No scope segment in the path.
    #[serde(rename = "none")]
    Unscoped,
}

impl Scope {
    /// Directory segment for this scope, if it has one.
    #[must_use]
    pub const fn segment(self) -> Option<&'static str> {
        match self {
            Self::Default => Some("default"),
            Self::Local => Some("local"),
            Self::Unscoped => None,
        }
    }

    /// Recognize a path segment that names a scope directory.
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "default" => Some(Self::Default),
            "local" => Some(Self::Local),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment().unwrap_or("none"))
    }
}

impl FromStr for Scope {
    type Err = ConfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "local" => Ok(Self::Local),
            "none" => Ok(Self::Unscoped),
            _ => Err(ConfError::UnknownScope(s.to_string())),
        }
    }
}
