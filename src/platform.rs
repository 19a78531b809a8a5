//! Platform family detection.
use std::fmt;

/// Operating system family.  Only the Windows/non-Windows split matters for
/// install locations and file ownership, so every Unix is `Linux`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux and other Unix-like systems.
    Linux,
    /// Microsoft Windows.
    Windows,
}

impl Os {
    /// Detect the family of the running system.
    #[must_use]
    pub const fn detect() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            // Default to Linux for other Unix-like systems
            Self::Linux
        }
    }

    /// Returns `true` for [`Os::Windows`].
    #[must_use]
    pub const fn is_windows(self) -> bool {
        matches!(self, Self::Windows)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Windows => write!(f, "windows"),
        }
    }
}
