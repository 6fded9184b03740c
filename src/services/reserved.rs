//! Reserved exporter name guard.
//!
//! The monitoring service renders its own `prometheus` exporter into the
//! collector configuration. A user exporter with the same name would replace
//! or duplicate that block, so such names are refused up front.

use crate::{Error, Result};

/// Exporter names owned by the monitoring service.
pub const RESERVED_EXPORTER_NAMES: &[&str] = &["prometheus"];

/// An immutable set of reserved exporter names.
///
/// Matching is exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedNames {
    names: &'static [&'static str],
}

impl ReservedNames {
    /// The names reserved by the monitoring service itself.
    #[must_use]
    pub const fn system() -> Self {
        Self {
            names: RESERVED_EXPORTER_NAMES,
        }
    }

    /// Creates a guard over an explicit name set.
    #[must_use]
    pub const fn from_static(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    /// Returns true if `name` is reserved.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name)
    }

    /// Fails with [`Error::ReservedName`] if `name` is reserved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedName`] when the name is in the reserved set.
    pub fn check(&self, name: &str) -> Result<()> {
        if self.contains(name) {
            return Err(Error::ReservedName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Iterates over the reserved names.
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.names.iter().copied()
    }
}

impl Default for ReservedNames {
    fn default() -> Self {
        Self::system()
    }
}
