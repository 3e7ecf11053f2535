//! Component identity.
//!
//! A component is identified by its `(name, version)` pair. Within a
//! single expansion plan there is at most one recipe per identifier; the
//! planner enforces this during its scan pass.

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

/// Unique identity of a component within a deployment: name plus exact
/// semantic version.
///
/// Ordering is lexicographic by `(name, version)`, which is what gives
/// expansion plans their deterministic, reproducible ordering.
///
/// # Examples
///
/// ```
/// use reforge::core::ComponentIdentifier;
///
/// let id = ComponentIdentifier::new("LoggerA", "1.0.0".parse().unwrap());
/// assert_eq!(id.to_string(), "LoggerA-1.0.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentIdentifier {
    /// Component name.
    pub name: String,
    /// Exact component version.
    pub version: Version,
}

impl ComponentIdentifier {
    /// Create an identifier from a name and an exact version.
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for ComponentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}
