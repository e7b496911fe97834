use std::str::FromStr;
use serde::Deserialize;

/// What happens to a directory's previously recorded imports when it is
/// scanned again.
///
/// - `Keep`: edges only accumulate; an import that disappears from the
///   source stays in the graph (default).
/// - `Prune`: the directory's outgoing edges, and their mirrored dependents
///   entries, are replaced by exactly what the latest scan found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleEdgePolicy {
    Keep,
    Prune,
}

impl Default for StaleEdgePolicy {
    fn default() -> Self {
        StaleEdgePolicy::Keep
    }
}

impl FromStr for StaleEdgePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keep" => Ok(StaleEdgePolicy::Keep),
            "prune" => Ok(StaleEdgePolicy::Prune),
            other => Err(format!(
                "invalid stale_edges: {other} (expected \"keep\" or \"prune\")"
            )),
        }
    }
}

/// Priority class of a build request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// The package whose own source changed.
    Direct,
    /// A package importing a changed package.
    Implied,
}

/// A request to build one package.
///
/// Carries nothing beyond the package path; asking twice for the same
/// package is the same as asking once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildRequest {
    pub package: String,
    pub kind: RequestKind,
}

impl BuildRequest {
    pub fn direct(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            kind: RequestKind::Direct,
        }
    }

    pub fn implied(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            kind: RequestKind::Implied,
        }
    }
}
