use std::path::PathBuf;

/// Unified error type for the skill-router crate.
///
/// Most variants are configuration errors raised while loading the rule
/// table; see [`RouteError::is_config`]. Dispatch itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("failed to read rule file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rule config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("unsupported rule config version {0:?} (expected \"1\")")]
    UnsupportedVersion(String),

    #[error("capability {0:?} is declared more than once")]
    DuplicateCapability(String),

    #[error("rule #{index} references unknown capability {capability:?}")]
    UnknownCapability { index: usize, capability: String },

    #[error("rule #{index} for {capability:?} has an empty pattern")]
    EmptyPattern { index: usize, capability: String },

    #[error("rule #{index} for {capability:?} has an invalid pattern: {source}")]
    InvalidPattern {
        index: usize,
        capability: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule #{index} duplicates pattern {pattern:?} for {capability:?}")]
    DuplicateRule {
        index: usize,
        pattern: String,
        capability: String,
    },

    #[error("rule #{index} reuses output marker {marker:?}")]
    DuplicateMarker { index: usize, marker: String },

    #[error("rule #{index} for {capability:?} chains to {target:?}, which no rule activates")]
    UnknownChainTarget {
        index: usize,
        capability: String,
        target: String,
    },

    #[error("rule #{index} for {capability:?} fans out to an empty target list")]
    EmptyFanOut { index: usize, capability: String },

    #[error("unconditional chain cycle: {}", .0.join(" -> "))]
    ChainCycle(Vec<String>),

    #[error("no rule activates capability {0:?}")]
    NotActivatable(String),

    #[error("rule #{index} does not activate capability {capability:?}")]
    RuleMismatch { index: usize, capability: String },

    #[error("invalid debt record path component {0:?}")]
    InvalidDebtPath(String),

    #[error("failed to write debt record {path}: {source}")]
    DebtWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RouteError {
    /// True for errors raised while loading or validating the rule table.
    pub fn is_config(&self) -> bool {
        !matches!(
            self,
            RouteError::NotActivatable(_)
                | RouteError::RuleMismatch { .. }
                | RouteError::InvalidDebtPath(_)
                | RouteError::DebtWrite { .. }
                | RouteError::Io(_)
        )
    }
}

/// Result type alias using [`RouteError`].
pub type RouteResult<T> = Result<T, RouteError>;
