use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::capability::Capability;
use crate::error::{RouteError, RouteResult};
use crate::rule::chain::ChainDirective;

pub const RULE_CONFIG_VERSION: &str = "1";
pub const DEFAULT_DEBT_ROOT: &str = ".claude/debt";

const BUILTIN_RULES: &str = include_str!("../../rules/builtin.json");

/// Static rule configuration as it appears on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub version: String,
    #[serde(default = "default_debt_root")]
    pub debt_root: PathBuf,
    pub capabilities: Vec<Capability>,
    pub rules: Vec<RuleSpec>,
}

/// One unvalidated rule. Order in [`RuleConfig::rules`] is significant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,
    pub capability: String,
    pub marker: String,
    #[serde(default)]
    pub chain: ChainDirective,
}

fn default_debt_root() -> PathBuf {
    PathBuf::from(DEFAULT_DEBT_ROOT)
}

impl RuleConfig {
    /// The table compiled into the binary.
    pub fn builtin() -> RouteResult<Self> {
        Self::from_json(BUILTIN_RULES)
    }

    pub fn from_json(text: &str) -> RouteResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> RouteResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| RouteError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}
