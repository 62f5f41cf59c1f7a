//! Runtime settings resolved from CLI flags and environment.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::RouteResult;
use crate::rule::RuleTable;

pub const RULES_ENV: &str = "SKILL_ROUTER_RULES";
pub const DEBT_ROOT_ENV: &str = "SKILL_ROUTER_DEBT_ROOT";
pub const LOG_ENV: &str = "SKILL_ROUTER_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            other => Err(format!("unknown output format {other:?} (expected json or text)")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouterSettings {
    /// Rule file; the builtin table when unset.
    pub rules_path: Option<PathBuf>,
    /// Overrides the debt root declared by the rule table.
    pub debt_root: Option<PathBuf>,
    pub format: OutputFormat,
}

impl RouterSettings {
    pub fn load_table(&self) -> RouteResult<RuleTable> {
        match &self.rules_path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading rule file");
                RuleTable::load(path)
            }
            None => RuleTable::builtin(),
        }
    }

    pub fn debt_root<'a>(&'a self, table: &'a RuleTable) -> &'a Path {
        self.debt_root.as_deref().unwrap_or_else(|| table.debt_root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::config::DEFAULT_DEBT_ROOT;

    #[test]
    fn defaults_to_builtin_table() {
        let settings = RouterSettings::default();
        let table = settings.load_table().expect("builtin");
        assert!(!table.is_empty());
        assert_eq!(settings.debt_root(&table), Path::new(DEFAULT_DEBT_ROOT));
    }

    #[test]
    fn debt_root_override_wins() {
        let settings = RouterSettings {
            debt_root: Some(PathBuf::from("/tmp/debt")),
            ..Default::default()
        };
        let table = settings.load_table().unwrap();
        assert_eq!(settings.debt_root(&table), Path::new("/tmp/debt"));
    }

    #[test]
    fn missing_rule_file_is_an_error() {
        let settings = RouterSettings {
            rules_path: Some(PathBuf::from("/definitely/not/here.json")),
            ..Default::default()
        };
        assert!(settings.load_table().is_err());
    }

    #[test]
    fn parses_output_format() {
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
