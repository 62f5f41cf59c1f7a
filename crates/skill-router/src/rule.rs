//! The declarative rule table: configuration model, chains, and validation.

pub mod chain;
pub mod config;
pub mod table;

pub use chain::{Branch, ChainDirective, ChainKind, FailureAction, Severity};
pub use config::{RuleConfig, RuleSpec, RULE_CONFIG_VERSION};
pub use table::{Rule, RuleSummary, RuleTable};
