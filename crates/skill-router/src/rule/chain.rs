//! Follow-on directives attached to a rule.
//!
//! Chains are hints for the host. The router validates their targets at load
//! time but never executes them; the host re-enters the dispatcher for each
//! follow-on capability.

use serde::{Deserialize, Serialize};

/// What the host should do once the activated capability completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainDirective {
    /// Terminal capability.
    #[default]
    None,
    /// Activate `next` unconditionally.
    Sequential { next: String },
    /// Follow one branch depending on the host-reported outcome.
    Conditional { on_pass: Branch, on_fail: Branch },
    /// Activate every target; the host may run them concurrently, in any order.
    #[serde(rename = "fanout", alias = "fan_out")]
    FanOut { next: Vec<String> },
}

impl ChainDirective {
    pub fn kind(&self) -> ChainKind {
        match self {
            ChainDirective::None => ChainKind::None,
            ChainDirective::Sequential { .. } => ChainKind::Sequential,
            ChainDirective::Conditional { .. } => ChainKind::Conditional,
            ChainDirective::FanOut { .. } => ChainKind::FanOut,
        }
    }

    /// Capability ids this chain may activate, in declaration order.
    ///
    /// Debt-record branches are not capabilities and are left out.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            ChainDirective::None => Vec::new(),
            ChainDirective::Sequential { next } => vec![next.as_str()],
            ChainDirective::Conditional { on_pass, on_fail } => on_pass
                .capability()
                .into_iter()
                .chain(on_fail.capability())
                .collect(),
            ChainDirective::FanOut { next } => next.iter().map(String::as_str).collect(),
        }
    }

    /// Targets the host activates regardless of any outcome.
    pub fn unconditional_targets(&self) -> Vec<&str> {
        match self {
            ChainDirective::Sequential { .. } | ChainDirective::FanOut { .. } => self.targets(),
            ChainDirective::None | ChainDirective::Conditional { .. } => Vec::new(),
        }
    }
}

/// One side of a conditional chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Branch {
    Activate { capability: String },
    CreateDebtRecord(FailureAction),
}

impl Branch {
    pub fn capability(&self) -> Option<&str> {
        match self {
            Branch::Activate { capability } => Some(capability),
            Branch::CreateDebtRecord(_) => None,
        }
    }
}

/// Instruction for the host to persist a debt record.
///
/// The record is namespaced by the capability of the rule that owns the
/// chain, so the capability id is not repeated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureAction {
    #[serde(default = "default_slug")]
    pub slug: String,
    #[serde(default)]
    pub severity: Severity,
    /// Follow-up checklist; empty means the standard checklist.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
}

fn default_slug() -> String {
    "failure".to_string()
}

impl Default for FailureAction {
    fn default() -> Self {
        Self {
            slug: default_slug(),
            severity: Severity::default(),
            actions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Wire name of a chain directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainKind {
    None,
    Sequential,
    Conditional,
    #[serde(rename = "fanout")]
    FanOut,
}

impl ChainKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChainKind::None => "none",
            ChainKind::Sequential => "sequential",
            ChainKind::Conditional => "conditional",
            ChainKind::FanOut => "fanout",
        }
    }
}
