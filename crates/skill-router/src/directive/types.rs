use serde::Serialize;

use crate::rule::{ChainDirective, ChainKind, Severity};

/// What the host should activate, where to read it, and what comes next.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Directive {
    pub capability_id: String,
    /// Forwarded untouched; the router never opens it.
    pub resource_path: String,
    pub instruction: String,
    pub output_marker: String,
    pub chain: ChainKind,
    /// Capability ids the chain may activate. Empty for `none`.
    pub chain_targets: Vec<String>,
    /// Present only for conditional chains.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<BranchPayload>,
    /// Typed chain, consumed by the outcome router.
    #[serde(skip)]
    pub chain_directive: ChainDirective,
    /// Index of the rule that fired. Hosts pass it back when reporting an
    /// outcome so the chain of this exact rule is followed.
    pub rule_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchPayload {
    pub on_pass: BranchAction,
    pub on_fail: BranchAction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BranchAction {
    Activate(String),
    CreateDebtRecord(DebtActionPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtActionPayload {
    pub capability_id: String,
    pub slug: String,
    pub severity: Severity,
}

/// Outcome of one dispatch call. No match is an ordinary result, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchResult {
    Directive(Directive),
    NoOp,
}

impl DispatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, DispatchResult::Directive(_))
    }

    pub fn directive(&self) -> Option<&Directive> {
        match self {
            DispatchResult::Directive(directive) => Some(directive),
            DispatchResult::NoOp => None,
        }
    }

    pub fn into_directive(self) -> Option<Directive> {
        match self {
            DispatchResult::Directive(directive) => Some(directive),
            DispatchResult::NoOp => None,
        }
    }

    /// Wire form: `{"matched": false}` or `{"matched": true, ...directive}`.
    pub fn payload(&self) -> DispatchPayload<'_> {
        DispatchPayload {
            matched: self.is_match(),
            directive: self.directive(),
        }
    }

    /// Plain-text form for hosts that inject stdout into their context.
    /// Empty when nothing matched.
    pub fn render_text(&self) -> String {
        match self {
            DispatchResult::Directive(d) => format!(
                "{} {}\nRead {}\n{}\n",
                d.output_marker, d.capability_id, d.resource_path, d.instruction
            ),
            DispatchResult::NoOp => String::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DispatchPayload<'a> {
    pub matched: bool,
    #[serde(flatten)]
    pub directive: Option<&'a Directive>,
}
