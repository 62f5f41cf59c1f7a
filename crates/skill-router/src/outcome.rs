//! Outcome routing: what the host does after a capability completes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::debt::standard_checklist;
use crate::directive::Directive;
use crate::rule::{Branch, ChainDirective, FailureAction, Severity};
use crate::utils::slug::slugify;

/// Pass/fail verdict reported by the host for a completed capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => write!(f, "pass"),
            Outcome::Fail => write!(f, "fail"),
        }
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pass" | "passed" | "ok" => Ok(Outcome::Pass),
            "fail" | "failed" => Ok(Outcome::Fail),
            other => Err(format!("unknown outcome {other:?} (expected pass or fail)")),
        }
    }
}

/// Host-supplied detail accompanying an outcome.
#[derive(Debug, Clone, Default)]
pub struct OutcomeReport {
    /// Overrides the slug configured on the debt branch.
    pub slug: Option<String>,
    pub context: String,
}

/// The single next step for the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum Resolution {
    Complete,
    Activate { capabilities: Vec<String> },
    RecordDebt(DebtRequest),
}

/// A debt record the host must persist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtRequest {
    pub capability_id: String,
    pub slug: String,
    pub severity: Severity,
    pub context: String,
    pub actions: Vec<String>,
}

/// Resolve the chain of `directive` against the reported outcome.
///
/// Only conditional chains consult the outcome. A conditional chain yields
/// exactly one branch: an activation or a debt record, never both.
pub fn resolve(directive: &Directive, outcome: Outcome, report: OutcomeReport) -> Resolution {
    let resolution = match &directive.chain_directive {
        ChainDirective::None => Resolution::Complete,
        ChainDirective::Sequential { next } => Resolution::Activate {
            capabilities: vec![next.clone()],
        },
        ChainDirective::FanOut { next } => Resolution::Activate {
            capabilities: next.clone(),
        },
        ChainDirective::Conditional { on_pass, on_fail } => {
            let branch = match outcome {
                Outcome::Pass => on_pass,
                Outcome::Fail => on_fail,
            };
            match branch {
                Branch::Activate { capability } => Resolution::Activate {
                    capabilities: vec![capability.clone()],
                },
                Branch::CreateDebtRecord(action) => {
                    Resolution::RecordDebt(debt_request(&directive.capability_id, action, report))
                }
            }
        }
    };

    tracing::debug!(capability = %directive.capability_id, %outcome, ?resolution, "outcome resolved");
    resolution
}

fn debt_request(capability_id: &str, action: &FailureAction, report: OutcomeReport) -> DebtRequest {
    let slug = report.slug.as_deref().unwrap_or(&action.slug);
    let actions = if action.actions.is_empty() {
        standard_checklist(capability_id)
    } else {
        action.actions.clone()
    };

    DebtRequest {
        capability_id: capability_id.to_string(),
        slug: slugify(slug),
        severity: action.severity,
        context: report.context,
        actions,
    }
}
