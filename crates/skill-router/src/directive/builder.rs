use super::types::{BranchAction, BranchPayload, DebtActionPayload, Directive};
use crate::rule::{Branch, ChainDirective, Rule};

/// Build the directive for a matched rule.
///
/// Chain targets were validated when the table loaded, so this never fails.
pub fn build(rule: &Rule) -> Directive {
    let chain = &rule.chain;

    Directive {
        capability_id: rule.capability_id.clone(),
        resource_path: rule.resource_path.clone(),
        instruction: instruction(&rule.capability_id, chain),
        output_marker: rule.output_marker.clone(),
        chain: chain.kind(),
        chain_targets: chain.targets().into_iter().map(str::to_string).collect(),
        branches: branches(&rule.capability_id, chain),
        chain_directive: chain.clone(),
        rule_index: rule.index,
    }
}

fn instruction(capability_id: &str, chain: &ChainDirective) -> String {
    let head = format!("activate capability \"{capability_id}\"");
    match chain {
        ChainDirective::None => format!("{head}; no further action"),
        ChainDirective::Sequential { next } => {
            format!("{head}; after completion, activate \"{next}\"")
        }
        ChainDirective::Conditional { on_pass, on_fail } => format!(
            "{head}; on PASS → {}; on FAIL → {}",
            describe_branch(capability_id, on_pass),
            describe_branch(capability_id, on_fail)
        ),
        ChainDirective::FanOut { next } => {
            let targets: Vec<String> = next.iter().map(|id| format!("\"{id}\"")).collect();
            format!("{head}; after completion, activate all of {}", targets.join(", "))
        }
    }
}

fn describe_branch(capability_id: &str, branch: &Branch) -> String {
    match branch {
        Branch::Activate { capability } => format!("activate \"{capability}\""),
        Branch::CreateDebtRecord(action) => format!(
            "create {} debt record under \"{capability_id}\" (slug: {})",
            action.severity.as_str(),
            action.slug
        ),
    }
}

fn branches(capability_id: &str, chain: &ChainDirective) -> Option<BranchPayload> {
    match chain {
        ChainDirective::Conditional { on_pass, on_fail } => Some(BranchPayload {
            on_pass: branch_action(capability_id, on_pass),
            on_fail: branch_action(capability_id, on_fail),
        }),
        _ => None,
    }
}

fn branch_action(capability_id: &str, branch: &Branch) -> BranchAction {
    match branch {
        Branch::Activate { capability } => BranchAction::Activate(capability.clone()),
        Branch::CreateDebtRecord(action) => BranchAction::CreateDebtRecord(DebtActionPayload {
            capability_id: capability_id.to_string(),
            slug: action.slug.clone(),
            severity: action.severity,
        }),
    }
}
