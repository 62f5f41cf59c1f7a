use std::sync::Arc;

use crate::directive::{self, Directive, DispatchResult};
use crate::error::{RouteError, RouteResult};
use crate::input;
use crate::routing::Matcher;
use crate::rule::{Rule, RuleTable};

/// Stateless entry point: prompt in, directive or no-op out.
///
/// Cloning is cheap and clones share the same immutable table, so one
/// dispatcher may serve concurrent callers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: Arc<RuleTable>,
}

impl Dispatcher {
    pub fn new(table: RuleTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn from_shared(table: Arc<RuleTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Normalize, match, and build. Never fails; no match yields
    /// [`DispatchResult::NoOp`].
    pub fn dispatch(&self, raw_input: &str) -> DispatchResult {
        let input = input::normalize(raw_input);
        if input.is_empty() {
            tracing::debug!(source = ?input.source, "empty prompt, nothing to dispatch");
            return DispatchResult::NoOp;
        }

        match Matcher::new(&self.table).first_match(&input.normalized_text) {
            Some(rule) => {
                tracing::debug!(
                    rule = rule.index,
                    capability = %rule.capability_id,
                    marker = %rule.output_marker,
                    "rule matched"
                );
                DispatchResult::Directive(directive::build(rule))
            }
            None => {
                tracing::debug!(source = ?input.source, "no rule matched");
                DispatchResult::NoOp
            }
        }
    }

    /// Directive for a chained capability, taken from the first rule that
    /// activates it. Unknown ids yield [`DispatchResult::NoOp`].
    pub fn activate(&self, capability_id: &str) -> DispatchResult {
        match self.table.first_rule_for(capability_id) {
            Some(rule) => DispatchResult::Directive(directive::build(rule)),
            None => {
                tracing::warn!(capability = %capability_id, "activation requested for unknown capability");
                DispatchResult::NoOp
            }
        }
    }

    /// Directive of the rule at `index`, which must activate `capability_id`.
    /// Without an index this falls back to [`Dispatcher::activate`].
    pub fn activate_rule(
        &self,
        capability_id: &str,
        index: Option<usize>,
    ) -> RouteResult<Directive> {
        let rule = match index {
            Some(index) => self
                .table
                .rule(index)
                .filter(|rule| rule.capability_id == capability_id)
                .ok_or_else(|| RouteError::RuleMismatch {
                    index,
                    capability: capability_id.to_string(),
                })?,
            None => self
                .table
                .first_rule_for(capability_id)
                .ok_or_else(|| RouteError::NotActivatable(capability_id.to_string()))?,
        };
        Ok(directive::build(rule))
    }

    /// Every rule the input would match, in table order.
    pub fn explain(&self, raw_input: &str) -> Vec<&Rule> {
        let input = input::normalize(raw_input);
        Matcher::new(&self.table).all_matches(&input.normalized_text)
    }
}
