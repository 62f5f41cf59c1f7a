use crate::rule::{Rule, RuleTable};

/// First-match-wins matcher over an ordered rule table.
///
/// Rule order is part of the contract: table authors list specific triggers
/// before general ones, and no scoring step reorders them.
pub struct Matcher<'a> {
    table: &'a RuleTable,
}

impl<'a> Matcher<'a> {
    pub fn new(table: &'a RuleTable) -> Self {
        Self { table }
    }

    /// Return the first rule whose pattern matches, scanning in declaration
    /// order and stopping at the first hit.
    pub fn first_match(&self, normalized_text: &str) -> Option<&'a Rule> {
        if normalized_text.is_empty() {
            return None;
        }
        self.table.rules().iter().find(|rule| rule.is_match(normalized_text))
    }

    /// Every matching rule in table order. Diagnostic only.
    pub fn all_matches(&self, normalized_text: &str) -> Vec<&'a Rule> {
        if normalized_text.is_empty() {
            return Vec::new();
        }
        self.table
            .rules()
            .iter()
            .filter(|rule| rule.is_match(normalized_text))
            .collect()
    }
}
