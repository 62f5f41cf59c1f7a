use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::capability::Capability;
use crate::error::{RouteError, RouteResult};
use crate::rule::chain::{ChainDirective, ChainKind};
use crate::rule::config::{RuleConfig, RULE_CONFIG_VERSION};

/// A validated rule: compiled pattern, capability, chain, and marker.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Position in the table, starting at 0.
    pub index: usize,
    pub pattern: Regex,
    pub capability_id: String,
    /// Resolved from the capability catalog.
    pub resource_path: String,
    pub chain: ChainDirective,
    /// Display-only token; never a control-flow key.
    pub output_marker: String,
}

impl Rule {
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn summary(&self) -> RuleSummary<'_> {
        RuleSummary {
            index: self.index,
            capability_id: &self.capability_id,
            pattern: self.pattern.as_str(),
            output_marker: &self.output_marker,
            chain: self.chain.kind(),
        }
    }
}

/// Serializable view of a rule for diagnostics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSummary<'a> {
    pub index: usize,
    pub capability_id: &'a str,
    pub pattern: &'a str,
    pub output_marker: &'a str,
    pub chain: ChainKind,
}

/// Ordered, immutable rule table. Only constructed through validation, so
/// every `RuleTable` value satisfies the load-time invariants.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
    capabilities: Vec<Capability>,
    debt_root: PathBuf,
}

impl RuleTable {
    /// Validate the builtin configuration.
    pub fn builtin() -> RouteResult<Self> {
        Self::from_config(RuleConfig::builtin()?)
    }

    pub fn load(path: &Path) -> RouteResult<Self> {
        Self::from_config(RuleConfig::load(path)?)
    }

    pub fn from_config(config: RuleConfig) -> RouteResult<Self> {
        if config.version != RULE_CONFIG_VERSION {
            return Err(RouteError::UnsupportedVersion(config.version));
        }

        let mut catalog: HashMap<&str, &Capability> = HashMap::new();
        for capability in &config.capabilities {
            if catalog.insert(capability.id.as_str(), capability).is_some() {
                return Err(RouteError::DuplicateCapability(capability.id.clone()));
            }
        }

        let mut rules = Vec::with_capacity(config.rules.len());
        let mut seen_pairs: HashSet<(String, &str)> = HashSet::new();
        let mut seen_markers: HashSet<&str> = HashSet::new();

        for (index, spec) in config.rules.iter().enumerate() {
            let capability = catalog.get(spec.capability.as_str()).ok_or_else(|| {
                RouteError::UnknownCapability {
                    index,
                    capability: spec.capability.clone(),
                }
            })?;

            let source = spec.pattern.trim();
            if source.is_empty() {
                return Err(RouteError::EmptyPattern {
                    index,
                    capability: spec.capability.clone(),
                });
            }

            let pattern = RegexBuilder::new(source)
                .case_insensitive(true)
                .build()
                .map_err(|source| RouteError::InvalidPattern {
                    index,
                    capability: spec.capability.clone(),
                    source,
                })?;

            if !seen_pairs.insert((fold_pattern(source), spec.capability.as_str())) {
                return Err(RouteError::DuplicateRule {
                    index,
                    pattern: source.to_string(),
                    capability: spec.capability.clone(),
                });
            }

            if !seen_markers.insert(spec.marker.as_str()) {
                return Err(RouteError::DuplicateMarker {
                    index,
                    marker: spec.marker.clone(),
                });
            }

            rules.push(Rule {
                index,
                pattern,
                capability_id: spec.capability.clone(),
                resource_path: capability.resource.clone(),
                chain: spec.chain.clone(),
                output_marker: spec.marker.clone(),
            });
        }

        check_chain_targets(&rules)?;

        if let Some(cycle) = find_unconditional_cycle(&rules) {
            return Err(RouteError::ChainCycle(cycle));
        }

        let reachable: HashSet<&str> = rules.iter().map(|r| r.capability_id.as_str()).collect();
        for capability in &config.capabilities {
            if !reachable.contains(capability.id.as_str()) {
                tracing::warn!(capability = %capability.id, "capability has no rule and can never be activated");
            }
        }

        tracing::debug!(rules = rules.len(), capabilities = config.capabilities.len(), "rule table loaded");

        Ok(Self {
            rules,
            capabilities: config.capabilities,
            debt_root: config.debt_root,
        })
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn capability(&self, id: &str) -> Option<&Capability> {
        self.capabilities.iter().find(|c| c.id == id)
    }

    /// Rule at table position `index`.
    pub fn rule(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    /// First rule in table order that activates `capability_id`.
    pub fn first_rule_for(&self, capability_id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.capability_id == capability_id)
    }

    pub fn debt_root(&self) -> &Path {
        &self.debt_root
    }
}

/// Case-folds the literal parts of a pattern so sources that compile to the
/// `\d` and `\D` are different classes.
/// `\\d` and `\\D` are different classes.
fn fold_pattern(source: &str) -> String {
    let mut folded = String::with_capacity(source.len());
    let mut escaped = false;
    for ch in source.chars() {
        if escaped {
            folded.push(ch);
            escaped = false;
        } else {
            escaped = ch == '\\';
            folded.extend(ch.to_lowercase());
        }
    }
    folded
}

fn check_chain_targets(rules: &[Rule]) -> RouteResult<()> {
    let activatable: HashSet<&str> = rules.iter().map(|r| r.capability_id.as_str()).collect();

    for rule in rules {
        if let ChainDirective::FanOut { next } = &rule.chain {
            if next.is_empty() {
                return Err(RouteError::EmptyFanOut {
                    index: rule.index,
                    capability: rule.capability_id.clone(),
                });
            }
        }

        if let Some(target) = rule
            .chain
            .targets()
            .into_iter()
            .find(|target| !activatable.contains(target))
        {
            return Err(RouteError::UnknownChainTarget {
                index: rule.index,
                capability: rule.capability_id.clone(),
                target: target.to_string(),
            });
        }
    }

    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Active,
    Done,
}

/// Depth-first search over sequential/fan-out edges between capabilities.
/// Returns the first cycle found, closed on its starting capability.
fn find_unconditional_cycle(rules: &[Rule]) -> Option<Vec<String>> {
    let mut edges: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for rule in rules {
        edges
            .entry(rule.capability_id.as_str())
            .or_default()
            .extend(rule.chain.unconditional_targets());
    }

    let mut state = HashMap::new();
    let mut stack = Vec::new();
    edges
        .keys()
        .find_map(|start| visit(*start, &edges, &mut state, &mut stack))
}

fn visit<'a>(
    node: &'a str,
    edges: &BTreeMap<&'a str, Vec<&'a str>>,
    state: &mut HashMap<&'a str, Visit>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    match state.get(node) {
        Some(Visit::Done) => return None,
        Some(Visit::Active) => {
            let start = stack.iter().position(|n| *n == node)?;
            let mut cycle: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(node.to_string());
            return Some(cycle);
        }
        None => {}
    }

    state.insert(node, Visit::Active);
    stack.push(node);
    if let Some(targets) = edges.get(node) {
        for target in targets {
            if let Some(cycle) = visit(*target, edges, state, stack) {
                return Some(cycle);
            }
        }
    }
    stack.pop();
    state.insert(node, Visit::Done);
    None
}
