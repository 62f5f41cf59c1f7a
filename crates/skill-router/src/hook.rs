//! Host-facing operations behind the CLI.
//!
//! The prompt hook must never block the host, so [`dispatch_or_noop`]
//! swallows table errors. Everything else propagates them.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::debt::{DebtRecorder, FileDebtSink, MemoryDebtSink, SharedDebtSink, WrittenDebt};
use crate::directive::{Directive, DispatchResult};
use crate::dispatcher::Dispatcher;
use crate::error::RouteResult;
use crate::outcome::{resolve, Outcome, OutcomeReport, Resolution};
use crate::settings::RouterSettings;

/// Loads the table and dispatches `raw_input`. A table that fails to load
/// is logged and treated as no match.
pub fn dispatch_or_noop(settings: &RouterSettings, raw_input: &str) -> DispatchResult {
    match settings.load_table() {
        Ok(table) => Dispatcher::new(table).dispatch(raw_input),
        Err(error) => {
            tracing::error!("rule table rejected, skipping dispatch: {error}");
            DispatchResult::NoOp
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub valid: bool,
    pub rules: usize,
    pub capabilities: usize,
    pub debt_root: PathBuf,
}

pub fn validate(settings: &RouterSettings) -> RouteResult<ValidationSummary> {
    let table = settings.load_table()?;
    Ok(ValidationSummary {
        valid: true,
        rules: table.len(),
        capabilities: table.capabilities().len(),
        debt_root: settings.debt_root(&table).to_path_buf(),
    })
}

/// A host report that a capability finished.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub capability: String,
    /// Index of the rule that fired; the first rule for the capability
    /// when unset.
    pub rule: Option<usize>,
    pub outcome: Outcome,
    pub report: OutcomeReport,
    /// Keep debt records in memory instead of writing them.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutput {
    pub capability: String,
    pub rule_index: usize,
    pub outcome: Outcome,
    #[serde(flatten)]
    pub resolution: Resolution,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub next: Vec<Directive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt: Option<WrittenDebt>,
}

/// Resolves an outcome against the rule that fired, activating follow-up
/// directives or writing a debt record.
pub async fn resolve_outcome(
    settings: &RouterSettings,
    request: ResolveRequest,
) -> RouteResult<ResolveOutput> {
    let table = settings.load_table()?;
    let debt_root = settings.debt_root(&table).to_path_buf();
    let dispatcher = Dispatcher::new(table);

    let directive = dispatcher.activate_rule(&request.capability, request.rule)?;
    let resolution = resolve(&directive, request.outcome, request.report);

    let mut next = Vec::new();
    let mut debt = None;
    match &resolution {
        Resolution::Complete => {}
        Resolution::Activate { capabilities } => {
            next = capabilities
                .iter()
                .filter_map(|id| dispatcher.activate(id).into_directive())
                .collect();
        }
        Resolution::RecordDebt(debt_request) => {
            let sink: SharedDebtSink = if request.dry_run {
                Arc::new(MemoryDebtSink::new())
            } else {
                Arc::new(FileDebtSink::new(debt_root))
            };
            debt = Some(DebtRecorder::new(sink).record(debt_request.clone()).await?);
        }
    }

    Ok(ResolveOutput {
        capability: request.capability,
        rule_index: directive.rule_index,
        outcome: request.outcome,
        resolution,
        next,
        debt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouteError;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn builtin_settings(debt_root: PathBuf) -> RouterSettings {
        RouterSettings {
            debt_root: Some(debt_root),
            ..Default::default()
        }
    }

    fn failed(capability: &str, rule: Option<usize>) -> ResolveRequest {
        ResolveRequest {
            capability: capability.to_string(),
            rule,
            outcome: Outcome::Fail,
            report: OutcomeReport {
                slug: None,
                context: "reviewer found missing tools".to_string(),
            },
            dry_run: false,
        }
    }

    #[test]
    fn malformed_rule_file_degrades_to_no_op() {
        let mut file = NamedTempFile::new().expect("tempfile");
        write!(file, "{{ \"version\": \"1\", \"rules\": [").expect("write");
        let settings = RouterSettings {
            rules_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        assert_eq!(
            dispatch_or_noop(&settings, "I have a bug"),
            DispatchResult::NoOp
        );
        let err = validate(&settings).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn invalid_table_degrades_to_no_op() {
        let mut file = NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"{{ "version": "1",
                 "capabilities": [{{ "id": "a", "resource": "a.md" }}],
                 "rules": [{{ "pattern": "(bug", "capability": "a", "marker": "[a]" }}] }}"#
        )
        .expect("write");
        let settings = RouterSettings {
            rules_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        assert_eq!(dispatch_or_noop(&settings, "bug"), DispatchResult::NoOp);
        assert!(matches!(
            validate(&settings),
            Err(RouteError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn builtin_table_dispatches_and_validates() {
        let settings = RouterSettings::default();
        let result = dispatch_or_noop(&settings, r#"{"prompt":"I have a bug"}"#);
        assert_eq!(
            result.directive().map(|d| d.capability_id.as_str()),
            Some("systematic-debugging")
        );

        let summary = validate(&settings).expect("valid");
        assert!(summary.valid);
        assert!(summary.rules > 0);
    }

    #[tokio::test]
    async fn failure_follows_the_rule_that_fired() {
        let dir = tempdir().expect("tempdir");
        let settings = builtin_settings(dir.path().to_path_buf());
        let fired = dispatch_or_noop(&settings, "please review the agent definition")
            .into_directive()
            .expect("match");

        let output = resolve_outcome(&settings, failed("agent-audit", Some(fired.rule_index)))
            .await
            .expect("resolve");

        assert_eq!(output.rule_index, fired.rule_index);
        let debt = output.debt.expect("debt record");
        assert_eq!(debt.record.slug, "agent-review-failed");
        assert!(debt.path.starts_with(dir.path().join("agent-audit")));
        assert!(tokio::fs::metadata(&debt.path).await.is_ok());
    }

    #[tokio::test]
    async fn without_rule_index_the_first_rule_applies() {
        let dir = tempdir().expect("tempdir");
        let settings = builtin_settings(dir.path().to_path_buf());

        let output = resolve_outcome(&settings, failed("agent-audit", None))
            .await
            .expect("resolve");

        assert_eq!(output.rule_index, 0);
        let debt = output.debt.expect("debt record");
        assert_eq!(debt.record.slug, "agent-audit-failed");
        assert!(debt.path.starts_with(dir.path().join("agent-audit")));
    }

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let dir = tempdir().expect("tempdir");
        let settings = builtin_settings(dir.path().join("debt"));
        let mut request = failed("agent-audit", Some(0));
        request.dry_run = true;

        let output = resolve_outcome(&settings, request).await.expect("resolve");

        assert!(output.debt.is_some());
        assert!(tokio::fs::metadata(dir.path().join("debt")).await.is_err());
    }

    #[tokio::test]
    async fn pass_activates_next_capability() {
        let dir = tempdir().expect("tempdir");
        let settings = builtin_settings(dir.path().to_path_buf());
        let mut request = failed("agent-audit", Some(1));
        request.outcome = Outcome::Pass;

        let output = resolve_outcome(&settings, request).await.expect("resolve");

        assert!(output.debt.is_none());
        let next: Vec<_> = output.next.iter().map(|d| d.capability_id.as_str()).collect();
        assert_eq!(next, vec!["agent-tester"]);
    }

    #[tokio::test]
    async fn mismatched_rule_index_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let settings = builtin_settings(dir.path().to_path_buf());

        let err = resolve_outcome(&settings, failed("agent-tester", Some(1)))
            .await
            .unwrap_err();

        assert!(matches!(err, RouteError::RuleMismatch { index: 1, .. }));
        assert!(!err.is_config());
    }
}
