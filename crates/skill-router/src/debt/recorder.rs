use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use super::{DebtRecord, SharedDebtSink};
use crate::error::RouteResult;
use crate::outcome::DebtRequest;
use crate::utils::time::now_utc;

/// Turns debt requests into stamped records and hands them to a sink.
#[derive(Clone)]
pub struct DebtRecorder {
    sink: SharedDebtSink,
}

/// A record together with where it was stored.
#[derive(Debug, Clone, Serialize)]
pub struct WrittenDebt {
    pub path: PathBuf,
    pub record: DebtRecord,
}

impl DebtRecorder {
    pub fn new(sink: SharedDebtSink) -> Self {
        Self { sink }
    }

    pub async fn record(&self, request: DebtRequest) -> RouteResult<WrittenDebt> {
        self.record_at(request, now_utc()).await
    }

    pub async fn record_at(
        &self,
        request: DebtRequest,
        created_at: DateTime<Utc>,
    ) -> RouteResult<WrittenDebt> {
        let record = DebtRecord::from_request(request, created_at);
        let path = self.sink.write(&record).await?;
        Ok(WrittenDebt { path, record })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::{FileDebtSink, MemoryDebtSink};
    use crate::directive;
    use crate::outcome::{resolve, Outcome, OutcomeReport, Resolution};
    use crate::rule::{RuleConfig, RuleTable};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn audit_table() -> RuleTable {
        let config: RuleConfig = serde_json::from_value(json!({
            "version": "1",
            "capabilities": [
                { "id": "agent-audit", "resource": "skills/agent-audit/SKILL.md" },
                { "id": "agent-tester", "resource": "skills/agent-tester/SKILL.md" }
            ],
            "rules": [
                { "pattern": "audit", "capability": "agent-audit", "marker": "[audit]",
                  "chain": {
                      "kind": "conditional",
                      "on_pass": { "action": "activate", "capability": "agent-tester" },
                      "on_fail": { "action": "create_debt_record", "slug": "audit-failed" }
                  } },
                { "pattern": "tester", "capability": "agent-tester", "marker": "[tester]" }
            ]
        }))
        .unwrap();
        RuleTable::from_config(config).unwrap()
    }

    #[tokio::test]
    async fn failed_audit_writes_under_capability_namespace() {
        let dir = tempdir().expect("tempdir");
        let table = audit_table();
        let directive = directive::build(&table.rules()[0]);

        let resolution = resolve(
            &directive,
            Outcome::Fail,
            OutcomeReport {
                slug: None,
                context: "missing tools".to_string(),
            },
        );
        let request = match resolution {
            Resolution::RecordDebt(request) => request,
            other => panic!("fail must record debt, got {other:?}"),
        };

        let recorder = DebtRecorder::new(Arc::new(FileDebtSink::new(dir.path().to_path_buf())));
        let written = recorder.record(request).await.expect("record");

        assert!(written.path.starts_with(dir.path().join("agent-audit")));
        assert!(written
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with("-audit-failed.md")));
        assert_eq!(written.record.capability_id, "agent-audit");
        assert!(tokio::fs::metadata(&written.path).await.is_ok());
    }

    #[tokio::test]
    async fn record_at_uses_given_timestamp() {
        let sink = Arc::new(MemoryDebtSink::new());
        let recorder = DebtRecorder::new(sink.clone());
        let at = chrono::TimeZone::with_ymd_and_hms(&Utc, 2026, 10, 18, 12, 0, 0).unwrap();

        let written = recorder
            .record_at(
                DebtRequest {
                    capability_id: "agent-audit".to_string(),
                    slug: "x".to_string(),
                    severity: Default::default(),
                    context: String::new(),
                    actions: Vec::new(),
                },
                at,
            )
            .await
            .unwrap();

        assert_eq!(written.record.created_at, at);
        assert_eq!(sink.len().await, 1);
    }
}
