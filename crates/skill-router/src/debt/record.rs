use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

use crate::outcome::DebtRequest;
use crate::rule::Severity;
use crate::utils::slug::slugify;
use crate::utils::time::{to_iso_basic, to_rfc3339};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtStatus {
    Open,
}

impl DebtStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DebtStatus::Open => "open",
        }
    }
}

/// A failure artifact, created when a conditional chain takes a debt branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub capability_id: String,
    pub severity: Severity,
    pub status: DebtStatus,
    pub slug: String,
    pub context: String,
    pub actions: Vec<String>,
}

/// Follow-up checklist used when a debt branch configures none.
pub fn standard_checklist(capability_id: &str) -> Vec<String> {
    vec![
        format!("Reproduce the failure reported by `{capability_id}`"),
        "Identify the root cause".to_string(),
        format!("Fix the cause and re-run `{capability_id}`"),
        format!("Set status to `resolved` once `{capability_id}` passes"),
    ]
}

impl DebtRecord {
    pub fn from_request(request: DebtRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            created_at,
            slug: slugify(&request.slug),
            capability_id: request.capability_id,
            severity: request.severity,
            status: DebtStatus::Open,
            context: request.context,
            actions: request.actions,
        }
    }

    /// `{timestamp}-{slug}`, timestamp in ISO 8601 basic format.
    pub fn file_stem(&self) -> String {
        format!("{}-{}", to_iso_basic(&self.created_at), self.slug)
    }

    /// `{capability}/{timestamp}-{slug}.md`, relative to the debt root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.capability_id).join(format!("{}.md", self.file_stem()))
    }

    pub fn render_markdown(&self) -> String {
        let context = match self.context.trim() {
            "" => "_No context reported._",
            text => text,
        };
        let checklist: String = self
            .actions
            .iter()
            .map(|action| format!("- [ ] {action}\n"))
            .collect();

        format!(
            "---\n\
             id: {id}\n\
             created: {created}\n\
             capability: {capability}\n\
             severity: {severity}\n\
             status: {status}\n\
             slug: {slug}\n\
             ---\n\
             \n\
             # Debt: {capability} / {slug}\n\
             \n\
             ## Context\n\
             \n\
             {context}\n\
             \n\
             ## Required follow-up\n\
             \n\
             {checklist}",
            id = self.id,
            created = to_rfc3339(&self.created_at),
            capability = self.capability_id,
            severity = self.severity.as_str(),
            status = self.status.as_str(),
            slug = self.slug,
        )
    }
}
