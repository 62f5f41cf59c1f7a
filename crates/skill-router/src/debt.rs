//! Debt records: write-once failure artifacts for conditional chains.

pub mod file;
pub mod memory;
pub mod record;
pub mod recorder;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::RouteResult;

pub use file::FileDebtSink;
pub use memory::MemoryDebtSink;
pub use record::{standard_checklist, DebtRecord, DebtStatus};
pub use recorder::{DebtRecorder, WrittenDebt};

/// Destination for debt records. Records are never read back.
#[async_trait]
pub trait DebtSink: Send + Sync {
    /// Persist `record` under a unique name and return where it went.
    async fn write(&self, record: &DebtRecord) -> RouteResult<PathBuf>;
}

pub type SharedDebtSink = Arc<dyn DebtSink>;

/// Upper bound on `-N` suffixes tried when a record name is taken.
pub(crate) const MAX_NAME_ATTEMPTS: usize = 100;

/// File name for the `attempt`-th try (1-based) at storing `record`.
pub(crate) fn candidate_file_name(record: &DebtRecord, attempt: usize) -> String {
    if attempt <= 1 {
        format!("{}.md", record.file_stem())
    } else {
        format!("{}-{attempt}.md", record.file_stem())
    }
}
