use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::Mutex;

use super::{candidate_file_name, DebtRecord, DebtSink, MAX_NAME_ATTEMPTS};
use crate::error::{RouteError, RouteResult};

/// Keeps records in memory under their would-be relative paths.
/// Used for dry runs and by hosts that persist records themselves.
#[derive(Debug, Default)]
pub struct MemoryDebtSink {
    records: Mutex<Vec<(PathBuf, DebtRecord)>>,
}

impl MemoryDebtSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<(PathBuf, DebtRecord)> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl DebtSink for MemoryDebtSink {
    async fn write(&self, record: &DebtRecord) -> RouteResult<PathBuf> {
        let mut records = self.records.lock().await;
        let dir = PathBuf::from(&record.capability_id);

        let path = (1..=MAX_NAME_ATTEMPTS)
            .map(|attempt| dir.join(candidate_file_name(record, attempt)))
            .find(|candidate| records.iter().all(|(taken, _)| taken != candidate))
            .ok_or_else(|| RouteError::DebtWrite {
                path: record.relative_path(),
                source: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "no free name"),
            })?;

        records.push((path.clone(), record.clone()));
        Ok(path)
    }
}
