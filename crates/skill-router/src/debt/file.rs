use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::{candidate_file_name, DebtRecord, DebtSink, MAX_NAME_ATTEMPTS};
use crate::error::{RouteError, RouteResult};

/// Writes records as Markdown under `{root}/{capability}/`.
#[derive(Debug, Clone)]
pub struct FileDebtSink {
    root: PathBuf,
}

impl FileDebtSink {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn ensure_dir(dir: &Path) -> RouteResult<()> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| RouteError::DebtWrite {
                path: dir.to_path_buf(),
                source,
            })
    }
}

#[async_trait]
impl DebtSink for FileDebtSink {
    async fn write(&self, record: &DebtRecord) -> RouteResult<PathBuf> {
        validate_component(&record.capability_id)?;
        let dir = self.root.join(&record.capability_id);
        Self::ensure_dir(&dir).await?;

        let contents = record.render_markdown();
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let path = dir.join(candidate_file_name(record, attempt));
            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(RouteError::DebtWrite { path, source }),
            };

            let written = async {
                file.write_all(contents.as_bytes()).await?;
                file.flush().await
            }
            .await;
            drop(file);
            settle(&path, written).await?;

            tracing::info!(path = %path.display(), capability = %record.capability_id, "debt record written");
            return Ok(path);
        }

        Err(RouteError::DebtWrite {
            path: dir.join(format!("{}.md", record.file_stem())),
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("no free name after {MAX_NAME_ATTEMPTS} attempts"),
            ),
        })
    }
}

/// Removes a half-written record so the name is free for the next attempt.
async fn settle(path: &Path, written: std::io::Result<()>) -> RouteResult<()> {
    let Err(source) = written else {
        return Ok(());
    };
    if let Err(error) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), "failed to remove partial debt record: {error}");
    }
    Err(RouteError::DebtWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_component(component: &str) -> RouteResult<()> {
    if component.is_empty()
        || component == "."
        || component == ".."
        || component.contains('/')
        || component.contains('\\')
    {
        return Err(RouteError::InvalidDebtPath(component.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::standard_checklist;
    use crate::outcome::DebtRequest;
    use crate::rule::Severity;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn record(capability: &str) -> DebtRecord {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        DebtRecord::from_request(
            DebtRequest {
                capability_id: capability.to_string(),
                slug: "audit-failed".to_string(),
                severity: Severity::Medium,
                context: "ctx".to_string(),
                actions: standard_checklist(capability),
            },
            at,
        )
    }

    #[tokio::test]
    async fn writes_under_capability_directory() {
        let dir = tempdir().expect("tempdir");
        let sink = FileDebtSink::new(dir.path().join("debt"));

        let path = sink.write(&record("agent-audit")).await.expect("write");

        assert_eq!(
            path,
            dir.path()
                .join("debt")
                .join("agent-audit")
                .join("20261018T090000Z-audit-failed.md")
        );
        let written = tokio::fs::read_to_string(&path).await.expect("read");
        assert!(written.contains("status: open"));
        assert!(written.contains("capability: agent-audit"));
    }

    #[tokio::test]
    async fn collisions_get_numeric_suffix() {
        let dir = tempdir().expect("tempdir");
        let sink = FileDebtSink::new(dir.path().to_path_buf());
        let record = record("agent-audit");

        let first = sink.write(&record).await.expect("first");
        let second = sink.write(&record).await.expect("second");
        let third = sink.write(&record).await.expect("third");

        assert_ne!(first, second);
        assert!(second.ends_with("20261018T090000Z-audit-failed-2.md"));
        assert!(third.ends_with("20261018T090000Z-audit-failed-3.md"));
    }

    #[tokio::test]
    async fn never_overwrites_existing_files() {
        let dir = tempdir().expect("tempdir");
        let sink = FileDebtSink::new(dir.path().to_path_buf());
        let record = record("agent-audit");

        let existing = dir.path().join("agent-audit");
        tokio::fs::create_dir_all(&existing).await.expect("mkdir");
        let taken = existing.join("20261018T090000Z-audit-failed.md");
        tokio::fs::write(&taken, "keep me").await.expect("seed");

        let path = sink.write(&record).await.expect("write");
        assert_ne!(path, taken);
        assert_eq!(tokio::fs::read_to_string(&taken).await.unwrap(), "keep me");
    }

    #[tokio::test]
    async fn failed_write_leaves_no_partial_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("20261018T090000Z-audit-failed.md");
        tokio::fs::write(&path, "---\nid: ").await.expect("seed");

        let err = settle(&path, Err(std::io::Error::other("disk full")))
            .await
            .unwrap_err();

        assert!(matches!(err, RouteError::DebtWrite { .. }));
        assert!(tokio::fs::metadata(&path).await.is_err());

        let sink = FileDebtSink::new(dir.path().to_path_buf());
        let next = sink.write(&record("agent-audit")).await.expect("write");
        assert!(next.ends_with("agent-audit/20261018T090000Z-audit-failed.md"));
    }

    #[tokio::test]
    async fn successful_write_is_kept() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("kept.md");
        tokio::fs::write(&path, "body").await.expect("seed");

        settle(&path, Ok(())).await.expect("settle");
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "body");
    }

    #[tokio::test]
    async fn rejects_path_like_capability() {
        let dir = tempdir().expect("tempdir");
        let sink = FileDebtSink::new(dir.path().to_path_buf());

        let err = sink.write(&record("../escape")).await.unwrap_err();
        assert!(matches!(err, RouteError::InvalidDebtPath(_)));
        assert!(!err.is_config());
    }
}
