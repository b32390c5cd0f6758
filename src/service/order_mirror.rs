use crate::domain::order::OrderRecord;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Flat-file mirror of order records for admin tooling: one JSON object per
/// line, keyed by transaction id, rewritten on update. A denormalized read
/// cache, never the system of record.
#[derive(Clone)]
pub struct OrderMirror {
    path: PathBuf,
    // Serializes whole-file rewrites within this process.
    lock: Arc<Mutex<()>>,
}

impl OrderMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn upsert(&self, order: &OrderRecord) -> Result<()> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let existing = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let serialized = serde_json::to_string(order)?;
        let mut lines: Vec<String> = Vec::new();
        let mut replaced = false;
        for line in existing.lines() {
            let keep = serde_json::from_str::<serde_json::Value>(line)
                .ok()
                .and_then(|v| {
                    v.get("transaction_id")
                        .and_then(|t| t.as_str())
                        .map(|t| t != order.transaction_id)
                })
                .unwrap_or(true);
            if keep {
                lines.push(line.to_string());
            } else {
                lines.push(serialized.clone());
                replaced = true;
            }
        }
        if !replaced {
            lines.push(serialized);
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, lines.join("\n") + "\n").await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        Ok(())
    }
}
