use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::scan::{ScanJob, ScanKind, ScanStatus};

/// 扫描历史记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub task_id: String,
    pub target_label: String,
    pub date: DateTime<Utc>,
    pub status: ScanStatus,
    pub kind: ScanKind,
}

impl HistoryEntry {
    pub fn from_job(job: &ScanJob) -> Self {
        Self {
            task_id: job.task_id.clone(),
            target_label: job.target_label(),
            date: Utc::now(),
            status: job.status,
            kind: job.kind,
        }
    }
}

/// 内存中的扫描历史，最新的在前，不去重也不删除
#[derive(Debug, Default, Clone)]
pub struct HistoryStore {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        tracing::debug!("History: {} {} ({:?})", entry.task_id, entry.target_label, entry.status);
        self.entries.push_front(entry);
    }

    pub fn recent(&self, n: usize) -> Vec<HistoryEntry> {
        self.entries.iter().take(n).cloned().collect()
    }

    pub fn all(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn find(&self, task_id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.task_id == task_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
