// Session - 进程内的漏洞日志和扫描历史
// 任务完成后的处理流程: shape -> summary -> extract -> history

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::history::{HistoryEntry, HistoryStore};
use crate::results::shape::ResultsPayload;
use crate::results::summary::{severity_histogram, summarize, SeverityBar, SeverityCounts, Summary};
use crate::scan::{ScanArtifact, ScanJob, ScanStatus};
use crate::vuln::extractor::extract_payload;
use crate::vuln::model::Vulnerability;
use crate::vuln::store::VulnerabilityLog;

/// 单次结果的统计报告，分布只统计本次新增的漏洞
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub task_id: String,
    pub payload: ResultsPayload,
    pub summary: Summary,
    pub added: usize,
    pub histogram: SeverityCounts,
    pub bars: Vec<SeverityBar>,
    pub vulnerabilities: Vec<Vulnerability>,
}

impl ScanReport {
    fn build(task_id: &str, payload: ResultsPayload, summary: Summary, delta: &[Vulnerability]) -> Self {
        let histogram = severity_histogram(delta);
        Self {
            task_id: task_id.to_string(),
            payload,
            summary,
            added: delta.len(),
            histogram,
            bars: histogram.bars(),
            vulnerabilities: delta.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum SessionOutcome {
    Report(ScanReport),
    Subdomains(Vec<String>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_scans: usize,
    pub total_vulnerabilities: usize,
    pub total_domains: usize,
}

#[derive(Debug, Default)]
pub struct ScanSession {
    vulnerabilities: VulnerabilityLog,
    history: HistoryStore,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vulnerabilities(&self) -> &VulnerabilityLog {
        &self.vulnerabilities
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// 记录已完成的任务并处理其产出
    pub fn complete(&mut self, job: &ScanJob, artifact: ScanArtifact) -> SessionOutcome {
        self.history.record(HistoryEntry::from_job(job));
        match artifact {
            ScanArtifact::Results(payload) => SessionOutcome::Report(self.ingest(&job.task_id, payload)),
            ScanArtifact::Subdomains(names) => {
                tracing::info!("{} subdomains found for {}", names.len(), job.target_label());
                SessionOutcome::Subdomains(names)
            }
        }
    }

    /// 记录后端报告失败的任务，其他状态的任务不记录
    pub fn fail(&mut self, job: &ScanJob) -> bool {
        if job.status != ScanStatus::Error {
            return false;
        }
        self.history.record(HistoryEntry::from_job(job));
        true
    }

    /// 统计载荷并把漏洞追加到日志
    pub fn ingest(&mut self, task_id: &str, payload: ResultsPayload) -> ScanReport {
        let summary = summarize(&payload);
        let offset = self.vulnerabilities.len();
        let added = self.vulnerabilities.append(extract_payload(&payload));

        tracing::info!(
            "Scan {}: {} open ports, {} services, {} new vulnerabilities",
            task_id,
            summary.open_ports,
            summary.services,
            added
        );
        ScanReport::build(task_id, payload, summary, self.vulnerabilities.since(offset))
    }

    /// 与 [`Self::ingest`] 相同的报告，但不修改日志
    pub fn preview(&self, task_id: &str, payload: ResultsPayload) -> ScanReport {
        let summary = summarize(&payload);
        let found = extract_payload(&payload);
        ScanReport::build(task_id, payload, summary, &found)
    }

    pub fn vulnerabilities_by_severity(&self) -> Vec<Vulnerability> {
        self.vulnerabilities
            .sorted_by_severity()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> DashboardStats {
        let domains: HashSet<String> = self
            .history
            .all()
            .into_iter()
            .map(|e| e.target_label)
            .collect();
        DashboardStats {
            total_scans: self.history.len(),
            total_vulnerabilities: self.vulnerabilities.len(),
            total_domains: domains.len(),
        }
    }
}
