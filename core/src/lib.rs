// Sentinelle Core Library
// 扫描任务编排、漏洞抽取与统计

mod patterns;

pub mod history;
pub mod results;
pub mod scan;
pub mod session;
pub mod vuln;

// 重新导出常用类型
pub use history::{HistoryEntry, HistoryStore};
pub use results::{detect, ResultsPayload, Shape, SingleTargetResult, Summary, SeverityCounts};
pub use scan::http::HttpBackend;
pub use scan::manager::{cancel_pair, CancelHandle, CancelToken, OrchestratorConfig, PollInterval, ScanOrchestrator};
pub use scan::{ScanArtifact, ScanBackend, ScanJob, ScanKind, ScanRequest, ScanStatus, StatusResponse};
pub use session::{DashboardStats, ScanReport, ScanSession, SessionOutcome};
pub use vuln::{Severity, ToolSource, Vulnerability, VulnerabilityLog};

pub mod error {
    use std::time::Duration;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum ScanError {
        #[error("Scan failed: transport error: {0}")]
        Transport(#[from] reqwest::Error),

        #[error("Scan failed: backend answered HTTP {status}: {body}")]
        Http { status: u16, body: String },

        #[error("Scan failed: malformed backend response: {0}")]
        Decode(#[from] serde_json::Error),

        #[error("Scan failed: {0}")]
        Backend(String),

        #[error("Scan failed: job completed without a usable result")]
        MissingArtifact,

        #[error("Invalid scan targets: {0}")]
        InvalidTargets(String),

        #[error("Scan cancelled")]
        Cancelled,

        #[error("Scan timed out after {0:?}")]
        TimedOut(Duration),
    }

    pub type Result<T> = std::result::Result<T, ScanError>;
}
