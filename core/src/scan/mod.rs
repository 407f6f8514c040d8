// Scan module - 扫描任务的生命周期
// 定义任务、后端接口和线上数据格式

pub mod http;
pub mod manager;
pub mod progress;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ScanError};
use crate::results::shape::ResultsPayload;

/// 单次完整扫描的子域名上限，后端同样限制
pub const MAX_FULL_TARGETS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanKind {
    Direct,
    SubdomainDiscovery,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Submitted,
    Running,
    Completed,
    Error,
}

impl ScanStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Error)
    }
}

/// 提交给后端的扫描请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScanRequest {
    Direct { target: String },
    SubdomainDiscovery { target: String },
    Full { subdomains: Vec<String> },
}

impl ScanRequest {
    pub fn kind(&self) -> ScanKind {
        match self {
            ScanRequest::Direct { .. } => ScanKind::Direct,
            ScanRequest::SubdomainDiscovery { .. } => ScanKind::SubdomainDiscovery,
            ScanRequest::Full { .. } => ScanKind::Full,
        }
    }

    pub fn targets(&self) -> Vec<String> {
        match self {
            ScanRequest::Direct { target } | ScanRequest::SubdomainDiscovery { target } => {
                vec![target.clone()]
            }
            ScanRequest::Full { subdomains } => subdomains.clone(),
        }
    }

    /// 对应的后端路径
    pub fn path(&self) -> &'static str {
        match self {
            ScanRequest::Direct { .. } => "/scan/",
            ScanRequest::SubdomainDiscovery { .. } => "/scan/subdomains/",
            ScanRequest::Full { .. } => "/scan/full/",
        }
    }

    /// 发往 [`Self::path`] 的 JSON 请求体
    pub fn body(&self) -> Value {
        match self {
            ScanRequest::Direct { target } | ScanRequest::SubdomainDiscovery { target } => {
                serde_json::json!({ "target": target })
            }
            ScanRequest::Full { subdomains } => serde_json::json!({ "subdomains": subdomains }),
        }
    }

    /// 去除目标两端空白，拒绝空目标和超量请求
    pub fn validated(self) -> Result<Self> {
        match self {
            ScanRequest::Direct { target } => Ok(ScanRequest::Direct {
                target: non_empty(target)?,
            }),
            ScanRequest::SubdomainDiscovery { target } => Ok(ScanRequest::SubdomainDiscovery {
                target: non_empty(target)?,
            }),
            ScanRequest::Full { subdomains } => {
                if subdomains.is_empty() {
                    return Err(ScanError::InvalidTargets(
                        "select at least one subdomain".to_string(),
                    ));
                }
                if subdomains.len() > MAX_FULL_TARGETS {
                    return Err(ScanError::InvalidTargets(format!(
                        "at most {} subdomains per full scan, got {}",
                        MAX_FULL_TARGETS,
                        subdomains.len()
                    )));
                }
                let subdomains = subdomains
                    .into_iter()
                    .map(non_empty)
                    .collect::<Result<Vec<_>>>()?;
                Ok(ScanRequest::Full { subdomains })
            }
        }
    }
}

fn non_empty(target: String) -> Result<String> {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        Err(ScanError::InvalidTargets("target must not be empty".to_string()))
    } else {
        Ok(trimmed.to_string())
    }
}

/// 一个扫描任务的客户端视图，只由 orchestrator 的轮询修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanJob {
    pub task_id: String,
    pub targets: Vec<String>,
    pub kind: ScanKind,
    pub status: ScanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_text: Option<String>,
    pub percent: u8,
    pub created_at: DateTime<Utc>,
}

impl ScanJob {
    pub fn new(task_id: String, request: &ScanRequest) -> Self {
        Self {
            task_id,
            targets: request.targets(),
            kind: request.kind(),
            status: ScanStatus::Submitted,
            progress_text: None,
            percent: 0,
            created_at: Utc::now(),
        }
    }

    pub fn target_label(&self) -> String {
        self.targets.join(", ")
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub task_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    Pending,
    Running,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

/// `GET /results/{task_id}` 的响应
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: BackendStatus,
    #[serde(default)]
    pub progress: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// 已完成任务的产出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ScanArtifact {
    Results(ResultsPayload),
    Subdomains(Vec<String>),
}

impl ScanArtifact {
    pub fn from_result(kind: ScanKind, result: Option<Value>) -> Result<Self> {
        let value = match result {
            Some(value) if !value.is_null() => value,
            _ => return Err(ScanError::MissingArtifact),
        };

        match kind {
            ScanKind::SubdomainDiscovery => {
                let names = value
                    .get("subdomains")
                    .and_then(Value::as_array)
                    .ok_or(ScanError::MissingArtifact)?;
                Ok(ScanArtifact::Subdomains(
                    names
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect(),
                ))
            }
            ScanKind::Direct | ScanKind::Full => {
                if !value.is_object() {
                    return Err(ScanError::MissingArtifact);
                }
                Ok(ScanArtifact::Results(ResultsPayload::from_value(&value)))
            }
        }
    }
}

/// 扫描后端接口 - 远端服务或测试替身都实现此接口
#[async_trait]
pub trait ScanBackend: Send + Sync {
    /// 返回后端名称
    fn name(&self) -> String;

    /// 提交任务，返回 task_id
    async fn submit(&self, request: &ScanRequest) -> Result<String>;

    /// 查询任务状态
    async fn status(&self, task_id: &str) -> Result<StatusResponse>;
}
