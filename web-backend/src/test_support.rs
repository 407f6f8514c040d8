// 路由测试共用的脚本化后端和状态构建

use async_trait::async_trait;
use sentinelle_core::error::Result;
use sentinelle_core::scan::BackendStatus;
use sentinelle_core::{ScanBackend, ScanRequest, StatusResponse};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::AppConfig;
use crate::state::{AppState, ScanEnd};

/// 按脚本回答状态查询，脚本用完后一直返回 running
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<VecDeque<Result<StatusResponse>>>>,
    submitted: Arc<Mutex<usize>>,
}

impl ScriptedBackend {
    pub fn with(responses: Vec<Result<StatusResponse>>) -> Self {
        let backend = Self::default();
        backend.script.lock().unwrap().extend(responses);
        backend
    }
}

#[async_trait]
impl ScanBackend for ScriptedBackend {
    fn name(&self) -> String {
        "ScriptedBackend".to_string()
    }

    async fn submit(&self, _request: &ScanRequest) -> Result<String> {
        let mut submitted = self.submitted.lock().unwrap();
        *submitted += 1;
        Ok(format!("task-{}", submitted))
    }

    async fn status(&self, _task_id: &str) -> Result<StatusResponse> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(running(None)))
    }
}

pub fn running(progress: Option<&str>) -> StatusResponse {
    StatusResponse {
        status: BackendStatus::Running,
        progress: progress.map(String::from),
        result: None,
        error: None,
    }
}

pub fn completed(result: Value) -> StatusResponse {
    StatusResponse {
        status: BackendStatus::Completed,
        progress: None,
        result: Some(result),
        error: None,
    }
}

pub fn failed(message: &str) -> StatusResponse {
    StatusResponse {
        status: BackendStatus::Error,
        progress: None,
        result: None,
        error: Some(message.to_string()),
    }
}

/// 以 1ms 间隔轮询脚本后端的状态
pub async fn scripted_state(dir: &tempfile::TempDir, backend: ScriptedBackend) -> AppState {
    let config = AppConfig {
        db_path: dir.path().join("settings.db"),
        ..AppConfig::default()
    };
    let state = AppState::with_backend(&config, backend).await.unwrap();
    state.orchestrator.poll_interval().set(Duration::from_millis(1));
    state
}

pub async fn wait_for_end(state: &AppState, task_id: &str) -> ScanEnd {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let end = state
                .scans
                .lock()
                .await
                .get(task_id)
                .and_then(|scan| scan.end.clone());
            if let Some(end) = end {
                return end;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("scan did not finish in time")
}
