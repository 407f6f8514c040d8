use sentinelle_core::{
    cancel_pair, CancelHandle, HttpBackend, OrchestratorConfig, PollInterval, ScanBackend, ScanJob,
    ScanOrchestrator, ScanSession, ScanStatus, SessionOutcome,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

use crate::config::AppConfig;
use crate::settings::{Settings, SettingsStore};

/// 扫描的结束方式
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ScanEnd {
    Finished { result: SessionOutcome },
    Failed { error: String },
}

/// 本进程提交过的扫描
pub struct TrackedScan {
    pub updates: watch::Receiver<ScanJob>,
    pub cancel: Option<CancelHandle>,
    pub end: Option<ScanEnd>,
}

#[derive(Serialize)]
pub struct ScanView {
    pub job: ScanJob,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<ScanEnd>,
}

impl TrackedScan {
    pub fn view(&self) -> ScanView {
        ScanView {
            job: self.updates.borrow().clone(),
            end: self.end.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: ScanOrchestrator,
    pub session: Arc<Mutex<ScanSession>>,
    pub scans: Arc<Mutex<HashMap<String, TrackedScan>>>,
    pub settings: SettingsStore,
    pub preferences: Arc<Mutex<Settings>>,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        Self::with_backend(config, HttpBackend::new(&config.api_url)).await
    }

    /// 使用任意扫描后端构建状态，轮询间隔取自已保存的设置
    pub async fn with_backend<B: ScanBackend + 'static>(
        config: &AppConfig,
        backend: B,
    ) -> anyhow::Result<Self> {
        // 初始化设置存储
        let settings = SettingsStore::open(&config.db_path).await?;
        let defaults = Settings {
            dark_mode: false,
            refresh_interval: config.poll_interval.as_secs().max(1),
        };
        let preferences = settings.load(defaults).await?;

        // 初始化扫描编排器
        let backend_name = backend.name();
        let orchestrator = ScanOrchestrator::new(
            backend,
            OrchestratorConfig {
                poll_interval: PollInterval::new(Duration::from_secs(preferences.refresh_interval)),
                max_wait: config.max_wait,
            },
        );
        tracing::info!(
            "Scanning backend {} polled every {}s",
            backend_name,
            preferences.refresh_interval
        );

        Ok(Self {
            orchestrator,
            session: Arc::new(Mutex::new(ScanSession::new())),
            scans: Arc::new(Mutex::new(HashMap::new())),
            settings,
            preferences: Arc::new(Mutex::new(preferences)),
        })
    }

    /// 登记已提交的任务，并在后台任务中轮询到结束
    pub async fn track(&self, job: ScanJob) -> ScanView {
        let (updates_tx, updates_rx) = watch::channel(job.clone());
        let (cancel, token) = cancel_pair();
        let tracked = TrackedScan {
            updates: updates_rx,
            cancel: Some(cancel),
            end: None,
        };
        let view = tracked.view();
        self.scans.lock().await.insert(job.task_id.clone(), tracked);

        let state = self.clone();
        tokio::spawn(async move {
            let mut job = job;
            let outcome = state
                .orchestrator
                .await_completion(&mut job, &updates_tx, &token)
                .await;

            // 轮询结束后不再接受取消
            if let Some(tracked) = state.scans.lock().await.get_mut(&job.task_id) {
                tracked.cancel = None;
            }

            let end = match outcome {
                Ok(artifact) => {
                    let result = state.session.lock().await.complete(&job, artifact);
                    ScanEnd::Finished { result }
                }
                Err(e) => {
                    if job.status == ScanStatus::Error {
                        state.session.lock().await.fail(&job);
                    }
                    ScanEnd::Failed { error: e.to_string() }
                }
            };

            if let Some(tracked) = state.scans.lock().await.get_mut(&job.task_id) {
                tracked.end = Some(end);
            }
        });

        view
    }

    pub async fn update_preferences(&self, wanted: Settings) -> anyhow::Result<Settings> {
        self.settings.save(&wanted).await?;
        self.orchestrator
            .poll_interval()
            .set(Duration::from_secs(wanted.refresh_interval));
        *self.preferences.lock().await = wanted;
        Ok(wanted)
    }
}
