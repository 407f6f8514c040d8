use super::progress::ProgressTracker;
use super::{BackendStatus, ScanArtifact, ScanBackend, ScanJob, ScanKind, ScanRequest, ScanStatus};
use crate::error::{Result, ScanError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// 共享的轮询间隔，每次查询前重新读取，设置修改对进行中的扫描同样生效
#[derive(Debug, Clone)]
pub struct PollInterval(Arc<AtomicU64>);

impl PollInterval {
    pub fn new(interval: Duration) -> Self {
        Self(Arc::new(AtomicU64::new(saturating_millis(interval))))
    }

    pub fn get(&self) -> Duration {
        Duration::from_millis(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, interval: Duration) {
        self.0.store(saturating_millis(interval), Ordering::Relaxed);
    }
}

fn saturating_millis(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX)
}

impl Default for PollInterval {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub poll_interval: PollInterval,
    /// `None` 表示一直等待
    pub max_wait: Option<Duration>,
}

/// 触发对应 [`CancelToken`] 的取消
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

#[derive(Debug, Clone)]
pub struct CancelToken(watch::Receiver<bool>);

impl CancelToken {
    /// 永远不会被取消的 token
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self(rx)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    async fn cancelled(&self) {
        let mut rx = self.0.clone();
        let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            // handle 已经丢弃，不会再被取消
            std::future::pending::<()>().await;
        }
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), CancelToken(rx))
}

/// 扫描编排器：提交任务并轮询到终态
#[derive(Clone)]
pub struct ScanOrchestrator {
    backend: Arc<dyn ScanBackend>,
    config: OrchestratorConfig,
}

impl ScanOrchestrator {
    pub fn new<B: ScanBackend + 'static>(backend: B, config: OrchestratorConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            config,
        }
    }

    pub fn poll_interval(&self) -> &PollInterval {
        &self.config.poll_interval
    }

    pub async fn submit(&self, request: ScanRequest) -> Result<ScanJob> {
        let request = request.validated()?;
        let task_id = self.backend.submit(&request).await?;
        let job = ScanJob::new(task_id, &request);

        tracing::info!(
            "Submitted {:?} scan {} for {} via {}",
            job.kind,
            job.task_id,
            job.target_label(),
            self.backend.name()
        );
        Ok(job)
    }

    /// 轮询直到后端报告终态
    ///
    /// `job` 的每次变化都会推送到 `updates`。后端报告的错误会把任务置为 `error`，
    /// 传输失败、取消和超时则保留最后已知的状态
    pub async fn await_completion(
        &self,
        job: &mut ScanJob,
        updates: &watch::Sender<ScanJob>,
        cancel: &CancelToken,
    ) -> Result<ScanArtifact> {
        let max_wait = self.config.max_wait;
        let task_id = job.task_id.clone();

        let outcome = {
            let poll = self.poll_until_terminal(job, updates);
            tokio::select! {
                res = async move {
                    match max_wait {
                        Some(limit) => tokio::time::timeout(limit, poll)
                            .await
                            .unwrap_or_else(|_| Err(ScanError::TimedOut(limit))),
                        None => poll.await,
                    }
                } => res,
                _ = cancel.cancelled() => Err(ScanError::Cancelled),
            }
        };

        match &outcome {
            Ok(_) => tracing::info!("Scan {} completed", task_id),
            Err(e) => tracing::warn!("Scan {} stopped: {}", task_id, e),
        }
        outcome
    }

    /// 对已结束任务做一次状态查询
    /// 后端仍在处理时返回 `Ok(None)`
    pub async fn fetch_results(&self, task_id: &str, kind: ScanKind) -> Result<Option<ScanArtifact>> {
        let response = self.backend.status(task_id).await?;
        match response.status {
            BackendStatus::Completed => ScanArtifact::from_result(kind, response.result).map(Some),
            BackendStatus::Error => Err(ScanError::Backend(
                response
                    .error
                    .unwrap_or_else(|| "backend reported an error".to_string()),
            )),
            _ => Ok(None),
        }
    }

    async fn poll_until_terminal(
        &self,
        job: &mut ScanJob,
        updates: &watch::Sender<ScanJob>,
    ) -> Result<ScanArtifact> {
        let mut tracker = ProgressTracker::new(job.kind, job.targets.clone());

        loop {
            tokio::time::sleep(self.config.poll_interval.get()).await;
            let response = self.backend.status(&job.task_id).await?;

            match response.status {
                BackendStatus::Completed => {
                    let artifact = ScanArtifact::from_result(job.kind, response.result)?;
                    job.status = ScanStatus::Completed;
                    job.percent = tracker.complete();
                    if response.progress.is_some() {
                        job.progress_text = response.progress;
                    }
                    updates.send_replace(job.clone());
                    return Ok(artifact);
                }
                BackendStatus::Error => {
                    job.status = ScanStatus::Error;
                    updates.send_replace(job.clone());
                    let message = response
                        .error
                        .unwrap_or_else(|| "backend reported an error".to_string());
                    return Err(ScanError::Backend(message));
                }
                BackendStatus::Running => {
                    job.status = ScanStatus::Running;
                    if let Some(text) = response.progress {
                        match tracker.observe(&text) {
                            Some(percent) => job.percent = percent,
                            None => tracing::debug!("Progress for {} not advanced: {}", job.task_id, text),
                        }
                        job.progress_text = Some(text);
                    }
                    updates.send_replace(job.clone());
                }
                BackendStatus::Pending | BackendStatus::Unknown => {
                    tracing::trace!("Scan {} not started yet", job.task_id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huge_intervals_saturate_instead_of_wrapping() {
        let interval = PollInterval::new(Duration::from_secs(18_446_744_073_709_552));
        assert_eq!(interval.get(), Duration::from_millis(u64::MAX));

        interval.set(Duration::from_secs(5));
        assert_eq!(interval.get(), Duration::from_secs(5));

        interval.set(Duration::MAX);
        assert!(interval.get() >= Duration::from_secs(1));
    }

    #[test]
    fn clones_share_one_interval() {
        let interval = PollInterval::default();
        let shared = interval.clone();
        shared.set(Duration::from_millis(250));
        assert_eq!(interval.get(), Duration::from_millis(250));
    }

    #[test]
    fn cancel_handle_flips_its_token() {
        let (handle, token) = cancel_pair();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
        assert!(!CancelToken::never().is_cancelled());
    }
}
