use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use sentinelle_core::{ScanArtifact, SessionOutcome};
use serde::Deserialize;

use super::{error_response, scan_error_response};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub fn configure_history_routes(cfg: &mut web::ServiceConfig) {
    cfg
        .route("", web::get().to(list_history))
        .route("/{task_id}/results", web::get().to(get_history_results));
}

pub async fn list_history(
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> impl Responder {
    let session = state.session.lock().await;
    let history = session.history();
    let entries = match query.limit {
        Some(n) => history.recent(n),
        None => history.all(),
    };
    HttpResponse::Ok().json(entries)
}

/// 重新拉取历史任务的结果，只做展示，不写入漏洞日志
pub async fn get_history_results(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let task_id = path.into_inner();

    // 先释放锁再请求后端
    let kind = {
        let session = state.session.lock().await;
        session.history().find(&task_id).map(|entry| entry.kind)
    };
    let Some(kind) = kind else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("No history entry for '{}'", task_id),
        );
    };

    match state.orchestrator.fetch_results(&task_id, kind).await {
        Ok(Some(ScanArtifact::Results(payload))) => {
            let report = state.session.lock().await.preview(&task_id, payload);
            HttpResponse::Ok().json(SessionOutcome::Report(report))
        }
        Ok(Some(ScanArtifact::Subdomains(names))) => {
            HttpResponse::Ok().json(SessionOutcome::Subdomains(names))
        }
        Ok(None) => error_response(
            StatusCode::CONFLICT,
            format!("Scan '{}' has no results yet", task_id),
        ),
        Err(e) => {
            tracing::error!("Failed to fetch results for {}: {}", task_id, e);
            scan_error_response(&e)
        }
    }
}
