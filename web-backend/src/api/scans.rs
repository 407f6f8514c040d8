use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use sentinelle_core::ScanRequest;
use serde::Deserialize;

use super::{error_response, scan_error_response};
use crate::state::{AppState, ScanView};

#[derive(Deserialize)]
pub struct TargetRequest {
    pub target: String,
}

#[derive(Deserialize)]
pub struct FullScanRequest {
    pub subdomains: Vec<String>,
}

pub fn configure_scan_routes(cfg: &mut web::ServiceConfig) {
    cfg
        .route("", web::get().to(list_scans))
        .route("/direct", web::post().to(start_direct_scan))
        .route("/subdomains", web::post().to(start_subdomain_scan))
        .route("/full", web::post().to(start_full_scan))
        .route("/{task_id}", web::get().to(get_scan))
        .route("/{task_id}/cancel", web::post().to(cancel_scan));
}

async fn launch(state: &AppState, request: ScanRequest) -> HttpResponse {
    match state.orchestrator.submit(request).await {
        Ok(job) => {
            let view = state.track(job).await;
            HttpResponse::Accepted().json(view)
        }
        Err(e) => {
            tracing::error!("Failed to submit scan: {}", e);
            scan_error_response(&e)
        }
    }
}

/// 直接扫描单个目标
pub async fn start_direct_scan(
    state: web::Data<AppState>,
    req: web::Json<TargetRequest>,
) -> impl Responder {
    let target = req.into_inner().target;
    launch(&state, ScanRequest::Direct { target }).await
}

/// 子域名发现
pub async fn start_subdomain_scan(
    state: web::Data<AppState>,
    req: web::Json<TargetRequest>,
) -> impl Responder {
    let target = req.into_inner().target;
    launch(&state, ScanRequest::SubdomainDiscovery { target }).await
}

/// 对选中的子域名做完整扫描 (最多 3 个)
pub async fn start_full_scan(
    state: web::Data<AppState>,
    req: web::Json<FullScanRequest>,
) -> impl Responder {
    let subdomains = req.into_inner().subdomains;
    launch(&state, ScanRequest::Full { subdomains }).await
}

pub async fn list_scans(state: web::Data<AppState>) -> impl Responder {
    let scans = state.scans.lock().await;
    let mut views: Vec<ScanView> = scans.values().map(|s| s.view()).collect();
    views.sort_by(|a, b| b.job.created_at.cmp(&a.job.created_at));
    HttpResponse::Ok().json(views)
}

pub async fn get_scan(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let task_id = path.into_inner();
    let scans = state.scans.lock().await;

    match scans.get(&task_id) {
        Some(scan) => HttpResponse::Ok().json(scan.view()),
        None => error_response(StatusCode::NOT_FOUND, format!("Scan '{}' not found", task_id)),
    }
}

pub async fn cancel_scan(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let task_id = path.into_inner();
    let mut scans = state.scans.lock().await;

    let Some(scan) = scans.get_mut(&task_id) else {
        return error_response(StatusCode::NOT_FOUND, format!("Scan '{}' not found", task_id));
    };

    if scan.updates.borrow().is_terminal() {
        return error_response(
            StatusCode::CONFLICT,
            format!("Scan '{}' is no longer running", task_id),
        );
    }

    match scan.cancel.take() {
        Some(handle) => {
            handle.cancel();
            tracing::info!("Cancelled scan {}", task_id);
            HttpResponse::Accepted().json(scan.view())
        }
        None => error_response(
            StatusCode::CONFLICT,
            format!("Scan '{}' is no longer running", task_id),
        ),
    }
}
