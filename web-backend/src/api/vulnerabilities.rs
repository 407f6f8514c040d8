use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use sentinelle_core::{Severity, Vulnerability};
use serde::Deserialize;

use super::error_response;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct VulnerabilityQuery {
    pub severity: Option<String>,
}

pub fn configure_vulnerability_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_vulnerabilities));
}

/// 漏洞列表，按严重等级排序
pub async fn list_vulnerabilities(
    state: web::Data<AppState>,
    query: web::Query<VulnerabilityQuery>,
) -> impl Responder {
    let filter = match query.severity.as_deref() {
        Some(raw) => match raw.parse::<Severity>() {
            Ok(severity) => Some(severity),
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
        },
        None => None,
    };

    let session = state.session.lock().await;
    let found: Vec<Vulnerability> = match filter {
        Some(severity) => session
            .vulnerabilities()
            .with_severity(severity)
            .into_iter()
            .cloned()
            .collect(),
        None => session.vulnerabilities_by_severity(),
    };
    HttpResponse::Ok().json(found)
}

pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    let stats = state.session.lock().await.stats();
    HttpResponse::Ok().json(stats)
}
