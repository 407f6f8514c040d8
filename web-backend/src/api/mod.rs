use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Scope};
use sentinelle_core::error::ScanError;

pub mod history;
pub mod scans;
pub mod settings;
pub mod vulnerabilities;

pub fn create_api_router() -> Scope {
    web::scope("/api")
        .service(scan_routes())
        .service(vulnerability_routes())
        .service(history_routes())
        .service(settings_routes())
        .route("/stats", web::get().to(vulnerabilities::get_stats))
}

fn scan_routes() -> Scope {
    web::scope("/scans")
        .configure(scans::configure_scan_routes)
}

fn vulnerability_routes() -> Scope {
    web::scope("/vulnerabilities")
        .configure(vulnerabilities::configure_vulnerability_routes)
}

fn history_routes() -> Scope {
    web::scope("/history")
        .configure(history::configure_history_routes)
}

fn settings_routes() -> Scope {
    web::scope("/settings")
        .configure(settings::configure_settings_routes)
}

pub(crate) fn error_response(status: StatusCode, message: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "error": message.to_string()
    }))
}

/// 扫描错误到 HTTP 状态码的映射
pub(crate) fn scan_error_response(e: &ScanError) -> HttpResponse {
    let status = match e {
        ScanError::InvalidTargets(_) => StatusCode::BAD_REQUEST,
        ScanError::Transport(_) | ScanError::Http { .. } | ScanError::Decode(_) => StatusCode::BAD_GATEWAY,
        // 任务本身失败或没有结果
        ScanError::Backend(_) | ScanError::MissingArtifact => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, e)
}
