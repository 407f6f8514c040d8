use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};

use super::error_response;
use crate::settings::Settings;
use crate::state::AppState;

pub fn configure_settings_routes(cfg: &mut web::ServiceConfig) {
    cfg
        .route("", web::get().to(get_settings))
        .route("", web::put().to(update_settings));
}

pub async fn get_settings(state: web::Data<AppState>) -> impl Responder {
    let current = *state.preferences.lock().await;
    HttpResponse::Ok().json(current)
}

/// 保存设置，新的轮询间隔对进行中的扫描立即生效
pub async fn update_settings(
    state: web::Data<AppState>,
    req: web::Json<Settings>,
) -> impl Responder {
    let wanted = req.into_inner();
    if let Err(e) = wanted.validate() {
        return error_response(StatusCode::BAD_REQUEST, e);
    }

    match state.update_preferences(wanted).await {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => {
            tracing::error!("Failed to save settings: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}
