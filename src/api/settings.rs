use crate::{
    api::{message, store_failure},
    auth::auth::AuthUser,
    model::settings::AppSettings,
    store::RecordStore,
};
use actix_web::{HttpResponse, Responder, http::StatusCode, web};
use tracing::info;

#[utoipa::path(
    get,
    path = "/api/settings",
    responses((status = 200, description = "Current settings", body = AppSettings)),
    tag = "Settings",
    security(("bearer_auth" = []))
)]
pub async fn get_settings(store: web::Data<RecordStore>) -> impl Responder {
    match store.settings().await {
        Ok(settings) => HttpResponse::Ok().json(settings),
        Err(e) => store_failure(&e),
    }
}

/// Replace the settings document
#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = AppSettings,
    responses(
        (status = 200, description = "Settings saved", body = AppSettings),
        (status = 400, description = "Webhook URL is not http(s)")
    ),
    tag = "Settings",
    security(("bearer_auth" = []))
)]
pub async fn update_settings(
    auth: AuthUser,
    store: web::Data<RecordStore>,
    payload: web::Json<AppSettings>,
) -> impl Responder {
    let settings = payload.into_inner();
    if let Some(url) = settings.webhook_url() {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return message(StatusCode::BAD_REQUEST, "Webhook URL must be http(s)");
        }
    }

    match store.save_settings(&settings).await {
        Ok(()) => {
            info!(
                actor = %auth.subject,
                sync_enabled = settings.webhook_url().is_some(),
                "Settings updated"
            );
            HttpResponse::Ok().json(settings)
        }
        Err(e) => store_failure(&e),
    }
}
