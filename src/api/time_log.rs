use crate::{api::store_failure, model::time_log::TimeLog, store::RecordStore};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct LogQuery {
    /// Only this employee's punches.
    pub employee_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/logs",
    params(LogQuery),
    responses((status = 200, description = "Punches in recording order", body = [TimeLog])),
    tag = "TimeLog",
    security(("bearer_auth" = []))
)]
pub async fn list_logs(store: web::Data<RecordStore>, query: web::Query<LogQuery>) -> impl Responder {
    let logs = match store.logs().await {
        Ok(logs) => logs,
        Err(e) => return store_failure(&e),
    };

    let logs: Vec<TimeLog> = match &query.employee_id {
        Some(id) => logs.into_iter().filter(|l| &l.employee_id == id).collect(),
        None => logs,
    };
    HttpResponse::Ok().json(logs)
}
