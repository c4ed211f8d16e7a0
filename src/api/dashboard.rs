use crate::{
    api::store_failure,
    model::{employee::Employee, time_log::TimeLog},
    report,
    store::{RecordStore, StoreError},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::Local;

async fn roster_and_logs(store: &RecordStore) -> Result<(Vec<Employee>, Vec<TimeLog>), StoreError> {
    futures::try_join!(store.employees(), store.logs())
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses((status = 200, description = "Today's attendance and the last seven days", body = DashboardStats)),
    tag = "Report",
    security(("bearer_auth" = []))
)]
pub async fn dashboard(store: web::Data<RecordStore>) -> impl Responder {
    match roster_and_logs(&store).await {
        Ok((employees, logs)) => {
            HttpResponse::Ok().json(report::dashboard(&employees, &logs, &Local::now()))
        }
        Err(e) => store_failure(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/payroll",
    responses((status = 200, description = "Weekly hours and labor cost per employee", body = PayrollStats)),
    tag = "Report",
    security(("bearer_auth" = []))
)]
pub async fn payroll(store: web::Data<RecordStore>) -> impl Responder {
    match roster_and_logs(&store).await {
        Ok((employees, logs)) => {
            HttpResponse::Ok().json(report::payroll(&employees, &logs, &Local::now()))
        }
        Err(e) => store_failure(&e),
    }
}
