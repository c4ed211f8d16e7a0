use crate::{
    api::{message, store_failure},
    assistant::AssistantRelay,
    store::RecordStore,
};
use actix_web::{HttpResponse, Responder, http::StatusCode, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct AssistantQuestion {
    #[schema(example = "Quem trabalhou mais horas esta semana?")]
    pub question: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AssistantAnswer {
    pub answer: String,
}

/// Ask the assistant about the roster, sites and recent punches
#[utoipa::path(
    post,
    path = "/api/assistant",
    request_body = AssistantQuestion,
    responses(
        (status = 200, description = "Answer or a fixed fallback message", body = AssistantAnswer),
        (status = 400, description = "Blank question")
    ),
    tag = "Assistant",
    security(("bearer_auth" = []))
)]
pub async fn ask(
    store: web::Data<RecordStore>,
    relay: web::Data<AssistantRelay>,
    payload: web::Json<AssistantQuestion>,
) -> impl Responder {
    let question = payload.question.trim();
    if question.is_empty() {
        return message(StatusCode::BAD_REQUEST, "Question must not be empty");
    }

    let data = futures::try_join!(store.employees(), store.logs(), store.sites());
    let (employees, logs, sites) = match data {
        Ok(data) => data,
        Err(e) => return store_failure(&e),
    };

    info!(question_len = question.len(), "Assistant question received");
    let answer = relay
        .ask(&employees, &logs, &sites, question, &Local)
        .await;
    HttpResponse::Ok().json(AssistantAnswer { answer })
}
