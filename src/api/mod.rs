pub mod assistant;
pub mod dashboard;
pub mod employee;
pub mod kiosk;
pub mod settings;
pub mod site;
pub mod time_log;

use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::{
    kiosk::session::{MSG_BAD_PIN, MSG_NO_SITE, SessionError},
    store::StoreError,
};

pub const INTERNAL_ERROR: &str = "Something went wrong, Contact with system admin";

pub fn message(status: StatusCode, text: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "message": text.into() }))
}

pub fn store_failure(e: &StoreError) -> HttpResponse {
    error!(error = %e, "Record store failure");
    message(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
}

pub fn session_failure(e: SessionError) -> HttpResponse {
    match e {
        SessionError::Store(e) => store_failure(&e),
        SessionError::WrongState { .. } | SessionError::CameraNotReady => {
            message(StatusCode::CONFLICT, e.to_string())
        }
        SessionError::NotADigit(_) => message(StatusCode::BAD_REQUEST, e.to_string()),
        SessionError::UnknownSite(_) => message(StatusCode::NOT_FOUND, e.to_string()),
        SessionError::MissingSite => message(StatusCode::BAD_REQUEST, MSG_NO_SITE),
        SessionError::PinRejected => message(StatusCode::UNAUTHORIZED, MSG_BAD_PIN),
    }
}
