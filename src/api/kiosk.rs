use crate::{
    api::{message, session_failure, store_failure},
    kiosk::{
        KioskHandle,
        session::{KeypadOutcome, KioskView},
        snapshot,
    },
    model::time_log::Direction,
    store::RecordStore,
};
use actix_web::{HttpResponse, Responder, http::StatusCode, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct KeypadPress {
    #[schema(example = "7")]
    pub digit: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SiteSelection {
    #[schema(example = "1")]
    pub site_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CameraFrame {
    /// Base64 image, bare or as a data URL.
    #[schema(example = "data:image/jpeg;base64,/9j/4AAQSkZJRg...")]
    pub image: String,
}

#[derive(Serialize, ToSchema)]
pub struct KeypadResponse {
    /// `pending`, `ignored`, `not_found` or `identified`.
    #[schema(example = "pending")]
    pub outcome: String,
    #[schema(nullable = true)]
    pub employee_id: Option<String>,
    pub view: KioskView,
}

#[derive(Serialize, ToSchema)]
pub struct PunchResponse {
    pub log_id: String,
    pub employee_id: String,
    #[schema(example = "Carlos Silva")]
    pub employee_name: String,
    pub site_id: String,
    pub direction: Direction,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub view: KioskView,
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::get().to(current_view)))
        .service(web::resource("/sites").route(web::get().to(list_sites)))
        .service(web::resource("/keypad").route(web::post().to(press_key)))
        .service(web::resource("/clear").route(web::post().to(clear_input)))
        .service(web::resource("/site").route(web::put().to(select_site)))
        .service(web::resource("/camera/frame").route(web::put().to(push_frame)))
        .service(web::resource("/confirm").route(web::post().to(confirm_punch)))
        .service(web::resource("/back").route(web::post().to(go_back)));
}

/// Current kiosk screen
#[utoipa::path(
    get,
    path = "/kiosk",
    responses((status = 200, description = "Kiosk screen state", body = KioskView)),
    tag = "Kiosk"
)]
pub async fn current_view(kiosk: web::Data<KioskHandle>) -> impl Responder {
    let mut session = kiosk.lock().await;
    session.tick(Utc::now());
    HttpResponse::Ok().json(session.view())
}

/// Work sites offered by the site selector
#[utoipa::path(
    get,
    path = "/kiosk/sites",
    responses((status = 200, description = "Sites in store order", body = [Site])),
    tag = "Kiosk"
)]
pub async fn list_sites(store: web::Data<RecordStore>) -> impl Responder {
    match store.sites().await {
        Ok(sites) => HttpResponse::Ok().json(sites),
        Err(e) => store_failure(&e),
    }
}

/// Press one keypad digit
#[utoipa::path(
    post,
    path = "/kiosk/keypad",
    request_body = KeypadPress,
    responses(
        (status = 200, description = "Digit handled", body = KeypadResponse),
        (status = 400, description = "Not a single digit"),
        (status = 409, description = "Kiosk is confirming a punch")
    ),
    tag = "Kiosk"
)]
pub async fn press_key(
    kiosk: web::Data<KioskHandle>,
    payload: web::Json<KeypadPress>,
) -> impl Responder {
    let mut chars = payload.digit.chars();
    let (Some(digit), None) = (chars.next(), chars.next()) else {
        return message(StatusCode::BAD_REQUEST, "Exactly one digit expected");
    };

    let mut session = kiosk.lock().await;
    let outcome = match session.press_digit(digit, Utc::now()).await {
        Ok(outcome) => outcome,
        Err(e) => return session_failure(e),
    };

    let (outcome, employee_id) = match outcome {
        KeypadOutcome::Pending(_) => ("pending", None),
        KeypadOutcome::Ignored => ("ignored", None),
        KeypadOutcome::NotFound => ("not_found", None),
        KeypadOutcome::Identified { employee_id } => ("identified", Some(employee_id)),
    };
    HttpResponse::Ok().json(KeypadResponse {
        outcome: outcome.to_string(),
        employee_id,
        view: session.view(),
    })
}

/// Clear the keypad input
#[utoipa::path(
    post,
    path = "/kiosk/clear",
    responses(
        (status = 200, description = "Input cleared", body = KioskView),
        (status = 409, description = "Kiosk is confirming a punch")
    ),
    tag = "Kiosk"
)]
pub async fn clear_input(kiosk: web::Data<KioskHandle>) -> impl Responder {
    let mut session = kiosk.lock().await;
    session.tick(Utc::now());
    match session.clear() {
        Ok(()) => HttpResponse::Ok().json(session.view()),
        Err(e) => session_failure(e),
    }
}

/// Select the work site punches are recorded against
#[utoipa::path(
    put,
    path = "/kiosk/site",
    request_body = SiteSelection,
    responses(
        (status = 200, description = "Site selected", body = KioskView),
        (status = 404, description = "No such site")
    ),
    tag = "Kiosk"
)]
pub async fn select_site(
    kiosk: web::Data<KioskHandle>,
    payload: web::Json<SiteSelection>,
) -> impl Responder {
    let mut session = kiosk.lock().await;
    session.tick(Utc::now());
    match session.select_site(&payload.site_id).await {
        Ok(()) => {
            debug!(site_id = %payload.site_id, "Kiosk site selected");
            HttpResponse::Ok().json(session.view())
        }
        Err(e) => session_failure(e),
    }
}

/// Push the latest live camera frame
#[utoipa::path(
    put,
    path = "/kiosk/camera/frame",
    request_body = CameraFrame,
    responses(
        (status = 200, description = "Frame buffered", body = KioskView),
        (status = 400, description = "Not a decodable image"),
        (status = 409, description = "Camera is not active")
    ),
    tag = "Kiosk"
)]
pub async fn push_frame(
    kiosk: web::Data<KioskHandle>,
    payload: web::Json<CameraFrame>,
) -> impl Responder {
    let frame = match snapshot::decode_upload(&payload.image) {
        Ok(frame) => frame,
        Err(e) => {
            debug!(error = %e, "Rejected camera frame");
            return message(StatusCode::BAD_REQUEST, "Invalid image");
        }
    };

    let mut session = kiosk.lock().await;
    session.tick(Utc::now());
    if !session.camera_mut().push_frame(frame) {
        return message(StatusCode::CONFLICT, "Camera is not active");
    }
    HttpResponse::Ok().json(session.view())
}

/// Record the punch for the identified employee
#[utoipa::path(
    post,
    path = "/kiosk/confirm",
    responses(
        (status = 201, description = "Punch recorded", body = PunchResponse),
        (status = 400, description = "No work site selected"),
        (status = 409, description = "Nobody identified or camera not ready")
    ),
    tag = "Kiosk"
)]
pub async fn confirm_punch(kiosk: web::Data<KioskHandle>) -> impl Responder {
    let mut session = kiosk.lock().await;
    match session.confirm(Utc::now()).await {
        Ok(receipt) => {
            info!(log_id = %receipt.log.id, "Kiosk punch confirmed");
            HttpResponse::Created().json(PunchResponse {
                log_id: receipt.log.id,
                employee_id: receipt.log.employee_id,
                employee_name: receipt.employee_name,
                site_id: receipt.log.site_id,
                direction: receipt.direction,
                timestamp: receipt.log.timestamp,
                view: session.view(),
            })
        }
        Err(e) => session_failure(e),
    }
}

/// Cancel the confirmation and return to the keypad
#[utoipa::path(
    post,
    path = "/kiosk/back",
    responses(
        (status = 200, description = "Back on the keypad", body = KioskView),
        (status = 409, description = "Nothing to cancel")
    ),
    tag = "Kiosk"
)]
pub async fn go_back(kiosk: web::Data<KioskHandle>) -> impl Responder {
    let mut session = kiosk.lock().await;
    match session.back() {
        Ok(()) => HttpResponse::Ok().json(session.view()),
        Err(e) => session_failure(e),
    }
}
