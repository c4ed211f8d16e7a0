use crate::{
    api::{INTERNAL_ERROR, message, session_failure},
    auth::jwt::{generate_access_token, generate_refresh_token, verify_token},
    config::Config,
    kiosk::KioskHandle,
    models::{Claims, PinLoginReq, TokenPair, TokenType},
    utils::token_blocklist,
};
use actix_web::{HttpRequest, HttpResponse, Responder, http::StatusCode, web};
use chrono::Utc;
use tracing::{debug, error, info, instrument};

fn issue_pair(config: &Config) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    let access_token = generate_access_token(&config.jwt_secret, config.access_token_ttl)?;
    let (refresh_token, claims) =
        generate_refresh_token(&config.jwt_secret, config.refresh_token_ttl)?;
    debug!(jti = %claims.jti, "Refresh token issued");
    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn refresh_claims(req: &HttpRequest, config: &Config) -> Option<Claims> {
    let claims = verify_token(bearer(req)?, &config.jwt_secret).ok()?;
    (claims.token_type == TokenType::Refresh).then_some(claims)
}

/// Admin PIN login from the kiosk keypad screen
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = PinLoginReq,
    responses(
        (status = 200, description = "PIN accepted", body = TokenPair),
        (status = 401, description = "PIN rejected", body = Object, example = json!({
            "message": "PIN Incorreto"
        })),
        (status = 409, description = "Kiosk is confirming a punch")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip_all)]
pub async fn login(
    payload: web::Json<PinLoginReq>,
    kiosk: web::Data<KioskHandle>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Admin login requested");

    if payload.pin.trim().is_empty() {
        return message(StatusCode::BAD_REQUEST, "PIN required");
    }

    let unlocked = kiosk.lock().await.unlock_admin(&payload.pin, Utc::now());
    if let Err(e) = unlocked {
        info!(error = %e, "Admin login refused");
        return session_failure(e);
    }

    match issue_pair(&config) {
        Ok(pair) => {
            info!("Admin login successful");
            HttpResponse::Ok().json(pair)
        }
        Err(e) => {
            error!(error = %e, "Failed to sign admin tokens");
            message(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
        }
    }
}

/// Rotate the refresh token sent as Bearer
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Missing, invalid or revoked refresh token")
    ),
    tag = "Auth",
    security(("bearer_auth" = []))
)]
pub async fn refresh_token(req: HttpRequest, config: web::Data<Config>) -> impl Responder {
    let Some(claims) = refresh_claims(&req, &config) else {
        return message(StatusCode::UNAUTHORIZED, "Refresh token required");
    };

    if token_blocklist::is_revoked(&claims.jti).await {
        info!(jti = %claims.jti, "Revoked refresh token presented");
        return message(StatusCode::UNAUTHORIZED, "Refresh token revoked");
    }

    // one use per refresh token
    token_blocklist::revoke(&claims.jti, claims.exp).await;

    match issue_pair(&config) {
        Ok(pair) => HttpResponse::Ok().json(pair),
        Err(e) => {
            error!(error = %e, "Failed to sign admin tokens");
            message(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
        }
    }
}

/// Revoke the refresh token sent as Bearer. Always succeeds.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Logged out")),
    tag = "Auth",
    security(("bearer_auth" = []))
)]
pub async fn logout(req: HttpRequest, config: web::Data<Config>) -> impl Responder {
    if let Some(claims) = refresh_claims(&req, &config) {
        token_blocklist::revoke(&claims.jti, claims.exp).await;
        info!(jti = %claims.jti, "Admin logged out");
    }
    HttpResponse::NoContent().finish()
}
