use crate::{
    api::{message, store_failure},
    auth::auth::AuthUser,
    model::site::Site,
    store::RecordStore,
};
use actix_web::{HttpResponse, Responder, http::StatusCode, web};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct CreateSite {
    #[schema(example = "Galpão Logístico Norte")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "Rod. Anhanguera, km 30")]
    pub address: String,
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(list_sites))
            .route(web::post().to(create_site)),
    )
    .service(web::resource("/{id}").route(web::delete().to(delete_site)));
}

#[utoipa::path(
    get,
    path = "/api/sites",
    responses((status = 200, description = "All work sites", body = [Site])),
    tag = "Site",
    security(("bearer_auth" = []))
)]
pub async fn list_sites(store: web::Data<RecordStore>) -> impl Responder {
    match store.sites().await {
        Ok(sites) => HttpResponse::Ok().json(sites),
        Err(e) => store_failure(&e),
    }
}

#[utoipa::path(
    post,
    path = "/api/sites",
    request_body = CreateSite,
    responses(
        (status = 201, description = "Site created", body = Site),
        (status = 400, description = "Name missing")
    ),
    tag = "Site",
    security(("bearer_auth" = []))
)]
pub async fn create_site(
    auth: AuthUser,
    store: web::Data<RecordStore>,
    payload: web::Json<CreateSite>,
) -> impl Responder {
    let name = payload.name.trim();
    if name.is_empty() {
        return message(StatusCode::BAD_REQUEST, "Site name must not be empty");
    }

    let site = Site {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        address: payload.address.trim().to_string(),
        active: true,
    };
    match store.add_site(site.clone()).await {
        Ok(()) => {
            info!(actor = %auth.subject, site_id = %site.id, "Site added");
            HttpResponse::Created().json(site)
        }
        Err(e) => store_failure(&e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/sites/{id}",
    params(("id" = String, Path, description = "Site id")),
    responses(
        (status = 204, description = "Site removed"),
        (status = 404, description = "Site not found")
    ),
    tag = "Site",
    security(("bearer_auth" = []))
)]
pub async fn delete_site(
    auth: AuthUser,
    store: web::Data<RecordStore>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    match store.delete_site(&id).await {
        Ok(true) => {
            info!(actor = %auth.subject, site_id = %id, "Site removed");
            HttpResponse::NoContent().finish()
        }
        Ok(false) => message(StatusCode::NOT_FOUND, "Site not found"),
        Err(e) => store_failure(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::testing, auth::middleware::auth_middleware};
    use actix_web::{App, middleware::from_fn, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn create_list_delete() {
        let (store, _) = testing::store();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(testing::config()))
                .app_data(web::Data::from(store.clone()))
                .service(
                    web::scope("/api/sites")
                        .wrap(from_fn(auth_middleware))
                        .configure(routes),
                ),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/sites")
            .insert_header(testing::bearer())
            .set_json(json!({ "name": "  " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/sites")
            .insert_header(testing::bearer())
            .set_json(json!({ "name": "Galpão Norte" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created["active"], true);
        assert_eq!(created["address"], "");

        let req = test::TestRequest::get()
            .uri("/api/sites")
            .insert_header(testing::bearer())
            .to_request();
        let sites: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(sites.as_array().map(Vec::len), Some(3));
        assert_eq!(sites[2]["name"], "Galpão Norte");

        let req = test::TestRequest::delete()
            .uri("/api/sites/1")
            .insert_header(testing::bearer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::delete()
            .uri("/api/sites/1")
            .insert_header(testing::bearer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
