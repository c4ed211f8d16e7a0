use crate::{
    api::{message, store_failure},
    auth::auth::AuthUser,
    model::{
        employee::{Employee, SUFFIX_LEN, Schedule},
        role::EmployeeRole,
    },
    store::{RecordStore, RosterWrite},
};
use actix_web::{HttpResponse, Responder, http::StatusCode, web};
use chrono::NaiveTime;
use derive_more::Display;
use serde::Deserialize;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

const SUFFIX_TAKEN: &str = "Phone suffix already used by another active employee";

/// Create/replace payload. Missing optional fields take the roster defaults.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    #[schema(example = "João Pereira")]
    pub name: String,
    #[schema(example = "(11) 97777-4321")]
    pub phone: String,
    #[serde(default)]
    #[schema(example = "joao@obra.com")]
    pub email: String,
    #[serde(default)]
    pub role: EmployeeRole,
    #[schema(example = 28.5)]
    pub hourly_rate: f64,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    #[schema(nullable = true)]
    pub photo_url: Option<String>,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Display, PartialEq)]
pub enum ValidationError {
    #[display(fmt = "Name must not be empty")]
    EmptyName,
    #[display(fmt = "Phone must contain at least {} digits", SUFFIX_LEN)]
    ShortPhone,
    #[display(fmt = "Hourly rate must be a non-negative number")]
    BadRate,
    #[display(fmt = "Schedule time '{}' is not HH:MM", _0)]
    BadTime(String),
}

impl std::error::Error for ValidationError {}

fn valid_time(raw: &str) -> bool {
    raw.len() == 5 && NaiveTime::parse_from_str(raw, "%H:%M").is_ok()
}

impl EmployeeInput {
    pub fn into_employee(self, id: String) -> Result<Employee, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        // keypad only types digits
        let phone: String = self.phone.chars().filter(char::is_ascii_digit).collect();
        if phone.len() < SUFFIX_LEN {
            return Err(ValidationError::ShortPhone);
        }

        if !self.hourly_rate.is_finite() || self.hourly_rate < 0.0 {
            return Err(ValidationError::BadRate);
        }

        for time in [&self.schedule.start, &self.schedule.end] {
            if !valid_time(time) {
                return Err(ValidationError::BadTime(time.clone()));
            }
        }

        Ok(Employee {
            id,
            name,
            phone,
            email: self.email.trim().to_string(),
            role: self.role,
            hourly_rate: self.hourly_rate,
            schedule: self.schedule,
            photo_url: self.photo_url.filter(|url| !url.trim().is_empty()),
            active: self.active,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmployeeQuery {
    /// Case-insensitive match on name or role label.
    pub search: Option<String>,
}

fn matches_search(employee: &Employee, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    needle.is_empty()
        || employee.name.to_lowercase().contains(&needle)
        || employee.role.as_ref().to_lowercase().contains(&needle)
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::post().to(create_employee))
            .route(web::get().to(list_employees)),
    )
    .service(
        web::resource("/{id}")
            .route(web::put().to(update_employee))
            .route(web::get().to(get_employee))
            .route(web::delete().to(delete_employee)),
    );
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = EmployeeInput,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "message": "Name must not be empty"
        })),
        (status = 409, description = "Phone suffix clash", body = Object, example = json!({
            "message": SUFFIX_TAKEN
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "message": "Something went wrong, Contact with system admin"
        }))
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    auth: AuthUser,
    store: web::Data<RecordStore>,
    payload: web::Json<EmployeeInput>,
) -> impl Responder {
    let employee = match payload
        .into_inner()
        .into_employee(Uuid::new_v4().to_string())
    {
        Ok(employee) => employee,
        Err(e) => return message(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match store.insert_employee(employee.clone()).await {
        Ok(RosterWrite::Saved) => {
            info!(actor = %auth.subject, employee_id = %employee.id, "Employee added to roster");
            HttpResponse::Created().json(employee)
        }
        Ok(RosterWrite::SuffixTaken { .. }) => message(StatusCode::CONFLICT, SUFFIX_TAKEN),
        Ok(RosterWrite::NotFound) => message(StatusCode::NOT_FOUND, "Employee not found"),
        Err(e) => store_failure(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Roster in insertion order", body = [Employee])
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    store: web::Data<RecordStore>,
    query: web::Query<EmployeeQuery>,
) -> impl Responder {
    let employees = match store.employees().await {
        Ok(employees) => employees,
        Err(e) => return store_failure(&e),
    };

    let filtered: Vec<Employee> = match &query.search {
        Some(search) => employees
            .into_iter()
            .filter(|e| matches_search(e, search))
            .collect(),
        None => employees,
    };
    debug!(count = filtered.len(), search = ?query.search, "Listing employees");

    HttpResponse::Ok().json(filtered)
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(("id" = String, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_employee(store: web::Data<RecordStore>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    match store.employees().await {
        Ok(employees) => match employees.into_iter().find(|e| e.id == id) {
            Some(employee) => HttpResponse::Ok().json(employee),
            None => message(StatusCode::NOT_FOUND, "Employee not found"),
        },
        Err(e) => store_failure(&e),
    }
}

/// Replace an employee record in full
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(("id" = String, Path, description = "Employee id")),
    request_body = EmployeeInput,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Phone suffix clash")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn update_employee(
    auth: AuthUser,
    store: web::Data<RecordStore>,
    path: web::Path<String>,
    payload: web::Json<EmployeeInput>,
) -> impl Responder {
    let employee = match payload.into_inner().into_employee(path.into_inner()) {
        Ok(employee) => employee,
        Err(e) => return message(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match store.replace_employee(employee.clone()).await {
        Ok(RosterWrite::Saved) => {
            info!(actor = %auth.subject, employee_id = %employee.id, "Employee record replaced");
            HttpResponse::Ok().json(employee)
        }
        Ok(RosterWrite::NotFound) => message(StatusCode::NOT_FOUND, "Employee not found"),
        Ok(RosterWrite::SuffixTaken { .. }) => message(StatusCode::CONFLICT, SUFFIX_TAKEN),
        Err(e) => store_failure(&e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(("id" = String, Path, description = "Employee id")),
    responses(
        (status = 204, description = "Employee removed"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn delete_employee(
    auth: AuthUser,
    store: web::Data<RecordStore>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    match store.delete_employee(&id).await {
        Ok(true) => {
            info!(actor = %auth.subject, employee_id = %id, "Employee removed from roster");
            HttpResponse::NoContent().finish()
        }
        Ok(false) => message(StatusCode::NOT_FOUND, "Employee not found"),
        Err(e) => store_failure(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::testing, auth::middleware::auth_middleware};
    use actix_web::{App, middleware::from_fn, test};
    use serde_json::{Value, json};

    macro_rules! roster_app {
        ($store:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(testing::config()))
                    .app_data(web::Data::from($store.clone()))
                    .service(
                        web::scope("/api/employees")
                            .wrap(from_fn(auth_middleware))
                            .configure(routes),
                    ),
            )
            .await
        };
    }

    fn input(name: &str, phone: &str) -> EmployeeInput {
        serde_json::from_value(json!({ "name": name, "phone": phone, "hourlyRate": 20.0 })).unwrap()
    }

    #[actix_web::test]
    async fn input_defaults_and_normalisation() {
        let employee = input("  João Pereira ", "(11) 97777-4321")
            .into_employee("x".into())
            .unwrap();
        assert_eq!(employee.name, "João Pereira");
        assert_eq!(employee.phone, "11977774321");
        assert_eq!(employee.role, EmployeeRole::Worker);
        assert_eq!(employee.schedule, Schedule::default());
        assert!(employee.active);
    }

    #[actix_web::test]
    async fn validation_rules() {
        assert_eq!(
            input(" ", "11977774321").into_employee("x".into()),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            input("Rui", "12-3").into_employee("x".into()),
            Err(ValidationError::ShortPhone)
        );

        let mut bad_rate = input("Rui", "11977774321");
        bad_rate.hourly_rate = f64::NAN;
        assert_eq!(bad_rate.into_employee("x".into()), Err(ValidationError::BadRate));

        let mut bad_time = input("Rui", "11977774321");
        bad_time.schedule.end = "5pm".into();
        assert_eq!(
            bad_time.into_employee("x".into()),
            Err(ValidationError::BadTime("5pm".into()))
        );
    }

    #[actix_web::test]
    async fn requests_without_token_are_rejected() {
        let (store, _) = testing::store();
        let app = roster_app!(store);

        let req = test::TestRequest::get().uri("/api/employees").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn create_search_update_delete() {
        let (store, _) = testing::store();
        let app = roster_app!(store);

        let req = test::TestRequest::post()
            .uri("/api/employees")
            .insert_header(testing::bearer())
            .set_json(json!({
                "name": "João Pereira",
                "phone": "11977774321",
                "role": "Operário",
                "hourlyRate": 28.5
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["hourlyRate"], 28.5);

        let req = test::TestRequest::get()
            .uri("/api/employees?search=engen")
            .insert_header(testing::bearer())
            .to_request();
        let found: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found.as_array().map(Vec::len), Some(1));
        assert_eq!(found[0]["name"], "Ana Souza");

        let req = test::TestRequest::put()
            .uri(&format!("/api/employees/{id}"))
            .insert_header(testing::bearer())
            .set_json(json!({
                "name": "João P. Pereira",
                "phone": "11977774321",
                "hourlyRate": 30.0,
                "active": false
            }))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["active"], false);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/employees/{id}"))
            .insert_header(testing::bearer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri(&format!("/api/employees/{id}"))
            .insert_header(testing::bearer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn suffix_clash_is_a_conflict() {
        let (store, _) = testing::store();
        let app = roster_app!(store);

        // Carlos Silva already logs in with 1234
        let req = test::TestRequest::post()
            .uri("/api/employees")
            .insert_header(testing::bearer())
            .set_json(json!({ "name": "Rui", "phone": "21900001234", "hourlyRate": 20.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::put()
            .uri("/api/employees/nope")
            .insert_header(testing::bearer())
            .set_json(json!({ "name": "Rui", "phone": "21900009999", "hourlyRate": 20.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
