use crate::api::assistant::{AssistantAnswer, AssistantQuestion};
use crate::api::employee::EmployeeInput;
use crate::api::kiosk::{CameraFrame, KeypadPress, KeypadResponse, PunchResponse, SiteSelection};
use crate::api::site::CreateSite;
use crate::kiosk::session::{KioskState, KioskView, StatusKind, StatusMessage};
use crate::model::employee::{Employee, Schedule};
use crate::model::role::EmployeeRole;
use crate::model::settings::AppSettings;
use crate::model::site::Site;
use crate::model::time_log::{Direction, TimeLog};
use crate::models::{PinLoginReq, TokenPair};
use crate::report::{DashboardStats, DayHours, EmployeeWeek, PayrollStats};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Site Punch API",
        version = "1.0.0",
        description = r#"
## Construction-site time clock

A shared kiosk where crew members punch in and out by typing the last four
digits of their phone, plus the back-office used to manage the roster.

### 🔹 Key Features
- **Kiosk**
  - Keypad identification, site selection, photo snapshot, automatic IN/OUT
- **Roster & Sites**
  - Create, update, list and remove employees and work sites
- **Reports**
  - Today's attendance, hours per day, weekly hours and labor cost
- **Spreadsheet sync**
  - Every punch is forwarded to a configured webhook
- **Assistant**
  - Free-form questions answered over the roster and recent punches

### 🔐 Security
Kiosk routes are public. The back-office requires a **JWT Bearer** token
obtained with the admin PIN.
"#,
    ),
    paths(
        crate::api::kiosk::current_view,
        crate::api::kiosk::list_sites,
        crate::api::kiosk::press_key,
        crate::api::kiosk::clear_input,
        crate::api::kiosk::select_site,
        crate::api::kiosk::push_frame,
        crate::api::kiosk::confirm_punch,
        crate::api::kiosk::go_back,

        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::site::list_sites,
        crate::api::site::create_site,
        crate::api::site::delete_site,

        crate::api::time_log::list_logs,
        crate::api::dashboard::dashboard,
        crate::api::dashboard::payroll,
        crate::api::settings::get_settings,
        crate::api::settings::update_settings,
        crate::api::assistant::ask
    ),
    components(
        schemas(
            KioskView,
            KioskState,
            StatusKind,
            StatusMessage,
            KeypadPress,
            KeypadResponse,
            SiteSelection,
            CameraFrame,
            PunchResponse,
            PinLoginReq,
            TokenPair,
            Employee,
            EmployeeRole,
            Schedule,
            EmployeeInput,
            Site,
            CreateSite,
            TimeLog,
            Direction,
            DashboardStats,
            DayHours,
            PayrollStats,
            EmployeeWeek,
            AppSettings,
            AssistantQuestion,
            AssistantAnswer
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Kiosk", description = "Punch-clock terminal"),
        (name = "Auth", description = "Admin PIN login and token rotation"),
        (name = "Employee", description = "Roster management"),
        (name = "Site", description = "Work site management"),
        (name = "TimeLog", description = "Recorded punches"),
        (name = "Report", description = "Dashboard and payroll figures"),
        (name = "Settings", description = "Spreadsheet sync configuration"),
        (name = "Assistant", description = "AI questions over the records"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_kiosk_and_back_office() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/kiosk/keypad"));
        assert!(doc.paths.paths.contains_key("/api/employees/{id}"));
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"))
        );
    }
}
