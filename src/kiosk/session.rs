use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use derive_more::Display;
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::gate::AdminGate,
    kiosk::{camera::Camera, snapshot},
    model::{
        employee::{Employee, SUFFIX_LEN},
        time_log::{Direction, TimeLog, next_direction},
    },
    store::{RecordStore, StoreError},
};

const LOOKUP_ERROR_SECS: i64 = 2;
const PUNCH_DONE_SECS: i64 = 3;
const CAMERA_ERROR_SECS: i64 = 3;

pub const MSG_NOT_FOUND: &str = "Funcionário não encontrado.";
pub const MSG_NO_SITE: &str = "Selecione uma obra antes de registrar.";
pub const MSG_CAMERA: &str = "Erro na câmera. Verifique permissões.";
pub const MSG_BAD_PIN: &str = "PIN Incorreto";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KioskState {
    #[display(fmt = "IDENTIFY")]
    Identify,
    #[display(fmt = "CONFIRM")]
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// Punch IN recorded.
    Success,
    /// Punch OUT recorded.
    Exit,
    Error,
    Info,
}

/// Banner shown on the kiosk until `expires_at`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    #[schema(value_type = String, format = DateTime)]
    pub expires_at: DateTime<Utc>,
    #[serde(skip)]
    clears_input: bool,
}

#[derive(Debug, Display)]
pub enum SessionError {
    #[display(fmt = "kiosk is not in {} state", expected)]
    WrongState { expected: KioskState },
    #[display(fmt = "'{}' is not a keypad digit", _0)]
    NotADigit(char),
    #[display(fmt = "unknown site {}", _0)]
    UnknownSite(String),
    #[display(fmt = "no work site selected")]
    MissingSite,
    #[display(fmt = "camera is not ready")]
    CameraNotReady,
    #[display(fmt = "admin PIN rejected")]
    PinRejected,
    #[display(fmt = "{}", _0)]
    Store(StoreError),
}

impl std::error::Error for SessionError {}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::Store(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeypadOutcome {
    /// Digit accepted; this many entered so far.
    Pending(usize),
    /// Input is full and waiting for its error banner to clear.
    Ignored,
    NotFound,
    Identified { employee_id: String },
}

#[derive(Debug, Clone)]
pub struct PunchReceipt {
    pub log: TimeLog,
    pub employee_name: String,
    pub direction: Direction,
}

/// Snapshot of what the kiosk screen should show.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KioskView {
    pub state: KioskState,
    pub digits_entered: usize,
    #[schema(nullable = true)]
    pub employee_first_name: Option<String>,
    #[schema(nullable = true)]
    pub site_id: Option<String>,
    pub camera_ready: bool,
    #[schema(nullable = true)]
    pub status: Option<StatusMessage>,
}

/// The punch-clock conversation of one kiosk: IDENTIFY collects the phone
/// suffix, CONFIRM holds the camera until the punch is committed or
/// cancelled. The camera is released on every path back to IDENTIFY and when
/// the session is dropped.
pub struct PunchSession<C: Camera> {
    store: Arc<RecordStore>,
    gate: Arc<dyn AdminGate>,
    camera: C,
    camera_live: bool,
    state: KioskState,
    input: String,
    employee: Option<Employee>,
    site_id: Option<String>,
    status: Option<StatusMessage>,
}

impl<C: Camera> PunchSession<C> {
    pub fn new(store: Arc<RecordStore>, gate: Arc<dyn AdminGate>, camera: C) -> Self {
        Self {
            store,
            gate,
            camera,
            camera_live: false,
            state: KioskState::Identify,
            input: String::new(),
            employee: None,
            site_id: None,
            status: None,
        }
    }

    pub fn state(&self) -> KioskState {
        self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    #[cfg(test)]
    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    pub fn view(&self) -> KioskView {
        KioskView {
            state: self.state,
            digits_entered: self.input.len(),
            employee_first_name: self.employee.as_ref().map(|e| e.first_name().to_string()),
            site_id: self.site_id.clone(),
            camera_ready: self.camera_live && self.camera.is_ready(),
            status: self.status.clone(),
        }
    }

    /// Expires the banner once its window has passed. A lookup failure
    /// clears the typed digits at the same moment.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if let Some(status) = &self.status {
            if now >= status.expires_at {
                if status.clears_input {
                    self.input.clear();
                }
                self.status = None;
            }
        }
    }

    pub async fn press_digit(
        &mut self,
        digit: char,
        now: DateTime<Utc>,
    ) -> Result<KeypadOutcome, SessionError> {
        self.tick(now);
        self.expect_state(KioskState::Identify)?;
        if !digit.is_ascii_digit() {
            return Err(SessionError::NotADigit(digit));
        }
        if self.input.len() >= SUFFIX_LEN {
            return Ok(KeypadOutcome::Ignored);
        }

        self.input.push(digit);
        if self.input.len() < SUFFIX_LEN {
            return Ok(KeypadOutcome::Pending(self.input.len()));
        }

        let suffix = self.input.clone();
        let employees = self.store.employees().await?;
        let mut matches = employees.into_iter().filter(|e| e.matches_suffix(&suffix));
        let Some(employee) = matches.next() else {
            info!("No active employee for entered suffix");
            self.show(StatusKind::Error, MSG_NOT_FOUND, now, LOOKUP_ERROR_SECS, true);
            return Ok(KeypadOutcome::NotFound);
        };
        if let Some(other) = matches.next() {
            warn!(
                employee_id = %employee.id,
                other_id = %other.id,
                "Suffix matches several active employees, using the first in the roster"
            );
        }

        let employee_id = employee.id.clone();
        self.enter_confirm(employee, now).await?;
        Ok(KeypadOutcome::Identified { employee_id })
    }

    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.expect_state(KioskState::Identify)?;
        self.input.clear();
        if self.status.as_ref().is_some_and(|s| s.clears_input) {
            self.status = None;
        }
        Ok(())
    }

    pub async fn select_site(&mut self, site_id: &str) -> Result<(), SessionError> {
        let sites = self.store.sites().await?;
        if !sites.iter().any(|s| s.id == site_id) {
            return Err(SessionError::UnknownSite(site_id.to_string()));
        }
        self.site_id = Some(site_id.to_string());
        Ok(())
    }

    /// Commits the punch for the identified employee. Direction is the
    /// opposite of that employee's most recent log, IN when there is none.
    pub async fn confirm(&mut self, now: DateTime<Utc>) -> Result<PunchReceipt, SessionError> {
        self.tick(now);
        self.expect_state(KioskState::Confirm)?;

        let Some(site_id) = self.site_id.clone() else {
            self.show(StatusKind::Error, MSG_NO_SITE, now, PUNCH_DONE_SECS, false);
            return Err(SessionError::MissingSite);
        };
        // the site may have been removed from the back-office since it was picked
        if !self.store.sites().await?.iter().any(|s| s.id == site_id) {
            warn!(site_id = %site_id, "Selected site no longer exists");
            self.site_id = None;
            self.show(StatusKind::Error, MSG_NO_SITE, now, PUNCH_DONE_SECS, false);
            return Err(SessionError::MissingSite);
        }
        if !(self.camera_live && self.camera.is_ready()) {
            return Err(SessionError::CameraNotReady);
        }
        let Some(employee) = self.employee.clone() else {
            return Err(SessionError::WrongState {
                expected: KioskState::Confirm,
            });
        };

        let photo_snapshot = match self.camera.grab_frame() {
            Some(frame) => snapshot::encode(&frame).unwrap_or_else(|e| {
                warn!(error = %e, employee_id = %employee.id, "Snapshot encoding failed");
                String::new()
            }),
            None => String::new(),
        };

        let logs = self.store.logs().await?;
        let direction = next_direction(&logs, &employee.id);

        let log = TimeLog {
            id: Uuid::new_v4().to_string(),
            employee_id: employee.id.clone(),
            site_id,
            timestamp: now.timestamp_millis(),
            direction,
            photo_snapshot,
        };
        self.store.add_log(log.clone()).await?;

        let kind = match direction {
            Direction::In => StatusKind::Success,
            Direction::Out => StatusKind::Exit,
        };
        let text = format!(
            "Olá, {}! {} registrada.",
            employee.first_name(),
            direction.label()
        );
        self.reset();
        self.show(kind, &text, now, PUNCH_DONE_SECS, false);

        Ok(PunchReceipt {
            log,
            employee_name: employee.name,
            direction,
        })
    }

    /// Leaves CONFIRM without recording anything.
    pub fn back(&mut self) -> Result<(), SessionError> {
        self.expect_state(KioskState::Confirm)?;
        self.reset();
        self.status = None;
        Ok(())
    }

    /// Back-office access check, only offered on the keypad screen.
    pub fn unlock_admin(&mut self, pin: &str, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.expect_state(KioskState::Identify)?;
        if self.gate.check(pin) {
            Ok(())
        } else {
            self.show(StatusKind::Error, MSG_BAD_PIN, now, LOOKUP_ERROR_SECS, false);
            Err(SessionError::PinRejected)
        }
    }

    async fn enter_confirm(
        &mut self,
        employee: Employee,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        let sites = self.store.sites().await?;
        let site_known = self
            .site_id
            .as_ref()
            .is_some_and(|id| sites.iter().any(|s| &s.id == id));
        if !site_known {
            self.site_id = sites.first().map(|s| s.id.clone());
        }

        info!(employee_id = %employee.id, "Employee identified");
        self.employee = Some(employee);
        self.state = KioskState::Confirm;

        match self.camera.start() {
            Ok(()) => self.camera_live = true,
            Err(e) => {
                warn!(error = %e, "Camera could not be started");
                self.camera_live = false;
                self.show(StatusKind::Error, MSG_CAMERA, now, CAMERA_ERROR_SECS, false);
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.release_camera();
        self.state = KioskState::Identify;
        self.input.clear();
        self.employee = None;
    }

    fn release_camera(&mut self) {
        if self.camera_live {
            self.camera.stop();
            self.camera_live = false;
        }
    }

    fn show(&mut self, kind: StatusKind, text: &str, now: DateTime<Utc>, secs: i64, clears: bool) {
        self.status = Some(StatusMessage {
            kind,
            text: text.to_string(),
            expires_at: now + Duration::seconds(secs),
            clears_input: clears,
        });
    }

    fn expect_state(&self, expected: KioskState) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::WrongState { expected })
        }
    }
}

impl<C: Camera> Drop for PunchSession<C> {
    fn drop(&mut self) {
        self.release_camera();
    }
}
