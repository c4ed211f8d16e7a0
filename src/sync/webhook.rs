use chrono::TimeZone;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::{
    model::{employee::Employee, site::Site, time_log::TimeLog},
    utils::locale,
};

/// Row appended to the spreadsheet by the receiving web-app script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetRow {
    pub data: String,
    pub hora: String,
    pub funcionario: String,
    pub tipo: String,
    pub obra: String,
    pub foto: String,
}

impl SheetRow {
    pub fn from_log<Tz: TimeZone>(
        log: &TimeLog,
        employees: &[Employee],
        sites: &[Site],
        tz: &Tz,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let at = locale::from_millis(tz, log.timestamp);
        let funcionario = employees
            .iter()
            .find(|e| e.id == log.employee_id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| "Desconhecido".into());
        let obra = sites
            .iter()
            .find(|s| s.id == log.site_id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| "Desconhecida".into());

        Self {
            data: at.as_ref().map(locale::date_br).unwrap_or_default(),
            hora: at.as_ref().map(locale::time_br).unwrap_or_default(),
            funcionario,
            tipo: log.direction.label().to_string(),
            obra,
            foto: log.photo_snapshot.clone(),
        }
    }
}

/// Hands a committed punch to the outside world. Implementations must return
/// immediately; delivery happens (or fails) on its own.
pub trait PunchForwarder: Send + Sync {
    fn forward(&self, url: &str, row: SheetRow);
}

pub struct WebhookForwarder {
    client: reqwest::Client,
}

impl WebhookForwarder {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl PunchForwarder for WebhookForwarder {
    fn forward(&self, url: &str, row: SheetRow) {
        let client = self.client.clone();
        let url = url.to_string();

        actix_web::rt::spawn(async move {
            debug!(funcionario = %row.funcionario, tipo = %row.tipo, "Forwarding punch to spreadsheet");
            match client.post(&url).json(&row).send().await {
                Ok(resp) => info!(status = %resp.status(), "Punch forwarded to spreadsheet"),
                Err(e) => error!(error = %e, "Spreadsheet sync failed"),
            }
        });
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::{PunchForwarder, SheetRow};

    /// Captures forwarded rows instead of sending them.
    #[derive(Default)]
    pub struct RecordingForwarder {
        pub sent: Mutex<Vec<(String, SheetRow)>>,
    }

    impl RecordingForwarder {
        pub fn sent(&self) -> Vec<(String, SheetRow)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl PunchForwarder for RecordingForwarder {
        fn forward(&self, url: &str, row: SheetRow) {
            self.sent.lock().unwrap().push((url.to_string(), row));
        }
    }
}
