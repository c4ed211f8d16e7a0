//! Record store: the four keyed documents (employees, sites, logs, settings)
//! and the only place that writes them.

pub mod backend;
pub mod seed;

use std::sync::Arc;

use chrono::Local;
use derive_more::Display;
use futures::lock::Mutex;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, error, info, warn};

use crate::{
    model::{employee::Employee, settings::AppSettings, site::Site, time_log::TimeLog},
    sync::webhook::{PunchForwarder, SheetRow},
};
use backend::StorageBackend;

pub const EMPLOYEES_KEY: &str = "cp_employees";
pub const SITES_KEY: &str = "cp_sites";
pub const LOGS_KEY: &str = "cp_logs";
pub const SETTINGS_KEY: &str = "cp_settings";

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "storage backend failure: {}", _0)]
    Backend(anyhow::Error),
    #[display(fmt = "malformed {} document: {}", key, source)]
    Malformed {
        key: &'static str,
        source: serde_json::Error,
    },
}

impl std::error::Error for StoreError {}

/// Result of an admin write to the roster.
#[derive(Debug, PartialEq)]
pub enum RosterWrite {
    Saved,
    NotFound,
    /// Another active employee already logs in with the same four digits.
    SuffixTaken { holder_id: String },
}

pub struct RecordStore {
    backend: Arc<dyn StorageBackend>,
    forwarder: Arc<dyn PunchForwarder>,
    // read-modify-write cycles go through here
    writer: Mutex<()>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn StorageBackend>, forwarder: Arc<dyn PunchForwarder>) -> Self {
        Self {
            backend,
            forwarder,
            writer: Mutex::new(()),
        }
    }

    async fn read<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, StoreError> {
        let raw = self.backend.load(key).await.map_err(StoreError::Backend)?;
        match raw {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Malformed { key, source }),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize + ?Sized>(
        &self,
        key: &'static str,
        value: &T,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|e| StoreError::Backend(e.into()))?;
        self.backend
            .store(key, raw)
            .await
            .map_err(StoreError::Backend)
    }

    // ---------- employees ----------

    /// Roster in insertion order; the seed roster until one has been saved.
    pub async fn employees(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(self
            .read(EMPLOYEES_KEY)
            .await?
            .unwrap_or_else(seed::employees))
    }

    pub async fn save_employees(&self, employees: &[Employee]) -> Result<(), StoreError> {
        self.write(EMPLOYEES_KEY, employees).await
    }

    pub async fn insert_employee(&self, employee: Employee) -> Result<RosterWrite, StoreError> {
        let _guard = self.writer.lock().await;
        let mut roster = self.employees().await?;

        if let Some(holder) = suffix_holder(&roster, &employee) {
            return Ok(RosterWrite::SuffixTaken {
                holder_id: holder.id.clone(),
            });
        }

        info!(employee_id = %employee.id, "Employee created");
        roster.push(employee);
        self.save_employees(&roster).await?;
        Ok(RosterWrite::Saved)
    }

    pub async fn replace_employee(&self, employee: Employee) -> Result<RosterWrite, StoreError> {
        let _guard = self.writer.lock().await;
        let mut roster = self.employees().await?;

        let Some(index) = roster.iter().position(|e| e.id == employee.id) else {
            return Ok(RosterWrite::NotFound);
        };
        if let Some(holder) = suffix_holder(&roster, &employee) {
            return Ok(RosterWrite::SuffixTaken {
                holder_id: holder.id.clone(),
            });
        }

        info!(employee_id = %employee.id, "Employee updated");
        roster[index] = employee;
        self.save_employees(&roster).await?;
        Ok(RosterWrite::Saved)
    }

    pub async fn delete_employee(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.writer.lock().await;
        let mut roster = self.employees().await?;
        let before = roster.len();
        roster.retain(|e| e.id != id);
        if roster.len() == before {
            return Ok(false);
        }
        self.save_employees(&roster).await?;
        info!(employee_id = %id, "Employee deleted");
        Ok(true)
    }

    // ---------- sites ----------

    pub async fn sites(&self) -> Result<Vec<Site>, StoreError> {
        Ok(self.read(SITES_KEY).await?.unwrap_or_else(seed::sites))
    }

    pub async fn save_sites(&self, sites: &[Site]) -> Result<(), StoreError> {
        self.write(SITES_KEY, sites).await
    }

    pub async fn add_site(&self, site: Site) -> Result<(), StoreError> {
        let _guard = self.writer.lock().await;
        let mut sites = self.sites().await?;
        info!(site_id = %site.id, name = %site.name, "Site created");
        sites.push(site);
        self.save_sites(&sites).await
    }

    pub async fn delete_site(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.writer.lock().await;
        let mut sites = self.sites().await?;
        let before = sites.len();
        sites.retain(|s| s.id != id);
        if sites.len() == before {
            return Ok(false);
        }
        self.save_sites(&sites).await?;
        info!(site_id = %id, "Site deleted");
        Ok(true)
    }

    // ---------- logs ----------

    pub async fn logs(&self) -> Result<Vec<TimeLog>, StoreError> {
        Ok(self.read(LOGS_KEY).await?.unwrap_or_default())
    }

    /// Appends one punch, then hands it to the spreadsheet forwarder when a
    /// webhook is configured. Forwarding never blocks or fails the append.
    pub async fn add_log(&self, log: TimeLog) -> Result<(), StoreError> {
        {
            let _guard = self.writer.lock().await;
            let mut logs = self.logs().await?;
            logs.push(log.clone());
            self.write(LOGS_KEY, &logs).await?;
        }
        info!(
            employee_id = %log.employee_id,
            site_id = %log.site_id,
            direction = log.direction.as_ref(),
            "Punch recorded"
        );

        // the punch is durable from here on
        if let Err(e) = self.forward_punch(&log).await {
            error!(error = %e, log_id = %log.id, "Spreadsheet sync skipped");
        }
        Ok(())
    }

    async fn forward_punch(&self, log: &TimeLog) -> Result<(), StoreError> {
        let settings = self.settings().await?;
        let Some(url) = settings.webhook_url() else {
            debug!("No spreadsheet webhook configured, skipping sync");
            return Ok(());
        };

        let employees = self.employees().await?;
        let sites = self.sites().await?;
        let row = SheetRow::from_log(log, &employees, &sites, &Local);
        self.forwarder.forward(url, row);
        Ok(())
    }

    // ---------- settings ----------

    pub async fn settings(&self) -> Result<AppSettings, StoreError> {
        Ok(self.read(SETTINGS_KEY).await?.unwrap_or_default())
    }

    pub async fn save_settings(&self, settings: &AppSettings) -> Result<(), StoreError> {
        self.write(SETTINGS_KEY, settings).await
    }
}

/// Another active employee whose phone shares `candidate`'s login suffix.
fn suffix_holder<'a>(roster: &'a [Employee], candidate: &Employee) -> Option<&'a Employee> {
    if !candidate.active {
        return None;
    }
    let suffix = candidate.phone_suffix()?;
    let holder = roster
        .iter()
        .find(|e| e.id != candidate.id && e.active && e.phone_suffix() == Some(suffix));
    if let Some(holder) = holder {
        warn!(
            employee_id = %candidate.id,
            holder_id = %holder.id,
            "Phone suffix already used by another active employee"
        );
    }
    holder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::time_log::Direction;
    use crate::sync::webhook::testing::RecordingForwarder;
    use backend::MemoryBackend;

    fn store_with(forwarder: Arc<RecordingForwarder>) -> RecordStore {
        RecordStore::new(Arc::new(MemoryBackend::new()), forwarder)
    }

    fn punch(id: &str, employee_id: &str, timestamp: i64) -> TimeLog {
        TimeLog {
            id: id.into(),
            employee_id: employee_id.into(),
            site_id: "1".into(),
            timestamp,
            direction: Direction::In,
            photo_snapshot: String::new(),
        }
    }

    #[actix_web::test]
    async fn empty_store_serves_seed_data() {
        let store = store_with(Arc::default());

        let employees = store.employees().await.unwrap();
        let ids: Vec<_> = employees.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(store.sites().await.unwrap().len(), 2);
        assert!(store.logs().await.unwrap().is_empty());
        assert_eq!(store.settings().await.unwrap(), AppSettings::default());
    }

    #[actix_web::test]
    async fn saved_collection_reads_back_in_order() {
        let store = store_with(Arc::default());
        let mut roster = seed::employees();
        roster.reverse();
        roster[0].name = "Ana Souza Lima".into();

        store.save_employees(&roster).await.unwrap();
        assert_eq!(store.employees().await.unwrap(), roster);

        store.save_sites(&[]).await.unwrap();
        assert!(store.sites().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn unreadable_settings_do_not_fail_the_append() {
        let forwarder = Arc::new(RecordingForwarder::default());
        let backend = MemoryBackend::with_entry(SETTINGS_KEY, "{broken");
        let store = RecordStore::new(Arc::new(backend), forwarder.clone());

        store.add_log(punch("a", "1", 1_000)).await.unwrap();

        assert_eq!(store.logs().await.unwrap().len(), 1);
        assert!(forwarder.sent().is_empty());
    }

    #[actix_web::test]
    async fn malformed_document_is_reported_not_replaced() {
        let backend = MemoryBackend::with_entry(LOGS_KEY, "[{not json");
        let store = RecordStore::new(Arc::new(backend), Arc::new(RecordingForwarder::default()));

        let err = store.logs().await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed { key: LOGS_KEY, .. }));
    }

    #[actix_web::test]
    async fn add_log_without_webhook_only_appends() {
        let forwarder = Arc::new(RecordingForwarder::default());
        let store = store_with(forwarder.clone());

        store.add_log(punch("a", "1", 10)).await.unwrap();
        store.add_log(punch("b", "2", 20)).await.unwrap();

        let ids: Vec<_> = store
            .logs()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(forwarder.sent().is_empty());
    }

    #[actix_web::test]
    async fn add_log_forwards_when_webhook_configured() {
        let forwarder = Arc::new(RecordingForwarder::default());
        let store = store_with(forwarder.clone());
        store
            .save_settings(&AppSettings {
                google_sheet_url: Some("https://hooks.example/sheet".into()),
            })
            .await
            .unwrap();

        store.add_log(punch("a", "1", 10)).await.unwrap();

        let sent = forwarder.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "https://hooks.example/sheet");
        assert_eq!(sent[0].1.funcionario, "Carlos Silva");
        assert_eq!(sent[0].1.obra, "Residencial Parque Verde");
    }

    #[actix_web::test]
    async fn roster_rejects_duplicate_active_suffix() {
        let store = store_with(Arc::default());
        let mut clash = seed::employees()[0].clone();
        clash.id = "3".into();
        clash.phone = "21900001234".into();

        let outcome = store.insert_employee(clash.clone()).await.unwrap();
        assert_eq!(
            outcome,
            RosterWrite::SuffixTaken {
                holder_id: "1".into()
            }
        );

        // inactive employees do not take part in kiosk login
        clash.active = false;
        assert_eq!(
            store.insert_employee(clash).await.unwrap(),
            RosterWrite::Saved
        );
        assert_eq!(store.employees().await.unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn replace_and_delete_report_missing_ids() {
        let store = store_with(Arc::default());
        let mut ghost = seed::employees()[1].clone();
        ghost.id = "404".into();

        assert_eq!(
            store.replace_employee(ghost).await.unwrap(),
            RosterWrite::NotFound
        );
        assert!(!store.delete_employee("404").await.unwrap());
        assert!(store.delete_employee("2").await.unwrap());
        assert_eq!(store.employees().await.unwrap().len(), 1);

        let mut carlos = seed::employees()[0].clone();
        carlos.hourly_rate = 40.0;
        assert_eq!(
            store.replace_employee(carlos).await.unwrap(),
            RosterWrite::Saved
        );
        assert_eq!(store.employees().await.unwrap()[0].hourly_rate, 40.0);
    }

    #[actix_web::test]
    async fn sites_are_created_and_deleted() {
        let store = store_with(Arc::default());
        store
            .add_site(Site {
                id: "s3".into(),
                name: "Galpão Norte".into(),
                address: String::new(),
                active: true,
            })
            .await
            .unwrap();
        assert_eq!(store.sites().await.unwrap().len(), 3);
        assert!(store.delete_site("1").await.unwrap());
        let names: Vec<_> = store
            .sites()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Reforma Shopping Centro", "Galpão Norte"]);
    }
}
