use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{Context, anyhow};
use futures::FutureExt;
use futures::future::BoxFuture;
use sqlx::MySqlPool;

/// Durable keyed storage for whole JSON documents.
pub trait StorageBackend: Send + Sync {
    fn load<'a>(&'a self, key: &'a str) -> BoxFuture<'a, anyhow::Result<Option<String>>>;
    fn store<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, anyhow::Result<()>>;
}

/// One row per document in `kv_store`.
pub struct MySqlBackend {
    pool: MySqlPool,
}

impl MySqlBackend {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, key: &str) -> anyhow::Result<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT v FROM kv_store WHERE k = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("reading {key}"))
    }

    async fn upsert(&self, key: &str, value: String) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (k, v) VALUES (?, ?)
            ON DUPLICATE KEY UPDATE v = VALUES(v)
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("writing {key}"))?;
        Ok(())
    }
}

impl StorageBackend for MySqlBackend {
    fn load<'a>(&'a self, key: &'a str) -> BoxFuture<'a, anyhow::Result<Option<String>>> {
        self.fetch(key).boxed()
    }

    fn store<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, anyhow::Result<()>> {
        self.upsert(key, value).boxed()
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let backend = Self::new();
        if let Ok(mut entries) = backend.entries.write() {
            entries.insert(key.to_string(), value.to_string());
        }
        backend
    }
}

impl StorageBackend for MemoryBackend {
    fn load<'a>(&'a self, key: &'a str) -> BoxFuture<'a, anyhow::Result<Option<String>>> {
        let result = self
            .entries
            .read()
            .map(|entries| entries.get(key).cloned())
            .map_err(|_| anyhow!("memory store poisoned"));
        async move { result }.boxed()
    }

    fn store<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, anyhow::Result<()>> {
        let result = self
            .entries
            .write()
            .map(|mut entries| {
                entries.insert(key.to_string(), value);
            })
            .map_err(|_| anyhow!("memory store poisoned"));
        async move { result }.boxed()
    }
}
