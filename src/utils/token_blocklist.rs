use std::time::{Duration, Instant};

use chrono::Utc;
use moka::{Expiry, future::Cache};
use once_cell::sync::Lazy;

/// Keeps a revoked jti only until its token would have expired anyway.
struct UntilTokenExpiry;

impl Expiry<String, u64> for UntilTokenExpiry {
    fn expire_after_create(&self, _jti: &String, exp: &u64, _created_at: Instant) -> Option<Duration> {
        let now = Utc::now().timestamp().max(0) as u64;
        Some(Duration::from_secs(exp.saturating_sub(now)))
    }
}

/// jti => token expiry (unix seconds)
pub static REVOKED_TOKENS: Lazy<Cache<String, u64>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .expire_after(UntilTokenExpiry)
        .build()
});

pub async fn revoke(jti: &str, exp: usize) {
    REVOKED_TOKENS.insert(jti.to_string(), exp as u64).await;
}

pub async fn is_revoked(jti: &str) -> bool {
    REVOKED_TOKENS.get(jti).await.is_some()
}
