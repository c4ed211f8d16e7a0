use tracing::{info, warn};

use crate::auth::password::{hash_pin, verify_pin};

/// Decides whether a kiosk user may enter the back-office.
pub trait AdminGate: Send + Sync {
    fn check(&self, pin: &str) -> bool;
}

/// Single shared PIN, held only as an argon2 hash.
pub struct PinGate {
    pin_hash: String,
}

impl PinGate {
    pub fn from_pin(pin: &str) -> anyhow::Result<Self> {
        let pin_hash = hash_pin(pin).map_err(|e| anyhow::anyhow!("hashing admin PIN: {e}"))?;
        Ok(Self { pin_hash })
    }
}

impl AdminGate for PinGate {
    fn check(&self, pin: &str) -> bool {
        match verify_pin(pin, &self.pin_hash) {
            Ok(()) => {
                info!("Admin PIN accepted");
                true
            }
            Err(e) => {
                warn!(error = %e, "Admin PIN rejected");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_configured_pin_passes() {
        let gate = PinGate::from_pin("0000").unwrap();
        assert!(gate.check("0000"));
        assert!(!gate.check("1234"));
        assert!(!gate.check(""));
    }
}
