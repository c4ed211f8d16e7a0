use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Job role of a crew member. The serialized labels are the ones stored in
/// the employee document and shown on the roster.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    ToSchema,
)]
pub enum EmployeeRole {
    #[serde(rename = "Admin")]
    #[strum(serialize = "Admin")]
    Admin,
    #[serde(rename = "Operário")]
    #[strum(serialize = "Operário")]
    Worker,
    #[serde(rename = "Mestre de Obras")]
    #[strum(serialize = "Mestre de Obras")]
    Foreman,
    #[serde(rename = "Engenheiro")]
    #[strum(serialize = "Engenheiro")]
    Engineer,
}

impl Default for EmployeeRole {
    fn default() -> Self {
        EmployeeRole::Worker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn labels_match_stored_documents() {
        assert_eq!(EmployeeRole::Foreman.to_string(), "Mestre de Obras");
        assert_eq!(
            serde_json::to_string(&EmployeeRole::Worker).unwrap(),
            "\"Operário\""
        );
        assert_eq!(
            EmployeeRole::from_str("Engenheiro").unwrap(),
            EmployeeRole::Engineer
        );
    }

    #[test]
    fn every_role_parses_back_from_its_label() {
        for role in EmployeeRole::iter() {
            assert_eq!(EmployeeRole::from_str(role.as_ref()).unwrap(), role);
        }
    }
}
