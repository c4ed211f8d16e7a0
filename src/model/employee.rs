use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::EmployeeRole;

/// Number of trailing phone digits typed on the kiosk keypad.
pub const SUFFIX_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "days": ["Seg", "Ter", "Qua", "Qui", "Sex"],
    "start": "07:00",
    "end": "16:00"
}))]
pub struct Schedule {
    pub days: Vec<String>,
    #[schema(example = "07:00")]
    pub start: String,
    #[schema(example = "16:00")]
    pub end: String,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            days: ["Seg", "Ter", "Qua", "Qui", "Sex"]
                .into_iter()
                .map(String::from)
                .collect(),
            start: "08:00".into(),
            end: "17:00".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": "1",
        "name": "Carlos Silva",
        "phone": "11999991234",
        "email": "carlos@obra.com",
        "role": "Mestre de Obras",
        "hourlyRate": 35.0,
        "schedule": { "days": ["Seg", "Ter", "Qua", "Qui", "Sex"], "start": "07:00", "end": "16:00" },
        "active": true
    })
)]
pub struct Employee {
    #[schema(example = "1")]
    pub id: String,

    #[schema(example = "Carlos Silva")]
    pub name: String,

    /// Login credential: the kiosk matches on the last four digits.
    #[schema(example = "11999991234")]
    pub phone: String,

    #[schema(example = "carlos@obra.com")]
    pub email: String,

    pub role: EmployeeRole,

    #[schema(example = 35.0)]
    pub hourly_rate: f64,

    pub schedule: Schedule,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(nullable = true)]
    pub photo_url: Option<String>,

    pub active: bool,
}

impl Employee {
    pub fn phone_suffix(&self) -> Option<&str> {
        let len = self.phone.len();
        if len < SUFFIX_LEN {
            return None;
        }
        self.phone.get(len - SUFFIX_LEN..)
    }

    pub fn matches_suffix(&self, suffix: &str) -> bool {
        self.active && self.phone.ends_with(suffix)
    }

    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}
