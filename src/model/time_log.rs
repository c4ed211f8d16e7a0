use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, EnumString, AsRefStr, ToSchema,
)]
pub enum Direction {
    #[serde(rename = "ENTRADA")]
    #[strum(serialize = "ENTRADA")]
    In,
    #[serde(rename = "SAIDA")]
    #[strum(serialize = "SAIDA")]
    Out,
}

impl Direction {
    /// Human label, as printed on the kiosk banner and the spreadsheet row.
    pub fn label(self) -> &'static str {
        match self {
            Direction::In => "ENTRADA",
            Direction::Out => "SAÍDA",
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
        }
    }
}

/// One punch. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": "3f1c9a0e-8d7b-4a51-9f0e-2c7d6b1a4e55",
        "employeeId": "1",
        "siteId": "2",
        "timestamp": 1760598000000i64,
        "type": "ENTRADA",
        "photoSnapshot": "data:image/jpeg;base64,/9j/4AAQ..."
    })
)]
pub struct TimeLog {
    pub id: String,
    pub employee_id: String,
    pub site_id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub direction: Direction,
    #[serde(default)]
    pub photo_snapshot: String,
}

/// Direction for the next punch of `employee_id`: the opposite of the most
/// recent entry, or IN when there is none.
pub fn next_direction(logs: &[TimeLog], employee_id: &str) -> Direction {
    logs.iter()
        .filter(|log| log.employee_id == employee_id)
        // on a timestamp tie the earliest stored entry wins
        .rev()
        .max_by_key(|log| log.timestamp)
        .map(|last| last.direction.flip())
        .unwrap_or(Direction::In)
}
