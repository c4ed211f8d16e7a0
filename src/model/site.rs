use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": "1",
        "name": "Residencial Parque Verde",
        "address": "Rua das Flores, 123",
        "active": true
    })
)]
pub struct Site {
    #[schema(example = "1")]
    pub id: String,
    #[schema(example = "Residencial Parque Verde")]
    pub name: String,
    #[schema(example = "Rua das Flores, 123")]
    pub address: String,
    pub active: bool,
}
