use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Physician {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
