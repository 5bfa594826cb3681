use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Referring doctor, distinct from the performing [`super::physician::Physician`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub clinic_name: Option<String>,
    pub phone_number: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}
