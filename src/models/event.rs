use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit record written by the request middleware for every successful
/// mutation. Read-only through the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub action: String,
    pub detail: Option<String>,
    pub user_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
