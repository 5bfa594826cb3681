use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scheduled exam for a patient. `lop` is the letter-of-protection note,
/// stored opaque. `schedule_time` is 24-hour `HH:MM`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub facility_id: Uuid,
    pub physician_id: Uuid,
    pub patient_id: Uuid,
    pub status_id: Uuid,
    pub schedule_date: NaiveDate,
    pub schedule_time: String,
    pub is_completed: bool,
    pub lop: Option<String>,
    pub created_at: DateTime<Utc>,
}
