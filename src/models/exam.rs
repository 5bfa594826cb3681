use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Priced variant of an exam. Deleted together with its parent exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubExam {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub name: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}
