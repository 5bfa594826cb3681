use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::case_manager::CaseManager;
use super::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attorney {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub bar_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Attorney with its linked user and case managers, the shape every
/// `/api/attorneys` response uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttorneyProfile {
    #[serde(flatten)]
    pub attorney: Attorney,
    pub user: UserSummary,
    pub case_managers: Vec<CaseManager>,
}
