use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project owns prompts. Deletion only sets the tombstone flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectRecord {
    pub project_id: String,
    pub org_id: String,
    pub team_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
