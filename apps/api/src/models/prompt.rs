use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sequential identifier of a version within one branch. Starts at 1.
pub type VersionId = u32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptRecord {
    pub prompt_id: String,
    pub project_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Hash of the prompt's identity; prefixes every content path.
    pub stub: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable pointer record for one named branch of a prompt.
///
/// `branch_id` is generated per creation, so a branch that is deleted and
/// later recreated under the same name never sees the old branch's versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchRecord {
    pub project_id: String,
    pub prompt_id: String,
    pub branch_id: String,
    pub branch_name: String,
    /// Highest version id handed out on this branch. An id is reserved here
    /// before its version record is written, so a failed append leaves a gap
    /// rather than a record.
    pub head_version: VersionId,
    pub active_version: Option<VersionId>,
    pub parent_branch: Option<String>,
    pub parent_version: Option<VersionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionRecord {
    pub project_id: String,
    pub prompt_id: String,
    pub branch_id: String,
    pub branch_name: String,
    pub version_id: VersionId,
    pub content_path: String,
    /// SHA-256 of the content bytes, lowercase hex.
    pub checksum: String,
    pub size_bytes: u64,
    pub message: Option<String>,
    /// User that wrote the version, when the gateway supplied one.
    #[serde(default)]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}
