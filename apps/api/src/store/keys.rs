//! Key layout for every record kind.
//!
//! ```text
//! project  ORG#{org}          PROJECT#{project}
//! prompt   PROJECT#{project}  PROMPT#{prompt}
//! branch   PROMPT#{prompt}    BRANCH#{name}
//! version  PROMPT#{prompt}    VERSION#{branch_id}#{version:010}
//! ```
//!
//! Version ids are zero-padded so lexicographic sort key order equals
//! numeric version order.

use super::Key;
use crate::models::prompt::VersionId;

pub const PROJECT_PREFIX: &str = "PROJECT#";
pub const PROMPT_PREFIX: &str = "PROMPT#";
pub const BRANCH_PREFIX: &str = "BRANCH#";

pub fn org_partition(org_id: &str) -> String {
    format!("ORG#{org_id}")
}

pub fn project_partition(project_id: &str) -> String {
    format!("{PROJECT_PREFIX}{project_id}")
}

pub fn prompt_partition(prompt_id: &str) -> String {
    format!("{PROMPT_PREFIX}{prompt_id}")
}

pub fn project_key(org_id: &str, project_id: &str) -> Key {
    Key::new(org_partition(org_id), format!("{PROJECT_PREFIX}{project_id}"))
}

pub fn prompt_key(project_id: &str, prompt_id: &str) -> Key {
    Key::new(
        project_partition(project_id),
        format!("{PROMPT_PREFIX}{prompt_id}"),
    )
}

pub fn branch_key(prompt_id: &str, branch_name: &str) -> Key {
    Key::new(
        prompt_partition(prompt_id),
        format!("{BRANCH_PREFIX}{branch_name}"),
    )
}

pub fn versions_prefix(branch_id: &str) -> String {
    format!("VERSION#{branch_id}#")
}

pub fn version_key(prompt_id: &str, branch_id: &str, version: VersionId) -> Key {
    Key::new(
        prompt_partition(prompt_id),
        format!("{}{version:010}", versions_prefix(branch_id)),
    )
}
