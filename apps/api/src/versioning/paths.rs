//! Stub and content path derivation.

use sha2::{Digest, Sha256};

use crate::models::prompt::VersionId;

const STUB_LEN: usize = 32;

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Stable identifier derived from the prompt's coordinates.
pub fn prompt_stub(org_id: &str, project_id: &str, prompt_id: &str) -> String {
    let mut stub = sha256_hex(format!("{org_id}/{project_id}/{prompt_id}").as_bytes());
    stub.truncate(STUB_LEN);
    stub
}

pub fn content_checksum(content: &[u8]) -> String {
    sha256_hex(content)
}

/// `prompts/{stub}/{branch_id}/v{version}/{checksum}`
///
/// The checksum suffix makes the path content-addressed: the same bytes at
/// the same coordinates always land on the same path, so a repeated write
/// of an existing path is a harmless retry.
pub fn content_path(stub: &str, branch_id: &str, version: VersionId, checksum: &str) -> String {
    format!("prompts/{stub}/{branch_id}/v{version}/{checksum}")
}
