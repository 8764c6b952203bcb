//! Prompt version & branch engine.
//!
//! Each prompt has named branches; each branch has an append-only sequence of
//! immutable versions plus two pointers: `head_version` (latest written) and
//! `active_version` (served to readers). Content is written to the blob store
//! before any metadata record references it, and the only mutations of
//! existing records go through the metadata store's compare-and-swap.

pub mod error;
pub mod ids;
pub mod manager;
pub mod names;
pub mod paths;
pub mod retry;

pub use error::VersionError;
pub use ids::UuidGenerator;
pub use manager::{
    MetadataUpdate, NewPrompt, PromptContent, PromptRef, VersionManager, MAIN_BRANCH,
};
pub use retry::RetryPolicy;
