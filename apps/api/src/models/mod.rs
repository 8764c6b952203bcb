pub mod project;
pub mod prompt;

use chrono::{DateTime, Utc};

/// Records that are soft-deleted by flag rather than removed.
pub trait Tombstone {
    fn is_deleted(&self) -> bool;
    fn mark_deleted(&mut self);
}

/// Records whose display name and description can be edited in place.
pub trait Describe {
    fn describe(&mut self, name: Option<&str>, description: Option<&str>, at: DateTime<Utc>);
}

impl Tombstone for project::ProjectRecord {
    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}

impl Tombstone for prompt::PromptRecord {
    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}

impl Describe for project::ProjectRecord {
    fn describe(&mut self, name: Option<&str>, description: Option<&str>, at: DateTime<Utc>) {
        if let Some(name) = name {
            self.name = name.to_string();
        }
        if let Some(description) = description {
            self.description = Some(description.to_string());
        }
        self.updated_at = at;
    }
}

impl Describe for prompt::PromptRecord {
    fn describe(&mut self, name: Option<&str>, description: Option<&str>, at: DateTime<Utc>) {
        if let Some(name) = name {
            self.name = name.to_string();
        }
        if let Some(description) = description {
            self.description = Some(description.to_string());
        }
        self.updated_at = at;
    }
}
