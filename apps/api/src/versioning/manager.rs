//! The prompt branch/version state machine.
//!
//! Write ordering for anything that creates a version:
//! 1. content bytes to the blob store (`write_once`)
//! 2. the immutable version record (insert-if-absent)
//! 3. the branch record (insert, or compare-and-swap of its head pointer)
//!
//! A failure between steps leaves at most an unreferenced blob or an
//! unreferenced version record, never a pointer to missing content.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use futures::{future, TryStreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_retry2::{Retry, RetryError};
use tracing::{info, instrument, warn};

use crate::blob::{BlobError, BlobStore};
use crate::models::project::ProjectRecord;
use crate::models::prompt::{BranchRecord, PromptRecord, VersionId, VersionRecord};
use crate::models::{Describe, Tombstone};
use crate::store::{
    encode, keys, Key, MetadataStore, Precondition, StoreError, VersionTag,
};
use crate::versioning::error::VersionError;
use crate::versioning::ids::IdGenerator;
use crate::versioning::names::validate_branch_name;
use crate::versioning::paths;
use crate::versioning::retry::RetryPolicy;

/// Created with every prompt; can never be deleted.
pub const MAIN_BRANCH: &str = "main";

/// Coordinates of a prompt, as supplied by the authorization layer.
#[derive(Debug, Clone, Copy)]
pub struct PromptRef<'a> {
    pub org_id: &'a str,
    pub project_id: &'a str,
    pub prompt_id: &'a str,
    /// Caller identity; recorded as the author of versions written through
    /// this reference.
    pub user_id: Option<&'a str>,
}

pub struct NewPrompt<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub content: &'a str,
    pub message: Option<&'a str>,
    pub author: Option<&'a str>,
}

/// Name and description edits. `None` leaves a field as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataUpdate<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
}

impl MetadataUpdate<'_> {
    fn validate(&self, what: &str) -> Result<(), VersionError> {
        if self.name.is_none() && self.description.is_none() {
            return Err(VersionError::InvalidInput(format!(
                "{what} update must change the name or the description"
            )));
        }
        if let Some(name) = self.name {
            require_non_blank(&format!("{what} name"), name)?;
        }
        Ok(())
    }
}

/// Content of one version together with the branch it was resolved through.
#[derive(Debug, Clone)]
pub struct PromptContent {
    pub branch: BranchRecord,
    pub version: VersionRecord,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct PromptOverview {
    pub prompt: PromptRecord,
    pub branches: Vec<BranchRecord>,
}

#[derive(Debug, Clone)]
pub struct CreatedPrompt {
    pub prompt: PromptRecord,
    pub content: PromptContent,
}

/// Outcome of one optimistic attempt.
enum Attempt<T> {
    Done(T),
    Contended,
}

pub struct VersionManager {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    ids: Arc<dyn IdGenerator>,
    retry: RetryPolicy,
    max_content_bytes: usize,
}

impl VersionManager {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
        ids: Arc<dyn IdGenerator>,
        retry: RetryPolicy,
        max_content_bytes: usize,
    ) -> Self {
        Self {
            metadata,
            blobs,
            ids,
            retry,
            max_content_bytes,
        }
    }

    // ── Projects ────────────────────────────────────────────────────────────

    #[instrument(skip_all, fields(org_id = %org_id))]
    pub async fn create_project(
        &self,
        org_id: &str,
        team_id: Option<&str>,
        name: &str,
        description: Option<&str>,
    ) -> Result<ProjectRecord, VersionError> {
        require_non_blank("project name", name)?;

        let now = Utc::now();
        let project = ProjectRecord {
            project_id: self.ids.next_id(),
            org_id: org_id.to_string(),
            team_id: team_id.map(str::to_string),
            name: name.trim().to_string(),
            description: description.map(str::to_string),
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        let key = keys::project_key(org_id, &project.project_id);
        self.insert_new(&key, &project, "create project").await?;

        info!("Created project {} for org {org_id}", project.project_id);
        Ok(project)
    }

    pub async fn get_project(
        &self,
        org_id: &str,
        project_id: &str,
    ) -> Result<ProjectRecord, VersionError> {
        let key = keys::project_key(org_id, project_id);
        match self.load::<ProjectRecord>(&key, "load project").await? {
            Some((_, project)) if !project.deleted => Ok(project),
            _ => Err(VersionError::NotFound(format!("project {project_id}"))),
        }
    }

    pub async fn list_projects(&self, org_id: &str) -> Result<Vec<ProjectRecord>, VersionError> {
        let projects: Vec<ProjectRecord> = self
            .collect_prefix(
                &keys::org_partition(org_id),
                keys::PROJECT_PREFIX,
                "list projects",
            )
            .await?;
        Ok(projects.into_iter().filter(|p| !p.deleted).collect())
    }

    #[instrument(skip_all, fields(org_id = %org_id, project_id = %project_id))]
    pub async fn delete_project(&self, org_id: &str, project_id: &str) -> Result<(), VersionError> {
        let key = keys::project_key(org_id, project_id);
        let key = &key;
        let label = format!("project {project_id}");
        let label = label.as_str();
        self.retry_on_contention("delete project", move || {
            self.try_tombstone::<ProjectRecord>(key, label)
        })
        .await?;

        info!("Soft-deleted project {project_id}");
        Ok(())
    }

    #[instrument(skip_all, fields(org_id = %org_id, project_id = %project_id))]
    pub async fn update_project(
        &self,
        org_id: &str,
        project_id: &str,
        update: MetadataUpdate<'_>,
    ) -> Result<ProjectRecord, VersionError> {
        update.validate("project")?;
        let key = keys::project_key(org_id, project_id);
        let key = &key;
        let label = format!("project {project_id}");
        let label = label.as_str();
        let project = self
            .retry_on_contention("update project", move || {
                self.try_describe::<ProjectRecord>(key, label, update)
            })
            .await?;

        info!("Updated project {project_id}");
        Ok(project)
    }

    // ── Prompts ─────────────────────────────────────────────────────────────

    /// Creates a prompt whose `main` branch holds `new.content` as version 1,
    /// already active.
    #[instrument(skip_all, fields(org_id = %org_id, project_id = %project_id))]
    pub async fn create_prompt(
        &self,
        org_id: &str,
        project_id: &str,
        new: NewPrompt<'_>,
    ) -> Result<CreatedPrompt, VersionError> {
        self.get_project(org_id, project_id).await?;
        require_non_blank("prompt name", new.name)?;
        let bytes = self.validate_content(new.content)?;

        let now = Utc::now();
        let prompt_id = self.ids.next_id();
        let prompt = PromptRecord {
            stub: paths::prompt_stub(org_id, project_id, &prompt_id),
            prompt_id,
            project_id: project_id.to_string(),
            name: new.name.trim().to_string(),
            description: new.description.map(str::to_string),
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        let branch = BranchRecord {
            project_id: project_id.to_string(),
            prompt_id: prompt.prompt_id.clone(),
            branch_id: self.ids.next_id(),
            branch_name: MAIN_BRANCH.to_string(),
            head_version: 1,
            active_version: Some(1),
            parent_branch: None,
            parent_version: None,
            created_at: now,
            updated_at: now,
        };

        let version = self
            .write_content(&prompt, &branch, 1, &bytes, new.message, new.author)
            .await?;

        let version_key = keys::version_key(&prompt.prompt_id, &branch.branch_id, 1);
        self.insert_new(&version_key, &version, "record initial version")
            .await?;
        let branch_key = keys::branch_key(&prompt.prompt_id, MAIN_BRANCH);
        self.insert_new(&branch_key, &branch, "record main branch")
            .await?;
        let prompt_key = keys::prompt_key(project_id, &prompt.prompt_id);
        self.insert_new(&prompt_key, &prompt, "record prompt").await?;

        info!(
            "Created prompt {} in project {project_id} at {}",
            prompt.prompt_id, version.content_path
        );
        Ok(CreatedPrompt {
            prompt,
            content: PromptContent {
                branch,
                version,
                content: new.content.to_string(),
            },
        })
    }

    pub async fn list_prompts(
        &self,
        org_id: &str,
        project_id: &str,
    ) -> Result<Vec<PromptRecord>, VersionError> {
        self.get_project(org_id, project_id).await?;
        let prompts: Vec<PromptRecord> = self
            .collect_prefix(
                &keys::project_partition(project_id),
                keys::PROMPT_PREFIX,
                "list prompts",
            )
            .await?;
        Ok(prompts.into_iter().filter(|p| !p.deleted).collect())
    }

    pub async fn get_prompt_info(&self, prompt: PromptRef<'_>) -> Result<PromptOverview, VersionError> {
        let record = self.require_prompt(prompt).await?;
        let branches = self.branches_of(&record).await?;
        Ok(PromptOverview {
            prompt: record,
            branches,
        })
    }

    #[instrument(skip_all, fields(prompt_id = %prompt.prompt_id))]
    pub async fn delete_prompt(&self, prompt: PromptRef<'_>) -> Result<(), VersionError> {
        self.get_project(prompt.org_id, prompt.project_id).await?;
        let key = keys::prompt_key(prompt.project_id, prompt.prompt_id);
        let key = &key;
        let label = format!("prompt {}", prompt.prompt_id);
        let label = label.as_str();
        self.retry_on_contention("delete prompt", move || {
            self.try_tombstone::<PromptRecord>(key, label)
        })
        .await?;

        info!("Soft-deleted prompt {}", prompt.prompt_id);
        Ok(())
    }

    #[instrument(skip_all, fields(prompt_id = %prompt.prompt_id))]
    pub async fn update_prompt(
        &self,
        prompt: PromptRef<'_>,
        update: MetadataUpdate<'_>,
    ) -> Result<PromptRecord, VersionError> {
        update.validate("prompt")?;
        self.get_project(prompt.org_id, prompt.project_id).await?;
        let key = keys::prompt_key(prompt.project_id, prompt.prompt_id);
        let key = &key;
        let label = format!("prompt {}", prompt.prompt_id);
        let label = label.as_str();
        let updated = self
            .retry_on_contention("update prompt", move || {
                self.try_describe::<PromptRecord>(key, label, update)
            })
            .await?;

        info!("Updated prompt {}", prompt.prompt_id);
        Ok(updated)
    }

    /// Reads a version's content. Without `version`, resolves the branch's
    /// active pointer from the latest committed branch record.
    #[instrument(skip_all, fields(prompt_id = %prompt.prompt_id, branch = %branch))]
    pub async fn get_prompt(
        &self,
        prompt: PromptRef<'_>,
        branch: &str,
        version: Option<VersionId>,
    ) -> Result<PromptContent, VersionError> {
        let record = self.require_prompt(prompt).await?;
        let (_, branch_record) = self.require_branch(&record, branch).await?;

        let version_id = match version {
            Some(v) => v,
            None => branch_record
                .active_version
                .ok_or_else(|| VersionError::NoActiveVersion {
                    branch: branch.to_string(),
                })?,
        };
        let version_record = self
            .require_version(&record, &branch_record, version_id)
            .await?;

        let bytes = self
            .blobs
            .read(&version_record.content_path)
            .await
            .map_err(|e| VersionError::blob("read prompt content", e))?;
        let content = String::from_utf8(bytes.to_vec()).map_err(|_| {
            VersionError::InvalidState(format!(
                "content of version {version_id} on branch '{branch}' is not valid UTF-8"
            ))
        })?;

        Ok(PromptContent {
            branch: branch_record,
            version: version_record,
            content,
        })
    }

    /// Appends a new version to `branch`. The active pointer is left alone:
    /// publishing is always a separate call.
    ///
    /// The next id is first reserved by a compare-and-swap of the branch's
    /// head, so every writer owns its id exclusively. Content and the version
    /// record follow; inserting that record is the single step that makes
    /// the version visible. A failure or cancellation before it leaves at
    /// most a reserved id and an orphan blob, neither of which any read
    /// path reports.
    #[instrument(skip_all, fields(prompt_id = %prompt.prompt_id, branch = %branch))]
    pub async fn update_prompt_content(
        &self,
        prompt: PromptRef<'_>,
        branch: &str,
        content: &str,
        message: Option<&str>,
    ) -> Result<PromptContent, VersionError> {
        let record = self.require_prompt(prompt).await?;
        let bytes = self.validate_content(content)?;

        let record = &record;
        let reserved = self
            .retry_on_contention("reserve version id", move || {
                self.try_reserve_version(record, branch)
            })
            .await?;
        let version_id = reserved.head_version;

        let version = self
            .write_content(record, &reserved, version_id, &bytes, message, prompt.user_id)
            .await?;
        let key = keys::version_key(&record.prompt_id, &reserved.branch_id, version_id);
        if !self.try_insert(&key, &version, "record version").await? {
            return Err(VersionError::InvalidState(format!(
                "version {version_id} of branch '{branch}' is already recorded"
            )));
        }

        info!(
            "Appended version {version_id} to branch '{branch}' of prompt {}",
            record.prompt_id
        );
        Ok(PromptContent {
            branch: reserved,
            version,
            content: content.to_string(),
        })
    }

    // ── Branches ────────────────────────────────────────────────────────────

    /// Creates `new_branch` whose version 1 shares the content of
    /// `from_branch`'s active version. No bytes are copied.
    #[instrument(skip_all, fields(prompt_id = %prompt.prompt_id, branch = %new_branch, from = %from_branch))]
    pub async fn create_branch(
        &self,
        prompt: PromptRef<'_>,
        new_branch: &str,
        from_branch: &str,
    ) -> Result<BranchRecord, VersionError> {
        validate_branch_name(new_branch)?;
        let record = self.require_prompt(prompt).await?;
        let (_, source) = self.require_branch(&record, from_branch).await?;
        let active = source.active_version.ok_or_else(|| {
            VersionError::InvalidState(format!(
                "branch '{from_branch}' has no active version to branch from"
            ))
        })?;
        let source_version = self.require_version(&record, &source, active).await?;

        let branch_key = keys::branch_key(&record.prompt_id, new_branch);
        let already_exists = || VersionError::AlreadyExists(format!("branch '{new_branch}'"));
        if self.load::<BranchRecord>(&branch_key, "check branch name").await?.is_some() {
            return Err(already_exists());
        }

        let now = Utc::now();
        let branch = BranchRecord {
            project_id: record.project_id.clone(),
            prompt_id: record.prompt_id.clone(),
            branch_id: self.ids.next_id(),
            branch_name: new_branch.to_string(),
            head_version: 1,
            active_version: Some(1),
            parent_branch: Some(from_branch.to_string()),
            parent_version: Some(active),
            created_at: now,
            updated_at: now,
        };
        let version = VersionRecord {
            project_id: record.project_id.clone(),
            prompt_id: record.prompt_id.clone(),
            branch_id: branch.branch_id.clone(),
            branch_name: new_branch.to_string(),
            version_id: 1,
            content_path: source_version.content_path,
            checksum: source_version.checksum,
            size_bytes: source_version.size_bytes,
            message: Some(format!("Branched from {from_branch}@v{active}")),
            author: prompt.user_id.map(str::to_string),
            created_at: now,
        };

        let version_key = keys::version_key(&record.prompt_id, &branch.branch_id, 1);
        if !self
            .try_insert(&version_key, &version, "record branch point version")
            .await?
        {
            return Err(already_exists());
        }
        if !self.try_insert(&branch_key, &branch, "create branch").await? {
            return Err(already_exists());
        }

        info!(
            "Created branch '{new_branch}' from '{from_branch}'@v{active} on prompt {}",
            record.prompt_id
        );
        Ok(branch)
    }

    pub async fn list_branches(&self, prompt: PromptRef<'_>) -> Result<Vec<BranchRecord>, VersionError> {
        let record = self.require_prompt(prompt).await?;
        self.branches_of(&record).await
    }

    pub async fn get_branch(
        &self,
        prompt: PromptRef<'_>,
        branch: &str,
    ) -> Result<BranchRecord, VersionError> {
        let record = self.require_prompt(prompt).await?;
        let (_, branch_record) = self.require_branch(&record, branch).await?;
        Ok(branch_record)
    }

    /// Removes the branch pointer. Its versions stay in place, unreferenced.
    #[instrument(skip_all, fields(prompt_id = %prompt.prompt_id, branch = %branch))]
    pub async fn delete_branch(&self, prompt: PromptRef<'_>, branch: &str) -> Result<(), VersionError> {
        if branch == MAIN_BRANCH {
            return Err(VersionError::Protected(branch.to_string()));
        }
        let record = self.require_prompt(prompt).await?;

        let key = keys::branch_key(&record.prompt_id, branch);
        let removed = self
            .metadata
            .delete(&key)
            .await
            .map_err(|e| VersionError::store("delete branch", e))?;
        if !removed {
            return Err(VersionError::NotFound(format!("branch '{branch}'")));
        }

        info!("Deleted branch '{branch}' of prompt {}", record.prompt_id);
        Ok(())
    }

    // ── Versions ────────────────────────────────────────────────────────────

    pub async fn list_versions(
        &self,
        prompt: PromptRef<'_>,
        branch: &str,
    ) -> Result<Vec<VersionRecord>, VersionError> {
        let record = self.require_prompt(prompt).await?;
        let (_, branch_record) = self.require_branch(&record, branch).await?;
        self.collect_prefix(
            &keys::prompt_partition(&record.prompt_id),
            &keys::versions_prefix(&branch_record.branch_id),
            "list versions",
        )
        .await
    }

    /// Points `branch` at `target`. Concurrent writers are serialized by the
    /// store's compare-and-swap; a lost race re-runs the whole
    /// read-verify-write sequence within the retry budget.
    #[instrument(skip_all, fields(prompt_id = %prompt.prompt_id, branch = %branch, version = target))]
    pub async fn update_active_version(
        &self,
        prompt: PromptRef<'_>,
        branch: &str,
        target: VersionId,
    ) -> Result<BranchRecord, VersionError> {
        let record = self.require_prompt(prompt).await?;
        let record = &record;
        let updated = self
            .retry_on_contention("update active version", move || {
                self.try_set_active(record, branch, target)
            })
            .await?;

        info!(
            "Branch '{branch}' of prompt {} now serves version {target}",
            record.prompt_id
        );
        Ok(updated)
    }

    // ── Optimistic steps ────────────────────────────────────────────────────

    async fn try_set_active(
        &self,
        prompt: &PromptRecord,
        branch: &str,
        target: VersionId,
    ) -> Result<Attempt<BranchRecord>, VersionError> {
        let (tag, mut current) = self.require_branch(prompt, branch).await?;
        self.require_version(prompt, &current, target).await?;
        if current.active_version == Some(target) {
            return Ok(Attempt::Done(current));
        }

        current.active_version = Some(target);
        current.updated_at = Utc::now();
        let key = keys::branch_key(&prompt.prompt_id, branch);
        self.swap(&key, current, tag, "update active version").await
    }

    async fn try_reserve_version(
        &self,
        prompt: &PromptRecord,
        branch: &str,
    ) -> Result<Attempt<BranchRecord>, VersionError> {
        let (tag, mut current) = self.require_branch(prompt, branch).await?;
        current.head_version += 1;
        current.updated_at = Utc::now();
        let key = keys::branch_key(&prompt.prompt_id, branch);
        self.swap(&key, current, tag, "reserve version id").await
    }

    async fn try_tombstone<T>(&self, key: &Key, label: &str) -> Result<Attempt<()>, VersionError>
    where
        T: Tombstone + Serialize + DeserializeOwned + Send + Sync,
    {
        let (tag, mut record) = match self.load::<T>(key, "load record to delete").await? {
            Some((tag, record)) if !record.is_deleted() => (tag, record),
            _ => return Err(VersionError::NotFound(label.to_string())),
        };
        record.mark_deleted();
        Ok(match self.swap(key, record, tag, "mark record deleted").await? {
            Attempt::Done(_) => Attempt::Done(()),
            Attempt::Contended => Attempt::Contended,
        })
    }

    async fn try_describe<T>(
        &self,
        key: &Key,
        label: &str,
        update: MetadataUpdate<'_>,
    ) -> Result<Attempt<T>, VersionError>
    where
        T: Tombstone + Describe + Serialize + DeserializeOwned + Send + Sync,
    {
        let (tag, mut record) = match self.load::<T>(key, "load record to update").await? {
            Some((tag, record)) if !record.is_deleted() => (tag, record),
            _ => return Err(VersionError::NotFound(label.to_string())),
        };
        record.describe(update.name.map(str::trim), update.description, Utc::now());
        self.swap(key, record, tag, "update record metadata").await
    }

    /// Runs `step` until it lands, sleeping between contended attempts.
    /// Errors from `step` end the loop immediately.
    async fn retry_on_contention<T, F, Fut>(
        &self,
        operation: &'static str,
        mut step: F,
    ) -> Result<T, VersionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Attempt<T>, VersionError>>,
    {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0u32;
        Retry::spawn(self.retry.strategy(), || {
            attempt += 1;
            let current = attempt;
            let pending = step();
            async move {
                match pending.await {
                    Ok(Attempt::Done(value)) => Ok(value),
                    Ok(Attempt::Contended) => {
                        warn!("{operation}: lost concurrent update on attempt {current}");
                        Err(RetryError::Transient {
                            err: VersionError::Conflict {
                                operation,
                                attempts: max_attempts,
                            },
                            retry_after: None,
                        })
                    }
                    Err(e) => Err(RetryError::Permanent(e)),
                }
            }
        })
        .await
    }

    // ── Store helpers ───────────────────────────────────────────────────────

    async fn write_content(
        &self,
        prompt: &PromptRecord,
        branch: &BranchRecord,
        version_id: VersionId,
        bytes: &Bytes,
        message: Option<&str>,
        author: Option<&str>,
    ) -> Result<VersionRecord, VersionError> {
        let checksum = paths::content_checksum(bytes);
        let content_path =
            paths::content_path(&prompt.stub, &branch.branch_id, version_id, &checksum);

        match self.blobs.write_once(&content_path, bytes.clone()).await {
            // Same path means same bytes: an earlier attempt already wrote it.
            Ok(()) | Err(BlobError::AlreadyExists { .. }) => {}
            Err(e) => return Err(VersionError::blob("write prompt content", e)),
        }

        Ok(VersionRecord {
            project_id: prompt.project_id.clone(),
            prompt_id: prompt.prompt_id.clone(),
            branch_id: branch.branch_id.clone(),
            branch_name: branch.branch_name.clone(),
            version_id,
            content_path,
            checksum,
            size_bytes: bytes.len() as u64,
            message: message.map(str::to_string),
            author: author.map(str::to_string),
            created_at: Utc::now(),
        })
    }

    async fn require_prompt(&self, prompt: PromptRef<'_>) -> Result<PromptRecord, VersionError> {
        self.get_project(prompt.org_id, prompt.project_id).await?;
        let key = keys::prompt_key(prompt.project_id, prompt.prompt_id);
        match self.load::<PromptRecord>(&key, "load prompt").await? {
            Some((_, record)) if !record.deleted => Ok(record),
            _ => Err(VersionError::NotFound(format!("prompt {}", prompt.prompt_id))),
        }
    }

    async fn require_branch(
        &self,
        prompt: &PromptRecord,
        branch: &str,
    ) -> Result<(VersionTag, BranchRecord), VersionError> {
        let key = keys::branch_key(&prompt.prompt_id, branch);
        self.load::<BranchRecord>(&key, "load branch")
            .await?
            .ok_or_else(|| VersionError::NotFound(format!("branch '{branch}'")))
    }

    async fn require_version(
        &self,
        prompt: &PromptRecord,
        branch: &BranchRecord,
        version_id: VersionId,
    ) -> Result<VersionRecord, VersionError> {
        let key = keys::version_key(&prompt.prompt_id, &branch.branch_id, version_id);
        self.load::<VersionRecord>(&key, "load version")
            .await?
            .map(|(_, v)| v)
            .ok_or_else(|| {
                VersionError::NotFound(format!(
                    "version {version_id} of branch '{}'",
                    branch.branch_name
                ))
            })
    }

    async fn branches_of(&self, prompt: &PromptRecord) -> Result<Vec<BranchRecord>, VersionError> {
        self.collect_prefix(
            &keys::prompt_partition(&prompt.prompt_id),
            keys::BRANCH_PREFIX,
            "list branches",
        )
        .await
    }

    async fn load<T: DeserializeOwned>(
        &self,
        key: &Key,
        context: &'static str,
    ) -> Result<Option<(VersionTag, T)>, VersionError> {
        let Some(item) = self
            .metadata
            .get(key)
            .await
            .map_err(|e| VersionError::store(context, e))?
        else {
            return Ok(None);
        };
        let record = item
            .decode()
            .map_err(|e| VersionError::store(context, e))?;
        Ok(Some((item.tag, record)))
    }

    async fn collect_prefix<T: DeserializeOwned + Send>(
        &self,
        pk: &str,
        sk_prefix: &str,
        context: &'static str,
    ) -> Result<Vec<T>, VersionError> {
        self.metadata
            .query_prefix(pk, sk_prefix)
            .and_then(|item| future::ready(item.decode::<T>()))
            .try_collect::<Vec<T>>()
            .await
            .map_err(|e| VersionError::store(context, e))
    }

    /// Insert-if-absent. `Ok(false)` when the key is already taken.
    async fn try_insert<T: Serialize + Sync>(
        &self,
        key: &Key,
        record: &T,
        context: &'static str,
    ) -> Result<bool, VersionError> {
        let body = encode(record).map_err(|e| VersionError::store(context, e))?;
        match self.metadata.put(key, body, Precondition::Absent).await {
            Ok(_) => Ok(true),
            Err(StoreError::ConditionFailed { .. }) => Ok(false),
            Err(e) => Err(VersionError::store(context, e)),
        }
    }

    async fn insert_new<T: Serialize + Sync>(
        &self,
        key: &Key,
        record: &T,
        context: &'static str,
    ) -> Result<(), VersionError> {
        if self.try_insert(key, record, context).await? {
            Ok(())
        } else {
            Err(VersionError::AlreadyExists(key.to_string()))
        }
    }

    /// Compare-and-swap of an existing record against the tag it was read at.
    async fn swap<T: Serialize + Send + Sync>(
        &self,
        key: &Key,
        record: T,
        tag: VersionTag,
        context: &'static str,
    ) -> Result<Attempt<T>, VersionError> {
        let body = encode(&record).map_err(|e| VersionError::store(context, e))?;
        match self.metadata.put(key, body, Precondition::Tag(tag)).await {
            Ok(_) => Ok(Attempt::Done(record)),
            Err(StoreError::ConditionFailed { .. }) => Ok(Attempt::Contended),
            Err(e) => Err(VersionError::store(context, e)),
        }
    }

    fn validate_content(&self, content: &str) -> Result<Bytes, VersionError> {
        if content.is_empty() {
            return Err(VersionError::InvalidInput(
                "prompt content must not be empty".to_string(),
            ));
        }
        if content.len() > self.max_content_bytes {
            return Err(VersionError::InvalidInput(format!(
                "prompt content is {} bytes, limit is {}",
                content.len(),
                self.max_content_bytes
            )));
        }
        Ok(Bytes::copy_from_slice(content.as_bytes()))
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), VersionError> {
    if value.trim().is_empty() {
        return Err(VersionError::InvalidInput(format!("{field} must not be blank")));
    }
    Ok(())
}
