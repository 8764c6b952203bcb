//! Maps request objects onto `VersionManager` calls and engine results onto
//! response objects. Holds no state of its own.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::project::ProjectRecord;
use crate::models::prompt::{BranchRecord, PromptRecord, VersionId, VersionRecord};
use crate::prompts::tenant::Tenant;
use crate::versioning::{
    MetadataUpdate, NewPrompt, PromptContent, PromptRef, VersionManager, MAIN_BRANCH,
};

// ────────────────────────────────────────────────────────────────────────────
// Requests
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub team_id: Option<String>,
}

/// Shared by project and prompt edits. Omitted fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateMetadataRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateMetadataRequest {
    fn as_update(&self) -> MetadataUpdate<'_> {
        MetadataUpdate {
            name: self.name.as_deref(),
            description: self.description.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePromptRequest {
    pub name: String,
    pub description: Option<String>,
    pub content: String,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBranchRequest {
    pub name: String,
    /// Defaults to `main`.
    pub from_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub content: String,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateActiveVersionRequest {
    pub version: VersionId,
}

#[derive(Debug, Deserialize)]
pub struct VersionQuery {
    pub version: Option<VersionId>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectPath {
    pub project_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PromptPath {
    pub project_id: String,
    pub prompt_id: String,
}

#[derive(Debug, Deserialize)]
pub struct BranchPath {
    pub project_id: String,
    pub prompt_id: String,
    pub branch: String,
}

impl PromptPath {
    fn prompt_ref<'a>(&'a self, tenant: &'a Tenant) -> PromptRef<'a> {
        PromptRef {
            org_id: &tenant.org_id,
            project_id: &self.project_id,
            prompt_id: &self.prompt_id,
            user_id: tenant.user_id.as_deref(),
        }
    }
}

impl BranchPath {
    fn prompt_ref<'a>(&'a self, tenant: &'a Tenant) -> PromptRef<'a> {
        PromptRef {
            org_id: &tenant.org_id,
            project_id: &self.project_id,
            prompt_id: &self.prompt_id,
            user_id: tenant.user_id.as_deref(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Responses
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub team_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub description: Option<String>,
    pub stub: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BranchResponse {
    pub name: String,
    pub head_version: VersionId,
    pub active_version: Option<VersionId>,
    pub parent_branch: Option<String>,
    pub parent_version: Option<VersionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: VersionId,
    pub branch: String,
    pub checksum: String,
    pub size_bytes: u64,
    pub message: Option<String>,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PromptContentResponse {
    pub prompt_id: String,
    pub project_id: String,
    pub branch: String,
    pub version: VersionId,
    pub active_version: Option<VersionId>,
    pub head_version: VersionId,
    pub content: String,
    pub checksum: String,
    pub message: Option<String>,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CreatePromptResponse {
    pub prompt: PromptResponse,
    pub content: PromptContentResponse,
}

#[derive(Debug, Serialize)]
pub struct PromptDetailResponse {
    pub prompt: PromptResponse,
    pub branches: Vec<BranchResponse>,
}

impl From<ProjectRecord> for ProjectResponse {
    fn from(p: ProjectRecord) -> Self {
        Self {
            id: p.project_id,
            name: p.name,
            description: p.description,
            team_id: p.team_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<PromptRecord> for PromptResponse {
    fn from(p: PromptRecord) -> Self {
        Self {
            id: p.prompt_id,
            project_id: p.project_id,
            name: p.name,
            description: p.description,
            stub: p.stub,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<BranchRecord> for BranchResponse {
    fn from(b: BranchRecord) -> Self {
        Self {
            name: b.branch_name,
            head_version: b.head_version,
            active_version: b.active_version,
            parent_branch: b.parent_branch,
            parent_version: b.parent_version,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

impl From<VersionRecord> for VersionResponse {
    fn from(v: VersionRecord) -> Self {
        Self {
            version: v.version_id,
            branch: v.branch_name,
            checksum: v.checksum,
            size_bytes: v.size_bytes,
            message: v.message,
            author: v.author,
            created_at: v.created_at,
        }
    }
}

impl From<PromptContent> for PromptContentResponse {
    fn from(c: PromptContent) -> Self {
        Self {
            prompt_id: c.version.prompt_id,
            project_id: c.version.project_id,
            branch: c.branch.branch_name,
            version: c.version.version_id,
            active_version: c.branch.active_version,
            head_version: c.branch.head_version,
            content: c.content,
            checksum: c.version.checksum,
            message: c.version.message,
            author: c.version.author,
            created_at: c.version.created_at,
        }
    }
}

fn convert_all<T, R: From<T>>(items: Vec<T>) -> Vec<R> {
    items.into_iter().map(R::from).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Facade
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PromptFacade {
    manager: Arc<VersionManager>,
}

impl PromptFacade {
    pub fn new(manager: Arc<VersionManager>) -> Self {
        Self { manager }
    }

    pub async fn create_project(
        &self,
        tenant: &Tenant,
        req: CreateProjectRequest,
    ) -> Result<ProjectResponse, AppError> {
        let project = self
            .manager
            .create_project(
                &tenant.org_id,
                req.team_id.as_deref(),
                &req.name,
                req.description.as_deref(),
            )
            .await?;
        Ok(project.into())
    }

    pub async fn list_projects(&self, tenant: &Tenant) -> Result<Vec<ProjectResponse>, AppError> {
        Ok(convert_all(self.manager.list_projects(&tenant.org_id).await?))
    }

    pub async fn get_project(
        &self,
        tenant: &Tenant,
        path: &ProjectPath,
    ) -> Result<ProjectResponse, AppError> {
        let project = self
            .manager
            .get_project(&tenant.org_id, &path.project_id)
            .await?;
        Ok(project.into())
    }

    pub async fn delete_project(&self, tenant: &Tenant, path: &ProjectPath) -> Result<(), AppError> {
        self.manager
            .delete_project(&tenant.org_id, &path.project_id)
            .await?;
        Ok(())
    }

    pub async fn update_project(
        &self,
        tenant: &Tenant,
        path: &ProjectPath,
        req: UpdateMetadataRequest,
    ) -> Result<ProjectResponse, AppError> {
        let project = self
            .manager
            .update_project(&tenant.org_id, &path.project_id, req.as_update())
            .await?;
        Ok(project.into())
    }

    pub async fn create_prompt(
        &self,
        tenant: &Tenant,
        path: &ProjectPath,
        req: CreatePromptRequest,
    ) -> Result<CreatePromptResponse, AppError> {
        let created = self
            .manager
            .create_prompt(
                &tenant.org_id,
                &path.project_id,
                NewPrompt {
                    name: &req.name,
                    description: req.description.as_deref(),
                    content: &req.content,
                    message: req.message.as_deref(),
                    author: tenant.user_id.as_deref(),
                },
            )
            .await?;
        Ok(CreatePromptResponse {
            prompt: created.prompt.into(),
            content: created.content.into(),
        })
    }

    pub async fn list_prompts(
        &self,
        tenant: &Tenant,
        path: &ProjectPath,
    ) -> Result<Vec<PromptResponse>, AppError> {
        let prompts = self
            .manager
            .list_prompts(&tenant.org_id, &path.project_id)
            .await?;
        Ok(convert_all(prompts))
    }

    pub async fn get_prompt_info(
        &self,
        tenant: &Tenant,
        path: &PromptPath,
    ) -> Result<PromptDetailResponse, AppError> {
        let overview = self.manager.get_prompt_info(path.prompt_ref(tenant)).await?;
        Ok(PromptDetailResponse {
            prompt: overview.prompt.into(),
            branches: convert_all(overview.branches),
        })
    }

    pub async fn update_prompt(
        &self,
        tenant: &Tenant,
        path: &PromptPath,
        req: UpdateMetadataRequest,
    ) -> Result<PromptResponse, AppError> {
        let prompt = self
            .manager
            .update_prompt(path.prompt_ref(tenant), req.as_update())
            .await?;
        Ok(prompt.into())
    }

    pub async fn delete_prompt(&self, tenant: &Tenant, path: &PromptPath) -> Result<(), AppError> {
        self.manager.delete_prompt(path.prompt_ref(tenant)).await?;
        Ok(())
    }

    pub async fn get_prompt(
        &self,
        tenant: &Tenant,
        path: &BranchPath,
        query: &VersionQuery,
    ) -> Result<PromptContentResponse, AppError> {
        let content = self
            .manager
            .get_prompt(path.prompt_ref(tenant), &path.branch, query.version)
            .await?;
        Ok(content.into())
    }

    pub async fn update_prompt_content(
        &self,
        tenant: &Tenant,
        path: &BranchPath,
        req: UpdateContentRequest,
    ) -> Result<PromptContentResponse, AppError> {
        let appended = self
            .manager
            .update_prompt_content(
                path.prompt_ref(tenant),
                &path.branch,
                &req.content,
                req.message.as_deref(),
            )
            .await?;
        Ok(appended.into())
    }

    pub async fn create_branch(
        &self,
        tenant: &Tenant,
        path: &PromptPath,
        req: CreateBranchRequest,
    ) -> Result<BranchResponse, AppError> {
        let from = req.from_branch.as_deref().unwrap_or(MAIN_BRANCH);
        let branch = self
            .manager
            .create_branch(path.prompt_ref(tenant), &req.name, from)
            .await?;
        Ok(branch.into())
    }

    pub async fn list_branches(
        &self,
        tenant: &Tenant,
        path: &PromptPath,
    ) -> Result<Vec<BranchResponse>, AppError> {
        let branches = self.manager.list_branches(path.prompt_ref(tenant)).await?;
        Ok(convert_all(branches))
    }

    pub async fn get_branch(
        &self,
        tenant: &Tenant,
        path: &BranchPath,
    ) -> Result<BranchResponse, AppError> {
        let branch = self
            .manager
            .get_branch(path.prompt_ref(tenant), &path.branch)
            .await?;
        Ok(branch.into())
    }

    pub async fn delete_branch(&self, tenant: &Tenant, path: &BranchPath) -> Result<(), AppError> {
        self.manager
            .delete_branch(path.prompt_ref(tenant), &path.branch)
            .await?;
        Ok(())
    }

    pub async fn list_versions(
        &self,
        tenant: &Tenant,
        path: &BranchPath,
    ) -> Result<Vec<VersionResponse>, AppError> {
        let versions = self
            .manager
            .list_versions(path.prompt_ref(tenant), &path.branch)
            .await?;
        Ok(convert_all(versions))
    }

    pub async fn update_active_version(
        &self,
        tenant: &Tenant,
        path: &BranchPath,
        req: UpdateActiveVersionRequest,
    ) -> Result<BranchResponse, AppError> {
        let branch = self
            .manager
            .update_active_version(path.prompt_ref(tenant), &path.branch, req.version)
            .await?;
        Ok(branch.into())
    }
}
