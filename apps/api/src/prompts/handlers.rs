use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::prompts::facade::{
    BranchPath, BranchResponse, CreateBranchRequest, CreateProjectRequest, CreatePromptRequest,
    CreatePromptResponse, ProjectPath, ProjectResponse, PromptContentResponse,
    PromptDetailResponse, PromptPath, PromptResponse, UpdateActiveVersionRequest,
    UpdateContentRequest, UpdateMetadataRequest, VersionQuery, VersionResponse,
};
use crate::prompts::tenant::Tenant;
use crate::state::AppState;

/// POST /api/v1/projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), AppError> {
    let project = state.prompts.create_project(&tenant, req).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects
pub async fn handle_list_projects(
    State(state): State<AppState>,
    tenant: Tenant,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    Ok(Json(state.prompts.list_projects(&tenant).await?))
}

/// GET /api/v1/projects/:project_id
pub async fn handle_get_project(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<ProjectPath>,
) -> Result<Json<ProjectResponse>, AppError> {
    Ok(Json(state.prompts.get_project(&tenant, &path).await?))
}

/// PATCH /api/v1/projects/:project_id
pub async fn handle_update_project(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<ProjectPath>,
    Json(req): Json<UpdateMetadataRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    Ok(Json(state.prompts.update_project(&tenant, &path, req).await?))
}

/// DELETE /api/v1/projects/:project_id
pub async fn handle_delete_project(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<ProjectPath>,
) -> Result<StatusCode, AppError> {
    state.prompts.delete_project(&tenant, &path).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/:project_id/prompts
pub async fn handle_create_prompt(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<ProjectPath>,
    Json(req): Json<CreatePromptRequest>,
) -> Result<(StatusCode, Json<CreatePromptResponse>), AppError> {
    let created = state.prompts.create_prompt(&tenant, &path, req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/projects/:project_id/prompts
pub async fn handle_list_prompts(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<ProjectPath>,
) -> Result<Json<Vec<PromptResponse>>, AppError> {
    Ok(Json(state.prompts.list_prompts(&tenant, &path).await?))
}

/// GET /api/v1/projects/:project_id/prompts/:prompt_id
pub async fn handle_get_prompt_info(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<PromptPath>,
) -> Result<Json<PromptDetailResponse>, AppError> {
    Ok(Json(state.prompts.get_prompt_info(&tenant, &path).await?))
}

/// PATCH /api/v1/projects/:project_id/prompts/:prompt_id
pub async fn handle_update_prompt(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<PromptPath>,
    Json(req): Json<UpdateMetadataRequest>,
) -> Result<Json<PromptResponse>, AppError> {
    Ok(Json(state.prompts.update_prompt(&tenant, &path, req).await?))
}

/// DELETE /api/v1/projects/:project_id/prompts/:prompt_id
pub async fn handle_delete_prompt(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<PromptPath>,
) -> Result<StatusCode, AppError> {
    state.prompts.delete_prompt(&tenant, &path).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/projects/:project_id/prompts/:prompt_id/branches
pub async fn handle_list_branches(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<PromptPath>,
) -> Result<Json<Vec<BranchResponse>>, AppError> {
    Ok(Json(state.prompts.list_branches(&tenant, &path).await?))
}

/// POST /api/v1/projects/:project_id/prompts/:prompt_id/branches
pub async fn handle_create_branch(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<PromptPath>,
    Json(req): Json<CreateBranchRequest>,
) -> Result<(StatusCode, Json<BranchResponse>), AppError> {
    let branch = state.prompts.create_branch(&tenant, &path, req).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

/// GET /api/v1/projects/:project_id/prompts/:prompt_id/branches/:branch
pub async fn handle_get_branch(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<BranchPath>,
) -> Result<Json<BranchResponse>, AppError> {
    Ok(Json(state.prompts.get_branch(&tenant, &path).await?))
}

/// DELETE /api/v1/projects/:project_id/prompts/:prompt_id/branches/:branch
pub async fn handle_delete_branch(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<BranchPath>,
) -> Result<StatusCode, AppError> {
    state.prompts.delete_branch(&tenant, &path).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/projects/:project_id/prompts/:prompt_id/branches/:branch/content
pub async fn handle_get_content(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<BranchPath>,
    Query(query): Query<VersionQuery>,
) -> Result<Json<PromptContentResponse>, AppError> {
    Ok(Json(state.prompts.get_prompt(&tenant, &path, &query).await?))
}

/// PUT /api/v1/projects/:project_id/prompts/:prompt_id/branches/:branch/content
pub async fn handle_update_content(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<BranchPath>,
    Json(req): Json<UpdateContentRequest>,
) -> Result<(StatusCode, Json<PromptContentResponse>), AppError> {
    let appended = state
        .prompts
        .update_prompt_content(&tenant, &path, req)
        .await?;
    Ok((StatusCode::CREATED, Json(appended)))
}

/// GET /api/v1/projects/:project_id/prompts/:prompt_id/branches/:branch/versions
pub async fn handle_list_versions(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<BranchPath>,
) -> Result<Json<Vec<VersionResponse>>, AppError> {
    Ok(Json(state.prompts.list_versions(&tenant, &path).await?))
}

/// PUT /api/v1/projects/:project_id/prompts/:prompt_id/branches/:branch/active
pub async fn handle_update_active_version(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(path): Path<BranchPath>,
    Json(req): Json<UpdateActiveVersionRequest>,
) -> Result<Json<BranchResponse>, AppError> {
    Ok(Json(
        state
            .prompts
            .update_active_version(&tenant, &path, req)
            .await?,
    ))
}
