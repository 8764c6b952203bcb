pub mod health;

use axum::{
    routing::{get, put},
    Router,
};

use crate::prompts::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Projects
        .route(
            "/api/v1/projects",
            get(handlers::handle_list_projects).post(handlers::handle_create_project),
        )
        .route(
            "/api/v1/projects/:project_id",
            get(handlers::handle_get_project)
                .patch(handlers::handle_update_project)
                .delete(handlers::handle_delete_project),
        )
        // Prompts
        .route(
            "/api/v1/projects/:project_id/prompts",
            get(handlers::handle_list_prompts).post(handlers::handle_create_prompt),
        )
        .route(
            "/api/v1/projects/:project_id/prompts/:prompt_id",
            get(handlers::handle_get_prompt_info)
                .patch(handlers::handle_update_prompt)
                .delete(handlers::handle_delete_prompt),
        )
        // Branches and versions
        .route(
            "/api/v1/projects/:project_id/prompts/:prompt_id/branches",
            get(handlers::handle_list_branches).post(handlers::handle_create_branch),
        )
        .route(
            "/api/v1/projects/:project_id/prompts/:prompt_id/branches/:branch",
            get(handlers::handle_get_branch).delete(handlers::handle_delete_branch),
        )
        .route(
            "/api/v1/projects/:project_id/prompts/:prompt_id/branches/:branch/content",
            get(handlers::handle_get_content).put(handlers::handle_update_content),
        )
        .route(
            "/api/v1/projects/:project_id/prompts/:prompt_id/branches/:branch/versions",
            get(handlers::handle_list_versions),
        )
        .route(
            "/api/v1/projects/:project_id/prompts/:prompt_id/branches/:branch/active",
            put(handlers::handle_update_active_version),
        )
        .with_state(state)
}
