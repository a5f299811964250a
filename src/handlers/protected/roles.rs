use axum::extract::{Extension, Path, State};
use uuid::Uuid;

use crate::api::AppState;
use crate::database::models::Role;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, TeamContext};
use crate::services::role_service::{self, RoleDraft};

/// GET /api/teams/:team/roles
pub async fn list(Extension(ctx): Extension<TeamContext>) -> ApiResult<Vec<Role>> {
    let store = ctx.store.read().await;
    Ok(ApiResponse::success(role_service::list_roles(&store, &ctx.profile)?))
}

/// GET /api/teams/:team/roles/:role_id
pub async fn get(
    Extension(ctx): Extension<TeamContext>,
    Path((_team, role_id)): Path<(String, Uuid)>,
) -> ApiResult<Role> {
    let store = ctx.store.read().await;
    Ok(ApiResponse::success(role_service::get_role(&store, &ctx.profile, role_id)?))
}

/// POST /api/teams/:team/roles
pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    ApiJson(draft): ApiJson<RoleDraft>,
) -> ApiResult<Role> {
    let role = {
        let mut store = ctx.store.write().await;
        role_service::create_role(&mut store, &ctx.profile, draft)?
    };
    state.record(&ctx, "role.create", &role.name).await;
    Ok(ApiResponse::created(role))
}

/// PUT /api/teams/:team/roles/:role_id
pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, role_id)): Path<(String, Uuid)>,
    ApiJson(draft): ApiJson<RoleDraft>,
) -> ApiResult<Role> {
    let role = {
        let mut store = ctx.store.write().await;
        role_service::update_role(&mut store, &ctx.profile, role_id, draft)?
    };
    state.record(&ctx, "role.update", &role.name).await;
    Ok(ApiResponse::success(role))
}

/// DELETE /api/teams/:team/roles/:role_id
pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, role_id)): Path<(String, Uuid)>,
) -> ApiResult<Role> {
    let role = {
        let mut store = ctx.store.write().await;
        role_service::delete_role(&mut store, &ctx.profile, role_id)?
    };
    state.record(&ctx, "role.delete", &role.name).await;
    Ok(ApiResponse::success(role))
}
