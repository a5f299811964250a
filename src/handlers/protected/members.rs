use axum::extract::{Extension, Path, State};
use uuid::Uuid;

use crate::api::AppState;
use crate::database::models::Member;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, TeamContext};
use crate::services::member_service::{self, NewMember, SetRoles};

/// GET /api/teams/:team/members
pub async fn list(Extension(ctx): Extension<TeamContext>) -> ApiResult<Vec<Member>> {
    let store = ctx.store.read().await;
    Ok(ApiResponse::success(member_service::list_members(&store, &ctx.profile)?))
}

/// POST /api/teams/:team/members
pub async fn add(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    ApiJson(request): ApiJson<NewMember>,
) -> ApiResult<Member> {
    let member = {
        let mut store = ctx.store.write().await;
        member_service::add_member(&mut store, &ctx.profile, request)?
    };
    state.record(&ctx, "member.add", member.user_id).await;
    Ok(ApiResponse::created(member))
}

/// PUT /api/teams/:team/members/:user_id/roles - replace role assignment
pub async fn set_roles(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, user_id)): Path<(String, Uuid)>,
    ApiJson(request): ApiJson<SetRoles>,
) -> ApiResult<Member> {
    let member = {
        let mut store = ctx.store.write().await;
        member_service::set_roles(&mut store, &ctx.profile, user_id, request.role_ids)?
    };
    state.record(&ctx, "member.roles", user_id).await;
    Ok(ApiResponse::success(member))
}

/// DELETE /api/teams/:team/members/:user_id
pub async fn remove(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, user_id)): Path<(String, Uuid)>,
) -> ApiResult<Member> {
    let member = {
        let mut store = ctx.store.write().await;
        member_service::remove_member(&mut store, &ctx.profile, user_id)?
    };
    state.record(&ctx, "member.remove", user_id).await;
    Ok(ApiResponse::success(member))
}
