use axum::extract::{Extension, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::AccessProfile;
use crate::api::AppState;
use crate::database::models::{MenuTree, Team};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, TeamContext};
use crate::services::{menu_service, team_service};

#[derive(Debug, Deserialize)]
pub struct RenameTeam {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferOwnership {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct Me {
    pub team: Team,
    pub profile: AccessProfile,
    pub menu: MenuTree,
}

/// GET /api/teams/:team
pub async fn get(Extension(ctx): Extension<TeamContext>) -> ApiResult<Team> {
    let store = ctx.store.read().await;
    Ok(ApiResponse::success(store.team.clone()))
}

/// PATCH /api/teams/:team - rename
pub async fn rename(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    ApiJson(request): ApiJson<RenameTeam>,
) -> ApiResult<Team> {
    let team = {
        let mut store = ctx.store.write().await;
        team_service::rename_team(&mut store, &ctx.profile, &request.name)?
    };
    state.record(&ctx, "team.rename", &team.name).await;
    Ok(ApiResponse::success(team))
}

/// DELETE /api/teams/:team - owner only
pub async fn delete(State(state): State<AppState>, Extension(ctx): Extension<TeamContext>) -> ApiResult<()> {
    team_service::delete_team(&state.stores, &state.cache, ctx.team_id, &ctx.profile).await?;
    state.record(&ctx, "team.delete", ctx.team_id).await;
    Ok(ApiResponse::<()>::no_content())
}

/// POST /api/teams/:team/transfer - hand the team to another member
pub async fn transfer(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    ApiJson(request): ApiJson<TransferOwnership>,
) -> ApiResult<Team> {
    let team = {
        let mut store = ctx.store.write().await;
        team_service::transfer_ownership(&mut store, &ctx.profile, request.user_id)?
    };
    state.record(&ctx, "team.transfer", request.user_id).await;
    Ok(ApiResponse::success(team))
}

/// GET /api/teams/:team/me - the caller's access profile and visible menu
pub async fn me(Extension(ctx): Extension<TeamContext>) -> ApiResult<Me> {
    let store = ctx.store.read().await;
    Ok(ApiResponse::success(Me {
        team: store.team.clone(),
        menu: menu_service::visible_menu(&store.menu, &ctx.profile),
        profile: ctx.profile.clone(),
    }))
}
