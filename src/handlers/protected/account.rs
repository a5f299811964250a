use axum::extract::{Extension, State};

use crate::api::AppState;
use crate::database::models::Team;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::services::team_service::{self, CreateTeam, Founder};
use crate::services::AuditEvent;

/// GET /api/auth/whoami - identity carried by the bearer token
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<AuthUser> {
    Ok(ApiResponse::success(user))
}

/// GET /api/teams - teams the caller owns or belongs to
pub async fn list_teams(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<Team>> {
    let teams = team_service::list_teams(&state.stores, user.user_id).await;
    Ok(ApiResponse::success(teams))
}

/// POST /api/teams - create a team owned by the caller
pub async fn create_team(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateTeam>,
) -> ApiResult<Team> {
    let founder = Founder {
        user_id: user.user_id,
        email: user.email,
        display_name: user.name,
    };
    let team = team_service::create_team(&state.stores, founder, request).await?;

    state
        .audit
        .record(AuditEvent::new(Some(team.id), user.user_id, "team.create", &team.slug))
        .await;
    Ok(ApiResponse::created(team))
}
