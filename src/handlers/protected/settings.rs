use axum::extract::{Extension, State};

use crate::api::AppState;
use crate::database::models::{SettingsPatch, SiteSettings};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, TeamContext};
use crate::services::settings_service;

/// GET /api/teams/:team/settings
pub async fn get(Extension(ctx): Extension<TeamContext>) -> ApiResult<SiteSettings> {
    let store = ctx.store.read().await;
    Ok(ApiResponse::success(settings_service::get_settings(&store, &ctx.profile)?))
}

/// PATCH /api/teams/:team/settings - fields left out stay unchanged
pub async fn patch(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    ApiJson(patch): ApiJson<SettingsPatch>,
) -> ApiResult<SiteSettings> {
    let settings = {
        let mut store = ctx.store.write().await;
        settings_service::update_settings(&mut store, &ctx.profile, patch)?
    };
    state.record(&ctx, "settings.update", &settings.site_name).await;
    Ok(ApiResponse::success(settings))
}
