use std::collections::HashMap;

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::auth::AuthUser;
use crate::access::{AccessProfile, PermissionCache};
use crate::api::AppState;
use crate::database::SharedStore;
use crate::error::ApiError;

/// The team named in the path and what the caller may do in it.
#[derive(Clone)]
pub struct TeamContext {
    pub store: SharedStore,
    pub team_id: Uuid,
    pub profile: AccessProfile,
}

/// Loads the `:team` path segment (id or slug) and resolves the caller's
/// access profile, through the permission cache when enabled. Must run after
/// `jwt_auth_middleware`.
pub async fn team_access_middleware(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before team access"))?;

    let team_ref = params
        .get("team")
        .ok_or_else(|| ApiError::bad_request("Missing team in path"))?;
    let store = state.stores.get(team_ref).await?;

    let (team_id, profile) = {
        let guard = store.read().await;
        let profile = profile_for(&state.cache, &guard, user.user_id).await?;
        (guard.team_id(), profile)
    };

    request.extensions_mut().insert(TeamContext {
        store,
        team_id,
        profile,
    });
    Ok(next.run(request).await)
}

async fn profile_for(
    cache: &PermissionCache,
    store: &crate::database::TeamStore,
    user_id: Uuid,
) -> Result<AccessProfile, ApiError> {
    let team_id = store.team_id();
    let generation = store.generation();

    if let Some(profile) = cache.get(team_id, user_id, generation).await {
        tracing::debug!("Permission cache hit for {} in {}", user_id, store.team.slug);
        return Ok(profile);
    }

    let profile = store.resolve(user_id).map_err(|err| {
        tracing::warn!("Rejected {} for team {}: {}", user_id, store.team.slug, err);
        ApiError::from(err)
    })?;
    cache.insert(profile.clone(), generation).await;
    tracing::debug!("Resolved access for {} in {} at generation {}", user_id, store.team.slug, generation);
    Ok(profile)
}
