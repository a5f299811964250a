use axum::extract::{Path, State};
use serde::Serialize;

use crate::api::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::navigation_service::{self, PublishedLink};
use crate::tree::TreeItem;

#[derive(Debug, Serialize)]
pub struct PublishedNavigation {
    pub key: String,
    pub revision: String,
    pub items: Vec<TreeItem<PublishedLink>>,
}

/// GET /api/teams/:team/navigation/:key/published - what the public site renders
pub async fn published(
    State(state): State<AppState>,
    Path((team, key)): Path<(String, String)>,
) -> ApiResult<PublishedNavigation> {
    let store = state.stores.get(&team).await?;
    let store = store.read().await;

    let items = navigation_service::published(&store, &key)?;
    let revision = store
        .navigations
        .get(&key)
        .map(|navigation| navigation.revision.clone())
        .unwrap_or_default();

    Ok(ApiResponse::success(PublishedNavigation { key, revision, items }))
}
