use axum::extract::{Extension, Path, Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::AppState;
use crate::database::models::{Navigation, NavigationItem};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, TeamContext};
use crate::services::navigation_service::{
    self, NewNavigation, NewNavigationItem, RemoveItem, Rename, ReplaceItems, Revised,
};
use crate::tree::{DragInstruction, MoveInstruction, Projection, RemoveMode};

/// Query of DELETE requests, which carry no body.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub mode: RemoveMode,
    #[serde(default)]
    pub expected_revision: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ItemAdded {
    pub item_id: Uuid,
    pub navigation: Navigation,
}

#[derive(Debug, Serialize)]
pub struct Dragged {
    pub navigation: Navigation,
    pub projection: Projection,
}

/// GET /api/teams/:team/navigation
pub async fn list(Extension(ctx): Extension<TeamContext>) -> ApiResult<Vec<Navigation>> {
    let store = ctx.store.read().await;
    Ok(ApiResponse::success(navigation_service::list(&store, &ctx.profile)?))
}

/// POST /api/teams/:team/navigation
pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    ApiJson(request): ApiJson<NewNavigation>,
) -> ApiResult<Navigation> {
    let navigation = {
        let mut store = ctx.store.write().await;
        navigation_service::create(&mut store, &ctx.profile, request)?
    };
    state.record(&ctx, "navigation.create", &navigation.key).await;
    Ok(ApiResponse::created(navigation))
}

/// GET /api/teams/:team/navigation/:key
pub async fn get(
    Extension(ctx): Extension<TeamContext>,
    Path((_team, key)): Path<(String, String)>,
) -> ApiResult<Navigation> {
    let store = ctx.store.read().await;
    Ok(ApiResponse::success(navigation_service::get(&store, &ctx.profile, &key)?))
}

/// PATCH /api/teams/:team/navigation/:key - retitle
pub async fn rename(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, key)): Path<(String, String)>,
    ApiJson(request): ApiJson<Revised<Rename>>,
) -> ApiResult<Navigation> {
    let navigation = {
        let mut store = ctx.store.write().await;
        navigation_service::rename(&mut store, &ctx.profile, &key, request)?
    };
    state.record(&ctx, "navigation.rename", &key).await;
    Ok(ApiResponse::success(navigation))
}

/// DELETE /api/teams/:team/navigation/:key[?expected_revision=]
pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, key)): Path<(String, String)>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<Navigation> {
    let navigation = {
        let mut store = ctx.store.write().await;
        navigation_service::delete(&mut store, &ctx.profile, &key, query.expected_revision.as_deref())?
    };
    state.record(&ctx, "navigation.delete", &key).await;
    Ok(ApiResponse::success(navigation))
}

/// POST /api/teams/:team/navigation/:key/items
pub async fn add_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, key)): Path<(String, String)>,
    ApiJson(request): ApiJson<Revised<NewNavigationItem>>,
) -> ApiResult<ItemAdded> {
    let (navigation, item_id) = {
        let mut store = ctx.store.write().await;
        navigation_service::add_item(&mut store, &ctx.profile, &key, request)?
    };
    state.record(&ctx, "navigation.item.add", item_id).await;
    Ok(ApiResponse::created(ItemAdded { item_id, navigation }))
}

/// PUT /api/teams/:team/navigation/:key/items - replace the whole tree
pub async fn replace_items(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, key)): Path<(String, String)>,
    ApiJson(request): ApiJson<Revised<ReplaceItems>>,
) -> ApiResult<Navigation> {
    let navigation = {
        let mut store = ctx.store.write().await;
        navigation_service::replace_items(&mut store, &ctx.profile, &key, request)?
    };
    state.record(&ctx, "navigation.replace", &key).await;
    Ok(ApiResponse::success(navigation))
}

/// PUT /api/teams/:team/navigation/:key/items/:item_id
pub async fn update_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, key, item_id)): Path<(String, String, Uuid)>,
    ApiJson(request): ApiJson<Revised<NavigationItem>>,
) -> ApiResult<Navigation> {
    let navigation = {
        let mut store = ctx.store.write().await;
        navigation_service::update_item(&mut store, &ctx.profile, &key, item_id, request)?
    };
    state.record(&ctx, "navigation.item.update", item_id).await;
    Ok(ApiResponse::success(navigation))
}

/// DELETE /api/teams/:team/navigation/:key/items/:item_id[?mode=&expected_revision=]
pub async fn remove_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, key, item_id)): Path<(String, String, Uuid)>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<Navigation> {
    let request = Revised {
        body: RemoveItem { mode: query.mode },
        expected_revision: query.expected_revision,
    };
    let navigation = {
        let mut store = ctx.store.write().await;
        navigation_service::remove_item(&mut store, &ctx.profile, &key, item_id, request)?
    };
    state.record(&ctx, "navigation.item.remove", item_id).await;
    Ok(ApiResponse::success(navigation))
}

/// POST /api/teams/:team/navigation/:key/move
pub async fn move_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, key)): Path<(String, String)>,
    ApiJson(request): ApiJson<Revised<MoveInstruction>>,
) -> ApiResult<Navigation> {
    let moved = request.body.id;
    let navigation = {
        let mut store = ctx.store.write().await;
        navigation_service::move_item(&mut store, &ctx.profile, &key, request)?
    };
    state.record(&ctx, "navigation.item.move", moved).await;
    Ok(ApiResponse::success(navigation))
}

/// POST /api/teams/:team/navigation/:key/drag
pub async fn drag(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, key)): Path<(String, String)>,
    ApiJson(request): ApiJson<Revised<DragInstruction>>,
) -> ApiResult<Dragged> {
    let dragged = request.body.active_id;
    let (navigation, projection) = {
        let mut store = ctx.store.write().await;
        navigation_service::drag_item(&mut store, &ctx.profile, &key, request)?
    };
    state.record(&ctx, "navigation.item.drag", dragged).await;
    Ok(ApiResponse::success(Dragged { navigation, projection }))
}

/// POST /api/teams/:team/navigation/:key/drag/preview - where a drop would land
pub async fn preview_drag(
    Extension(ctx): Extension<TeamContext>,
    Path((_team, key)): Path<(String, String)>,
    ApiJson(instruction): ApiJson<DragInstruction>,
) -> ApiResult<Projection> {
    let store = ctx.store.read().await;
    let projection = navigation_service::preview_drag(&store, &ctx.profile, &key, &instruction)?;
    Ok(ApiResponse::success(projection))
}
