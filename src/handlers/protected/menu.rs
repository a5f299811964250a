use axum::extract::{Extension, Path, Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::AppState;
use crate::database::models::{MenuItem, MenuTree};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, TeamContext};
use crate::services::menu_service::{self, NewMenuItem};
use crate::tree::{DragInstruction, MoveInstruction, Projection, RemoveMode, TreeItem};

#[derive(Debug, Default, Deserialize)]
pub struct RemoveQuery {
    #[serde(default)]
    pub mode: RemoveMode,
}

#[derive(Debug, Serialize)]
pub struct Removed {
    pub removed_ids: Vec<Uuid>,
    pub menu: MenuTree,
}

#[derive(Debug, Serialize)]
pub struct Dragged {
    pub menu: MenuTree,
    pub projection: Projection,
}

/// GET /api/teams/:team/menu - the whole menu, for editing
pub async fn get(Extension(ctx): Extension<TeamContext>) -> ApiResult<MenuTree> {
    let store = ctx.store.read().await;
    Ok(ApiResponse::success(menu_service::get_menu(&store, &ctx.profile)?))
}

/// POST /api/teams/:team/menu/items
pub async fn insert(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    ApiJson(request): ApiJson<NewMenuItem>,
) -> ApiResult<TreeItem<MenuItem>> {
    let node = {
        let mut store = ctx.store.write().await;
        menu_service::insert_item(&mut store, &ctx.profile, request)?
    };
    state.record(&ctx, "menu.insert", node.id).await;
    Ok(ApiResponse::created(node))
}

/// PUT /api/teams/:team/menu/items/:item_id
pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, item_id)): Path<(String, Uuid)>,
    ApiJson(item): ApiJson<MenuItem>,
) -> ApiResult<TreeItem<MenuItem>> {
    let node = {
        let mut store = ctx.store.write().await;
        menu_service::update_item(&mut store, &ctx.profile, item_id, item)?
    };
    state.record(&ctx, "menu.update", item_id).await;
    Ok(ApiResponse::success(node))
}

/// DELETE /api/teams/:team/menu/items/:item_id?mode=cascade|promote_children
pub async fn remove(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, item_id)): Path<(String, Uuid)>,
    Query(query): Query<RemoveQuery>,
) -> ApiResult<Removed> {
    let removed = {
        let mut store = ctx.store.write().await;
        let removed_ids = menu_service::remove_item(&mut store, &ctx.profile, item_id, query.mode)?;
        Removed {
            removed_ids,
            menu: store.menu.clone(),
        }
    };
    state.record(&ctx, "menu.remove", item_id).await;
    Ok(ApiResponse::success(removed))
}

/// POST /api/teams/:team/menu/move
pub async fn move_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    ApiJson(instruction): ApiJson<MoveInstruction>,
) -> ApiResult<MenuTree> {
    let menu = {
        let mut store = ctx.store.write().await;
        menu_service::move_item(&mut store, &ctx.profile, &instruction)?
    };
    state.record(&ctx, "menu.move", instruction.id).await;
    Ok(ApiResponse::success(menu))
}

/// POST /api/teams/:team/menu/drag - apply a pointer drag
pub async fn drag(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    ApiJson(instruction): ApiJson<DragInstruction>,
) -> ApiResult<Dragged> {
    let (menu, projection) = {
        let mut store = ctx.store.write().await;
        menu_service::drag_item(&mut store, &ctx.profile, &instruction)?
    };
    state.record(&ctx, "menu.drag", instruction.active_id).await;
    Ok(ApiResponse::success(Dragged { menu, projection }))
}
