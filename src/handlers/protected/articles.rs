use axum::extract::{Extension, Path, Query, State};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::access::AccessProfile;
use crate::api::AppState;
use crate::database::models::{Article, ArticleDraft, ArticleStatus, ArticleUpdate};
use crate::database::TeamStore;
use crate::filter::FilterData;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, TeamContext};
use crate::services::article_service::{self, ArticlePage, Purged};
use crate::services::ServiceResult;

/// Query string of the plain listing; POST /find/articles takes a full filter.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<ArticleStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(default)]
    pub include_trashed: bool,
}

impl From<ListQuery> for FilterData {
    fn from(query: ListQuery) -> Self {
        FilterData {
            where_clause: query.status.map(|status| json!({ "status": status })),
            order: None,
            limit: query.limit,
            offset: query.offset,
            include_trashed: query.include_trashed,
        }
    }
}

/// GET /api/teams/:team/articles[?status=&limit=&offset=&include_trashed=]
pub async fn list(Extension(ctx): Extension<TeamContext>, Query(query): Query<ListQuery>) -> ApiResult<ArticlePage> {
    let store = ctx.store.read().await;
    Ok(ApiResponse::success(article_service::find(&store, &ctx.profile, query.into())?))
}

/// POST /api/teams/:team/find/articles - filtered find
pub async fn find(Extension(ctx): Extension<TeamContext>, ApiJson(filter): ApiJson<FilterData>) -> ApiResult<ArticlePage> {
    let store = ctx.store.read().await;
    Ok(ApiResponse::success(article_service::find(&store, &ctx.profile, filter)?))
}

/// GET /api/teams/:team/articles/:article - by id or slug
pub async fn get(
    Extension(ctx): Extension<TeamContext>,
    Path((_team, article)): Path<(String, String)>,
) -> ApiResult<Article> {
    let store = ctx.store.read().await;
    Ok(ApiResponse::success(article_service::get(&store, &ctx.profile, &article)?))
}

/// POST /api/teams/:team/articles
pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    ApiJson(draft): ApiJson<ArticleDraft>,
) -> ApiResult<Article> {
    let article = {
        let mut store = ctx.store.write().await;
        article_service::create(&mut store, &ctx.profile, draft)?
    };
    state.record(&ctx, "article.create", &article.slug).await;
    Ok(ApiResponse::created(article))
}

/// PATCH /api/teams/:team/articles/:article
pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, id)): Path<(String, Uuid)>,
    ApiJson(update): ApiJson<ArticleUpdate>,
) -> ApiResult<Article> {
    let article = {
        let mut store = ctx.store.write().await;
        article_service::update(&mut store, &ctx.profile, id, update)?
    };
    state.record(&ctx, "article.update", &article.slug).await;
    Ok(ApiResponse::success(article))
}

type Transition = fn(&mut TeamStore, &AccessProfile, Uuid) -> ServiceResult<Article>;

async fn transition(state: &AppState, ctx: &TeamContext, id: Uuid, action: &str, change: Transition) -> ApiResult<Article> {
    let article = {
        let mut store = ctx.store.write().await;
        change(&mut store, &ctx.profile, id)?
    };
    state.record(ctx, action, &article.slug).await;
    Ok(ApiResponse::success(article))
}

/// POST /api/teams/:team/articles/:article/publish
pub async fn publish(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, id)): Path<(String, Uuid)>,
) -> ApiResult<Article> {
    transition(&state, &ctx, id, "article.publish", article_service::publish).await
}

/// POST /api/teams/:team/articles/:article/unpublish
pub async fn unpublish(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, id)): Path<(String, Uuid)>,
) -> ApiResult<Article> {
    transition(&state, &ctx, id, "article.unpublish", article_service::unpublish).await
}

/// POST /api/teams/:team/articles/:article/trash
pub async fn trash(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, id)): Path<(String, Uuid)>,
) -> ApiResult<Article> {
    transition(&state, &ctx, id, "article.trash", article_service::trash).await
}

/// POST /api/teams/:team/articles/:article/restore
pub async fn restore(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, id)): Path<(String, Uuid)>,
) -> ApiResult<Article> {
    transition(&state, &ctx, id, "article.restore", article_service::restore).await
}

/// DELETE /api/teams/:team/articles/:article - purge a trashed article
pub async fn purge(
    State(state): State<AppState>,
    Extension(ctx): Extension<TeamContext>,
    Path((_team, id)): Path<(String, Uuid)>,
) -> ApiResult<Purged> {
    let purged = {
        let mut store = ctx.store.write().await;
        article_service::purge(&mut store, &ctx.profile, id)?
    };
    state.record(&ctx, "article.purge", &purged.article.slug).await;
    Ok(ApiResponse::success(purged))
}
