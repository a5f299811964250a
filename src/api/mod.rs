use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, team_access_middleware};

pub mod state;

pub use state::AppState;

/// The full HTTP application.
pub fn app(state: AppState) -> Router {
    let api = &config::config().api;

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/permissions", get(public::permissions))
        .route(
            "/api/teams/:team/navigation/:key/published",
            get(public::navigation_published),
        )
        // Protected
        .merge(account_routes())
        .merge(team_routes(&state))
        // Global middleware
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn account_routes() -> Router<AppState> {
    use protected::account;

    Router::new()
        .route("/api/auth/whoami", get(account::whoami))
        .route("/api/teams", get(account::list_teams).post(account::create_team))
        .route_layer(from_fn(jwt_auth_middleware))
}

/// Everything under /api/teams/:team. Layers run bottom-up: the token is
/// checked before team access is resolved.
fn team_routes(state: &AppState) -> Router<AppState> {
    use protected::{articles, members, menu, navigation, roles, settings, team};

    Router::new()
        // Team
        .route(
            "/api/teams/:team",
            get(team::get).patch(team::rename).delete(team::delete),
        )
        .route("/api/teams/:team/transfer", post(team::transfer))
        .route("/api/teams/:team/me", get(team::me))
        // Members
        .route("/api/teams/:team/members", get(members::list).post(members::add))
        .route("/api/teams/:team/members/:user_id", axum::routing::delete(members::remove))
        .route("/api/teams/:team/members/:user_id/roles", put(members::set_roles))
        // Roles
        .route("/api/teams/:team/roles", get(roles::list).post(roles::create))
        .route(
            "/api/teams/:team/roles/:role_id",
            get(roles::get).put(roles::update).delete(roles::delete),
        )
        // Admin menu
        .route("/api/teams/:team/menu", get(menu::get))
        .route("/api/teams/:team/menu/items", post(menu::insert))
        .route(
            "/api/teams/:team/menu/items/:item_id",
            put(menu::update).delete(menu::remove),
        )
        .route("/api/teams/:team/menu/move", post(menu::move_item))
        .route("/api/teams/:team/menu/drag", post(menu::drag))
        // Navigation
        .route(
            "/api/teams/:team/navigation",
            get(navigation::list).post(navigation::create),
        )
        .route(
            "/api/teams/:team/navigation/:key",
            get(navigation::get)
                .patch(navigation::rename)
                .delete(navigation::delete),
        )
        .route(
            "/api/teams/:team/navigation/:key/items",
            post(navigation::add_item).put(navigation::replace_items),
        )
        .route(
            "/api/teams/:team/navigation/:key/items/:item_id",
            put(navigation::update_item).delete(navigation::remove_item),
        )
        .route("/api/teams/:team/navigation/:key/move", post(navigation::move_item))
        .route("/api/teams/:team/navigation/:key/drag", post(navigation::drag))
        .route(
            "/api/teams/:team/navigation/:key/drag/preview",
            post(navigation::preview_drag),
        )
        // Settings
        .route(
            "/api/teams/:team/settings",
            get(settings::get).patch(settings::patch),
        )
        // Articles
        .route(
            "/api/teams/:team/articles",
            get(articles::list).post(articles::create),
        )
        .route(
            "/api/teams/:team/articles/:article",
            get(articles::get).patch(articles::update).delete(articles::purge),
        )
        .route("/api/teams/:team/articles/:article/publish", post(articles::publish))
        .route("/api/teams/:team/articles/:article/unpublish", post(articles::unpublish))
        .route("/api/teams/:team/articles/:article/trash", post(articles::trash))
        .route("/api/teams/:team/articles/:article/restore", post(articles::restore))
        .route("/api/teams/:team/find/articles", post(articles::find))
        .route_layer(from_fn_with_state(state.clone(), team_access_middleware))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let security = &config::config().security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::PermissionCache;
    use crate::auth::{generate_jwt, Claims};
    use crate::database::StoreManager;
    use crate::services::MemoryAuditSink;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;
    use uuid::Uuid;

    const OWNER: Uuid = Uuid::from_u128(0x0a);
    const STRANGER: Uuid = Uuid::from_u128(0x0b);

    fn state() -> (AppState, Arc<MemoryAuditSink>) {
        let audit = Arc::new(MemoryAuditSink::new());
        let state = AppState::new(
            StoreManager::new(),
            PermissionCache::new(Duration::from_secs(60), true),
            audit.clone(),
        );
        (state, audit)
    }

    fn token(user: Uuid) -> String {
        let claims = Claims::new(user, format!("{}@example.com", user.simple()), "Test User");
        generate_jwt(&claims).unwrap()
    }

    async fn call(app: &Router, method: &str, uri: &str, user: Option<Uuid>, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            request = request.header("authorization", format!("Bearer {}", token(user)));
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn public_routes_need_no_token() {
        let (state, _) = state();
        let app = app(state);

        let (status, body) = call(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");

        let (status, body) = call(&app, "GET", "/api/permissions", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(16));
    }

    #[tokio::test]
    async fn protected_routes_require_bearer_token() {
        let (state, _) = state();
        let app = app(state);

        let (status, body) = call(&app, "GET", "/api/teams", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, _) = call(&app, "GET", "/api/teams/acme/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn team_lifecycle_and_access() {
        let (state, audit) = state();
        let app = app(state.clone());

        let (status, body) = call(&app, "POST", "/api/teams", Some(OWNER), Some(json!({ "name": "Acme Corp" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["slug"], "acme-corp");

        let (status, body) = call(&app, "GET", "/api/teams/acme-corp/me", Some(OWNER), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["profile"]["is_owner"], true);

        let (status, _) = call(&app, "GET", "/api/teams/acme-corp/me", Some(STRANGER), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(&app, "GET", "/api/teams/nope/me", Some(OWNER), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Second lookup is served from the cache.
        call(&app, "GET", "/api/teams/acme-corp", Some(OWNER), None).await;
        assert!(state.cache.stats().await.hits >= 1);

        assert_eq!(audit.actions().await, vec!["team.create".to_string()]);
    }

    #[tokio::test]
    async fn membership_changes_take_effect_immediately() {
        let (state, _) = state();
        let app = app(state);
        call(&app, "POST", "/api/teams", Some(OWNER), Some(json!({ "name": "Acme" }))).await;

        let (_, roles) = call(&app, "GET", "/api/teams/acme/roles", Some(OWNER), None).await;
        let viewer = roles["data"]
            .as_array()
            .and_then(|roles| roles.iter().find(|r| r["name"] == "Viewer"))
            .map(|r| r["id"].clone())
            .unwrap();

        // Prime the cache with the stranger's rejection, then add them.
        let (status, _) = call(&app, "GET", "/api/teams/acme/settings", Some(STRANGER), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let member = json!({
            "user_id": STRANGER,
            "email": "new@example.com",
            "display_name": "Newcomer",
            "role_ids": [viewer]
        });
        let (status, _) = call(&app, "POST", "/api/teams/acme/members", Some(OWNER), Some(member)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(&app, "GET", "/api/teams/acme/settings", Some(STRANGER), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["site_name"], "Acme");

        let (status, body) = call(&app, "PATCH", "/api/teams/acme/settings", Some(STRANGER), Some(json!({ "tagline": "x" }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn navigation_revision_conflicts_and_published_view() {
        let (state, _) = state();
        let app = app(state);
        call(&app, "POST", "/api/teams", Some(OWNER), Some(json!({ "name": "Acme" }))).await;

        let item = json!({ "label": "Home", "link": { "type": "internal", "path": "/" } });
        let (status, body) = call(&app, "POST", "/api/teams/acme/navigation/main/items", Some(OWNER), Some(item)).await;
        assert_eq!(status, StatusCode::CREATED);
        let revision = body["data"]["navigation"]["revision"].as_str().unwrap().to_string();

        let stale = json!({ "title": "Header", "expected_revision": "stale" });
        let (status, body) = call(&app, "PATCH", "/api/teams/acme/navigation/main", Some(OWNER), Some(stale)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");

        let fresh = json!({ "title": "Header", "expected_revision": revision });
        let (status, _) = call(&app, "PATCH", "/api/teams/acme/navigation/main", Some(OWNER), Some(fresh)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, "GET", "/api/teams/acme/navigation/main/published", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["items"][0]["href"], "/");
    }

    #[tokio::test]
    async fn bad_json_is_reported_in_the_error_envelope() {
        let (state, _) = state();
        let app = app(state);

        let (status, body) = call(&app, "POST", "/api/teams", Some(OWNER), Some(json!({ "title": "no name" }))).await;
        assert!(status.is_client_error());
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INVALID_JSON");
    }
}
