use axum::extract::State;
use serde::Serialize;
use serde_json::{json, Value};

use crate::access::{CacheStats, Permission};
use crate::api::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - service description and endpoint map
pub async fn root() -> ApiResult<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Ok(ApiResponse::success(json!({
        "name": "CMS API (Rust)",
        "version": version,
        "description": "Multi-tenant CMS admin API built with Rust (Axum)",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "permissions": "/api/permissions (public)",
            "published": "/api/teams/:team/navigation/:key/published (public)",
            "auth": "/api/auth/whoami (protected)",
            "teams": "/api/teams[/:team] (protected)",
            "members": "/api/teams/:team/members (protected)",
            "roles": "/api/teams/:team/roles (protected)",
            "menu": "/api/teams/:team/menu (protected)",
            "navigation": "/api/teams/:team/navigation[/:key] (protected)",
            "settings": "/api/teams/:team/settings (protected)",
            "articles": "/api/teams/:team/articles[/:article] (protected)",
            "find": "/api/teams/:team/find/articles (protected)",
        }
    })))
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub teams: usize,
    pub permission_cache: CacheStats,
}

/// GET /health - liveness plus store and cache counters
pub async fn health(State(state): State<AppState>) -> ApiResult<Health> {
    Ok(ApiResponse::success(Health {
        status: "ok",
        timestamp: chrono::Utc::now(),
        teams: state.stores.len().await,
        permission_cache: state.cache.stats().await,
    }))
}

#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub key: &'static str,
    pub description: &'static str,
}

/// GET /api/permissions - every permission a role can grant
pub async fn permissions() -> ApiResult<Vec<CatalogEntry>> {
    let catalog = Permission::ALL
        .iter()
        .map(|permission| CatalogEntry {
            key: permission.key(),
            description: permission.description(),
        })
        .collect();
    Ok(ApiResponse::success(catalog))
}
