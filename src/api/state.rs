use std::fmt::Display;
use std::sync::Arc;

use crate::access::PermissionCache;
use crate::config;
use crate::database::StoreManager;
use crate::middleware::TeamContext;
use crate::services::{AuditEvent, AuditSink, TracingAuditSink};

/// Shared handles every handler can reach through `State`.
#[derive(Clone)]
pub struct AppState {
    pub stores: StoreManager,
    pub cache: Arc<PermissionCache>,
    pub audit: Arc<dyn AuditSink>,
}

impl AppState {
    pub fn new(stores: StoreManager, cache: PermissionCache, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            stores,
            cache: Arc::new(cache),
            audit,
        }
    }

    /// Cache and audit sink configured from `AppConfig`.
    pub fn from_config(stores: StoreManager) -> Self {
        let config = config::config();
        Self::new(
            stores,
            PermissionCache::from_config(&config.cache),
            Arc::new(TracingAuditSink::from_config()),
        )
    }

    /// Record a mutation made inside a team.
    pub async fn record(&self, ctx: &TeamContext, action: &str, target: impl Display) {
        self.audit
            .record(AuditEvent::new(Some(ctx.team_id), ctx.profile.user_id, action, target))
            .await;
    }
}
