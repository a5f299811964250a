use std::fmt::Display;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

/// One successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub team_id: Option<Uuid>,
    pub actor_id: Uuid,
    pub action: String,
    pub target: String,
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(team_id: Option<Uuid>, actor_id: Uuid, action: &str, target: impl Display) -> Self {
        Self {
            team_id,
            actor_id,
            action: action.to_string(),
            target: target.to_string(),
            at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent);
}

/// Writes audit events to the `audit` tracing target.
pub struct TracingAuditSink {
    enabled: bool,
}

impl TracingAuditSink {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn from_config() -> Self {
        Self::new(crate::config::config().security.enable_audit_logging)
    }
}

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) {
        if !self.enabled {
            return;
        }
        tracing::info!(
            target: "audit",
            team = ?event.team_id,
            actor = %event.actor_id,
            action = %event.action,
            "{}",
            event.target
        );
    }
}

/// Keeps events in memory for inspection.
#[derive(Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().await.clone()
    }

    pub async fn actions(&self) -> Vec<String> {
        self.events.lock().await.iter().map(|e| e.action.clone()).collect()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: AuditEvent) {
        self.events.lock().await.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_sink_keeps_order() {
        let sink = MemoryAuditSink::new();
        let actor = Uuid::from_u128(1);
        sink.record(AuditEvent::new(None, actor, "team.create", "acme")).await;
        sink.record(AuditEvent::new(None, actor, "team.rename", "acme")).await;
        assert_eq!(sink.actions().await, vec!["team.create", "team.rename"]);
        assert_eq!(sink.events().await[0].target, "acme");
    }
}
