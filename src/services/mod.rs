//! Team-scoped operations. Each takes the team's store and the caller's
//! resolved access profile and checks permissions itself.

pub mod article_service;
pub mod audit;
pub mod error;
pub mod member_service;
pub mod menu_service;
pub mod navigation_service;
pub mod role_service;
pub mod settings_service;
pub mod team_service;

pub use audit::{AuditEvent, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use error::{ServiceError, ServiceResult};
