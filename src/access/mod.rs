//! Who may do what inside a team.
//!
//! Roles carry `PermissionKey` grants (wildcards allowed) and admin menu
//! entries. `resolve` folds a member's roles into an `AccessProfile`, which
//! `PermissionCache` keeps per team and user until the team changes.

pub mod cache;
pub mod error;
pub mod permission;
pub mod profile;
pub mod resolver;

pub use cache::{CacheStats, PermissionCache};
pub use error::AccessError;
pub use permission::{Permission, PermissionKey};
pub use profile::AccessProfile;
pub use resolver::resolve;
