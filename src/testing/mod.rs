//! Seeded team fixtures for unit tests.

use uuid::Uuid;

use crate::access::AccessProfile;
use crate::database::models::role::{EDITOR as EDITOR_ROLE, VIEWER as VIEWER_ROLE};
use crate::database::models::{Member, Team};
use crate::database::TeamStore;

pub const OWNER: Uuid = Uuid::from_u128(0x01);
pub const EDITOR: Uuid = Uuid::from_u128(0x02);
pub const VIEWER: Uuid = Uuid::from_u128(0x03);
pub const OUTSIDER: Uuid = Uuid::from_u128(0x99);

pub fn member(user_id: Uuid, name: &str) -> Member {
    Member::new(user_id, format!("{}@example.com", name.to_lowercase()), name)
}

/// A team owned by `OWNER` with `EDITOR` and `VIEWER` holding the default
/// Editor and Viewer roles.
pub fn team() -> TeamStore {
    let mut store = TeamStore::new(Team::new("Acme", "acme", OWNER), member(OWNER, "Owner"));

    let editor = role_id(&store, EDITOR_ROLE);
    let viewer = role_id(&store, VIEWER_ROLE);
    store
        .members
        .insert(EDITOR, member(EDITOR, "Editor").with_roles(vec![editor]));
    store
        .members
        .insert(VIEWER, member(VIEWER, "Viewer").with_roles(vec![viewer]));
    store
}

pub fn role_id(store: &TeamStore, name: &str) -> Uuid {
    store
        .role_named(name)
        .map(|role| role.id)
        .unwrap_or_else(|| panic!("no role named {}", name))
}

pub fn profile(store: &TeamStore, user_id: Uuid) -> AccessProfile {
    store
        .resolve(user_id)
        .unwrap_or_else(|e| panic!("cannot resolve {}: {}", user_id, e))
}
