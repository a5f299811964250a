use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::access::{AccessProfile, Permission, PermissionKey};
use crate::database::models::Role;
use crate::database::TeamStore;
use crate::tree;

/// Body of role create and update requests. Permissions arrive as strings
/// so each bad key can be reported.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoleDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub full_access: bool,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub menu_ids: BTreeSet<Uuid>,
}

struct CheckedDraft {
    name: String,
    description: Option<String>,
    full_access: bool,
    permissions: BTreeSet<PermissionKey>,
    menu_ids: BTreeSet<Uuid>,
}

pub fn list_roles(store: &TeamStore, profile: &AccessProfile) -> ServiceResult<Vec<Role>> {
    profile.require(Permission::RolesRead)?;
    let mut roles: Vec<Role> = store.roles.values().cloned().collect();
    roles.sort_by_key(|role| role.name.to_lowercase());
    Ok(roles)
}

pub fn get_role(store: &TeamStore, profile: &AccessProfile, role_id: Uuid) -> ServiceResult<Role> {
    profile.require(Permission::RolesRead)?;
    store
        .roles
        .get(&role_id)
        .cloned()
        .ok_or_else(|| ServiceError::not_found(format!("Role {}", role_id)))
}

pub fn create_role(store: &mut TeamStore, profile: &AccessProfile, draft: RoleDraft) -> ServiceResult<Role> {
    profile.require(Permission::RolesManage)?;
    let draft = check_draft(store, None, draft)?;
    profile.can_grant(draft.full_access, &draft.permissions, &draft.menu_ids)?;

    let mut role = Role::new(draft.name);
    role.description = draft.description;
    role.full_access = draft.full_access;
    role.permissions = draft.permissions;
    role.menu_ids = draft.menu_ids;

    store.roles.insert(role.id, role.clone());
    store.bump();
    tracing::info!("Created role {} in team {}", role.name, store.team.slug);
    Ok(role)
}

/// Replace a role. Editing a role the caller could not have created is
/// refused as well.
pub fn update_role(
    store: &mut TeamStore,
    profile: &AccessProfile,
    role_id: Uuid,
    draft: RoleDraft,
) -> ServiceResult<Role> {
    profile.require(Permission::RolesManage)?;
    let existing = store
        .roles
        .get(&role_id)
        .ok_or_else(|| ServiceError::not_found(format!("Role {}", role_id)))?;
    profile.can_grant(existing.full_access, &existing.permissions, &existing.menu_ids)?;

    let draft = check_draft(store, Some(role_id), draft)?;
    profile.can_grant(draft.full_access, &draft.permissions, &draft.menu_ids)?;

    let role = store
        .roles
        .get_mut(&role_id)
        .ok_or_else(|| ServiceError::not_found(format!("Role {}", role_id)))?;
    role.name = draft.name;
    role.description = draft.description;
    role.full_access = draft.full_access;
    role.permissions = draft.permissions;
    role.menu_ids = draft.menu_ids;
    role.updated_at = Utc::now();
    let role = role.clone();

    store.bump();
    Ok(role)
}

/// Delete a role and detach it from every member.
pub fn delete_role(store: &mut TeamStore, profile: &AccessProfile, role_id: Uuid) -> ServiceResult<Role> {
    profile.require(Permission::RolesManage)?;
    let existing = store
        .roles
        .get(&role_id)
        .ok_or_else(|| ServiceError::not_found(format!("Role {}", role_id)))?;
    profile.can_grant(existing.full_access, &existing.permissions, &existing.menu_ids)?;

    let role = store
        .roles
        .remove(&role_id)
        .ok_or_else(|| ServiceError::not_found(format!("Role {}", role_id)))?;
    for member in store.members.values_mut() {
        member.role_ids.retain(|id| *id != role_id);
    }
    store.bump();
    Ok(role)
}

fn check_draft(store: &TeamStore, role_id: Option<Uuid>, draft: RoleDraft) -> ServiceResult<CheckedDraft> {
    let mut field_errors = HashMap::new();

    let name = draft.name.trim().to_string();
    if name.is_empty() || name.chars().count() > 60 {
        field_errors.insert("name".to_string(), "Role name must be 1 to 60 characters".to_string());
    } else if store
        .role_named(&name)
        .is_some_and(|other| Some(other.id) != role_id)
    {
        return Err(ServiceError::conflict(format!("A role named {} already exists", name)));
    }

    let mut permissions = BTreeSet::new();
    let mut invalid = Vec::new();
    for raw in &draft.permissions {
        match PermissionKey::parse(raw) {
            Ok(key) => {
                permissions.insert(key);
            }
            Err(_) => invalid.push(raw.clone()),
        }
    }
    if !invalid.is_empty() {
        field_errors.insert(
            "permissions".to_string(),
            format!("Invalid permission keys: {}", invalid.join(", ")),
        );
    }

    let known: HashSet<Uuid> = tree::ids(&store.menu).into_iter().collect();
    let unknown: Vec<String> = draft
        .menu_ids
        .iter()
        .filter(|id| !known.contains(id))
        .map(Uuid::to_string)
        .collect();
    if !unknown.is_empty() {
        field_errors.insert(
            "menu_ids".to_string(),
            format!("Unknown menu entries: {}", unknown.join(", ")),
        );
    }

    if !field_errors.is_empty() {
        return Err(ServiceError::validation("Invalid role", field_errors));
    }

    Ok(CheckedDraft {
        name,
        description: draft.description.filter(|d| !d.trim().is_empty()),
        full_access: draft.full_access,
        permissions,
        menu_ids: draft.menu_ids,
    })
}
