use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::access::{AccessProfile, Permission};
use crate::database::models::Member;
use crate::database::TeamStore;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewMember {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SetRoles {
    pub role_ids: Vec<Uuid>,
}

pub fn list_members(store: &TeamStore, profile: &AccessProfile) -> ServiceResult<Vec<Member>> {
    profile.require(Permission::MembersRead)?;
    let mut members: Vec<Member> = store.members.values().cloned().collect();
    members.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    Ok(members)
}

pub fn add_member(store: &mut TeamStore, profile: &AccessProfile, request: NewMember) -> ServiceResult<Member> {
    profile.require(Permission::MembersManage)?;

    if store.is_member(request.user_id) {
        return Err(ServiceError::conflict(format!(
            "User {} is already a member",
            request.user_id
        )));
    }

    let mut field_errors = HashMap::new();
    if !request.email.contains('@') || request.email.trim() != request.email {
        field_errors.insert("email".to_string(), "Invalid email address".to_string());
    }
    if request.display_name.trim().is_empty() {
        field_errors.insert("display_name".to_string(), "Display name is required".to_string());
    }
    if !field_errors.is_empty() {
        return Err(ServiceError::validation("Invalid member", field_errors));
    }

    let role_ids = checked_roles(store, profile, request.role_ids)?;
    let member = Member::new(request.user_id, request.email, request.display_name.trim()).with_roles(role_ids);
    store.members.insert(member.user_id, member.clone());
    store.bump();
    Ok(member)
}

pub fn set_roles(
    store: &mut TeamStore,
    profile: &AccessProfile,
    user_id: Uuid,
    role_ids: Vec<Uuid>,
) -> ServiceResult<Member> {
    profile.require(Permission::MembersManage)?;
    if !store.is_member(user_id) {
        return Err(ServiceError::not_found(format!("Member {}", user_id)));
    }

    let role_ids = checked_roles(store, profile, role_ids)?;
    let member = store
        .members
        .get_mut(&user_id)
        .ok_or_else(|| ServiceError::not_found(format!("Member {}", user_id)))?;
    member.role_ids = role_ids;
    let member = member.clone();
    store.bump();
    Ok(member)
}

/// Members with `members:manage` remove anyone but the owner; everyone may
/// leave on their own.
pub fn remove_member(store: &mut TeamStore, profile: &AccessProfile, user_id: Uuid) -> ServiceResult<Member> {
    if user_id != profile.user_id {
        profile.require(Permission::MembersManage)?;
    }
    if user_id == store.team.owner_id {
        return Err(ServiceError::forbidden(
            "The owner cannot be removed; transfer ownership first",
        ));
    }

    let member = store
        .members
        .remove(&user_id)
        .ok_or_else(|| ServiceError::not_found(format!("Member {}", user_id)))?;
    store.bump();
    Ok(member)
}

/// Roles must exist and may not grant more than the assigning user holds.
fn checked_roles(store: &TeamStore, profile: &AccessProfile, role_ids: Vec<Uuid>) -> ServiceResult<Vec<Uuid>> {
    let mut out: Vec<Uuid> = Vec::with_capacity(role_ids.len());
    for role_id in role_ids {
        let role = store
            .roles
            .get(&role_id)
            .ok_or_else(|| ServiceError::field("role_ids", format!("Unknown role {}", role_id)))?;
        profile.can_grant(role.full_access, &role.permissions, &role.menu_ids)?;
        if !out.contains(&role_id) {
            out.push(role_id);
        }
    }
    Ok(out)
}
