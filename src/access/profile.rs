use std::collections::BTreeSet;

use serde::Serialize;
use uuid::Uuid;

use super::{AccessError, Permission, PermissionKey};

/// What one user may do inside one team, resolved from ownership and roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessProfile {
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub is_owner: bool,
    pub full_access: bool,
    pub role_ids: Vec<Uuid>,
    pub permissions: BTreeSet<PermissionKey>,
    pub menu_ids: BTreeSet<Uuid>,
}

impl AccessProfile {
    pub fn has_full_access(&self) -> bool {
        self.is_owner || self.full_access
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.has_full_access() || self.permissions.iter().any(|key| key.allows(permission))
    }

    pub fn require(&self, permission: Permission) -> Result<(), AccessError> {
        if self.can(permission) {
            Ok(())
        } else {
            tracing::warn!(
                "User {} lacks {} in team {}",
                self.user_id,
                permission,
                self.team_id
            );
            Err(AccessError::Forbidden(permission.key().to_string()))
        }
    }

    pub fn can_see_menu(&self, menu_id: Uuid) -> bool {
        self.has_full_access() || self.menu_ids.contains(&menu_id)
    }

    /// Refuse to hand out more than the granting user holds: only full-access
    /// users create full-access roles, everyone else may only grant keys they
    /// hold themselves and menu entries they can see.
    pub fn can_grant(
        &self,
        full_access: bool,
        permissions: &BTreeSet<PermissionKey>,
        menu_ids: &BTreeSet<Uuid>,
    ) -> Result<(), AccessError> {
        if self.has_full_access() {
            return Ok(());
        }
        if full_access {
            return Err(AccessError::Escalation("full access".to_string()));
        }
        for key in permissions {
            if !self.permissions.iter().any(|held| held.covers(key)) {
                return Err(AccessError::Escalation(key.to_string()));
            }
        }
        for menu_id in menu_ids {
            if !self.menu_ids.contains(menu_id) {
                return Err(AccessError::Escalation(format!("menu entry {}", menu_id)));
            }
        }
        Ok(())
    }
}
