use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::menu::{menu_ids_for_paths, MenuItem};
use crate::access::{Permission, PermissionKey};
use crate::tree::TreeItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Everything is allowed and every menu entry is visible.
    #[serde(default)]
    pub full_access: bool,
    #[serde(default)]
    pub permissions: BTreeSet<PermissionKey>,
    /// Admin menu entries this role shows.
    #[serde(default)]
    pub menu_ids: BTreeSet<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            full_access: false,
            permissions: BTreeSet::new(),
            menu_ids: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    fn grant(mut self, keys: impl IntoIterator<Item = PermissionKey>) -> Self {
        self.permissions.extend(keys);
        self
    }

    fn show(mut self, menu_ids: Vec<Uuid>) -> Self {
        self.menu_ids.extend(menu_ids);
        self
    }
}

pub const ADMINISTRATOR: &str = "Administrator";
pub const EDITOR: &str = "Editor";
pub const VIEWER: &str = "Viewer";

/// Roles seeded into every new team, wired to its default menu.
pub fn default_roles(menu: &[TreeItem<MenuItem>]) -> Vec<Role> {
    let wildcard = |resource: &str| PermissionKey::parse(&format!("{}:*", resource));

    let mut administrator = Role::new(ADMINISTRATOR).describe("Full access to the team");
    administrator.full_access = true;

    let editor = Role::new(EDITOR)
        .describe("Writes articles and maintains navigation")
        .grant(["articles", "navigation"].into_iter().filter_map(|r| wildcard(r).ok()))
        .grant([Permission::MenuRead, Permission::SettingsRead].map(PermissionKey::from))
        .show(menu_ids_for_paths(menu, &["/dashboard", "/articles", "/navigation", "/settings"]));

    let viewer = Role::new(VIEWER)
        .describe("Read-only access to content")
        .grant(
            [
                Permission::ArticlesRead,
                Permission::NavigationRead,
                Permission::SettingsRead,
            ]
            .map(PermissionKey::from),
        )
        .show(menu_ids_for_paths(menu, &["/dashboard", "/articles"]));

    vec![administrator, editor, viewer]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::menu::default_menu;

    #[test]
    fn default_roles_point_at_existing_menu_entries() {
        let menu = default_menu();
        let roles = default_roles(&menu);
        let ids: BTreeSet<Uuid> = crate::tree::ids(&menu).into_iter().collect();

        assert_eq!(roles.len(), 3);
        assert!(roles[0].full_access);
        assert_eq!(roles[1].menu_ids.len(), 4);
        assert_eq!(roles[2].menu_ids.len(), 2);
        for role in &roles {
            assert!(role.menu_ids.is_subset(&ids));
        }
        assert!(roles[1]
            .permissions
            .iter()
            .any(|k| k.allows(Permission::ArticlesPublish)));
    }
}
