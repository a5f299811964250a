use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Permission;
use crate::tree::TreeItem;

/// One entry of the admin sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Admin route; groups have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Hide the entry from users lacking this permission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<Permission>,
}

impl MenuItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: None,
            path: None,
            permission: None,
        }
    }

    pub fn icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    pub fn permission(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
        self
    }
}

pub type MenuTree = Vec<TreeItem<MenuItem>>;

fn entry(item: MenuItem) -> TreeItem<MenuItem> {
    TreeItem::new(Uuid::new_v4(), item)
}

/// The sidebar every new team starts with.
pub fn default_menu() -> MenuTree {
    vec![
        entry(MenuItem::new("Dashboard").icon("home").path("/dashboard")),
        entry(MenuItem::new("Content").icon("file-text")).with_children(vec![
            entry(
                MenuItem::new("Articles")
                    .path("/articles")
                    .permission(Permission::ArticlesRead),
            ),
            entry(
                MenuItem::new("Navigation")
                    .path("/navigation")
                    .permission(Permission::NavigationRead),
            ),
        ]),
        entry(MenuItem::new("Team").icon("users")).with_children(vec![
            entry(
                MenuItem::new("Members")
                    .path("/team/members")
                    .permission(Permission::MembersRead),
            ),
            entry(
                MenuItem::new("Roles")
                    .path("/team/roles")
                    .permission(Permission::RolesRead),
            ),
        ]),
        entry(
            MenuItem::new("Settings")
                .icon("settings")
                .path("/settings")
                .permission(Permission::SettingsRead),
        ),
    ]
}

/// Ids of the entries whose path is one of `paths`.
pub fn menu_ids_for_paths(menu: &[TreeItem<MenuItem>], paths: &[&str]) -> Vec<Uuid> {
    let mut out = Vec::new();
    for item in menu {
        item.walk(&mut |node| {
            if node.data.path.as_deref().is_some_and(|p| paths.contains(&p)) {
                out.push(node.id);
            }
        });
    }
    out
}
