use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AccessError;

/// Permissions checked by the API. Roles grant them through `PermissionKey`s,
/// which may use wildcards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "articles:read")]
    ArticlesRead,
    #[serde(rename = "articles:create")]
    ArticlesCreate,
    #[serde(rename = "articles:update")]
    ArticlesUpdate,
    #[serde(rename = "articles:delete")]
    ArticlesDelete,
    #[serde(rename = "articles:publish")]
    ArticlesPublish,
    #[serde(rename = "navigation:read")]
    NavigationRead,
    #[serde(rename = "navigation:manage")]
    NavigationManage,
    #[serde(rename = "menu:read")]
    MenuRead,
    #[serde(rename = "menu:manage")]
    MenuManage,
    #[serde(rename = "members:read")]
    MembersRead,
    #[serde(rename = "members:manage")]
    MembersManage,
    #[serde(rename = "roles:read")]
    RolesRead,
    #[serde(rename = "roles:manage")]
    RolesManage,
    #[serde(rename = "settings:read")]
    SettingsRead,
    #[serde(rename = "settings:manage")]
    SettingsManage,
    #[serde(rename = "team:manage")]
    TeamManage,
}

impl Permission {
    pub const ALL: [Permission; 16] = [
        Permission::ArticlesRead,
        Permission::ArticlesCreate,
        Permission::ArticlesUpdate,
        Permission::ArticlesDelete,
        Permission::ArticlesPublish,
        Permission::NavigationRead,
        Permission::NavigationManage,
        Permission::MenuRead,
        Permission::MenuManage,
        Permission::MembersRead,
        Permission::MembersManage,
        Permission::RolesRead,
        Permission::RolesManage,
        Permission::SettingsRead,
        Permission::SettingsManage,
        Permission::TeamManage,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Permission::ArticlesRead => "articles:read",
            Permission::ArticlesCreate => "articles:create",
            Permission::ArticlesUpdate => "articles:update",
            Permission::ArticlesDelete => "articles:delete",
            Permission::ArticlesPublish => "articles:publish",
            Permission::NavigationRead => "navigation:read",
            Permission::NavigationManage => "navigation:manage",
            Permission::MenuRead => "menu:read",
            Permission::MenuManage => "menu:manage",
            Permission::MembersRead => "members:read",
            Permission::MembersManage => "members:manage",
            Permission::RolesRead => "roles:read",
            Permission::RolesManage => "roles:manage",
            Permission::SettingsRead => "settings:read",
            Permission::SettingsManage => "settings:manage",
            Permission::TeamManage => "team:manage",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Permission::ArticlesRead => "View articles, drafts included",
            Permission::ArticlesCreate => "Write new articles",
            Permission::ArticlesUpdate => "Edit existing articles",
            Permission::ArticlesDelete => "Trash, restore and purge articles",
            Permission::ArticlesPublish => "Publish and unpublish articles",
            Permission::NavigationRead => "View site navigations",
            Permission::NavigationManage => "Create and reorder site navigations",
            Permission::MenuRead => "View the full admin menu",
            Permission::MenuManage => "Edit the admin menu",
            Permission::MembersRead => "View team members",
            Permission::MembersManage => "Add, remove and assign roles to members",
            Permission::RolesRead => "View roles",
            Permission::RolesManage => "Create, edit and delete roles",
            Permission::SettingsRead => "View site settings",
            Permission::SettingsManage => "Change site settings",
            Permission::TeamManage => "Rename the team",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A granted permission as stored on a role: `resource:action`,
/// `resource:*`, or `*`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionKey(String);

impl PermissionKey {
    pub fn parse(raw: &str) -> Result<Self, AccessError> {
        let raw = raw.trim();
        if raw == "*" {
            return Ok(Self(raw.to_string()));
        }

        let (resource, action) = raw
            .split_once(':')
            .ok_or_else(|| AccessError::InvalidPermission(raw.to_string()))?;

        let valid_word = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_lowercase() || c == '_');
        if !valid_word(resource) || !(action == "*" || valid_word(action)) {
            return Err(AccessError::InvalidPermission(raw.to_string()));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn resource(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(r, _)| r)
    }

    pub fn action(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(_, a)| a)
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == "*" || self.action() == "*"
    }

    /// True when holding `self` implies holding `other`.
    pub fn covers(&self, other: &PermissionKey) -> bool {
        self.covers_key(other.as_str())
    }

    /// True when this grant allows the concrete permission.
    pub fn allows(&self, permission: Permission) -> bool {
        self.covers_key(permission.key())
    }

    fn covers_key(&self, key: &str) -> bool {
        if self.0 == "*" || self.0 == key {
            return true;
        }
        if self.action() == "*" {
            let resource = key.split_once(':').map_or(key, |(r, _)| r);
            return key != "*" && resource == self.resource();
        }
        false
    }
}

impl From<Permission> for PermissionKey {
    fn from(permission: Permission) -> Self {
        Self(permission.key().to_string())
    }
}

impl TryFrom<String> for PermissionKey {
    type Error = AccessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PermissionKey> for String {
    fn from(key: PermissionKey) -> Self {
        key.0
    }
}

impl FromStr for PermissionKey {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
