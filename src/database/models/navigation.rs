use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::tree::TreeItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavLink {
    Internal { path: String },
    External { url: String },
    Article { article_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationItem {
    pub label: String,
    pub link: NavLink,
    #[serde(default)]
    pub open_in_new_tab: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl NavigationItem {
    pub fn internal(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            link: NavLink::Internal { path: path.into() },
            open_in_new_tab: false,
            visible: true,
        }
    }

    /// Field errors keyed by field name; empty when the item is valid.
    pub fn validate(&self) -> HashMap<String, String> {
        let mut errors = HashMap::new();

        let label = self.label.trim();
        if label.is_empty() || label.chars().count() > 80 {
            errors.insert("label".to_string(), "Label must be 1 to 80 characters".to_string());
        }

        match &self.link {
            NavLink::Internal { path } => {
                if !path.starts_with('/') || path.contains(char::is_whitespace) {
                    errors.insert(
                        "link.path".to_string(),
                        "Internal paths start with '/' and contain no whitespace".to_string(),
                    );
                }
            }
            NavLink::External { url } => match url::Url::parse(url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                _ => {
                    errors.insert(
                        "link.url".to_string(),
                        "External links must be absolute http(s) URLs".to_string(),
                    );
                }
            },
            NavLink::Article { .. } => {}
        }

        errors
    }
}

pub type NavigationTree = Vec<TreeItem<NavigationItem>>;

/// A named site navigation such as `main` or `footer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Navigation {
    pub id: Uuid,
    pub key: String,
    pub title: String,
    pub items: NavigationTree,
    /// Digest of `items`; changes on every edit.
    pub revision: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Navigation {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        let items = NavigationTree::new();
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            title: title.into(),
            revision: revision_of(&items),
            items,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the items and advance the revision.
    pub fn set_items(&mut self, items: NavigationTree) {
        self.revision = revision_of(&items);
        self.items = items;
        self.updated_at = Utc::now();
    }
}

pub fn revision_of(items: &NavigationTree) -> String {
    let bytes = serde_json::to_vec(items).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    format!("{:x}", hasher.finalize())
}

/// Keys are what templates refer to: lower-case letters, digits and dashes.
pub fn is_valid_key(key: &str) -> bool {
    (1..=40).contains(&key.len())
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !key.starts_with('-')
        && !key.ends_with('-')
}
