use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::access::{AccessProfile, Permission};
use crate::config;
use crate::database::models::navigation::is_valid_key;
use crate::database::models::{NavLink, Navigation, NavigationItem, NavigationTree};
use crate::database::TeamStore;
use crate::tree::{
    self, DragInstruction, DragOptions, IntegrityReport, MoveInstruction, Projection, RemoveMode,
    TreeItem, TreeRecord,
};

/// A mutating request body. When `expected_revision` is given it must match
/// the navigation's current revision.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Revised<T> {
    #[serde(flatten)]
    pub body: T,
    #[serde(default)]
    pub expected_revision: Option<String>,
}

impl<T> Revised<T> {
    pub fn new(body: T) -> Self {
        Self {
            body,
            expected_revision: None,
        }
    }

    pub fn expecting(body: T, revision: &str) -> Self {
        Self {
            body,
            expected_revision: Some(revision.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewNavigation {
    pub key: String,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Rename {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewNavigationItem {
    #[serde(flatten)]
    pub item: NavigationItem,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RemoveItem {
    #[serde(default)]
    pub mode: RemoveMode,
}

/// A full replacement, either nested or as rows.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ReplaceItems {
    Nested { items: NavigationTree },
    Records { records: Vec<TreeRecord<NavigationItem>> },
}

/// What the public site renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedLink {
    pub label: String,
    pub href: String,
    pub open_in_new_tab: bool,
}

fn depth_limit() -> usize {
    config::config().tree.max_navigation_depth
}

fn find<'a>(store: &'a TeamStore, key: &str) -> ServiceResult<&'a Navigation> {
    store
        .navigations
        .get(key)
        .ok_or_else(|| ServiceError::not_found(format!("Navigation {}", key)))
}

fn find_checked<'a>(
    store: &'a mut TeamStore,
    key: &str,
    expected_revision: Option<&str>,
) -> ServiceResult<&'a mut Navigation> {
    let navigation = store
        .navigations
        .get_mut(key)
        .ok_or_else(|| ServiceError::not_found(format!("Navigation {}", key)))?;
    if let Some(expected) = expected_revision {
        if expected != navigation.revision {
            return Err(ServiceError::RevisionMismatch {
                expected: expected.to_string(),
                current: navigation.revision.clone(),
            });
        }
    }
    Ok(navigation)
}

fn check_item(store: &TeamStore, item: &NavigationItem) -> ServiceResult<()> {
    let mut field_errors = item.validate();
    if let NavLink::Article { article_id } = &item.link {
        if !store.articles.contains_key(article_id) {
            field_errors.insert("link.article_id".to_string(), format!("Unknown article {}", article_id));
        }
    }
    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::validation("Invalid navigation item", field_errors))
    }
}

fn check_tree(store: &TeamStore, items: &NavigationTree) -> ServiceResult<()> {
    let limit = depth_limit();
    if tree::max_depth(items) > limit {
        return Err(tree::TreeError::DepthExceeded { limit }.into());
    }
    for flat in tree::flatten(items) {
        check_item(store, &flat.data)?;
    }
    Ok(())
}

fn integrity_errors(report: &IntegrityReport) -> HashMap<String, String> {
    let join = |ids: &[Uuid]| ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(", ");
    let mut errors = HashMap::new();
    if !report.duplicate_ids.is_empty() {
        errors.insert("duplicate_ids".to_string(), join(&report.duplicate_ids));
    }
    if !report.orphans.is_empty() {
        errors.insert("orphans".to_string(), join(&report.orphans));
    }
    if !report.cycles.is_empty() {
        let cycles: Vec<String> = report.cycles.iter().map(|c| format!("[{}]", join(c))).collect();
        errors.insert("cycles".to_string(), cycles.join(" "));
    }
    errors
}

pub fn list(store: &TeamStore, profile: &AccessProfile) -> ServiceResult<Vec<Navigation>> {
    profile.require(Permission::NavigationRead)?;
    Ok(store.navigations.values().cloned().collect())
}

pub fn get(store: &TeamStore, profile: &AccessProfile, key: &str) -> ServiceResult<Navigation> {
    profile.require(Permission::NavigationRead)?;
    find(store, key).cloned()
}

pub fn create(store: &mut TeamStore, profile: &AccessProfile, request: NewNavigation) -> ServiceResult<Navigation> {
    profile.require(Permission::NavigationManage)?;

    let mut field_errors = HashMap::new();
    if !is_valid_key(&request.key) {
        field_errors.insert(
            "key".to_string(),
            "Key must be 1 to 40 lower-case letters, digits or dashes".to_string(),
        );
    }
    if request.title.trim().is_empty() {
        field_errors.insert("title".to_string(), "Title is required".to_string());
    }
    if !field_errors.is_empty() {
        return Err(ServiceError::validation("Invalid navigation", field_errors));
    }
    if store.navigations.contains_key(&request.key) {
        return Err(ServiceError::conflict(format!("Navigation {} already exists", request.key)));
    }

    let navigation = Navigation::new(request.key, request.title.trim());
    store.navigations.insert(navigation.key.clone(), navigation.clone());
    Ok(navigation)
}

pub fn rename(store: &mut TeamStore, profile: &AccessProfile, key: &str, request: Revised<Rename>) -> ServiceResult<Navigation> {
    profile.require(Permission::NavigationManage)?;
    let title = request.body.title.trim();
    if title.is_empty() {
        return Err(ServiceError::field("title", "Title is required"));
    }

    let navigation = find_checked(store, key, request.expected_revision.as_deref())?;
    navigation.title = title.to_string();
    navigation.updated_at = chrono::Utc::now();
    Ok(navigation.clone())
}

pub fn delete(
    store: &mut TeamStore,
    profile: &AccessProfile,
    key: &str,
    expected_revision: Option<&str>,
) -> ServiceResult<Navigation> {
    profile.require(Permission::NavigationManage)?;
    find_checked(store, key, expected_revision)?;
    store
        .navigations
        .remove(key)
        .ok_or_else(|| ServiceError::not_found(format!("Navigation {}", key)))
}

/// Add an item; returns the navigation and the new item's id.
pub fn add_item(
    store: &mut TeamStore,
    profile: &AccessProfile,
    key: &str,
    request: Revised<NewNavigationItem>,
) -> ServiceResult<(Navigation, Uuid)> {
    profile.require(Permission::NavigationManage)?;
    check_item(store, &request.body.item)?;

    let navigation = find_checked(store, key, request.expected_revision.as_deref())?;
    let node = TreeItem::new(Uuid::new_v4(), request.body.item);
    let id = node.id;

    let mut items = navigation.items.clone();
    tree::insert(&mut items, node, request.body.parent_id, request.body.index, Some(depth_limit()))?;
    navigation.set_items(items);
    Ok((navigation.clone(), id))
}

pub fn update_item(
    store: &mut TeamStore,
    profile: &AccessProfile,
    key: &str,
    item_id: Uuid,
    request: Revised<NavigationItem>,
) -> ServiceResult<Navigation> {
    profile.require(Permission::NavigationManage)?;
    check_item(store, &request.body)?;

    let navigation = find_checked(store, key, request.expected_revision.as_deref())?;
    let mut items = navigation.items.clone();
    let node = tree::find_mut(&mut items, item_id)
        .ok_or_else(|| ServiceError::not_found(format!("Navigation item {}", item_id)))?;
    node.data = request.body;
    navigation.set_items(items);
    Ok(navigation.clone())
}

pub fn remove_item(
    store: &mut TeamStore,
    profile: &AccessProfile,
    key: &str,
    item_id: Uuid,
    request: Revised<RemoveItem>,
) -> ServiceResult<Navigation> {
    profile.require(Permission::NavigationManage)?;

    let navigation = find_checked(store, key, request.expected_revision.as_deref())?;
    let mut items = navigation.items.clone();
    tree::remove(&mut items, item_id, request.body.mode)?;
    navigation.set_items(items);
    Ok(navigation.clone())
}

pub fn move_item(
    store: &mut TeamStore,
    profile: &AccessProfile,
    key: &str,
    request: Revised<MoveInstruction>,
) -> ServiceResult<Navigation> {
    profile.require(Permission::NavigationManage)?;

    let navigation = find_checked(store, key, request.expected_revision.as_deref())?;
    let mut items = navigation.items.clone();
    tree::move_node(&mut items, &request.body, Some(depth_limit()))?;
    navigation.set_items(items);
    Ok(navigation.clone())
}

fn drag_options() -> DragOptions {
    DragOptions {
        indentation_width: config::config().tree.indentation_width,
        depth_limit: Some(depth_limit()),
    }
}

pub fn drag_item(
    store: &mut TeamStore,
    profile: &AccessProfile,
    key: &str,
    request: Revised<DragInstruction>,
) -> ServiceResult<(Navigation, Projection)> {
    profile.require(Permission::NavigationManage)?;

    let navigation = find_checked(store, key, request.expected_revision.as_deref())?;
    let (items, projection) = tree::drag(&navigation.items, &request.body, &drag_options())?;
    navigation.set_items(items);
    Ok((navigation.clone(), projection))
}

/// Where a drop would land, without changing anything.
pub fn preview_drag(
    store: &TeamStore,
    profile: &AccessProfile,
    key: &str,
    instruction: &DragInstruction,
) -> ServiceResult<Projection> {
    profile.require(Permission::NavigationRead)?;
    let navigation = find(store, key)?;
    let flat = tree::flatten(&navigation.items);
    Ok(tree::project(
        &flat,
        instruction.active_id,
        instruction.over_id,
        instruction.offset,
        &drag_options(),
    )?)
}

pub fn replace_items(
    store: &mut TeamStore,
    profile: &AccessProfile,
    key: &str,
    request: Revised<ReplaceItems>,
) -> ServiceResult<Navigation> {
    profile.require(Permission::NavigationManage)?;

    let items = match request.body {
        // Rebuilding rejects ids repeated across the nested input.
        ReplaceItems::Nested { items } => tree::build(tree::flatten(&items))?,
        ReplaceItems::Records { records } => {
            let report = tree::check_integrity(&records);
            if !report.is_clean() {
                return Err(ServiceError::validation(
                    "Navigation rows failed the integrity check",
                    integrity_errors(&report),
                ));
            }
            tree::from_records(records)?
        }
    };
    check_tree(store, &items)?;

    let navigation = find_checked(store, key, request.expected_revision.as_deref())?;
    navigation.set_items(items);
    Ok(navigation.clone())
}

/// The navigation as the public site shows it: hidden items and links to
/// articles that are not live are left out along with their subtrees.
pub fn published(store: &TeamStore, key: &str) -> ServiceResult<Vec<TreeItem<PublishedLink>>> {
    let navigation = find(store, key)?;
    Ok(render(store, &navigation.items))
}

fn render(store: &TeamStore, items: &NavigationTree) -> Vec<TreeItem<PublishedLink>> {
    items
        .iter()
        .filter(|item| item.data.visible)
        .filter_map(|item| {
            let href = match &item.data.link {
                NavLink::Internal { path } => path.clone(),
                NavLink::External { url } => url.clone(),
                NavLink::Article { article_id } => {
                    let article = store.articles.get(article_id).filter(|a| a.is_live())?;
                    format!("/articles/{}", article.slug)
                }
            };
            let link = PublishedLink {
                label: item.data.label.clone(),
                href,
                open_in_new_tab: item.data.open_in_new_tab,
            };
            Some(TreeItem::new(item.id, link).with_children(render(store, &item.children)))
        })
        .collect()
}

/// Drop every link to `article_id`, promoting the link's children. Returns
/// the number of links removed.
pub fn remove_article_links(store: &mut TeamStore, article_id: Uuid) -> usize {
    let mut removed = 0;
    for navigation in store.navigations.values_mut() {
        let doomed: Vec<Uuid> = tree::flatten(&navigation.items)
            .into_iter()
            .filter(|flat| matches!(flat.data.link, NavLink::Article { article_id: id } if id == article_id))
            .map(|flat| flat.id)
            .collect();
        if doomed.is_empty() {
            continue;
        }

        let mut items = navigation.items.clone();
        for id in &doomed {
            if tree::remove(&mut items, *id, RemoveMode::PromoteChildren).is_ok() {
                removed += 1;
            }
        }
        navigation.set_items(items);
    }
    removed
}
