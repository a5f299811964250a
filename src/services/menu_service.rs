use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::access::{AccessProfile, Permission};
use crate::config;
use crate::database::models::{MenuItem, MenuTree};
use crate::database::TeamStore;
use crate::tree::{self, DragInstruction, DragOptions, MoveInstruction, Projection, RemoveMode, TreeItem};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewMenuItem {
    #[serde(flatten)]
    pub item: MenuItem,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub index: Option<usize>,
}

/// The part of the menu a profile may see.
///
/// Full access sees everything. Otherwise an entry stays when one of the
/// profile's roles grants it or when it leads to a granted entry; an entry
/// guarded by a permission the profile lacks goes with its subtree.
pub fn visible_menu(menu: &[TreeItem<MenuItem>], profile: &AccessProfile) -> MenuTree {
    if profile.has_full_access() {
        return menu.to_vec();
    }
    prune(menu, profile)
}

fn prune(items: &[TreeItem<MenuItem>], profile: &AccessProfile) -> MenuTree {
    items
        .iter()
        .filter(|item| item.data.permission.map_or(true, |p| profile.can(p)))
        .filter_map(|item| {
            let children = prune(&item.children, profile);
            (profile.can_see_menu(item.id) || !children.is_empty()).then(|| TreeItem {
                id: item.id,
                data: item.data.clone(),
                children,
            })
        })
        .collect()
}

pub fn get_menu(store: &TeamStore, profile: &AccessProfile) -> ServiceResult<MenuTree> {
    profile.require(Permission::MenuRead)?;
    Ok(store.menu.clone())
}

fn max_depth() -> Option<usize> {
    Some(config::config().tree.max_menu_depth)
}

fn check_item(item: &MenuItem) -> ServiceResult<()> {
    let label = item.label.trim();
    if label.is_empty() || label.chars().count() > 60 {
        return Err(ServiceError::field("label", "Label must be 1 to 60 characters"));
    }
    if let Some(path) = &item.path {
        if !path.starts_with('/') {
            return Err(ServiceError::field("path", "Menu paths start with '/'"));
        }
    }
    Ok(())
}

pub fn insert_item(store: &mut TeamStore, profile: &AccessProfile, request: NewMenuItem) -> ServiceResult<TreeItem<MenuItem>> {
    profile.require(Permission::MenuManage)?;
    check_item(&request.item)?;

    let node = TreeItem::new(Uuid::new_v4(), request.item);
    tree::insert(&mut store.menu, node.clone(), request.parent_id, request.index, max_depth())?;
    store.bump();
    Ok(node)
}

pub fn update_item(store: &mut TeamStore, profile: &AccessProfile, id: Uuid, item: MenuItem) -> ServiceResult<TreeItem<MenuItem>> {
    profile.require(Permission::MenuManage)?;
    check_item(&item)?;

    let node = tree::find_mut(&mut store.menu, id).ok_or_else(|| ServiceError::not_found(format!("Menu entry {}", id)))?;
    node.data = item;
    let node = node.clone();
    store.bump();
    Ok(node)
}

/// Remove an entry and strip every removed id from the roles that showed it.
/// Returns the removed ids.
pub fn remove_item(store: &mut TeamStore, profile: &AccessProfile, id: Uuid, mode: RemoveMode) -> ServiceResult<Vec<Uuid>> {
    profile.require(Permission::MenuManage)?;

    let removed = tree::remove(&mut store.menu, id, mode)?;
    let mut ids = vec![removed.id];
    ids.extend(tree::descendant_ids(&removed));

    let gone: HashSet<Uuid> = ids.iter().copied().collect();
    for role in store.roles.values_mut() {
        role.menu_ids.retain(|menu_id| !gone.contains(menu_id));
    }
    store.bump();
    Ok(ids)
}

pub fn move_item(store: &mut TeamStore, profile: &AccessProfile, instruction: &MoveInstruction) -> ServiceResult<MenuTree> {
    profile.require(Permission::MenuManage)?;
    tree::move_node(&mut store.menu, instruction, max_depth())?;
    store.bump();
    Ok(store.menu.clone())
}

pub fn drag_item(
    store: &mut TeamStore,
    profile: &AccessProfile,
    instruction: &DragInstruction,
) -> ServiceResult<(MenuTree, Projection)> {
    profile.require(Permission::MenuManage)?;
    let options = DragOptions {
        indentation_width: config::config().tree.indentation_width,
        depth_limit: max_depth(),
    };
    let (menu, projection) = tree::drag(&store.menu, instruction, &options)?;
    store.menu = menu;
    store.bump();
    Ok((store.menu.clone(), projection))
}
