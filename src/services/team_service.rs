use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::access::{AccessProfile, Permission, PermissionCache};
use crate::database::models::{Member, Team};
use crate::database::{StoreManager, TeamStore};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateTeam {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// The caller of a team-creating request, who becomes its owner.
#[derive(Debug, Clone)]
pub struct Founder {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
}

pub async fn create_team(
    manager: &StoreManager,
    founder: Founder,
    request: CreateTeam,
) -> ServiceResult<Team> {
    let owner = Member::new(founder.user_id, founder.email, founder.display_name);
    let store = manager
        .create_team(&request.name, request.slug.as_deref(), owner)
        .await?;
    let team = store.read().await.team.clone();
    Ok(team)
}

pub async fn list_teams(manager: &StoreManager, user_id: Uuid) -> Vec<Team> {
    manager.teams_for_user(user_id).await
}

/// Rename keeps the slug so existing links stay valid.
pub fn rename_team(store: &mut TeamStore, profile: &AccessProfile, name: &str) -> ServiceResult<Team> {
    profile.require(Permission::TeamManage)?;

    let name = name.trim();
    let length = name.chars().count();
    if !(2..=100).contains(&length) {
        return Err(ServiceError::field("name", "Team name must be 2 to 100 characters"));
    }

    store.team.name = name.to_string();
    store.team.updated_at = Utc::now();
    Ok(store.team.clone())
}

pub async fn delete_team(
    manager: &StoreManager,
    cache: &PermissionCache,
    team_id: Uuid,
    profile: &AccessProfile,
) -> ServiceResult<()> {
    if !profile.is_owner {
        return Err(ServiceError::forbidden("Only the owner can delete the team"));
    }
    manager.remove(team_id).await?;
    cache.invalidate_team(team_id).await;
    Ok(())
}

/// Hand the team to another member. The previous owner stays a member with
/// the roles they already had.
pub fn transfer_ownership(
    store: &mut TeamStore,
    profile: &AccessProfile,
    new_owner: Uuid,
) -> ServiceResult<Team> {
    if !profile.is_owner {
        return Err(ServiceError::forbidden("Only the owner can transfer ownership"));
    }
    if !store.is_member(new_owner) {
        return Err(ServiceError::field("user_id", "New owner must be a member of the team"));
    }

    store.team.owner_id = new_owner;
    store.team.updated_at = Utc::now();
    store.bump();
    tracing::info!("Team {} now owned by {}", store.team.slug, new_owner);
    Ok(store.team.clone())
}
