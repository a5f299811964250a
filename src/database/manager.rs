use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::models::{Member, Team};
use super::store::TeamStore;
use crate::types::{slugify, unique_slug};

pub type SharedStore = Arc<RwLock<TeamStore>>;

/// Errors from StoreManager and seed loading
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("Team slug already in use: {0}")]
    SlugTaken(String),

    #[error("Invalid team name: {0}")]
    InvalidTeamName(String),

    #[error("Invalid seed file: {0}")]
    InvalidSeed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Default)]
struct Registry {
    stores: HashMap<Uuid, SharedStore>,
    slugs: HashMap<String, Uuid>,
}

/// Registry of per-team stores. Each team sits behind its own lock so work
/// on one team never waits on another.
#[derive(Clone, Default)]
pub struct StoreManager {
    registry: Arc<RwLock<Registry>>,
}

impl StoreManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a team up by id or slug. A UUID-shaped slug is found once no
    /// team has that id.
    pub async fn get(&self, team_ref: &str) -> Result<SharedStore, DatabaseError> {
        let registry = self.registry.read().await;
        let id = Uuid::parse_str(team_ref)
            .ok()
            .filter(|id| registry.stores.contains_key(id))
            .or_else(|| registry.slugs.get(team_ref).copied());
        id.and_then(|id| registry.stores.get(&id))
            .cloned()
            .ok_or_else(|| DatabaseError::TeamNotFound(team_ref.to_string()))
    }

    /// Create a team owned by `owner`. Without an explicit slug one is
    /// derived from the name and made unique; an explicit slug must be free.
    pub async fn create_team(
        &self,
        name: &str,
        slug: Option<&str>,
        owner: Member,
    ) -> Result<SharedStore, DatabaseError> {
        let name = name.trim();
        Self::validate_team_name(name)?;

        let mut registry = self.registry.write().await;
        let slug = match slug {
            Some(slug) => {
                let slug = slugify(slug);
                if slug.is_empty() || registry.slugs.contains_key(&slug) {
                    return Err(DatabaseError::SlugTaken(slug));
                }
                slug
            }
            None => unique_slug(&slugify(name), |candidate| registry.slugs.contains_key(candidate)),
        };

        let team = Team::new(name, slug.clone(), owner.user_id);
        let team_id = team.id;
        let store = Arc::new(RwLock::new(TeamStore::new(team, owner)));

        registry.slugs.insert(slug.clone(), team_id);
        registry.stores.insert(team_id, store.clone());

        info!("Created team {} ({})", slug, team_id);
        Ok(store)
    }

    pub async fn remove(&self, team_id: Uuid) -> Result<(), DatabaseError> {
        let mut registry = self.registry.write().await;
        registry
            .stores
            .remove(&team_id)
            .ok_or_else(|| DatabaseError::TeamNotFound(team_id.to_string()))?;
        registry.slugs.retain(|_, id| *id != team_id);
        info!("Removed team {}", team_id);
        Ok(())
    }

    /// Teams the user belongs to or owns, ordered by name.
    pub async fn teams_for_user(&self, user_id: Uuid) -> Vec<Team> {
        let stores: Vec<SharedStore> = self.registry.read().await.stores.values().cloned().collect();

        let mut teams = Vec::new();
        for store in stores {
            let store = store.read().await;
            if store.team.owner_id == user_id || store.is_member(user_id) {
                teams.push(store.team.clone());
            }
        }
        teams.sort_by(|a, b| a.name.cmp(&b.name).then(a.slug.cmp(&b.slug)));
        teams
    }

    pub async fn len(&self) -> usize {
        self.registry.read().await.stores.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn validate_team_name(name: &str) -> Result<(), DatabaseError> {
        if name.chars().count() < 2 {
            return Err(DatabaseError::InvalidTeamName(
                "Team name must be at least 2 characters".to_string(),
            ));
        }
        if name.chars().count() > 100 {
            return Err(DatabaseError::InvalidTeamName(
                "Team name must be less than 100 characters".to_string(),
            ));
        }
        if name.chars().any(char::is_control) {
            return Err(DatabaseError::InvalidTeamName(
                "Team name cannot contain control characters".to_string(),
            ));
        }
        Ok(())
    }
}
