//! YAML seed files: teams with their members, roles, navigations, settings
//! and articles, loaded at startup when `CMS_SEED_FILE` is set.
//!
//! ```yaml
//! teams:
//!   - name: Acme
//!     owner: { user_id: 6f1c..., email: owner@acme.test, display_name: Owner }
//!     members:
//!       - { user_id: 0b7e..., email: ed@acme.test, display_name: Ed, roles: [Editor] }
//!     roles:
//!       - { name: Publisher, permissions: ["articles:*"], menu_paths: [/articles] }
//! ```

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::manager::{DatabaseError, StoreManager};
use super::models::{
    menu_ids_for_paths, Article, ArticleStatus, Member, Navigation, NavigationTree, Role,
    SettingsPatch,
};
use super::models::navigation::is_valid_key;
use crate::access::PermissionKey;
use crate::tree;
use crate::types::{slugify, unique_slug};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub teams: Vec<SeedTeam>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedTeam {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub owner: SeedUser,
    #[serde(default)]
    pub members: Vec<SeedMember>,
    /// Added to the default roles; a role named like a default replaces it.
    #[serde(default)]
    pub roles: Vec<SeedRole>,
    #[serde(default)]
    pub settings: Option<SettingsPatch>,
    #[serde(default)]
    pub navigations: Vec<SeedNavigation>,
    #[serde(default)]
    pub articles: Vec<SeedArticle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedMember {
    #[serde(flatten)]
    pub user: SeedUser,
    /// Role names.
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRole {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub full_access: bool,
    #[serde(default)]
    pub permissions: Vec<PermissionKey>,
    /// Admin menu paths the role shows, e.g. `/articles`.
    #[serde(default)]
    pub menu_paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedNavigation {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub items: NavigationTree,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedArticle {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub status: ArticleStatus,
}

const DEFAULT_ROLE_NAMES: [&str; 3] = [
    super::models::role::ADMINISTRATOR,
    super::models::role::EDITOR,
    super::models::role::VIEWER,
];

impl SeedFile {
    pub fn from_yaml(source: &str) -> Result<Self, DatabaseError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }

    /// Every problem found, as readable messages. Empty means the seed applies.
    pub fn validate(&self, max_navigation_depth: usize) -> Vec<String> {
        let mut problems = Vec::new();
        let mut slugs = HashSet::new();

        for (t, team) in self.teams.iter().enumerate() {
            let at = format!("teams[{}] ({})", t, team.name);

            let slug = slugify(team.slug.as_deref().unwrap_or(&team.name));
            if team.slug.is_some() && !slugs.insert(slug.clone()) {
                problems.push(format!("{}: duplicate slug {}", at, slug));
            }

            let mut role_names: HashSet<String> =
                DEFAULT_ROLE_NAMES.iter().map(|n| n.to_lowercase()).collect();
            for role in &team.roles {
                if role.name.trim().is_empty() {
                    problems.push(format!("{}: role with empty name", at));
                }
                role_names.insert(role.name.to_lowercase());
            }

            let mut users = HashSet::from([team.owner.user_id]);
            for member in &team.members {
                if !users.insert(member.user.user_id) {
                    problems.push(format!("{}: duplicate member {}", at, member.user.user_id));
                }
                for role in &member.roles {
                    if !role_names.contains(&role.to_lowercase()) {
                        problems.push(format!("{}: member {} has unknown role {}", at, member.user.email, role));
                    }
                }
            }

            if let Some(patch) = &team.settings {
                let mut settings = super::models::SiteSettings::for_site(team.name.clone());
                if let Err(errors) = settings.apply(patch.clone()) {
                    let mut fields: Vec<_> = errors.into_keys().collect();
                    fields.sort();
                    problems.push(format!("{}: invalid settings {}", at, fields.join(", ")));
                }
            }

            let mut keys = HashSet::new();
            for nav in &team.navigations {
                if !is_valid_key(&nav.key) {
                    problems.push(format!("{}: invalid navigation key {:?}", at, nav.key));
                }
                if !keys.insert(nav.key.clone()) {
                    problems.push(format!("{}: duplicate navigation key {}", at, nav.key));
                }
                if let Err(e) = tree::build(tree::flatten(&nav.items)) {
                    problems.push(format!("{}: navigation {}: {}", at, nav.key, e));
                }
                if tree::max_depth(&nav.items) > max_navigation_depth {
                    problems.push(format!(
                        "{}: navigation {} is deeper than {} levels",
                        at, nav.key, max_navigation_depth
                    ));
                }
                for flat in tree::flatten(&nav.items) {
                    for (field, message) in flat.data.validate() {
                        problems.push(format!("{}: navigation {} item {}: {} {}", at, nav.key, flat.id, field, message));
                    }
                }
            }

            for article in &team.articles {
                if article.title.trim().is_empty() {
                    problems.push(format!("{}: article with empty title", at));
                }
            }
        }

        problems
    }

    /// Validate, then create every team. Returns the number of teams created.
    pub async fn apply(
        &self,
        manager: &StoreManager,
        max_navigation_depth: usize,
    ) -> Result<usize, DatabaseError> {
        let problems = self.validate(max_navigation_depth);
        if !problems.is_empty() {
            return Err(DatabaseError::InvalidSeed(problems.join("; ")));
        }

        for seed in &self.teams {
            let owner = Member::new(seed.owner.user_id, &seed.owner.email, &seed.owner.display_name);
            let shared = manager
                .create_team(&seed.name, seed.slug.as_deref(), owner)
                .await?;
            let mut store = shared.write().await;

            for seeded in &seed.roles {
                let mut role = match store.role_named(&seeded.name) {
                    Some(existing) => existing.clone(),
                    None => Role::new(seeded.name.trim()),
                };
                role.description = seeded.description.clone().or(role.description);
                role.full_access = seeded.full_access;
                role.permissions = seeded.permissions.iter().cloned().collect();
                let paths: Vec<&str> = seeded.menu_paths.iter().map(String::as_str).collect();
                role.menu_ids = menu_ids_for_paths(&store.menu, &paths).into_iter().collect();
                store.roles.insert(role.id, role);
            }

            for seeded in &seed.members {
                let role_ids = seeded
                    .roles
                    .iter()
                    .filter_map(|name| store.role_named(name).map(|r| r.id))
                    .collect();
                let member = Member::new(seeded.user.user_id, &seeded.user.email, &seeded.user.display_name)
                    .with_roles(role_ids);
                store.members.insert(member.user_id, member);
            }

            if let Some(patch) = &seed.settings {
                store
                    .settings
                    .apply(patch.clone())
                    .map_err(|_| DatabaseError::InvalidSeed(format!("settings for {}", seed.name)))?;
            }

            for seeded in &seed.navigations {
                let mut navigation = Navigation::new(seeded.key.clone(), seeded.title.clone());
                navigation.set_items(seeded.items.clone());
                store.navigations.insert(navigation.key.clone(), navigation);
            }

            let author = seed.owner.user_id;
            for seeded in &seed.articles {
                let base = slugify(seeded.slug.as_deref().unwrap_or(&seeded.title));
                let slug = unique_slug(&base, |candidate| store.article_by_slug(candidate).is_some());
                let now = Utc::now();
                let article = Article {
                    id: seeded.id.unwrap_or_else(Uuid::new_v4),
                    title: seeded.title.trim().to_string(),
                    slug,
                    excerpt: seeded.excerpt.clone(),
                    body: seeded.body.clone(),
                    status: seeded.status,
                    author_id: author,
                    published_at: (seeded.status == ArticleStatus::Published).then_some(now),
                    created_at: now,
                    updated_at: now,
                    trashed_at: None,
                };
                store.articles.insert(article.id, article);
            }

            store.bump();
            tracing::info!("Seeded team {} with {} members", store.team.slug, store.members.len());
        }

        Ok(self.teams.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Permission;

    const SEED: &str = r#"
teams:
  - name: Acme
    owner:
      user_id: 00000000-0000-0000-0000-000000000001
      email: owner@acme.test
      display_name: Owner
    members:
      - user_id: 00000000-0000-0000-0000-000000000002
        email: ed@acme.test
        display_name: Ed
        roles: [Publisher]
    roles:
      - name: Publisher
        permissions: ["articles:*"]
        menu_paths: [/dashboard, /articles]
    settings:
      tagline: Everything
    navigations:
      - key: footer
        title: Footer
        items:
          - id: 00000000-0000-0000-0000-0000000000a1
            label: About
            link: { type: internal, path: /about }
    articles:
      - title: Hello World
        status: published
"#;

    #[tokio::test]
    async fn applies_a_valid_seed() {
        let seed = SeedFile::from_yaml(SEED).unwrap();
        assert!(seed.validate(4).is_empty());

        let manager = StoreManager::new();
        assert_eq!(seed.apply(&manager, 4).await.unwrap(), 1);

        let store = manager.get("acme").await.unwrap();
        let store = store.read().await;
        assert_eq!(store.settings.tagline, "Everything");
        assert!(store.navigations.contains_key("footer"));
        assert!(store.navigations.contains_key("main"));
        assert_eq!(store.article_by_slug("hello-world").map(|a| a.is_live()), Some(true));
        assert_eq!(store.generation(), 1);

        let ed = store.resolve(Uuid::from_u128(2)).unwrap();
        assert!(ed.can(Permission::ArticlesPublish));
        assert!(!ed.can(Permission::NavigationRead));
        assert_eq!(ed.menu_ids.len(), 2);
    }

    #[test]
    fn reports_every_problem() {
        let mut seed = SeedFile::from_yaml(SEED).unwrap();
        let team = &mut seed.teams[0];
        team.members[0].roles.push("Ghost".to_string());
        team.navigations[0].key = "Footer".to_string();
        team.settings = Some(SettingsPatch {
            contact_email: Some("nope".to_string()),
            ..Default::default()
        });

        let problems = seed.validate(4);
        assert_eq!(problems.len(), 3, "{:?}", problems);
        assert!(problems.iter().any(|p| p.contains("unknown role Ghost")));
    }

    #[tokio::test]
    async fn invalid_seed_creates_nothing() {
        let mut seed = SeedFile::from_yaml(SEED).unwrap();
        seed.teams[0].navigations[0].items[0].data.label = String::new();

        let manager = StoreManager::new();
        assert!(matches!(
            seed.apply(&manager, 4).await,
            Err(DatabaseError::InvalidSeed(_))
        ));
        assert!(manager.is_empty().await);
    }
}
