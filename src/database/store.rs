use std::collections::BTreeMap;

use uuid::Uuid;

use super::models::{
    default_menu, default_roles, role, Article, Member, MenuTree, Navigation, Role, SiteSettings,
    Team,
};
use crate::access::{self, AccessError, AccessProfile};

/// Everything one team owns. Held behind an async lock by `StoreManager`.
#[derive(Debug, Clone)]
pub struct TeamStore {
    pub team: Team,
    pub members: BTreeMap<Uuid, Member>,
    pub roles: BTreeMap<Uuid, Role>,
    pub menu: MenuTree,
    /// Keyed by navigation key.
    pub navigations: BTreeMap<String, Navigation>,
    pub settings: SiteSettings,
    pub articles: BTreeMap<Uuid, Article>,
    generation: u64,
}

impl TeamStore {
    /// A fresh team: default roles, menu, `main` navigation and settings, with
    /// the owner as its first member holding the Administrator role.
    pub fn new(team: Team, owner: Member) -> Self {
        let menu = default_menu();
        let roles: BTreeMap<Uuid, Role> = default_roles(&menu)
            .into_iter()
            .map(|role| (role.id, role))
            .collect();

        let administrator = roles
            .values()
            .filter(|role| role.name == role::ADMINISTRATOR)
            .map(|role| role.id)
            .collect();
        let owner = owner.with_roles(administrator);

        let main = Navigation::new("main", "Main navigation");
        let settings = SiteSettings::for_site(team.name.clone());

        Self {
            members: BTreeMap::from([(owner.user_id, owner)]),
            roles,
            menu,
            navigations: BTreeMap::from([(main.key.clone(), main)]),
            settings,
            articles: BTreeMap::new(),
            team,
            generation: 0,
        }
    }

    pub fn team_id(&self) -> Uuid {
        self.team.id
    }

    /// Changes whenever something feeding `AccessProfile` resolution does.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn bump(&mut self) {
        self.generation += 1;
    }

    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.contains_key(&user_id)
    }

    pub fn resolve(&self, user_id: Uuid) -> Result<AccessProfile, AccessError> {
        access::resolve(&self.team, self.members.get(&user_id), &self.roles, user_id)
    }

    pub fn role_named(&self, name: &str) -> Option<&Role> {
        self.roles
            .values()
            .find(|role| role.name.eq_ignore_ascii_case(name))
    }

    pub fn article_by_slug(&self, slug: &str) -> Option<&Article> {
        self.articles.values().find(|article| article.slug == slug)
    }
}
