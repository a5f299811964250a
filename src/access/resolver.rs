use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use super::{AccessError, AccessProfile};
use crate::database::models::{Member, Role, Team};

/// Fold ownership and role grants into an `AccessProfile`.
///
/// The owner always has full access, member or not. Role ids that no longer
/// exist are skipped.
pub fn resolve(
    team: &Team,
    member: Option<&Member>,
    roles: &BTreeMap<Uuid, Role>,
    user_id: Uuid,
) -> Result<AccessProfile, AccessError> {
    let is_owner = team.owner_id == user_id;

    let mut profile = AccessProfile {
        team_id: team.id,
        user_id,
        is_owner,
        full_access: is_owner,
        role_ids: Vec::new(),
        permissions: BTreeSet::new(),
        menu_ids: BTreeSet::new(),
    };

    let member = match member {
        Some(member) => member,
        None if is_owner => return Ok(profile),
        None => {
            return Err(AccessError::NotMember {
                team_id: team.id,
                user_id,
            })
        }
    };

    for role in member.role_ids.iter().filter_map(|id| roles.get(id)) {
        profile.role_ids.push(role.id);
        profile.full_access |= role.full_access;
        profile.permissions.extend(role.permissions.iter().cloned());
        profile.menu_ids.extend(role.menu_ids.iter().copied());
    }

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{Permission, PermissionKey};

    fn role(name: &str, keys: &[&str], menus: &[u128]) -> Role {
        let mut role = Role::new(name);
        role.permissions = keys.iter().map(|k| PermissionKey::parse(k).unwrap()).collect();
        role.menu_ids = menus.iter().map(|n| Uuid::from_u128(*n)).collect();
        role
    }

    fn catalog(roles: Vec<Role>) -> BTreeMap<Uuid, Role> {
        roles.into_iter().map(|r| (r.id, r)).collect()
    }

    #[test]
    fn owner_has_full_access_without_membership() {
        let owner = Uuid::from_u128(1);
        let team = Team::new("Acme", "acme", owner);
        let profile = resolve(&team, None, &BTreeMap::new(), owner).unwrap();
        assert!(profile.is_owner);
        assert!(profile.has_full_access());
    }

    #[test]
    fn non_member_is_rejected() {
        let team = Team::new("Acme", "acme", Uuid::from_u128(1));
        let stranger = Uuid::from_u128(2);
        assert_eq!(
            resolve(&team, None, &BTreeMap::new(), stranger),
            Err(AccessError::NotMember {
                team_id: team.id,
                user_id: stranger
            })
        );
    }

    #[test]
    fn roles_are_unioned_and_stale_ids_ignored() {
        let team = Team::new("Acme", "acme", Uuid::from_u128(1));
        let writer = role("Writer", &["articles:create"], &[10]);
        let reader = role("Reader", &["articles:read", "navigation:read"], &[11]);
        let member = Member::new(Uuid::from_u128(2), "w@example.com", "W").with_roles(vec![
            writer.id,
            Uuid::from_u128(404),
            reader.id,
        ]);
        let roles = catalog(vec![writer.clone(), reader.clone()]);

        let profile = resolve(&team, Some(&member), &roles, member.user_id).unwrap();
        assert_eq!(profile.role_ids, vec![writer.id, reader.id]);
        assert!(!profile.has_full_access());
        assert!(profile.can(Permission::ArticlesCreate));
        assert!(profile.can(Permission::NavigationRead));
        assert!(!profile.can(Permission::NavigationManage));
        assert_eq!(profile.menu_ids.len(), 2);
    }

    #[test]
    fn any_full_access_role_grants_everything() {
        let team = Team::new("Acme", "acme", Uuid::from_u128(1));
        let mut admin = role("Admin", &[], &[]);
        admin.full_access = true;
        let member = Member::new(Uuid::from_u128(3), "a@example.com", "A").with_roles(vec![admin.id]);
        let profile = resolve(&team, Some(&member), &catalog(vec![admin]), member.user_id).unwrap();
        assert!(profile.can(Permission::TeamManage));
        assert!(!profile.is_owner);
    }
}
