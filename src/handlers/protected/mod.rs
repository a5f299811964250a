// handlers/protected - endpoints behind jwt_auth_middleware.
//
// `account` needs only the bearer token. Every other module serves
// /api/teams/:team/* and also runs behind team_access_middleware, so its
// handlers receive a resolved `TeamContext`.

pub mod account;
pub mod articles;
pub mod members;
pub mod menu;
pub mod navigation;
pub mod roles;
pub mod settings;
pub mod team;
