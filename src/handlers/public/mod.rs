// handlers/public - endpoints that need no bearer token.
//
// Service discovery, health, the permission catalog, and the published view
// of a team's navigation that the public site renders.

pub mod navigation;
pub mod system;

pub use navigation::published as navigation_published;
pub use system::{health, permissions, root};
