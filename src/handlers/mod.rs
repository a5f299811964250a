// handlers/mod.rs - two handler tiers
//
// Public (no auth) → Protected (JWT auth, and team access for /api/teams/:team/*)
pub mod public;
pub mod protected;
