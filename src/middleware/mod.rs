pub mod auth;
pub mod response;
pub mod team_access;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use response::{ApiJson, ApiResponse, ApiResult};
pub use team_access::{team_access_middleware, TeamContext};
