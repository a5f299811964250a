use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("User {user_id} is not a member of team {team_id}")]
    NotMember { team_id: Uuid, user_id: Uuid },

    #[error("Missing permission: {0}")]
    Forbidden(String),

    #[error("Invalid permission key: {0}")]
    InvalidPermission(String),

    #[error("Cannot grant {0}: not held by the granting user")]
    Escalation(String),
}
