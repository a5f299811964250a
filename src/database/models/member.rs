use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    pub fn new(user_id: Uuid, email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            display_name: display_name.into(),
            role_ids: Vec::new(),
            joined_at: Utc::now(),
        }
    }

    pub fn with_roles(mut self, role_ids: Vec<Uuid>) -> Self {
        self.role_ids = role_ids;
        self
    }
}
