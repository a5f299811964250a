use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    /// Editor document, stored as given.
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub status: ArticleStatus,
    pub author_id: Uuid,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub trashed_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn is_trashed(&self) -> bool {
        self.trashed_at.is_some()
    }

    pub fn is_live(&self) -> bool {
        self.status == ArticleStatus::Published && !self.is_trashed()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArticleDraft {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub body: Value,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<Value>,
    pub status: Option<ArticleStatus>,
}
