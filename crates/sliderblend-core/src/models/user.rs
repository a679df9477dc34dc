use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bot user, identified externally by their Telegram id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub telegram_username: String,
    pub telegram_user_id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn can_submit_documents(&self) -> bool {
        self.is_active && !self.is_blocked
    }
}

/// Input for registering a bot user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub telegram_username: String,
    pub telegram_user_id: String,
    pub first_name: String,
    pub last_name: Option<String>,
}
