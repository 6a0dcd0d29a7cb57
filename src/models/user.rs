use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    /// Available (non-frozen) cash in base-instrument units.
    pub balance: i64,
    /// Most recently issued JWT, persisted in the same transaction that
    /// created the user.
    pub api_key: Option<String>,
}

/// Per-user available units of one non-cash instrument. A row exists for
/// every (user, instrument) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Inventory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub instrument_ticker: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3))]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub name: String,
    pub id: Uuid,
    pub role: Role,
    pub api_key: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            id: user.id,
            role: user.role,
            api_key: user.api_key.unwrap_or_default(),
        }
    }
}
