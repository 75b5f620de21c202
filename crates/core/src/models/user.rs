use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub slug: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub login_count: i32,
    pub is_admin: bool,
    pub onboarding_dismissed: bool,
    pub news_dismissed: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to persist a freshly registered user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub slug: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Banner {
    Onboarding,
    News,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: ProfileResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub slug: String,
    pub login_count: i32,
    pub is_admin: bool,
    pub onboarding_dismissed: bool,
    pub news_dismissed: bool,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            slug: user.slug,
            login_count: user.login_count,
            is_admin: user.is_admin,
            onboarding_dismissed: user.onboarding_dismissed,
            news_dismissed: user.news_dismissed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DismissRequest {
    pub banner: Banner,
}
