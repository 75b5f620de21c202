use crate::models::DbUser;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, slug, password_hash, login_count, is_admin, \
     onboarding_dismissed, news_dismissed, created_at";

/// Inserts a user, returning `None` when the email or slug is taken.
pub async fn create_user(
    pool: &Pool<Postgres>,
    name: &str,
    email: &str,
    slug: &str,
    password_hash: &str,
) -> Result<Option<DbUser>> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating user: id={}, slug={}", id, slug);

    let sql = format!(
        r#"
        INSERT INTO users (id, name, email, slug, password_hash, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT DO NOTHING
        RETURNING {}
        "#,
        USER_COLUMNS
    );
    let user = sqlx::query_as::<_, DbUser>(&sql)
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(slug)
        .bind(password_hash)
        .bind(now)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbUser>> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    let user = sqlx::query_as::<_, DbUser>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn get_user_by_slug(pool: &Pool<Postgres>, slug: &str) -> Result<Option<DbUser>> {
    let sql = format!("SELECT {} FROM users WHERE slug = $1", USER_COLUMNS);
    let user = sqlx::query_as::<_, DbUser>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn get_user_by_email(pool: &Pool<Postgres>, email: &str) -> Result<Option<DbUser>> {
    let sql = format!("SELECT {} FROM users WHERE LOWER(email) = LOWER($1)", USER_COLUMNS);
    let user = sqlx::query_as::<_, DbUser>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn slug_exists(pool: &Pool<Postgres>, slug: &str) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (SELECT 1 FROM users WHERE slug = $1)
        "#,
    )
    .bind(slug)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

pub async fn increment_login_count(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users SET login_count = login_count + 1 WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn set_onboarding_dismissed(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbUser>> {
    let sql = format!(
        "UPDATE users SET onboarding_dismissed = TRUE WHERE id = $1 RETURNING {}",
        USER_COLUMNS
    );
    let user = sqlx::query_as::<_, DbUser>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn set_news_dismissed(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbUser>> {
    let sql = format!(
        "UPDATE users SET news_dismissed = TRUE WHERE id = $1 RETURNING {}",
        USER_COLUMNS
    );
    let user = sqlx::query_as::<_, DbUser>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}
