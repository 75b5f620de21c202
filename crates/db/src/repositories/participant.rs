use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::DbParticipant;

/// Result of [`add_participant_guarded`], before mapping to the domain type.
#[derive(Debug)]
pub enum JoinResult {
    Joined {
        participant: DbParticipant,
        count: i64,
        max_participants: i32,
    },
    Full,
    NotFound,
}

/// Adds a participant inside one transaction holding the appointment row lock.
///
/// Concurrent joins on the same appointment queue on `FOR UPDATE`, so the
/// capacity check and the insert cannot interleave. When the insert fills the
/// last seat the appointment is marked assigned before the lock is released.
pub async fn add_participant_guarded(
    pool: &Pool<Postgres>,
    appointment_id: Uuid,
    name: &str,
    at: DateTime<Utc>,
) -> Result<JoinResult> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, (bool, Option<i32>)>(
        r#"
        SELECT is_assigned, max_participants
        FROM appointments
        WHERE id = $1 AND is_group_date = TRUE
        FOR UPDATE
        "#,
    )
    .bind(appointment_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((is_assigned, Some(max_participants))) = row else {
        tx.rollback().await?;
        return Ok(JoinResult::NotFound);
    };

    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM participants WHERE appointment_id = $1
        "#,
    )
    .bind(appointment_id)
    .fetch_one(&mut *tx)
    .await?;

    if is_assigned || count >= i64::from(max_participants) {
        tx.rollback().await?;
        return Ok(JoinResult::Full);
    }

    let participant = sqlx::query_as::<_, DbParticipant>(
        r#"
        INSERT INTO participants (id, appointment_id, name, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, appointment_id, name, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(appointment_id)
    .bind(name)
    .bind(at)
    .fetch_one(&mut *tx)
    .await?;

    let count = count + 1;
    sqlx::query(
        r#"
        UPDATE appointments
        SET is_assigned = $2, updated_at = $3
        WHERE id = $1
        "#,
    )
    .bind(appointment_id)
    .bind(count == i64::from(max_participants))
    .bind(at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(JoinResult::Joined {
        participant,
        count,
        max_participants,
    })
}

pub async fn count_participants(pool: &Pool<Postgres>, appointment_id: Uuid) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM participants WHERE appointment_id = $1
        "#,
    )
    .bind(appointment_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

pub async fn get_participants(
    pool: &Pool<Postgres>,
    appointment_id: Uuid,
) -> Result<Vec<DbParticipant>> {
    let participants = sqlx::query_as::<_, DbParticipant>(
        r#"
        SELECT id, appointment_id, name, created_at
        FROM participants
        WHERE appointment_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(appointment_id)
    .fetch_all(pool)
    .await?;

    Ok(participants)
}

pub async fn delete_participant(
    pool: &Pool<Postgres>,
    appointment_id: Uuid,
    participant_id: Uuid,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM participants
        WHERE id = $1 AND appointment_id = $2
        "#,
    )
    .bind(participant_id)
    .bind(appointment_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
