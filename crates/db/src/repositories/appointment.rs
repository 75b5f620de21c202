use chrono::{DateTime, NaiveDate, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::APPOINTMENT_COLUMNS;
use crate::models::DbAppointment;

pub async fn insert_appointments(
    pool: &Pool<Postgres>,
    appointments: &[DbAppointment],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    for appointment in appointments {
        sqlx::query(
            r#"
            INSERT INTO appointments (
                id, user_id, date, start_time, end_time, is_flexible, is_group_date,
                max_participants, partner_name, is_assigned, note, is_video_call,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(appointment.id)
        .bind(appointment.user_id)
        .bind(appointment.date)
        .bind(&appointment.start_time)
        .bind(&appointment.end_time)
        .bind(appointment.is_flexible)
        .bind(appointment.is_group_date)
        .bind(appointment.max_participants)
        .bind(&appointment.partner_name)
        .bind(appointment.is_assigned)
        .bind(&appointment.note)
        .bind(appointment.is_video_call)
        .bind(appointment.created_at)
        .bind(appointment.updated_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::debug!("Inserted {} appointments", appointments.len());
    Ok(())
}

pub async fn get_appointment_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbAppointment>> {
    let sql = format!("SELECT {} FROM appointments WHERE id = $1", APPOINTMENT_COLUMNS);
    let appointment = sqlx::query_as::<_, DbAppointment>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(appointment)
}

pub async fn get_appointments_by_owner(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    from: NaiveDate,
) -> Result<Vec<DbAppointment>> {
    let sql = format!(
        r#"
        SELECT {}
        FROM appointments
        WHERE user_id = $1 AND date >= $2
        ORDER BY date ASC, start_time ASC, created_at ASC
        "#,
        APPOINTMENT_COLUMNS
    );
    let appointments = sqlx::query_as::<_, DbAppointment>(&sql)
        .bind(user_id)
        .bind(from)
        .fetch_all(pool)
        .await?;

    Ok(appointments)
}

/// Writes every owner-editable column if `updated_at` still matches.
pub async fn update_appointment(
    pool: &Pool<Postgres>,
    appointment: &DbAppointment,
    expected_updated_at: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE appointments
        SET date = $2, start_time = $3, end_time = $4, is_flexible = $5,
            is_group_date = $6, max_participants = $7, partner_name = $8,
            is_assigned = $9, note = $10, is_video_call = $11, updated_at = $12
        WHERE id = $1 AND updated_at = $13
        "#,
    )
    .bind(appointment.id)
    .bind(appointment.date)
    .bind(&appointment.start_time)
    .bind(&appointment.end_time)
    .bind(appointment.is_flexible)
    .bind(appointment.is_group_date)
    .bind(appointment.max_participants)
    .bind(&appointment.partner_name)
    .bind(appointment.is_assigned)
    .bind(&appointment.note)
    .bind(appointment.is_video_call)
    .bind(appointment.updated_at)
    .bind(expected_updated_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Sets the partner of a single appointment only while it is still open.
pub async fn conditional_assign(
    pool: &Pool<Postgres>,
    id: Uuid,
    partner_name: &str,
    at: DateTime<Utc>,
) -> Result<Option<DbAppointment>> {
    let sql = format!(
        r#"
        UPDATE appointments
        SET is_assigned = TRUE, partner_name = $2, updated_at = $3
        WHERE id = $1 AND is_assigned = FALSE AND is_group_date = FALSE
        RETURNING {}
        "#,
        APPOINTMENT_COLUMNS
    );
    let appointment = sqlx::query_as::<_, DbAppointment>(&sql)
        .bind(id)
        .bind(partner_name)
        .bind(at)
        .fetch_optional(pool)
        .await?;

    Ok(appointment)
}

pub async fn unassign(
    pool: &Pool<Postgres>,
    id: Uuid,
    at: DateTime<Utc>,
) -> Result<Option<DbAppointment>> {
    let sql = format!(
        r#"
        UPDATE appointments
        SET is_assigned = FALSE, partner_name = NULL, updated_at = $2
        WHERE id = $1 AND is_group_date = FALSE
        RETURNING {}
        "#,
        APPOINTMENT_COLUMNS
    );
    let appointment = sqlx::query_as::<_, DbAppointment>(&sql)
        .bind(id)
        .bind(at)
        .fetch_optional(pool)
        .await?;

    Ok(appointment)
}

/// Deletes an appointment; participants go with it through the foreign key.
pub async fn delete_appointment(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
