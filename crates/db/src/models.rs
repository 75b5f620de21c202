use chrono::{DateTime, NaiveDate, Utc};
use eyre::{eyre, Result};
use miny_core::models::{
    appointment::{Appointment, AppointmentKind, SlotTime},
    participant::Participant,
    user::User,
};
use miny_core::validation::parse_clock_time;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub slug: String,
    pub password_hash: String,
    pub login_count: i32,
    pub is_admin: bool,
    pub onboarding_dismissed: bool,
    pub news_dismissed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(row: DbUser) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            slug: row.slug,
            password_hash: row.password_hash,
            login_count: row.login_count,
            is_admin: row.is_admin,
            onboarding_dismissed: row.onboarding_dismissed,
            news_dismissed: row.news_dismissed,
            created_at: row.created_at,
        }
    }
}

/// Flat row layout of an appointment; times are stored as text so flexible
/// descriptions and `HH:MM` clock times share a column.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: Option<String>,
    pub is_flexible: bool,
    pub is_group_date: bool,
    pub max_participants: Option<i32>,
    pub partner_name: Option<String>,
    pub is_assigned: bool,
    pub note: Option<String>,
    pub is_video_call: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = eyre::Report;

    fn try_from(row: DbAppointment) -> Result<Self> {
        let time = if row.is_flexible {
            SlotTime::Flexible {
                description: row.start_time,
            }
        } else {
            let start = parse_clock_time(&row.start_time)
                .ok_or_else(|| eyre!("Invalid start time '{}' on {}", row.start_time, row.id))?;
            let end = row
                .end_time
                .as_deref()
                .map(|end| {
                    parse_clock_time(end)
                        .ok_or_else(|| eyre!("Invalid end time '{}' on {}", end, row.id))
                })
                .transpose()?;
            SlotTime::Fixed { start, end }
        };

        let kind = if row.is_group_date {
            let max = row
                .max_participants
                .ok_or_else(|| eyre!("Group appointment {} has no capacity", row.id))?;
            AppointmentKind::Group {
                max_participants: u32::try_from(max)?,
            }
        } else {
            AppointmentKind::Single {
                partner_name: row.partner_name,
            }
        };

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            date: row.date,
            time,
            kind,
            is_assigned: row.is_assigned,
            note: row.note,
            is_video_call: row.is_video_call,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&Appointment> for DbAppointment {
    fn from(appointment: &Appointment) -> Self {
        let (start_time, end_time, is_flexible) = match &appointment.time {
            SlotTime::Fixed { start, end } => (
                start.format("%H:%M").to_string(),
                end.map(|e| e.format("%H:%M").to_string()),
                false,
            ),
            SlotTime::Flexible { description } => (description.clone(), None, true),
        };

        Self {
            id: appointment.id,
            user_id: appointment.user_id,
            date: appointment.date,
            start_time,
            end_time,
            is_flexible,
            is_group_date: appointment.kind.is_group(),
            max_participants: appointment.kind.max_participants().map(|m| m as i32),
            partner_name: appointment.kind.partner_name().map(str::to_string),
            is_assigned: appointment.is_assigned,
            note: appointment.note.clone(),
            is_video_call: appointment.is_video_call,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbParticipant {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<DbParticipant> for Participant {
    fn from(row: DbParticipant) -> Self {
        Self {
            id: row.id,
            appointment_id: row.appointment_id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}
