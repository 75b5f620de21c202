use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::participant::Participant;

/// Time-of-day of a slot: either a clock range or a free-text description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SlotTime {
    Fixed {
        start: NaiveTime,
        end: Option<NaiveTime>,
    },
    Flexible {
        description: String,
    },
}

impl SlotTime {
    pub fn is_flexible(&self) -> bool {
        matches!(self, SlotTime::Flexible { .. })
    }

    /// Human readable label such as `10:00 - 12:00` or the flexible text.
    pub fn label(&self) -> String {
        match self {
            SlotTime::Fixed { start, end: Some(end) } => {
                format!("{} - {}", start.format("%H:%M"), end.format("%H:%M"))
            }
            SlotTime::Fixed { start, end: None } => start.format("%H:%M").to_string(),
            SlotTime::Flexible { description } => description.clone(),
        }
    }
}

/// Whether a slot is taken by one partner or shared by a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppointmentKind {
    Single { partner_name: Option<String> },
    Group { max_participants: u32 },
}

impl AppointmentKind {
    pub fn is_group(&self) -> bool {
        matches!(self, AppointmentKind::Group { .. })
    }

    pub fn partner_name(&self) -> Option<&str> {
        match self {
            AppointmentKind::Single { partner_name } => partner_name.as_deref(),
            AppointmentKind::Group { .. } => None,
        }
    }

    pub fn max_participants(&self) -> Option<u32> {
        match self {
            AppointmentKind::Single { .. } => None,
            AppointmentKind::Group { max_participants } => Some(*max_participants),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub time: SlotTime,
    pub kind: AppointmentKind,
    pub is_assigned: bool,
    pub note: Option<String>,
    pub is_video_call: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// A slot accepts claims only while it is not assigned.
    pub fn is_claimable(&self) -> bool {
        !self.is_assigned
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn date_label(&self) -> String {
        self.date.format("%A, %d.%m.%Y").to_string()
    }
}

/// Raw appointment input as submitted by the owner's form.
///
/// Strings are validated and normalized by [`crate::validation`] before
/// anything reaches the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentForm {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub is_flexible: bool,
    #[serde(default)]
    pub start_time: String,
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_group_date: bool,
    pub max_participants: Option<i64>,
    pub partner_name: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub is_video_call: bool,
}

/// Validated, normalized appointment fields shared by every selected date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentSpec {
    pub dates: Vec<NaiveDate>,
    pub time: SlotTime,
    pub kind: AppointmentKind,
    pub note: Option<String>,
    pub is_video_call: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub name: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub appointment_id: Uuid,
    pub is_group_date: bool,
    pub is_assigned: bool,
    pub current_count: Option<u32>,
    pub max_participants: Option<u32>,
}

/// An appointment together with the people who joined it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub participants: Vec<Participant>,
}

/// What a visitor sees of a slot on the owner's public page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicAppointment {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time: SlotTime,
    pub is_group_date: bool,
    pub max_participants: Option<u32>,
    pub current_count: Option<u32>,
    pub note: Option<String>,
    pub is_video_call: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicPage {
    pub owner_name: String,
    pub slug: String,
    pub appointments: Vec<PublicAppointment>,
}
