//! In-process store backing tests and database-less local runs.
//!
//! A single async mutex guards all tables, so every guarded operation is a
//! critical section exactly like the row lock taken by the SQL store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::Result;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AccountStore, AppointmentStore};
use crate::models::{
    appointment::{Appointment, AppointmentKind, SlotTime},
    participant::{GroupJoin, Participant},
    user::{Banner, NewUser, User},
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    appointments: HashMap<Uuid, Appointment>,
    participants: Vec<Participant>,
}

impl Tables {
    fn participant_count(&self, appointment_id: Uuid) -> u32 {
        self.participants
            .iter()
            .filter(|p| p.appointment_id == appointment_id)
            .count() as u32
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sort key matching the SQL store's `ORDER BY date, start_time`.
fn start_key(appointment: &Appointment) -> String {
    match &appointment.time {
        SlotTime::Fixed { start, .. } => start.format("%H:%M").to_string(),
        SlotTime::Flexible { description } => description.clone(),
    }
}

#[async_trait]
impl AppointmentStore for InMemoryStore {
    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>> {
        let tables = self.tables.lock().await;
        Ok(tables.appointments.get(&id).cloned())
    }

    async fn find_appointments_by_owner(
        &self,
        owner_id: Uuid,
        from: NaiveDate,
    ) -> Result<Vec<Appointment>> {
        let tables = self.tables.lock().await;
        let mut found: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| a.user_id == owner_id && a.date >= from)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            (a.date, start_key(a), a.created_at).cmp(&(b.date, start_key(b), b.created_at))
        });
        Ok(found)
    }

    async fn insert_appointments(&self, appointments: &[Appointment]) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if let Some(dup) = appointments
            .iter()
            .find(|a| tables.appointments.contains_key(&a.id))
        {
            eyre::bail!("Appointment {} already exists", dup.id);
        }
        for appointment in appointments {
            tables
                .appointments
                .insert(appointment.id, appointment.clone());
        }
        Ok(())
    }

    async fn update_appointment(
        &self,
        appointment: &Appointment,
        expected: DateTime<Utc>,
    ) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.appointments.get_mut(&appointment.id) {
            Some(current) if current.updated_at == expected => {
                *current = appointment.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn conditional_assign(
        &self,
        id: Uuid,
        partner_name: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Appointment>> {
        let mut tables = self.tables.lock().await;
        let Some(current) = tables.appointments.get_mut(&id) else {
            return Ok(None);
        };
        if current.is_assigned || current.kind.is_group() {
            return Ok(None);
        }
        current.kind = AppointmentKind::Single {
            partner_name: Some(partner_name.to_string()),
        };
        current.is_assigned = true;
        current.updated_at = at;
        Ok(Some(current.clone()))
    }

    async fn unassign(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Appointment>> {
        let mut tables = self.tables.lock().await;
        let Some(current) = tables.appointments.get_mut(&id) else {
            return Ok(None);
        };
        if current.kind.is_group() {
            return Ok(None);
        }
        current.kind = AppointmentKind::Single { partner_name: None };
        current.is_assigned = false;
        current.updated_at = at;
        Ok(Some(current.clone()))
    }

    async fn add_participant_guarded(
        &self,
        appointment_id: Uuid,
        name: &str,
        at: DateTime<Utc>,
    ) -> Result<GroupJoin> {
        let mut tables = self.tables.lock().await;
        let count = tables.participant_count(appointment_id);
        let Some(appointment) = tables.appointments.get(&appointment_id) else {
            return Ok(GroupJoin::NotFound);
        };
        let AppointmentKind::Group { max_participants } = appointment.kind else {
            return Ok(GroupJoin::NotFound);
        };
        if appointment.is_assigned || count >= max_participants {
            return Ok(GroupJoin::Full);
        }

        let participant = Participant {
            id: Uuid::new_v4(),
            appointment_id,
            name: name.to_string(),
            created_at: at,
        };
        tables.participants.push(participant.clone());

        let count = count + 1;
        let filled = count == max_participants;
        if let Some(appointment) = tables.appointments.get_mut(&appointment_id) {
            if filled {
                appointment.is_assigned = true;
            }
            appointment.updated_at = at;
        }

        Ok(GroupJoin::Joined {
            participant,
            count,
            max_participants,
            filled,
        })
    }

    async fn count_participants(&self, appointment_id: Uuid) -> Result<u32> {
        let tables = self.tables.lock().await;
        Ok(tables.participant_count(appointment_id))
    }

    async fn list_participants(&self, appointment_id: Uuid) -> Result<Vec<Participant>> {
        let tables = self.tables.lock().await;
        let mut participants: Vec<Participant> = tables
            .participants
            .iter()
            .filter(|p| p.appointment_id == appointment_id)
            .cloned()
            .collect();
        participants.sort_by_key(|p| p.created_at);
        Ok(participants)
    }

    async fn delete_appointment(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let removed = tables.appointments.remove(&id).is_some();
        tables.participants.retain(|p| p.appointment_id != id);
        Ok(removed)
    }

    async fn delete_participant(
        &self,
        appointment_id: Uuid,
        participant_id: Uuid,
    ) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.participants.len();
        tables
            .participants
            .retain(|p| !(p.id == participant_id && p.appointment_id == appointment_id));
        Ok(tables.participants.len() < before)
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<Option<User>> {
        let mut tables = self.tables.lock().await;
        let taken = tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email) || u.slug == user.slug);
        if taken {
            return Ok(None);
        }

        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            slug: user.slug,
            password_hash: user.password_hash,
            login_count: 0,
            is_admin: false,
            onboarding_dismissed: false,
            news_dismissed: false,
            created_at: Utc::now(),
        };
        tables.users.insert(created.id, created.clone());
        Ok(Some(created))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn find_user_by_slug(&self, slug: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.slug == slug).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().any(|u| u.slug == slug))
    }

    async fn record_login(&self, user_id: Uuid) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if let Some(user) = tables.users.get_mut(&user_id) {
            user.login_count += 1;
        }
        Ok(())
    }

    async fn dismiss_banner(&self, user_id: Uuid, banner: Banner) -> Result<Option<User>> {
        let mut tables = self.tables.lock().await;
        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(None);
        };
        match banner {
            Banner::Onboarding => user.onboarding_dismissed = true,
            Banner::News => user.news_dismissed = true,
        }
        Ok(Some(user.clone()))
    }

    async fn create_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables
            .sessions
            .insert(token.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn find_session_user(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Uuid>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .sessions
            .get(token)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(user_id, _)| *user_id))
    }

    async fn delete_session(&self, token: &str) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.sessions.remove(token);
        Ok(())
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let before = tables.sessions.len();
        tables
            .sessions
            .retain(|_, (_, expires_at)| *expires_at > now);
        Ok((before - tables.sessions.len()) as u64)
    }
}
