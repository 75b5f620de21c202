//! PostgreSQL implementation of the core store ports.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::Result;
use miny_core::models::{
    appointment::Appointment,
    participant::{GroupJoin, Participant},
    user::{Banner, NewUser, User},
};
use miny_core::store::{AccountStore, AppointmentStore};
use uuid::Uuid;

use crate::models::DbAppointment;
use crate::repositories::{appointment, participant, session, user};
use crate::DbPool;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl AppointmentStore for PgStore {
    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>> {
        appointment::get_appointment_by_id(&self.pool, id)
            .await?
            .map(Appointment::try_from)
            .transpose()
    }

    async fn find_appointments_by_owner(
        &self,
        owner_id: Uuid,
        from: NaiveDate,
    ) -> Result<Vec<Appointment>> {
        appointment::get_appointments_by_owner(&self.pool, owner_id, from)
            .await?
            .into_iter()
            .map(Appointment::try_from)
            .collect()
    }

    async fn insert_appointments(&self, appointments: &[Appointment]) -> Result<()> {
        let rows: Vec<DbAppointment> = appointments.iter().map(DbAppointment::from).collect();
        appointment::insert_appointments(&self.pool, &rows).await
    }

    async fn update_appointment(
        &self,
        updated: &Appointment,
        expected: DateTime<Utc>,
    ) -> Result<bool> {
        appointment::update_appointment(&self.pool, &DbAppointment::from(updated), expected).await
    }

    async fn conditional_assign(
        &self,
        id: Uuid,
        partner_name: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Appointment>> {
        appointment::conditional_assign(&self.pool, id, partner_name, at)
            .await?
            .map(Appointment::try_from)
            .transpose()
    }

    async fn unassign(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Appointment>> {
        appointment::unassign(&self.pool, id, at)
            .await?
            .map(Appointment::try_from)
            .transpose()
    }

    async fn add_participant_guarded(
        &self,
        appointment_id: Uuid,
        name: &str,
        at: DateTime<Utc>,
    ) -> Result<GroupJoin> {
        let joined =
            participant::add_participant_guarded(&self.pool, appointment_id, name, at).await?;

        Ok(match joined {
            participant::JoinResult::Joined {
                participant,
                count,
                max_participants,
            } => GroupJoin::Joined {
                participant: participant.into(),
                count: u32::try_from(count)?,
                max_participants: u32::try_from(max_participants)?,
                filled: count == i64::from(max_participants),
            },
            participant::JoinResult::Full => GroupJoin::Full,
            participant::JoinResult::NotFound => GroupJoin::NotFound,
        })
    }

    async fn count_participants(&self, appointment_id: Uuid) -> Result<u32> {
        let count = participant::count_participants(&self.pool, appointment_id).await?;
        Ok(u32::try_from(count)?)
    }

    async fn list_participants(&self, appointment_id: Uuid) -> Result<Vec<Participant>> {
        let rows = participant::get_participants(&self.pool, appointment_id).await?;
        Ok(rows.into_iter().map(Participant::from).collect())
    }

    async fn delete_appointment(&self, id: Uuid) -> Result<bool> {
        appointment::delete_appointment(&self.pool, id).await
    }

    async fn delete_participant(
        &self,
        appointment_id: Uuid,
        participant_id: Uuid,
    ) -> Result<bool> {
        participant::delete_participant(&self.pool, appointment_id, participant_id).await
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> Result<Option<User>> {
        let created = user::create_user(
            &self.pool,
            &new_user.name,
            &new_user.email,
            &new_user.slug,
            &new_user.password_hash,
        )
        .await?;
        Ok(created.map(User::from))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(user::get_user_by_id(&self.pool, id).await?.map(User::from))
    }

    async fn find_user_by_slug(&self, slug: &str) -> Result<Option<User>> {
        Ok(user::get_user_by_slug(&self.pool, slug)
            .await?
            .map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(user::get_user_by_email(&self.pool, email)
            .await?
            .map(User::from))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        user::slug_exists(&self.pool, slug).await
    }

    async fn record_login(&self, user_id: Uuid) -> Result<()> {
        user::increment_login_count(&self.pool, user_id).await
    }

    async fn dismiss_banner(&self, user_id: Uuid, banner: Banner) -> Result<Option<User>> {
        let updated = match banner {
            Banner::Onboarding => user::set_onboarding_dismissed(&self.pool, user_id).await?,
            Banner::News => user::set_news_dismissed(&self.pool, user_id).await?,
        };
        Ok(updated.map(User::from))
    }

    async fn create_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        session::create_session(&self.pool, token, user_id, expires_at).await
    }

    async fn find_session_user(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Uuid>> {
        session::get_session_user(&self.pool, token, now).await
    }

    async fn delete_session(&self, token: &str) -> Result<()> {
        session::delete_session(&self.pool, token).await
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
        session::delete_expired_sessions(&self.pool, now).await
    }
}
