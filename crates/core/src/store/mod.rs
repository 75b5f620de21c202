//! Persistence ports consumed by the lifecycle engine and the API.
//!
//! Implementations must make the guarded operations (`conditional_assign`,
//! `add_participant_guarded`, `update_appointment`) atomic with respect to
//! each other: the check and the write happen under the same lock or
//! transaction.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::Result;
use uuid::Uuid;

use crate::models::{
    appointment::Appointment,
    participant::{GroupJoin, Participant},
    user::{Banner, NewUser, User},
};

pub use memory::InMemoryStore;

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>>;

    /// Owner's appointments on or after `from`, ascending by date and start.
    async fn find_appointments_by_owner(
        &self,
        owner_id: Uuid,
        from: NaiveDate,
    ) -> Result<Vec<Appointment>>;

    /// Persists every appointment or none of them.
    async fn insert_appointments(&self, appointments: &[Appointment]) -> Result<()>;

    /// Overwrites an appointment if its `updated_at` still equals `expected`.
    ///
    /// Returns `false` when another write got there first.
    async fn update_appointment(
        &self,
        appointment: &Appointment,
        expected: DateTime<Utc>,
    ) -> Result<bool>;

    /// Assigns a single-partner slot only if it is still unassigned.
    async fn conditional_assign(
        &self,
        id: Uuid,
        partner_name: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Appointment>>;

    /// Clears the partner of a single-partner slot and reopens it.
    async fn unassign(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Appointment>>;

    /// Adds a participant only while the group slot is open and below capacity.
    ///
    /// Marks the slot assigned in the same step when the new participant
    /// fills the last seat.
    async fn add_participant_guarded(
        &self,
        appointment_id: Uuid,
        name: &str,
        at: DateTime<Utc>,
    ) -> Result<GroupJoin>;

    async fn count_participants(&self, appointment_id: Uuid) -> Result<u32>;

    async fn list_participants(&self, appointment_id: Uuid) -> Result<Vec<Participant>>;

    /// Removes the appointment together with its participants.
    async fn delete_appointment(&self, id: Uuid) -> Result<bool>;

    async fn delete_participant(&self, appointment_id: Uuid, participant_id: Uuid)
        -> Result<bool>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts a user; returns `None` if the email or slug is already taken.
    async fn create_user(&self, user: NewUser) -> Result<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_user_by_slug(&self, slug: &str) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn slug_exists(&self, slug: &str) -> Result<bool>;

    /// Increments the login counter.
    async fn record_login(&self, user_id: Uuid) -> Result<()>;

    async fn dismiss_banner(&self, user_id: Uuid, banner: Banner) -> Result<Option<User>>;

    async fn create_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Resolves a session token that has not expired at `now`.
    ///
    /// Expired rows are ignored but left in place; see
    /// [`purge_expired_sessions`](Self::purge_expired_sessions).
    async fn find_session_user(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Uuid>>;

    async fn delete_session(&self, token: &str) -> Result<()>;

    /// Deletes every session whose expiry is at or before `now` and returns
    /// how many were removed. Login calls this before issuing a new token.
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64>;
}
