//! Test doubles for the engine's ports.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mockall::mock;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{
    appointment::Appointment,
    participant::{GroupJoin, Participant},
};
use crate::notification::{ClaimNotification, Notifier};
use crate::store::AppointmentStore;

mock! {
    pub Notifier {}

    #[async_trait]
    impl Notifier for Notifier {
        async fn notify_claim(&self, notification: &ClaimNotification) -> eyre::Result<()>;
    }
}

mock! {
    pub AppointmentRepo {}

    #[async_trait]
    impl AppointmentStore for AppointmentRepo {
        async fn find_appointment(&self, id: Uuid) -> eyre::Result<Option<Appointment>>;

        async fn find_appointments_by_owner(
            &self,
            owner_id: Uuid,
            from: NaiveDate,
        ) -> eyre::Result<Vec<Appointment>>;

        async fn insert_appointments(&self, appointments: &[Appointment]) -> eyre::Result<()>;

        async fn update_appointment(
            &self,
            appointment: &Appointment,
            expected: DateTime<Utc>,
        ) -> eyre::Result<bool>;

        async fn conditional_assign(
            &self,
            id: Uuid,
            partner_name: &str,
            at: DateTime<Utc>,
        ) -> eyre::Result<Option<Appointment>>;

        async fn unassign(&self, id: Uuid, at: DateTime<Utc>) -> eyre::Result<Option<Appointment>>;

        async fn add_participant_guarded(
            &self,
            appointment_id: Uuid,
            name: &str,
            at: DateTime<Utc>,
        ) -> eyre::Result<GroupJoin>;

        async fn count_participants(&self, appointment_id: Uuid) -> eyre::Result<u32>;

        async fn list_participants(&self, appointment_id: Uuid) -> eyre::Result<Vec<Participant>>;

        async fn delete_appointment(&self, id: Uuid) -> eyre::Result<bool>;

        async fn delete_participant(
            &self,
            appointment_id: Uuid,
            participant_id: Uuid,
        ) -> eyre::Result<bool>;
    }
}

/// Notifier that keeps every payload it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<ClaimNotification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<ClaimNotification> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_claim(&self, notification: &ClaimNotification) -> eyre::Result<()> {
        self.sent.lock().await.push(notification.clone());
        Ok(())
    }
}
