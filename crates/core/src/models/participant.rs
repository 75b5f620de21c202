use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a guarded group join at the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupJoin {
    Joined {
        participant: Participant,
        count: u32,
        max_participants: u32,
        filled: bool,
    },
    /// The slot was already assigned or at capacity when the lock was taken.
    Full,
    NotFound,
}
