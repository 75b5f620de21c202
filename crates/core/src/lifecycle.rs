//! # Appointment Lifecycle
//!
//! [`AppointmentService`] owns every rule about how a slot moves between
//! open, assigned and (for groups) partially or fully booked.
//!
//! ## Claiming
//!
//! A claim is decided twice: once on a snapshot to give a fast answer, and
//! again by the store's guarded write. Only the guarded write counts, so two
//! visitors racing for the same slot can never both win and a group can never
//! take more participants than it has seats.
//!
//! Single-partner slots:
//!
//! ```text
//! [Open] --claim--> [Assigned] --remove_partner--> [Open]
//! ```
//!
//! Group slots:
//!
//! ```text
//! [Open, 0] --claim--> [Open, k < max] --claim--> [Full, assigned]
//! ```
//!
//! Removing a participant from a full group leaves it assigned; the owner
//! reopens it through an edit.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::calendar::{calendar_event, render_ics, CalendarConfig};
use crate::clock::Clock;
use crate::errors::{MinyError, MinyResult};
use crate::models::{
    appointment::{
        Appointment, AppointmentForm, AppointmentKind, AppointmentView, ClaimRequest,
        PublicAppointment, PublicPage,
    },
    participant::GroupJoin,
    user::User,
};
use crate::notification::{ClaimNotification, Notifier};
use crate::slug::is_url_safe;
use crate::store::{AccountStore, AppointmentStore};
use crate::validation::{normalize_text, validate_claimant_name, validate_form, LifecycleConfig};

/// Result of a successful claim.
#[derive(Debug, Clone)]
pub struct ClaimOutcome {
    pub appointment: Appointment,
    pub notification: ClaimNotification,
}

#[derive(Clone)]
pub struct AppointmentService {
    appointments: Arc<dyn AppointmentStore>,
    accounts: Arc<dyn AccountStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: LifecycleConfig,
    calendar: CalendarConfig,
}

impl AppointmentService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        accounts: Arc<dyn AccountStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            appointments,
            accounts,
            notifier,
            clock,
            config,
            calendar: CalendarConfig::default(),
        }
    }

    pub fn with_calendar_config(mut self, calendar: CalendarConfig) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// The single gate in front of every claim attempt.
    pub fn is_claimable(appointment: &Appointment) -> bool {
        appointment.is_claimable()
    }

    /// Claims a slot for `request.name`.
    ///
    /// # Errors
    ///
    /// * `Validation` - the name is empty after trimming
    /// * `NotFound` - no such appointment
    /// * `AlreadyAssigned` - the slot was taken (possibly by a concurrent claim)
    /// * `CapacityExceeded` - a concurrent claim took the last group seat
    /// * `Database` - the store failed; nothing was written
    #[instrument(skip(self, request), fields(appointment_id = %appointment_id))]
    pub async fn claim(
        &self,
        appointment_id: Uuid,
        request: ClaimRequest,
    ) -> MinyResult<ClaimOutcome> {
        let name = validate_claimant_name(&request.name)?;
        let message = normalize_text(request.message.as_deref());

        let snapshot = self.load_appointment(appointment_id).await?;
        if !Self::is_claimable(&snapshot) {
            debug!("Claim rejected on snapshot, appointment already assigned");
            return Err(MinyError::AlreadyAssigned);
        }

        let owner = self.load_owner(snapshot.user_id).await?;
        let now = self.clock.now();

        let (appointment, group_counts) = match snapshot.kind {
            AppointmentKind::Single { .. } => {
                let assigned = self
                    .appointments
                    .conditional_assign(appointment_id, &name, now)
                    .await?;
                match assigned {
                    Some(appointment) => (appointment, None),
                    None => {
                        warn!("Lost claim race on single appointment");
                        return Err(MinyError::AlreadyAssigned);
                    }
                }
            }
            AppointmentKind::Group { .. } => {
                let joined = self
                    .appointments
                    .add_participant_guarded(appointment_id, &name, now)
                    .await?;
                match joined {
                    GroupJoin::Joined {
                        count,
                        max_participants,
                        filled,
                        ..
                    } => {
                        let mut appointment = snapshot;
                        appointment.is_assigned = filled;
                        appointment.updated_at = now;
                        if filled {
                            info!(count, max_participants, "Group appointment is now full");
                        }
                        (appointment, Some((count, max_participants)))
                    }
                    GroupJoin::Full => {
                        warn!("Lost claim race on group appointment");
                        return Err(MinyError::CapacityExceeded);
                    }
                    GroupJoin::NotFound => {
                        return Err(not_found(appointment_id));
                    }
                }
            }
        };

        info!(partner = %name, "Appointment claimed");

        let notification =
            ClaimNotification::for_claim(&owner, &appointment, &name, message, group_counts);
        if let Err(e) = self.notifier.notify_claim(&notification).await {
            warn!("Failed to send claim notification: {:#}", e);
        }

        Ok(ClaimOutcome {
            appointment,
            notification,
        })
    }

    /// Public claim entry point keyed by the owner's share slug.
    pub async fn claim_by_slug(
        &self,
        slug: &str,
        appointment_id: Uuid,
        request: ClaimRequest,
    ) -> MinyResult<ClaimOutcome> {
        let owner = self.load_owner_by_slug(slug).await?;
        let appointment = self.load_appointment(appointment_id).await?;
        if !appointment.is_owned_by(owner.id) {
            return Err(not_found(appointment_id));
        }
        self.claim(appointment_id, request).await
    }

    /// Creates one appointment per selected date, all or nothing.
    #[instrument(skip(self, form), fields(owner_id = %owner_id))]
    pub async fn create_appointments(
        &self,
        owner_id: Uuid,
        form: &AppointmentForm,
    ) -> MinyResult<Vec<Appointment>> {
        let spec = validate_form(form, self.clock.today(), &self.config)?;
        let now = self.clock.now();
        let is_assigned = match &spec.kind {
            AppointmentKind::Single { partner_name } => partner_name.is_some(),
            AppointmentKind::Group { .. } => false,
        };

        let appointments: Vec<Appointment> = spec
            .dates
            .iter()
            .map(|date| Appointment {
                id: Uuid::new_v4(),
                user_id: owner_id,
                date: *date,
                time: spec.time.clone(),
                kind: spec.kind.clone(),
                is_assigned,
                note: spec.note.clone(),
                is_video_call: spec.is_video_call,
                created_at: now,
                updated_at: now,
            })
            .collect();

        self.appointments.insert_appointments(&appointments).await?;
        info!(count = appointments.len(), "Created appointments");
        Ok(appointments)
    }

    /// Applies an owner edit to a single appointment.
    ///
    /// The form must name exactly one date. A single-partner slot keeps its
    /// current partner unless the form supplies one.
    #[instrument(skip(self, form), fields(appointment_id = %appointment_id, owner_id = %owner_id))]
    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        owner_id: Uuid,
        form: &AppointmentForm,
    ) -> MinyResult<Appointment> {
        let current = self.load_owned(appointment_id, owner_id).await?;

        if form.dates.len() > 1 {
            return Err(MinyError::validation(
                "date",
                "An existing appointment has exactly one date",
            ));
        }
        let spec = validate_form(form, self.clock.today(), &self.config)?;
        let date = spec
            .dates
            .first()
            .copied()
            .ok_or_else(|| MinyError::validation("date", "Select at least one date"))?;

        let participant_count = self.appointments.count_participants(appointment_id).await?;

        let (kind, is_assigned) = match spec.kind {
            AppointmentKind::Single { partner_name } => {
                if participant_count > 0 {
                    return Err(MinyError::validation(
                        "is_group_date",
                        "Remove all participants before turning this into a single appointment",
                    ));
                }
                let partner_name =
                    partner_name.or_else(|| current.kind.partner_name().map(str::to_string));
                let is_assigned = partner_name.is_some();
                (AppointmentKind::Single { partner_name }, is_assigned)
            }
            AppointmentKind::Group { max_participants } => {
                if participant_count > max_participants {
                    return Err(MinyError::validation(
                        "max_participants",
                        format!(
                            "{} people already joined, the maximum cannot be lower",
                            participant_count
                        ),
                    ));
                }
                (
                    AppointmentKind::Group { max_participants },
                    participant_count == max_participants,
                )
            }
        };

        let updated = Appointment {
            date,
            time: spec.time,
            kind,
            is_assigned,
            note: spec.note,
            is_video_call: spec.is_video_call,
            // Strictly newer than the stored stamp so the compare-and-swap always
            // observes a change.
            updated_at: self
                .clock
                .now()
                .max(current.updated_at + Duration::microseconds(1)),
            ..current.clone()
        };

        if !self
            .appointments
            .update_appointment(&updated, current.updated_at)
            .await?
        {
            warn!("Appointment changed while being edited");
            return Err(MinyError::Conflict(
                "The appointment was changed in the meantime, please reload".to_string(),
            ));
        }

        info!("Updated appointment");
        Ok(updated)
    }

    #[instrument(skip(self), fields(appointment_id = %appointment_id, owner_id = %owner_id))]
    pub async fn delete_appointment(&self, appointment_id: Uuid, owner_id: Uuid) -> MinyResult<()> {
        self.load_owned(appointment_id, owner_id).await?;
        if !self.appointments.delete_appointment(appointment_id).await? {
            return Err(not_found(appointment_id));
        }
        info!("Deleted appointment");
        Ok(())
    }

    /// Removes one participant; a full group stays assigned.
    #[instrument(skip(self), fields(appointment_id = %appointment_id, participant_id = %participant_id))]
    pub async fn remove_participant(
        &self,
        appointment_id: Uuid,
        participant_id: Uuid,
        owner_id: Uuid,
    ) -> MinyResult<()> {
        self.load_owned(appointment_id, owner_id).await?;
        if !self
            .appointments
            .delete_participant(appointment_id, participant_id)
            .await?
        {
            return Err(MinyError::NotFound(format!(
                "Participant with ID {} not found",
                participant_id
            )));
        }
        info!("Removed participant");
        Ok(())
    }

    /// Clears the partner of a single-partner slot, making it claimable again.
    #[instrument(skip(self), fields(appointment_id = %appointment_id))]
    pub async fn remove_partner(
        &self,
        appointment_id: Uuid,
        owner_id: Uuid,
    ) -> MinyResult<Appointment> {
        let current = self.load_owned(appointment_id, owner_id).await?;
        if current.kind.is_group() {
            return Err(MinyError::validation(
                "partner_name",
                "Group appointments have participants, not a partner",
            ));
        }
        let reopened = self
            .appointments
            .unassign(appointment_id, self.clock.now())
            .await?
            .ok_or_else(|| not_found(appointment_id))?;
        info!("Removed partner");
        Ok(reopened)
    }

    /// The owner's appointments from today on, with their participants.
    pub async fn list_upcoming(&self, owner_id: Uuid) -> MinyResult<Vec<AppointmentView>> {
        let appointments = self
            .appointments
            .find_appointments_by_owner(owner_id, self.clock.today())
            .await?;

        let mut views = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            let participants = if appointment.kind.is_group() {
                self.appointments.list_participants(appointment.id).await?
            } else {
                Vec::new()
            };
            views.push(AppointmentView {
                appointment,
                participants,
            });
        }
        Ok(views)
    }

    /// What visitors of a share link see: open slots from today on.
    pub async fn list_public(&self, slug: &str) -> MinyResult<PublicPage> {
        let owner = self.load_owner_by_slug(slug).await?;
        let appointments = self
            .appointments
            .find_appointments_by_owner(owner.id, self.clock.today())
            .await?;

        let mut open = Vec::new();
        for appointment in appointments.into_iter().filter(Self::is_claimable) {
            let current_count = match appointment.kind {
                AppointmentKind::Group { .. } => {
                    Some(self.appointments.count_participants(appointment.id).await?)
                }
                AppointmentKind::Single { .. } => None,
            };
            open.push(PublicAppointment {
                id: appointment.id,
                date: appointment.date,
                time: appointment.time.clone(),
                is_group_date: appointment.kind.is_group(),
                max_participants: appointment.kind.max_participants(),
                current_count,
                note: appointment.note.clone(),
                is_video_call: appointment.is_video_call,
            });
        }

        Ok(PublicPage {
            owner_name: owner.name,
            slug: owner.slug,
            appointments: open,
        })
    }

    /// Renders the owner's upcoming appointments as an iCalendar feed.
    pub async fn calendar_feed(&self, owner_id: Uuid) -> MinyResult<String> {
        let owner = self.load_owner(owner_id).await?;
        let views = self.list_upcoming(owner_id).await?;
        let events: Vec<_> = views
            .iter()
            .map(|view| calendar_event(&view.appointment, &view.participants, &self.calendar))
            .collect();
        Ok(render_ics(&format!("Miny - {}", owner.name), &events))
    }

    async fn load_appointment(&self, id: Uuid) -> MinyResult<Appointment> {
        self.appointments
            .find_appointment(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn load_owned(&self, id: Uuid, owner_id: Uuid) -> MinyResult<Appointment> {
        let appointment = self.load_appointment(id).await?;
        if !appointment.is_owned_by(owner_id) {
            warn!(%owner_id, "Rejected change by non-owner");
            return Err(MinyError::Authorization(
                "Only the owner may change this appointment".to_string(),
            ));
        }
        Ok(appointment)
    }

    async fn load_owner(&self, user_id: Uuid) -> MinyResult<User> {
        self.accounts
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| MinyError::NotFound(format!("User with ID {} not found", user_id)))
    }

    async fn load_owner_by_slug(&self, slug: &str) -> MinyResult<User> {
        let missing = || MinyError::NotFound(format!("No page found for '{}'", slug));
        // Generated slugs never contain anything else, so skip the lookup.
        if !is_url_safe(slug) {
            return Err(missing());
        }
        self.accounts
            .find_user_by_slug(slug)
            .await?
            .ok_or_else(missing)
    }
}

fn not_found(id: Uuid) -> MinyError {
    MinyError::NotFound(format!("Appointment with ID {} not found", id))
}
