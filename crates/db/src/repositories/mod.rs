pub mod appointment;
pub mod participant;
pub mod session;
pub mod user;

/// Column list shared by every appointment query.
pub(crate) const APPOINTMENT_COLUMNS: &str = "id, user_id, date, start_time, end_time, is_flexible, \
     is_group_date, max_participants, partner_name, is_assigned, note, is_video_call, \
     created_at, updated_at";
