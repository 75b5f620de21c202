//! # Appointment Validation
//!
//! Turns a raw [`AppointmentForm`] into an [`AppointmentSpec`]. All problems
//! are collected per field so a form can show every message at once; nothing
//! is persisted unless the whole form passes.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};

use crate::errors::{FieldErrors, MinyError, MinyResult};
use crate::models::appointment::{AppointmentForm, AppointmentKind, AppointmentSpec, SlotTime};

pub const MIN_PARTICIPANTS: i64 = 2;
pub const DEFAULT_MAX_PARTICIPANTS: u32 = 100;
/// Longest name or short text a column accepts, counted in characters.
pub const MAX_TEXT_LENGTH: usize = 255;

/// Tunable limits applied while validating owner input.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Upper bound for `max_participants` on group appointments.
    pub max_participants_ceiling: u32,
    /// Whether a slot may be created for the current day.
    pub allow_today: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_participants_ceiling: DEFAULT_MAX_PARTICIPANTS,
            allow_today: false,
        }
    }
}

/// Validates and normalizes an appointment form against `today`.
pub fn validate_form(
    form: &AppointmentForm,
    today: NaiveDate,
    config: &LifecycleConfig,
) -> MinyResult<AppointmentSpec> {
    let mut errors = FieldErrors::new();

    let dates = validate_dates(&form.dates, today, config.allow_today, &mut errors);
    let time = validate_time(form, &mut errors);
    let kind = validate_kind(form, config, &mut errors);
    let note = normalize_text(form.note.as_deref());

    errors.into_result()?;

    // Every branch above records an error whenever it yields None.
    match (time, kind) {
        (Some(time), Some(kind)) => Ok(AppointmentSpec {
            dates,
            time,
            kind,
            note,
            is_video_call: form.is_video_call,
        }),
        _ => Err(MinyError::validation(
            "form",
            "Incomplete appointment data",
        )),
    }
}

/// Trims a claimant name, rejecting empty input.
pub fn validate_claimant_name(name: &str) -> MinyResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(MinyError::validation(
            "name",
            "Please enter your name",
        ));
    }
    if exceeds_text_limit(trimmed) {
        return Err(MinyError::validation("name", too_long_message()));
    }
    Ok(trimmed.to_string())
}

pub fn exceeds_text_limit(value: &str) -> bool {
    value.chars().count() > MAX_TEXT_LENGTH
}

pub fn too_long_message() -> String {
    format!("Must not be longer than {} characters", MAX_TEXT_LENGTH)
}

/// Parses a strict `HH:MM` clock time between 00:00 and 23:59.
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    if !bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 2 || b.is_ascii_digit())
    {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

pub fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn validate_dates(
    raw: &[String],
    today: NaiveDate,
    allow_today: bool,
    errors: &mut FieldErrors,
) -> Vec<NaiveDate> {
    if raw.is_empty() {
        errors.push("date", "Select at least one date");
        return Vec::new();
    }

    let mut dates = BTreeSet::new();
    for value in raw {
        let Ok(date) = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") else {
            errors.push("date", format!("'{}' is not a valid date", value));
            continue;
        };
        let in_past = if allow_today {
            date < today
        } else {
            date <= today
        };
        if in_past {
            errors.push("date", format!("{} is not in the future", date));
            continue;
        }
        dates.insert(date);
    }
    dates.into_iter().collect()
}

fn validate_time(form: &AppointmentForm, errors: &mut FieldErrors) -> Option<SlotTime> {
    if form.is_flexible {
        let description = form.start_time.trim();
        if description.is_empty() {
            errors.push("start_time", "Describe when the appointment takes place");
            return None;
        }
        if exceeds_text_limit(description) {
            errors.push("start_time", too_long_message());
            return None;
        }
        return Some(SlotTime::Flexible {
            description: description.to_string(),
        });
    }

    let start_raw = form.start_time.trim();
    if start_raw.is_empty() {
        errors.push("start_time", "Start time is required");
        return None;
    }
    let Some(start) = parse_clock_time(start_raw) else {
        errors.push("start_time", "Start time must be HH:MM");
        return None;
    };

    let end = match normalize_text(form.end_time.as_deref()) {
        None => None,
        Some(raw) => match parse_clock_time(&raw) {
            None => {
                errors.push("end_time", "End time must be HH:MM");
                return None;
            }
            Some(end) if end < start => {
                errors.push("end_time", "End time must not be before start time");
                return None;
            }
            Some(end) => Some(end),
        },
    };

    Some(SlotTime::Fixed { start, end })
}

fn validate_kind(
    form: &AppointmentForm,
    config: &LifecycleConfig,
    errors: &mut FieldErrors,
) -> Option<AppointmentKind> {
    let partner_name = normalize_text(form.partner_name.as_deref());

    if partner_name.as_deref().is_some_and(exceeds_text_limit) {
        errors.push("partner_name", too_long_message());
        return None;
    }

    if !form.is_group_date {
        return Some(AppointmentKind::Single { partner_name });
    }

    if partner_name.is_some() {
        errors.push(
            "partner_name",
            "A partner cannot be assigned to a group appointment",
        );
    }

    let ceiling = i64::from(config.max_participants_ceiling);
    match form.max_participants {
        None => {
            errors.push("max_participants", "Maximum participants is required");
            None
        }
        Some(max) if max < MIN_PARTICIPANTS || max > ceiling => {
            errors.push(
                "max_participants",
                format!(
                    "Maximum participants must be between {} and {}",
                    MIN_PARTICIPANTS, ceiling
                ),
            );
            None
        }
        Some(max) => u32::try_from(max)
            .ok()
            .map(|max_participants| AppointmentKind::Group { max_participants }),
    }
}
