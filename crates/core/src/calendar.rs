//! # Calendar Export
//!
//! Maps appointments to calendar events and renders them as an iCalendar
//! (RFC 5545) feed. Times are written as floating local times, matching how
//! owners enter them; `DTSTAMP` is the UTC time of the last change. Content
//! lines are folded at 75 octets.

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::models::{
    appointment::{Appointment, AppointmentKind, SlotTime},
    participant::Participant,
};

#[derive(Debug, Clone)]
pub struct CalendarConfig {
    /// Start hour for flexible slots described as morning.
    pub morning_hour: u32,
    /// Start hour for flexible slots described as afternoon.
    pub afternoon_hour: u32,
    /// Start hour for any other flexible slot.
    pub default_hour: u32,
    pub default_duration: Duration,
    pub alarm_before: Duration,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            morning_hour: 9,
            afternoon_hour: 14,
            default_hour: 10,
            default_duration: Duration::hours(2),
            alarm_before: Duration::minutes(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: Uuid,
    /// Last modification of the appointment, written as `DTSTAMP`.
    pub stamp: DateTime<Utc>,
    pub start: NaiveDateTime,
    pub duration: Duration,
    pub title: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub alarm_before: Duration,
}

pub fn calendar_event(
    appointment: &Appointment,
    participants: &[Participant],
    config: &CalendarConfig,
) -> CalendarEvent {
    let (start_time, duration) = match &appointment.time {
        SlotTime::Fixed { start, end } => {
            let duration = end
                .map(|end| end - *start)
                .filter(|d| *d > Duration::zero())
                .unwrap_or(config.default_duration);
            (*start, duration)
        }
        SlotTime::Flexible { description } => {
            let hour = flexible_start_hour(description, config);
            (
                NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN),
                config.default_duration,
            )
        }
    };

    let mut description = appointment.note.clone();
    if let SlotTime::Flexible { description: text } = &appointment.time {
        description = Some(match description {
            Some(note) => format!("{}\n{}", text, note),
            None => text.clone(),
        });
    }
    if appointment.kind.is_group() && !participants.is_empty() {
        let names: Vec<&str> = participants.iter().map(|p| p.name.as_str()).collect();
        let line = format!("Participants: {}", names.join(", "));
        description = Some(match description {
            Some(existing) => format!("{}\n{}", existing, line),
            None => line,
        });
    }

    CalendarEvent {
        uid: appointment.id,
        stamp: appointment.updated_at,
        start: appointment.date.and_time(start_time),
        duration,
        title: event_title(appointment),
        location: appointment
            .is_video_call
            .then(|| "Video call".to_string()),
        description,
        alarm_before: config.alarm_before,
    }
}

pub fn event_title(appointment: &Appointment) -> String {
    match &appointment.kind {
        AppointmentKind::Group { .. } => "Group duty".to_string(),
        AppointmentKind::Single {
            partner_name: Some(partner),
        } if appointment.is_assigned => format!("Duty with {}", partner),
        AppointmentKind::Single { .. } => "Open".to_string(),
    }
}

fn flexible_start_hour(description: &str, config: &CalendarConfig) -> u32 {
    let lower = description.to_lowercase();
    if lower.contains("afternoon") || lower.contains("nachmittag") {
        config.afternoon_hour
    } else if lower.contains("morning") || lower.contains("vormittag") {
        config.morning_hour
    } else {
        config.default_hour
    }
}

/// Renders events as a complete VCALENDAR document with CRLF line endings.
pub fn render_ics(calendar_name: &str, events: &[CalendarEvent]) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//miny//appointments//EN".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        format!("X-WR-CALNAME:{}", escape_text(calendar_name)),
    ];

    for event in events {
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}@miny", event.uid));
        lines.push(format!("DTSTAMP:{}", event.stamp.format("%Y%m%dT%H%M%SZ")));
        lines.push(format!("DTSTART:{}", event.start.format("%Y%m%dT%H%M%S")));
        lines.push(format!("DURATION:{}", format_duration(event.duration)));
        lines.push(format!("SUMMARY:{}", escape_text(&event.title)));
        if let Some(location) = &event.location {
            lines.push(format!("LOCATION:{}", escape_text(location)));
        }
        if let Some(description) = &event.description {
            lines.push(format!("DESCRIPTION:{}", escape_text(description)));
        }
        lines.push("BEGIN:VALARM".to_string());
        lines.push("ACTION:DISPLAY".to_string());
        lines.push(format!("DESCRIPTION:{}", escape_text(&event.title)));
        lines.push(format!("TRIGGER:-{}", format_duration(event.alarm_before)));
        lines.push("END:VALARM".to_string());
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());

    let mut out = String::new();
    for line in &lines {
        out.push_str(&fold_line(line));
        out.push_str("\r\n");
    }
    out
}

const MAX_LINE_OCTETS: usize = 75;

/// Splits a content line into CRLF + space continuations of at most 75
/// octets each, never inside a UTF-8 sequence.
fn fold_line(line: &str) -> String {
    let mut folded = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    // Continuation lines carry a leading space that counts against the limit.
    let mut width = 0;
    for ch in line.chars() {
        let len = ch.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            folded.push_str("\r\n ");
            width = 1;
        }
        folded.push(ch);
        width += len;
    }
    folded
}

/// Formats a positive duration as `PT#H#M`.
fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    match (hours, minutes) {
        (0, m) => format!("PT{}M", m),
        (h, 0) => format!("PT{}H", h),
        (h, m) => format!("PT{}H{}M", h, m),
    }
}

fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
}
