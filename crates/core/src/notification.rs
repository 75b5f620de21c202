//! # Claim Notifications
//!
//! The lifecycle engine emits one [`ClaimNotification`] per successful claim.
//! The payload carries everything a mailer needs, so a [`Notifier`] never has
//! to go back to the store.

use async_trait::async_trait;
use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::models::{
    appointment::{Appointment, SlotTime},
    user::User,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimNotification {
    pub recipient_email: String,
    pub recipient_name: String,
    pub partner_name: String,
    pub is_group_date: bool,
    pub date_label: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub note: Option<String>,
    pub message: Option<String>,
    pub current_count: Option<u32>,
    pub max_participants: Option<u32>,
}

impl ClaimNotification {
    /// Builds the payload for a claim on `appointment` owned by `owner`.
    pub fn for_claim(
        owner: &User,
        appointment: &Appointment,
        partner_name: &str,
        message: Option<String>,
        group_counts: Option<(u32, u32)>,
    ) -> Self {
        let (start_time, end_time) = match &appointment.time {
            SlotTime::Fixed { start, end } => (
                start.format("%H:%M").to_string(),
                end.map(|e| e.format("%H:%M").to_string()),
            ),
            SlotTime::Flexible { description } => {
                (description.clone(), None)
            }
        };

        Self {
            recipient_email: owner.email.clone(),
            recipient_name: owner.name.clone(),
            partner_name: partner_name.to_string(),
            is_group_date: appointment.kind.is_group(),
            date_label: appointment.date_label(),
            start_time,
            end_time,
            note: appointment.note.clone(),
            message,
            current_count: group_counts.map(|(count, _)| count),
            max_participants: group_counts.map(|(_, max)| max),
        }
    }

    pub fn time_label(&self) -> String {
        match &self.end_time {
            Some(end) => format!("{} - {}", self.start_time, end),
            None => self.start_time.clone(),
        }
    }

    pub fn subject(&self) -> String {
        if self.is_group_date {
            format!(
                "{} joined your group appointment on {}",
                self.partner_name, self.date_label
            )
        } else {
            format!(
                "{} booked your appointment on {}",
                self.partner_name, self.date_label
            )
        }
    }

    pub fn text_body(&self) -> String {
        let mut body = format!("Hello {},\n\n", self.recipient_name);
        if self.is_group_date {
            body.push_str(&format!(
                "{} joined your group appointment on {} ({}).\n",
                self.partner_name,
                self.date_label,
                self.time_label()
            ));
            if let (Some(count), Some(max)) = (self.current_count, self.max_participants) {
                body.push_str(&format!("{} of {} seats are now taken.\n", count, max));
            }
        } else {
            body.push_str(&format!(
                "{} booked your appointment on {} ({}).\n",
                self.partner_name,
                self.date_label,
                self.time_label()
            ));
        }
        if let Some(note) = &self.note {
            body.push_str(&format!("\nNote: {}\n", note));
        }
        if let Some(message) = &self.message {
            body.push_str(&format!("\nMessage from {}:\n{}\n", self.partner_name, message));
        }
        body
    }

    pub fn html_body(&self) -> String {
        let mut html = format!("<p>Hello {},</p>", escape_html(&self.recipient_name));
        let action = if self.is_group_date {
            "joined your group appointment"
        } else {
            "booked your appointment"
        };
        html.push_str(&format!(
            "<p><strong>{}</strong> {} on {} ({}).</p>",
            escape_html(&self.partner_name),
            action,
            escape_html(&self.date_label),
            escape_html(&self.time_label())
        ));
        if let (Some(count), Some(max)) = (self.current_count, self.max_participants) {
            html.push_str(&format!("<p>{} of {} seats are now taken.</p>", count, max));
        }
        if let Some(note) = &self.note {
            html.push_str(&format!("<p>Note: {}</p>", escape_html(note)));
        }
        if let Some(message) = &self.message {
            html.push_str(&format!("<blockquote>{}</blockquote>", escape_html(message)));
        }
        html
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Delivery port for claim notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_claim(&self, notification: &ClaimNotification) -> Result<()>;
}
