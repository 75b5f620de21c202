//! # Miny Core
//!
//! Domain types and business rules for the Miny appointment service:
//! owners publish time slots, visitors claim them through a share link.
//!
//! The [`lifecycle`] engine is the only place that decides whether a slot
//! may be claimed, edited or removed. Persistence and delivery are reached
//! through the ports in [`store`] and [`notification`].

pub mod calendar;
pub mod clock;
pub mod errors;
pub mod lifecycle;
pub mod mock;
pub mod models;
pub mod notification;
pub mod slug;
pub mod store;
pub mod validation;
