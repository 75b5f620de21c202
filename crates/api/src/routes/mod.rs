pub mod account;
pub mod appointments;
pub mod calendar;
pub mod health;
pub mod public;
