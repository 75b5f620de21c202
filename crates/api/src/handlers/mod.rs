pub mod account;
pub mod appointments;
pub mod calendar;
pub mod public;
