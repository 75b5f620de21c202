pub mod appointment;
pub mod participant;
pub mod user;
