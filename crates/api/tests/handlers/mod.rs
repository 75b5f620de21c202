mod account_test;
mod appointments_test;
mod calendar_test;
mod health_test;
mod middleware_test;
mod public_test;
