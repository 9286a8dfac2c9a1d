pub mod admin;
pub mod bookings;
pub mod catalog;
pub mod dev;
pub mod health;
