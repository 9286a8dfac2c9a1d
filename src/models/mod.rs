pub mod activity;
pub mod booking;
pub mod customer;
pub mod sensitive;

pub use activity::Activity;
pub use booking::{Booking, BookingStatus};
pub use customer::Customer;
pub use sensitive::SensitivePayload;
