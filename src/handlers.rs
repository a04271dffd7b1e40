pub mod analytics;
pub mod auth;
pub mod bookings;
pub mod clients;
pub mod coupons;
pub mod events;
pub mod notifications;
