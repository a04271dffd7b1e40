pub mod analytics;
pub mod auth;
pub mod booking;
pub mod calendar;
pub mod coupon;
pub mod notification;
pub mod period;
pub mod user;
