pub mod analytics;
pub mod auth;
pub mod booking_service;
pub mod calendar;
pub mod catalog;
pub mod coupon_service;
pub mod invalidation;
pub mod notification_service;
pub mod report_service;
pub mod reports;
