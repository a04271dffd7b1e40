pub mod booking_repo;
pub use booking_repo::BookingRepository;
pub mod coupon_repo;
pub use coupon_repo::CouponRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
