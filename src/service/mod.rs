pub mod auth_service;
pub mod error;
pub mod mission_service;
pub mod notification_service;
pub mod payment_service;
pub mod rating_service;
pub mod subscription_service;
