pub mod auth;
pub mod clients;
pub mod missions;
pub mod notifications;
pub mod payments;
pub mod ratings;
pub mod workers;
