pub mod accountmodel;
pub mod missionmodel;
pub mod notificationmodel;
pub mod paymentmodel;
pub mod ratingmodel;
pub mod sessionmodel;
pub mod subscriptionmodels;
