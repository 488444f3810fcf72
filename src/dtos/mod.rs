pub mod missiondtos;
pub mod paymentdtos;
pub mod ratingdtos;
pub mod subscriptiondtos;
pub mod userdtos;
