use thiserror::Error;
use uuid::Uuid;
use axum::http::StatusCode;

use crate::{
    error::{ErrorMessage, HttpError},
    models::{
        accountmodel::PartyRole,
        missionmodel::{AssignmentStatus, MissionStatus},
        paymentmodel::PaymentStatus,
    },
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Mission {0} not found")]
    MissionNotFound(Uuid),

    #[error("No assignment found for mission {0}")]
    AssignmentNotFound(Uuid),

    #[error("Payment {0} not found")]
    PaymentNotFound(Uuid),

    #[error("Notification {0} not found")]
    NotificationNotFound(Uuid),

    #[error("User {0} not found")]
    UserNotFound(Uuid),

    #[error("Mission {0} is {1:?} and cannot move to {2:?}")]
    InvalidMissionStatus(Uuid, MissionStatus, MissionStatus),

    #[error("Mission {0} is already assigned")]
    MissionAlreadyAssigned(Uuid),

    #[error("Assignment for mission {0} is {1:?} and cannot move to {2:?}")]
    InvalidAssignmentStatus(Uuid, AssignmentStatus, AssignmentStatus),

    #[error("Payment {0} cannot move from {1:?} to {2:?}")]
    InvalidPaymentTransition(Uuid, PaymentStatus, PaymentStatus),

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("An active subscription already exists")]
    SubscriptionAlreadyActive,

    #[error("Only {} accounts can perform this action", .0.to_str())]
    RoleRequired(PartyRole),

    #[error("Mission {1} is not assigned to worker {0}")]
    NotAssignee(Uuid, Uuid),

    #[error("Client {0} does not own mission {1}")]
    NotMissionOwner(Uuid, Uuid),

    #[error("Account {0} is not a party to payment {1}")]
    NotPaymentOwner(Uuid, Uuid),

    #[error("Notification {1} does not belong to {0}")]
    NotNotificationOwner(Uuid, Uuid),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::MissionNotFound(_)
            | ServiceError::AssignmentNotFound(_)
            | ServiceError::PaymentNotFound(_)
            | ServiceError::NotificationNotFound(_)
            | ServiceError::UserNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::InvalidMissionStatus(..)
            | ServiceError::MissionAlreadyAssigned(_)
            | ServiceError::InvalidAssignmentStatus(..)
            | ServiceError::InvalidPaymentTransition(..)
            | ServiceError::EmailAlreadyRegistered
            | ServiceError::SubscriptionAlreadyActive
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::RoleRequired(_)
            | ServiceError::NotAssignee(..)
            | ServiceError::NotMissionOwner(..)
            | ServiceError::NotPaymentOwner(..)
            | ServiceError::NotNotificationOwner(..) => StatusCode::FORBIDDEN,

            ServiceError::Unauthenticated | ServiceError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }

            ServiceError::Database(_) | ServiceError::Hashing(_) | ServiceError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Conflicts: the request was well-formed but the entity's current state
    /// does not allow it.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidMissionStatus(..)
                | ServiceError::MissionAlreadyAssigned(_)
                | ServiceError::InvalidAssignmentStatus(..)
                | ServiceError::InvalidPaymentTransition(..)
                | ServiceError::EmailAlreadyRegistered
                | ServiceError::SubscriptionAlreadyActive
        )
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();

        if status.is_server_error() {
            tracing::error!("internal error: {}", error);
            return HttpError::server_error(ErrorMessage::ServerError.to_string());
        }

        if error.is_conflict() {
            tracing::debug!("conflict: {}", error);
        }

        let message = match &error {
            ServiceError::InvalidCredentials => ErrorMessage::WrongCredentials.to_string(),
            ServiceError::Unauthenticated => ErrorMessage::UserNotAuthenticated.to_string(),
            ServiceError::EmailAlreadyRegistered => ErrorMessage::EmailExist.to_string(),
            _ => error.to_string(),
        };

        HttpError::new(message, status)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::Validation(errors.to_string())
    }
}

impl From<ErrorMessage> for ServiceError {
    fn from(message: ErrorMessage) -> Self {
        match message {
            ErrorMessage::EmptyPassword | ErrorMessage::ExceededMaxPasswordLength(_) => {
                ServiceError::Validation(message.to_string())
            }
            other => ServiceError::Hashing(other.to_string()),
        }
    }
}
