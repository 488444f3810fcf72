// service/mission_service.rs
use std::sync::Arc;

use sqlx::types::BigDecimal;
use uuid::Uuid;

use crate::{
    db::{
        db::DBClient,
        missiondb::{
            AssignedMission, CancelledMission, CompletedMission, MissionExt, NewMission,
            TransitionOutcome,
        },
    },
    dtos::missiondtos::CreateMissionDto,
    models::{accountmodel::CLIENT_FALLBACK_NAME, missionmodel::*},
    service::{error::ServiceError, notification_service::NotificationService},
    utils::currency::{amount_from_f64, is_positive_amount},
};

/// What a guarded transition was trying to do, used to turn a rejected
/// outcome into the matching error.
#[derive(Debug, Clone, Copy)]
struct Transition {
    mission_id: Uuid,
    actor_id: Uuid,
    mission_target: MissionStatus,
    assignment_target: AssignmentStatus,
}

impl Transition {
    fn resolve<T>(self, outcome: TransitionOutcome<T>) -> Result<T, ServiceError> {
        let error = match outcome {
            TransitionOutcome::Applied(value) => return Ok(value),
            TransitionOutcome::MissionNotFound => ServiceError::MissionNotFound(self.mission_id),
            TransitionOutcome::AssignmentNotFound => ServiceError::AssignmentNotFound(self.mission_id),
            TransitionOutcome::NotAssignee(assignee) => {
                tracing::debug!("mission {} is assigned to worker {}", self.mission_id, assignee);
                ServiceError::NotAssignee(self.actor_id, self.mission_id)
            }
            TransitionOutcome::NotOwner => ServiceError::NotMissionOwner(self.actor_id, self.mission_id),
            TransitionOutcome::AlreadyAssigned => ServiceError::MissionAlreadyAssigned(self.mission_id),
            TransitionOutcome::MissionConflict(current) => {
                ServiceError::InvalidMissionStatus(self.mission_id, current, self.mission_target)
            }
            TransitionOutcome::AssignmentConflict(current) => {
                ServiceError::InvalidAssignmentStatus(self.mission_id, current, self.assignment_target)
            }
        };

        tracing::warn!(
            "rejected {} transition on mission {} by {}: {}",
            self.mission_target.to_str(),
            self.mission_id,
            self.actor_id,
            error
        );

        Err(error)
    }
}

#[derive(Debug, Clone)]
pub struct MissionService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
    platform_fee_rate: BigDecimal,
    payment_provider: String,
}

impl MissionService {
    pub fn new(
        db_client: Arc<DBClient>,
        notification_service: Arc<NotificationService>,
        platform_fee_rate: BigDecimal,
        payment_provider: String,
    ) -> Self {
        Self {
            db_client,
            notification_service,
            platform_fee_rate,
            payment_provider,
        }
    }

    pub async fn create_mission(
        &self,
        client_id: Uuid,
        body: CreateMissionDto,
    ) -> Result<Mission, ServiceError> {
        let price = amount_from_f64(body.price).map_err(ServiceError::Validation)?;
        if !is_positive_amount(&price) {
            return Err(ServiceError::Validation("Price must be greater than zero".to_string()));
        }

        let mission = self
            .db_client
            .create_mission(NewMission {
                client_id,
                title: body.title.trim(),
                description: body.description.trim(),
                category: body.category,
                estimated_duration: body.estimated_duration.trim(),
                price: &price,
                location: body.location.as_deref().map(str::trim).filter(|l| !l.is_empty()),
                location_lat: body.location_lat,
                location_lng: body.location_lng,
                is_remote: body.is_remote,
                required_skills: &body.required_skills,
            })
            .await?;

        tracing::info!(
            "mission {} created by client {} ({}, {})",
            mission.id,
            client_id,
            mission.category.to_str(),
            mission.price
        );

        Ok(mission)
    }

    pub async fn list_missions(
        &self,
        filter: &MissionFilter,
    ) -> Result<Vec<MissionWithClient>, ServiceError> {
        Ok(self
            .db_client
            .list_missions(filter, CLIENT_FALLBACK_NAME)
            .await?)
    }

    pub async fn get_mission_detail(&self, mission_id: Uuid) -> Result<MissionDetail, ServiceError> {
        let listing = self
            .db_client
            .get_mission_with_client(mission_id, CLIENT_FALLBACK_NAME)
            .await?
            .ok_or(ServiceError::MissionNotFound(mission_id))?;

        let assignment = self.db_client.get_assignment_by_mission(mission_id).await?;

        Ok(MissionDetail { listing, assignment })
    }

    pub async fn missions_for_client(&self, client_id: Uuid) -> Result<Vec<Mission>, ServiceError> {
        Ok(self.db_client.get_missions_by_client(client_id).await?)
    }

    pub async fn assignments_for_worker(
        &self,
        worker_id: Uuid,
    ) -> Result<Vec<AssignmentWithMission>, ServiceError> {
        Ok(self.db_client.get_assignments_by_worker(worker_id).await?)
    }

    pub async fn accept_mission(
        &self,
        mission_id: Uuid,
        worker_id: Uuid,
    ) -> Result<MissionAssignment, ServiceError> {
        let outcome = self.db_client.accept_mission(mission_id, worker_id).await?;
        let accepted = Transition {
            mission_id,
            actor_id: worker_id,
            mission_target: MissionStatus::Assigned,
            assignment_target: AssignmentStatus::Assigned,
        }
        .resolve(outcome)?;

        tracing::info!("mission {} assigned to worker {}", mission_id, worker_id);

        self.notification_service.notify_mission_accepted(&accepted).await;

        Ok(accepted.assignment)
    }

    pub async fn start_mission(
        &self,
        mission_id: Uuid,
        worker_id: Uuid,
    ) -> Result<AssignedMission, ServiceError> {
        let outcome = self.db_client.start_mission(mission_id, worker_id).await?;
        let started = Transition {
            mission_id,
            actor_id: worker_id,
            mission_target: MissionStatus::InProgress,
            assignment_target: AssignmentStatus::InProgress,
        }
        .resolve(outcome)?;

        tracing::info!("mission {} started by worker {}", mission_id, worker_id);

        self.notification_service.notify_mission_started(&started).await;

        Ok(started)
    }

    pub async fn complete_mission(
        &self,
        mission_id: Uuid,
        worker_id: Uuid,
    ) -> Result<CompletedMission, ServiceError> {
        let outcome = self
            .db_client
            .complete_mission(mission_id, worker_id, &self.platform_fee_rate, &self.payment_provider)
            .await?;
        let completed = Transition {
            mission_id,
            actor_id: worker_id,
            mission_target: MissionStatus::Completed,
            assignment_target: AssignmentStatus::Completed,
        }
        .resolve(outcome)?;

        tracing::info!(
            "mission {} completed by worker {}, payment {} pending ({} to worker, {} fee)",
            mission_id,
            worker_id,
            completed.payment.id,
            completed.payment.amount_to_worker,
            completed.payment.platform_fee
        );

        self.notification_service.notify_mission_completed(&completed).await;

        Ok(completed)
    }

    pub async fn cancel_mission(
        &self,
        mission_id: Uuid,
        client_id: Uuid,
    ) -> Result<CancelledMission, ServiceError> {
        let outcome = self.db_client.cancel_mission(mission_id, client_id).await?;
        let cancelled = Transition {
            mission_id,
            actor_id: client_id,
            mission_target: MissionStatus::Cancelled,
            assignment_target: AssignmentStatus::Cancelled,
        }
        .resolve(outcome)?;

        tracing::info!("mission {} cancelled by client {}", mission_id, client_id);

        self.notification_service.notify_mission_cancelled(&cancelled).await;

        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(mission_id: Uuid, actor_id: Uuid) -> Transition {
        Transition {
            mission_id,
            actor_id,
            mission_target: MissionStatus::Completed,
            assignment_target: AssignmentStatus::Completed,
        }
    }

    #[test]
    fn applied_outcome_passes_value_through() {
        let t = transition(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(t.resolve(TransitionOutcome::Applied(7)).unwrap(), 7);
    }

    #[test]
    fn rejections_map_to_the_error_taxonomy() {
        let mission_id = Uuid::new_v4();
        let worker_id = Uuid::new_v4();
        let t = transition(mission_id, worker_id);

        assert!(matches!(
            t.resolve::<()>(TransitionOutcome::MissionNotFound),
            Err(ServiceError::MissionNotFound(id)) if id == mission_id
        ));
        assert!(matches!(
            t.resolve::<()>(TransitionOutcome::AssignmentNotFound),
            Err(ServiceError::AssignmentNotFound(_))
        ));
        assert!(matches!(
            t.resolve::<()>(TransitionOutcome::NotAssignee(Uuid::new_v4())),
            Err(ServiceError::NotAssignee(w, m)) if w == worker_id && m == mission_id
        ));
        assert!(matches!(
            t.resolve::<()>(TransitionOutcome::AlreadyAssigned),
            Err(ServiceError::MissionAlreadyAssigned(_))
        ));
        assert!(matches!(
            t.resolve::<()>(TransitionOutcome::MissionConflict(MissionStatus::Open)),
            Err(ServiceError::InvalidMissionStatus(_, MissionStatus::Open, MissionStatus::Completed))
        ));
        assert!(matches!(
            t.resolve::<()>(TransitionOutcome::AssignmentConflict(AssignmentStatus::Completed)),
            Err(ServiceError::InvalidAssignmentStatus(_, AssignmentStatus::Completed, AssignmentStatus::Completed))
        ));
    }

    #[test]
    fn owner_rejection_is_forbidden() {
        let err = transition(Uuid::new_v4(), Uuid::new_v4())
            .resolve::<()>(TransitionOutcome::NotOwner)
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }
}
