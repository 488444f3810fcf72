// db/missiondb.rs
use async_trait::async_trait;
use sqlx::types::BigDecimal;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::db::DBClient;
use super::is_unique_violation;
use crate::models::{
    missionmodel::*,
    paymentmodel::{Payment, PaymentSplit},
};

const MISSION_WITH_CLIENT_SELECT: &str = r#"
    SELECT m.*,
           COALESCE(NULLIF(BTRIM(c.company_name), ''), $1) AS client_name,
           c.email AS client_email,
           c.photo_url AS client_photo_url
    FROM missions m
    JOIN clients c ON c.id = m.client_id
"#;

pub struct NewMission<'a> {
    pub client_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub category: MissionCategory,
    pub estimated_duration: &'a str,
    pub price: &'a BigDecimal,
    pub location: Option<&'a str>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub is_remote: bool,
    pub required_skills: &'a [String],
}

/// Result of a guarded lifecycle write. Anything other than `Applied` means
/// the transaction was rolled back and nothing changed.
#[derive(Debug)]
pub enum TransitionOutcome<T> {
    Applied(T),
    MissionNotFound,
    AssignmentNotFound,
    /// Carries the worker the mission is actually assigned to.
    NotAssignee(Uuid),
    NotOwner,
    MissionConflict(MissionStatus),
    AlreadyAssigned,
    AssignmentConflict(AssignmentStatus),
}

#[derive(Debug, Clone)]
pub struct AssignedMission {
    pub mission: Mission,
    pub assignment: MissionAssignment,
}

#[derive(Debug, Clone)]
pub struct CompletedMission {
    pub mission: Mission,
    pub assignment: MissionAssignment,
    pub payment: Payment,
}

#[derive(Debug, Clone)]
pub struct CancelledMission {
    pub mission: Mission,
    pub assignment: Option<MissionAssignment>,
}

#[async_trait]
pub trait MissionExt {
    async fn create_mission(&self, mission: NewMission<'_>) -> Result<Mission, sqlx::Error>;

    async fn get_mission(&self, mission_id: Uuid) -> Result<Option<Mission>, sqlx::Error>;

    async fn get_mission_with_client(
        &self,
        mission_id: Uuid,
        fallback_client_name: &str,
    ) -> Result<Option<MissionWithClient>, sqlx::Error>;

    async fn list_missions(
        &self,
        filter: &MissionFilter,
        fallback_client_name: &str,
    ) -> Result<Vec<MissionWithClient>, sqlx::Error>;

    async fn get_missions_by_client(&self, client_id: Uuid) -> Result<Vec<Mission>, sqlx::Error>;

    async fn get_assignment_by_mission(
        &self,
        mission_id: Uuid,
    ) -> Result<Option<MissionAssignment>, sqlx::Error>;

    async fn get_assignments_by_worker(
        &self,
        worker_id: Uuid,
    ) -> Result<Vec<AssignmentWithMission>, sqlx::Error>;

    async fn accept_mission(
        &self,
        mission_id: Uuid,
        worker_id: Uuid,
    ) -> Result<TransitionOutcome<AssignedMission>, sqlx::Error>;

    async fn start_mission(
        &self,
        mission_id: Uuid,
        worker_id: Uuid,
    ) -> Result<TransitionOutcome<AssignedMission>, sqlx::Error>;

    async fn complete_mission(
        &self,
        mission_id: Uuid,
        worker_id: Uuid,
        fee_rate: &BigDecimal,
        payment_provider: &str,
    ) -> Result<TransitionOutcome<CompletedMission>, sqlx::Error>;

    async fn cancel_mission(
        &self,
        mission_id: Uuid,
        client_id: Uuid,
    ) -> Result<TransitionOutcome<CancelledMission>, sqlx::Error>;
}

async fn lock_mission(
    tx: &mut Transaction<'_, Postgres>,
    mission_id: Uuid,
) -> Result<Option<Mission>, sqlx::Error> {
    sqlx::query_as::<_, Mission>("SELECT * FROM missions WHERE id = $1 FOR UPDATE")
        .bind(mission_id)
        .fetch_optional(&mut **tx)
        .await
}

async fn lock_assignment(
    tx: &mut Transaction<'_, Postgres>,
    mission_id: Uuid,
) -> Result<Option<MissionAssignment>, sqlx::Error> {
    sqlx::query_as::<_, MissionAssignment>(
        "SELECT * FROM mission_assignments WHERE mission_id = $1 FOR UPDATE",
    )
    .bind(mission_id)
    .fetch_optional(&mut **tx)
    .await
}

async fn set_mission_status(
    tx: &mut Transaction<'_, Postgres>,
    mission_id: Uuid,
    status: MissionStatus,
) -> Result<Mission, sqlx::Error> {
    sqlx::query_as::<_, Mission>("UPDATE missions SET status = $2 WHERE id = $1 RETURNING *")
        .bind(mission_id)
        .bind(status)
        .fetch_one(&mut **tx)
        .await
}

/// Locks the mission, then its assignment, and checks both may move to
/// `target`. Lock order is always mission before assignment.
async fn lock_for_worker_transition<T>(
    tx: &mut Transaction<'_, Postgres>,
    mission_id: Uuid,
    worker_id: Uuid,
    target: AssignmentStatus,
) -> Result<Result<(Mission, MissionAssignment), TransitionOutcome<T>>, sqlx::Error> {
    let Some(mission) = lock_mission(tx, mission_id).await? else {
        return Ok(Err(TransitionOutcome::MissionNotFound));
    };

    let Some(assignment) = lock_assignment(tx, mission_id).await? else {
        return Ok(Err(TransitionOutcome::AssignmentNotFound));
    };

    if assignment.worker_id != worker_id {
        return Ok(Err(TransitionOutcome::NotAssignee(assignment.worker_id)));
    }

    if !assignment.status.can_transition_to(target) {
        return Ok(Err(TransitionOutcome::AssignmentConflict(assignment.status)));
    }

    if let Some(next) = target.mission_status() {
        if !mission.status.can_transition_to(next) {
            return Ok(Err(TransitionOutcome::MissionConflict(mission.status)));
        }
    }

    Ok(Ok((mission, assignment)))
}

#[async_trait]
impl MissionExt for DBClient {
    async fn create_mission(&self, mission: NewMission<'_>) -> Result<Mission, sqlx::Error> {
        sqlx::query_as::<_, Mission>(
            r#"
            INSERT INTO missions
            (client_id, title, description, category, estimated_duration, price,
             location, location_lat, location_lng, is_remote, required_skills, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'open'::mission_status)
            RETURNING *
            "#,
        )
        .bind(mission.client_id)
        .bind(mission.title)
        .bind(mission.description)
        .bind(mission.category)
        .bind(mission.estimated_duration)
        .bind(mission.price)
        .bind(mission.location)
        .bind(mission.location_lat)
        .bind(mission.location_lng)
        .bind(mission.is_remote)
        .bind(mission.required_skills)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_mission(&self, mission_id: Uuid) -> Result<Option<Mission>, sqlx::Error> {
        sqlx::query_as::<_, Mission>("SELECT * FROM missions WHERE id = $1")
            .bind(mission_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_mission_with_client(
        &self,
        mission_id: Uuid,
        fallback_client_name: &str,
    ) -> Result<Option<MissionWithClient>, sqlx::Error> {
        let sql = format!("{} WHERE m.id = $2", MISSION_WITH_CLIENT_SELECT);

        let row = sqlx::query_as::<_, MissionClientRow>(&sql)
            .bind(fallback_client_name)
            .bind(mission_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(MissionWithClient::from))
    }

    async fn list_missions(
        &self,
        filter: &MissionFilter,
        fallback_client_name: &str,
    ) -> Result<Vec<MissionWithClient>, sqlx::Error> {
        let sql = format!(
            r#"{}
            WHERE ($2::mission_status IS NULL OR m.status = $2)
              AND ($3::mission_category IS NULL OR m.category = $3)
            ORDER BY m.created_at DESC, m.id DESC
            "#,
            MISSION_WITH_CLIENT_SELECT
        );

        let rows = sqlx::query_as::<_, MissionClientRow>(&sql)
            .bind(fallback_client_name)
            .bind(filter.status)
            .bind(filter.category)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(MissionWithClient::from).collect())
    }

    async fn get_missions_by_client(&self, client_id: Uuid) -> Result<Vec<Mission>, sqlx::Error> {
        sqlx::query_as::<_, Mission>(
            "SELECT * FROM missions WHERE client_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_assignment_by_mission(
        &self,
        mission_id: Uuid,
    ) -> Result<Option<MissionAssignment>, sqlx::Error> {
        sqlx::query_as::<_, MissionAssignment>(
            "SELECT * FROM mission_assignments WHERE mission_id = $1",
        )
        .bind(mission_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_assignments_by_worker(
        &self,
        worker_id: Uuid,
    ) -> Result<Vec<AssignmentWithMission>, sqlx::Error> {
        let assignments = sqlx::query_as::<_, MissionAssignment>(
            r#"
            SELECT * FROM mission_assignments
            WHERE worker_id = $1
            ORDER BY assigned_at DESC, id DESC
            "#,
        )
        .bind(worker_id)
        .fetch_all(&self.pool)
        .await?;

        if assignments.is_empty() {
            return Ok(vec![]);
        }

        let mission_ids: Vec<Uuid> = assignments.iter().map(|a| a.mission_id).collect();
        let missions = sqlx::query_as::<_, Mission>("SELECT * FROM missions WHERE id = ANY($1)")
            .bind(&mission_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(AssignmentWithMission::stitch(assignments, missions))
    }

    async fn accept_mission(
        &self,
        mission_id: Uuid,
        worker_id: Uuid,
    ) -> Result<TransitionOutcome<AssignedMission>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let Some(mission) = lock_mission(&mut tx, mission_id).await? else {
            return Ok(TransitionOutcome::MissionNotFound);
        };

        if !mission.status.can_transition_to(MissionStatus::Assigned) {
            return Ok(TransitionOutcome::MissionConflict(mission.status));
        }

        if lock_assignment(&mut tx, mission_id).await?.is_some() {
            return Ok(TransitionOutcome::AlreadyAssigned);
        }

        let inserted = sqlx::query_as::<_, MissionAssignment>(
            r#"
            INSERT INTO mission_assignments (mission_id, worker_id, status)
            VALUES ($1, $2, 'assigned'::assignment_status)
            RETURNING *
            "#,
        )
        .bind(mission_id)
        .bind(worker_id)
        .fetch_one(&mut *tx)
        .await;

        let assignment = match inserted {
            Ok(assignment) => assignment,
            Err(e) if is_unique_violation(&e) => return Ok(TransitionOutcome::AlreadyAssigned),
            Err(e) => return Err(e),
        };

        let mission = set_mission_status(&mut tx, mission_id, MissionStatus::Assigned).await?;

        tx.commit().await?;

        Ok(TransitionOutcome::Applied(AssignedMission { mission, assignment }))
    }

    async fn start_mission(
        &self,
        mission_id: Uuid,
        worker_id: Uuid,
    ) -> Result<TransitionOutcome<AssignedMission>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if let Err(rejected) =
            lock_for_worker_transition(&mut tx, mission_id, worker_id, AssignmentStatus::InProgress)
                .await?
        {
            return Ok(rejected);
        }

        let assignment = sqlx::query_as::<_, MissionAssignment>(
            r#"
            UPDATE mission_assignments
            SET status = 'in_progress'::assignment_status
            WHERE mission_id = $1
            RETURNING *
            "#,
        )
        .bind(mission_id)
        .fetch_one(&mut *tx)
        .await?;

        let mission = set_mission_status(&mut tx, mission_id, MissionStatus::InProgress).await?;

        tx.commit().await?;

        Ok(TransitionOutcome::Applied(AssignedMission { mission, assignment }))
    }

    async fn complete_mission(
        &self,
        mission_id: Uuid,
        worker_id: Uuid,
        fee_rate: &BigDecimal,
        payment_provider: &str,
    ) -> Result<TransitionOutcome<CompletedMission>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let locked =
            lock_for_worker_transition(&mut tx, mission_id, worker_id, AssignmentStatus::Completed)
                .await?;
        let (locked_mission, _) = match locked {
            Ok(pair) => pair,
            Err(rejected) => return Ok(rejected),
        };

        let assignment = sqlx::query_as::<_, MissionAssignment>(
            r#"
            UPDATE mission_assignments
            SET status = 'completed'::assignment_status, completed_at = NOW()
            WHERE mission_id = $1
            RETURNING *
            "#,
        )
        .bind(mission_id)
        .fetch_one(&mut *tx)
        .await?;

        let mission = set_mission_status(&mut tx, mission_id, MissionStatus::Completed).await?;

        sqlx::query("UPDATE workers SET completed_missions = completed_missions + 1 WHERE id = $1")
            .bind(worker_id)
            .execute(&mut *tx)
            .await?;

        let split = PaymentSplit::compute(&locked_mission.price, fee_rate);
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments
            (mission_id, client_id, worker_id, amount_total, amount_to_worker, platform_fee,
             payment_provider, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending'::payment_status)
            RETURNING *
            "#,
        )
        .bind(mission_id)
        .bind(mission.client_id)
        .bind(worker_id)
        .bind(&split.amount_total)
        .bind(&split.amount_to_worker)
        .bind(&split.platform_fee)
        .bind(payment_provider)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(TransitionOutcome::Applied(CompletedMission {
            mission,
            assignment,
            payment,
        }))
    }

    async fn cancel_mission(
        &self,
        mission_id: Uuid,
        client_id: Uuid,
    ) -> Result<TransitionOutcome<CancelledMission>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let Some(mission) = lock_mission(&mut tx, mission_id).await? else {
            return Ok(TransitionOutcome::MissionNotFound);
        };

        if mission.client_id != client_id {
            return Ok(TransitionOutcome::NotOwner);
        }

        if !mission.status.can_transition_to(MissionStatus::Cancelled) {
            return Ok(TransitionOutcome::MissionConflict(mission.status));
        }

        let assignment = match lock_assignment(&mut tx, mission_id).await? {
            Some(assignment) if !assignment.status.can_transition_to(AssignmentStatus::Cancelled) => {
                return Ok(TransitionOutcome::AssignmentConflict(assignment.status));
            }
            Some(_) => Some(
                sqlx::query_as::<_, MissionAssignment>(
                    r#"
                    UPDATE mission_assignments
                    SET status = 'cancelled'::assignment_status
                    WHERE mission_id = $1
                    RETURNING *
                    "#,
                )
                .bind(mission_id)
                .fetch_one(&mut *tx)
                .await?,
            ),
            None => None,
        };

        let mission = set_mission_status(&mut tx, mission_id, MissionStatus::Cancelled).await?;

        tx.commit().await?;

        Ok(TransitionOutcome::Applied(CancelledMission { mission, assignment }))
    }
}
