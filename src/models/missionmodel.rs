use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "mission_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MissionCategory {
    Pets,
    Moving,
    Digital,
    Garden,
    Cleaning,
    Handyman,
    Other,
}

impl MissionCategory {
    pub fn to_str(&self) -> &str {
        match self {
            MissionCategory::Pets => "pets",
            MissionCategory::Moving => "moving",
            MissionCategory::Digital => "digital",
            MissionCategory::Garden => "garden",
            MissionCategory::Cleaning => "cleaning",
            MissionCategory::Handyman => "handyman",
            MissionCategory::Other => "other",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "mission_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Open,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl MissionStatus {
    pub fn to_str(&self) -> &str {
        match self {
            MissionStatus::Open => "open",
            MissionStatus::Assigned => "assigned",
            MissionStatus::InProgress => "in_progress",
            MissionStatus::Completed => "completed",
            MissionStatus::Cancelled => "cancelled",
        }
    }

    /// Lifecycle edges. `open -> assigned -> in_progress -> completed`, with
    /// `assigned -> completed` allowed (start is optional) and cancellation
    /// only before work has started.
    pub fn can_transition_to(&self, next: MissionStatus) -> bool {
        use MissionStatus::*;

        matches!(
            (self, next),
            (Open, Assigned)
                | (Open, Cancelled)
                | (Assigned, InProgress)
                | (Assigned, Completed)
                | (Assigned, Cancelled)
                | (InProgress, Completed)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "assignment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    InProgress,
    Completed,
    Disputed,
    Cancelled,
}

impl AssignmentStatus {
    pub fn to_str(&self) -> &str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::InProgress => "in_progress",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Disputed => "disputed",
            AssignmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: AssignmentStatus) -> bool {
        use AssignmentStatus::*;

        matches!(
            (self, next),
            (Assigned, InProgress)
                | (Assigned, Completed)
                | (Assigned, Cancelled)
                | (Assigned, Disputed)
                | (InProgress, Completed)
                | (InProgress, Disputed)
        )
    }

    /// Mission status an assignment in this state pins its mission to.
    pub fn mission_status(&self) -> Option<MissionStatus> {
        match self {
            AssignmentStatus::Assigned => Some(MissionStatus::Assigned),
            AssignmentStatus::InProgress => Some(MissionStatus::InProgress),
            AssignmentStatus::Completed => Some(MissionStatus::Completed),
            AssignmentStatus::Cancelled => Some(MissionStatus::Cancelled),
            AssignmentStatus::Disputed => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: MissionCategory,
    pub estimated_duration: String,
    pub price: BigDecimal,
    pub location: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub is_remote: bool,
    pub required_skills: Vec<String>,
    pub status: MissionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MissionAssignment {
    pub id: Uuid,
    pub mission_id: Uuid,
    pub worker_id: Uuid,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: AssignmentStatus,
}

/// Public projection of a mission's owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub name: String,
    pub email: String,
    pub photo_url: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct MissionClientRow {
    #[sqlx(flatten)]
    pub mission: Mission,
    pub client_name: String,
    pub client_email: String,
    pub client_photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionWithClient {
    #[serde(flatten)]
    pub mission: Mission,
    pub client: ClientSummary,
}

impl From<MissionClientRow> for MissionWithClient {
    fn from(row: MissionClientRow) -> Self {
        MissionWithClient {
            mission: row.mission,
            client: ClientSummary {
                name: row.client_name,
                email: row.client_email,
                photo_url: row.client_photo_url,
            },
        }
    }
}

/// Mission page: listing fields, owner summary and the assignment if one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionDetail {
    #[serde(flatten)]
    pub listing: MissionWithClient,
    pub assignment: Option<MissionAssignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentWithMission {
    #[serde(flatten)]
    pub assignment: MissionAssignment,
    pub mission: Option<Mission>,
}

impl AssignmentWithMission {
    /// Pair each assignment with its mission, keeping the assignments' order.
    pub fn stitch(assignments: Vec<MissionAssignment>, missions: Vec<Mission>) -> Vec<Self> {
        let mut by_id: std::collections::HashMap<Uuid, Mission> =
            missions.into_iter().map(|m| (m.id, m)).collect();

        assignments
            .into_iter()
            .map(|assignment| AssignmentWithMission {
                mission: by_id.remove(&assignment.mission_id),
                assignment,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissionFilter {
    pub status: Option<MissionStatus>,
    pub category: Option<MissionCategory>,
}

impl MissionFilter {
    pub fn matches(&self, mission: &Mission) -> bool {
        self.status.map_or(true, |status| mission.status == status)
            && self.category.map_or(true, |category| mission.category == category)
    }
}
