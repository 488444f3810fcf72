use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "party_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Worker,
    Client,
}

impl PartyRole {
    pub fn to_str(&self) -> &str {
        match self {
            PartyRole::Worker => "worker",
            PartyRole::Client => "client",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "client_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    Individual,
    Company,
}

/// An authenticated party. Anything that can be written by either role
/// (ratings, notifications, sessions) is keyed by this instead of a bare id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum Principal {
    Worker(Uuid),
    Client(Uuid),
}

impl Principal {
    pub fn id(&self) -> Uuid {
        match self {
            Principal::Worker(id) | Principal::Client(id) => *id,
        }
    }

    pub fn role(&self) -> PartyRole {
        match self {
            Principal::Worker(_) => PartyRole::Worker,
            Principal::Client(_) => PartyRole::Client,
        }
    }

    pub fn from_parts(role: PartyRole, id: Uuid) -> Self {
        match role {
            PartyRole::Worker => Principal::Worker(id),
            PartyRole::Client => Principal::Client(id),
        }
    }

    pub fn worker_id(&self) -> Option<Uuid> {
        match self {
            Principal::Worker(id) => Some(*id),
            Principal::Client(_) => None,
        }
    }

    pub fn client_id(&self) -> Option<Uuid> {
        match self {
            Principal::Client(id) => Some(*id),
            Principal::Worker(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub skills: Vec<String>,
    pub rating: f64,
    pub completed_missions: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillingInfo {
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub user_type: ClientType,
    pub company_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub billing_info: Option<Json<BillingInfo>>,
    pub created_at: DateTime<Utc>,
}

pub const CLIENT_FALLBACK_NAME: &str = "Client";

impl Client {
    /// Company name when one is set, otherwise a generic label.
    pub fn display_name(&self) -> &str {
        self.company_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(CLIENT_FALLBACK_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(company_name: Option<&str>) -> Client {
        Client {
            id: Uuid::new_v4(),
            user_type: ClientType::Company,
            company_name: company_name.map(str::to_string),
            email: "shop@example.com".to_string(),
            password_hash: "hash".to_string(),
            phone: None,
            photo_url: None,
            billing_info: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn principal_round_trips_through_role_and_id() {
        let id = Uuid::new_v4();
        let worker = Principal::from_parts(PartyRole::Worker, id);
        assert_eq!(worker, Principal::Worker(id));
        assert_eq!(worker.role(), PartyRole::Worker);
        assert_eq!(worker.worker_id(), Some(id));
        assert_eq!(worker.client_id(), None);

        let client = Principal::from_parts(PartyRole::Client, id);
        assert_eq!(client.id(), id);
        assert_eq!(client.client_id(), Some(id));
        assert_eq!(client.worker_id(), None);
    }

    #[test]
    fn display_name_falls_back_for_individuals() {
        assert_eq!(client(Some("Local Shop")).display_name(), "Local Shop");
        assert_eq!(client(None).display_name(), CLIENT_FALLBACK_NAME);
        assert_eq!(client(Some("  ")).display_name(), CLIENT_FALLBACK_NAME);
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let value = serde_json::to_value(client(None)).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert_eq!(value["userType"], "company");
    }
}
