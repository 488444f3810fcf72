use std::borrow::Cow;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::accountmodel::*;

fn phone_regex() -> &'static regex::Regex {
    static PHONE: OnceLock<regex::Regex> = OnceLock::new();
    PHONE.get_or_init(|| {
        regex::Regex::new(r"^\+?[0-9][0-9 .\-]{6,18}[0-9]$").expect("phone pattern is valid")
    })
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if !phone_regex().is_match(phone.trim()) {
        let mut error = ValidationError::new("invalid_phone");
        error.message = Some(Cow::from("Phone number must be in a valid format (e.g., +33 6 12 34 56 78)"));
        return Err(error);
    }
    Ok(())
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterWorkerDto {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,

    #[validate(range(min = 16, max = 99, message = "Age must be between 16 and 99"))]
    pub age: i32,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(min = 6, max = 64, message = "Password must be between 6 and 64 characters"))]
    #[serde(alias = "passwordHash")]
    pub password: String,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[validate(url(message = "Invalid photo URL"))]
    pub photo_url: Option<String>,

    #[validate(length(max = 1000, message = "Bio must be at most 1000 characters"))]
    pub bio: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub location_lat: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub location_lng: Option<f64>,

    #[serde(default)]
    #[validate(length(max = 30, message = "At most 30 skills"))]
    pub skills: Vec<String>,
}

fn validate_company_name(body: &RegisterClientDto) -> Result<(), ValidationError> {
    let has_name = body
        .company_name
        .as_deref()
        .map_or(false, |name| !name.trim().is_empty());

    if body.user_type == ClientType::Company && !has_name {
        let mut error = ValidationError::new("company_name_required");
        error.message = Some(Cow::from("Company name is required for company accounts"));
        return Err(error);
    }
    Ok(())
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_company_name", skip_on_field_errors = false))]
pub struct RegisterClientDto {
    pub user_type: ClientType,

    #[validate(length(max = 200, message = "Company name must be at most 200 characters"))]
    pub company_name: Option<String>,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(min = 6, max = 64, message = "Password must be between 6 and 64 characters"))]
    #[serde(alias = "passwordHash")]
    pub password: String,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[validate(url(message = "Invalid photo URL"))]
    pub photo_url: Option<String>,

    pub billing_info: Option<BillingInfo>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(length(min = 1, message = "Email is required"), email(message = "Email is invalid"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    pub role: PartyRole,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterWorkerDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: PartyRole,
    pub rating: f64,
    pub completed_missions: i32,
    pub photo_url: Option<String>,
}

impl FilterWorkerDto {
    pub fn filter_worker(worker: &Worker) -> Self {
        FilterWorkerDto {
            id: worker.id,
            first_name: worker.first_name.to_owned(),
            last_name: worker.last_name.to_owned(),
            email: worker.email.to_owned(),
            role: PartyRole::Worker,
            rating: worker.rating,
            completed_missions: worker.completed_missions,
            photo_url: worker.photo_url.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterClientDto {
    pub id: Uuid,
    pub email: String,
    pub user_type: ClientType,
    pub company_name: Option<String>,
    pub name: String,
    pub role: PartyRole,
    pub photo_url: Option<String>,
}

impl FilterClientDto {
    pub fn filter_client(client: &Client) -> Self {
        FilterClientDto {
            id: client.id,
            email: client.email.to_owned(),
            user_type: client.user_type,
            company_name: client.company_name.to_owned(),
            name: client.display_name().to_owned(),
            role: PartyRole::Client,
            photo_url: client.photo_url.to_owned(),
        }
    }
}

/// Serialized as `{"user": {...}}` for workers and `{"client": {...}}` for clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum IdentityResponseDto {
    User(FilterWorkerDto),
    Client(FilterClientDto),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub status: &'static str,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker_body() -> RegisterWorkerDto {
        RegisterWorkerDto {
            first_name: "Alex".to_string(),
            last_name: "Chen".to_string(),
            age: 19,
            email: "worker1@quicktask.com".to_string(),
            password: "password123".to_string(),
            phone: Some("+33 6 11 00 00 11".to_string()),
            skills: vec!["Jardinage".to_string()],
            ..Default::default()
        }
    }

    fn client_body(user_type: ClientType, company_name: Option<&str>) -> RegisterClientDto {
        RegisterClientDto {
            user_type,
            company_name: company_name.map(str::to_string),
            email: "client1@quicktask.com".to_string(),
            password: "password123".to_string(),
            phone: None,
            photo_url: None,
            billing_info: None,
        }
    }

    #[test]
    fn valid_worker_signup_passes() {
        assert!(worker_body().validate().is_ok());
    }

    #[test]
    fn worker_signup_rejects_bad_fields() {
        let mut body = worker_body();
        body.email = "not-an-email".to_string();
        assert!(body.validate().is_err());

        let mut body = worker_body();
        body.age = 12;
        assert!(body.validate().is_err());

        let mut body = worker_body();
        body.phone = Some("call me".to_string());
        assert!(body.validate().is_err());

        let mut body = worker_body();
        body.password = "123".to_string();
        assert!(body.validate().is_err());
    }

    #[test]
    fn signup_accepts_legacy_password_field() {
        let body: RegisterWorkerDto = serde_json::from_value(serde_json::json!({
            "firstName": "Sam",
            "lastName": "Johnson",
            "age": 21,
            "email": "sam@quicktask.com",
            "passwordHash": "password123"
        }))
        .unwrap();
        assert_eq!(body.password, "password123");
        assert!(body.skills.is_empty());
    }

    #[test]
    fn company_clients_need_a_company_name() {
        assert!(client_body(ClientType::Individual, None).validate().is_ok());
        assert!(client_body(ClientType::Company, Some("Tech Startup")).validate().is_ok());
        assert!(client_body(ClientType::Company, None).validate().is_err());
        assert!(client_body(ClientType::Company, Some(" ")).validate().is_err());
    }

    #[test]
    fn identity_response_is_keyed_by_role() {
        let dto = IdentityResponseDto::Client(FilterClientDto {
            id: Uuid::nil(),
            email: "c@example.com".to_string(),
            user_type: ClientType::Individual,
            company_name: None,
            name: "Client".to_string(),
            role: PartyRole::Client,
            photo_url: None,
        });
        let value = serde_json::to_value(&dto).unwrap();
        assert_eq!(value["client"]["role"], "client");
        assert_eq!(value["client"]["email"], "c@example.com");
    }
}
