use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    models::{
        missionmodel::*,
        paymentmodel::Payment,
    },
    utils::currency::{amount_from_f64, is_positive_amount, MAX_AMOUNT},
};

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

pub fn validate_price(price: f64) -> Result<(), ValidationError> {
    let amount = amount_from_f64(price)
        .map_err(|_| validation_error("invalid_price", "Price must be a number"))?;

    if !is_positive_amount(&amount) {
        return Err(validation_error("non_positive_price", "Price must be greater than zero"));
    }

    if price > MAX_AMOUNT {
        return Err(validation_error("price_too_large", "Price is too large"));
    }

    Ok(())
}

fn validate_mission(body: &CreateMissionDto) -> Result<(), ValidationError> {
    if body.title.trim().is_empty() {
        return Err(validation_error("blank_title", "Title is required"));
    }
    if body.description.trim().is_empty() {
        return Err(validation_error("blank_description", "Description is required"));
    }
    if body.estimated_duration.trim().is_empty() {
        return Err(validation_error("blank_duration", "Estimated duration is required"));
    }

    validate_price(body.price)?;

    let has_location = body
        .location
        .as_deref()
        .map_or(false, |location| !location.trim().is_empty());

    if !body.is_remote && !has_location {
        return Err(validation_error(
            "location_required",
            "A location is required unless the mission is remote",
        ));
    }
    Ok(())
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_mission", skip_on_field_errors = false))]
pub struct CreateMissionDto {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 2000, message = "Description must be between 1 and 2000 characters"))]
    pub description: String,

    pub category: MissionCategory,

    #[validate(length(min = 1, max = 50, message = "Estimated duration is required"))]
    pub estimated_duration: String,

    pub price: f64,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub location_lat: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub location_lng: Option<f64>,

    #[serde(default)]
    pub is_remote: bool,

    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 required skills"))]
    pub required_skills: Vec<String>,
}

/// Query string of `GET /missions`. Unknown enum values are rejected by the
/// extractor with a 400.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissionQueryDto {
    pub status: Option<MissionStatus>,
    pub category: Option<MissionCategory>,
}

impl From<MissionQueryDto> for MissionFilter {
    fn from(query: MissionQueryDto) -> Self {
        MissionFilter {
            status: query.status,
            category: query.category,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MissionCompletedDto {
    pub message: String,
    pub mission: Mission,
    pub assignment: MissionAssignment,
    pub payment: Payment,
}
