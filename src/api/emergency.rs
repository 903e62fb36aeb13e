use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use serde_json::Value;
use std::sync::Arc;

use super::validation::{
    self, FormValidator, NAME_MAX_LEN, PHONE_MAX_LEN, RELATIONSHIP_MAX_LEN,
};
use super::{ApiError, ApiResponse, AppJson, AppPath, AppState};
use crate::db::{NewContact, User};
use crate::services::EmergencyError;
use crate::services::emergency_service::{ContactDto, SosConfirmation};

impl From<EmergencyError> for ApiError {
    fn from(err: EmergencyError) -> Self {
        match err {
            EmergencyError::NoContacts => {
                ApiError::BadRequest(EmergencyError::NoContacts.to_string())
            }
            EmergencyError::ContactNotFound => {
                ApiError::NotFound(EmergencyError::ContactNotFound.to_string())
            }
            EmergencyError::Database(msg) => ApiError::DatabaseError(msg),
            EmergencyError::Internal(msg) => ApiError::internal(msg),
        }
    }
}

/// GET /emergency/contacts/
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<Vec<ContactDto>>>, ApiError> {
    let contacts = state.emergency_service().contacts(user.id).await?;
    Ok(Json(ApiResponse::success(contacts)))
}

/// POST /emergency/contacts/
pub async fn add_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppJson(body): AppJson<Value>,
) -> Result<(StatusCode, Json<ApiResponse<ContactDto>>), ApiError> {
    let contact = parse_contact(&body)?;

    let created = state
        .emergency_service()
        .add_contact(user.id, contact)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Contact added successfully", created)),
    ))
}

/// DELETE /emergency/contacts/{id}/delete/
pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.emergency_service().remove_contact(user.id, id).await?;
    Ok(Json(ApiResponse::message("Contact deleted")))
}

/// POST /emergency/sos/
pub async fn trigger_sos(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<SosConfirmation>>, ApiError> {
    let confirmation = state.emergency_service().trigger_sos(user.id).await?;

    Ok(Json(ApiResponse::with_message(
        "Emergency SOS triggered successfully",
        confirmation,
    )))
}

fn parse_contact(body: &Value) -> Result<NewContact, ApiError> {
    let mut form = FormValidator::new(body)?;

    let name = form.required_str("name", NAME_MAX_LEN);
    let phone_number = form.required_str("phone_number", PHONE_MAX_LEN);
    let relationship = form.required_str("relationship", RELATIONSHIP_MAX_LEN);
    let is_primary = form.optional_bool("is_primary").unwrap_or(false);

    if let Some(phone) = &phone_number
        && !validation::is_valid_phone(phone)
    {
        form.error("phone_number", validation::INVALID_PHONE);
    }

    form.finish()?;

    match (name, phone_number, relationship) {
        (Some(name), Some(phone_number), Some(relationship)) => Ok(NewContact {
            name,
            phone_number,
            relationship,
            is_primary,
        }),
        _ => Err(ApiError::internal("Validated contact fields missing")),
    }
}
