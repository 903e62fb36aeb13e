use axum::{Extension, Json, extract::State};
use serde_json::Value;
use std::sync::Arc;

use super::validation::FormValidator;
use super::{ApiError, ApiResponse, AppJson, AppState};
use crate::db::{RegulatorChanges, User};
use crate::services::regulator_service::RegulatorDto;
use crate::services::{RegulatorAction, RegulatorError};

impl From<RegulatorError> for ApiError {
    fn from(err: RegulatorError) -> Self {
        match err {
            RegulatorError::Database(msg) => ApiError::DatabaseError(msg),
            RegulatorError::Internal(msg) => ApiError::internal(msg),
        }
    }
}

/// GET /regulator/control/
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<RegulatorDto>>, ApiError> {
    let regulator = state.regulator_service().state(user.id).await?;
    Ok(Json(ApiResponse::success(regulator)))
}

/// POST /regulator/control/
pub async fn control(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<ApiResponse<RegulatorDto>>, ApiError> {
    let action = parse_action(&body)?;

    let regulator = state.regulator_service().control(user.id, action).await?;

    Ok(Json(ApiResponse::with_message(
        format!("Regulator {} completed", action.name()),
        regulator,
    )))
}

fn parse_action(body: &Value) -> Result<RegulatorAction, ApiError> {
    let mut form = FormValidator::new(body)?;

    let Some(name) = form.required_str("action", usize::MAX) else {
        form.finish()?;
        return Err(ApiError::field("action", super::validation::REQUIRED));
    };

    let action = match name.as_str() {
        "toggle_power" => RegulatorAction::TogglePower,
        "toggle_auto" => RegulatorAction::ToggleAuto,
        "update_settings" => {
            let changes = RegulatorChanges {
                is_on: form.optional_bool("is_on"),
                auto_mode: form.optional_bool("auto_mode"),
                current_pressure: form.optional_number("current_pressure", Some(0.0)),
                flow_rate: form.optional_number("flow_rate", Some(0.0)),
                temperature: form.optional_number("temperature", None),
            };
            RegulatorAction::UpdateSettings(changes)
        }
        other => {
            form.error(
                "action",
                format!(
                    "\"{other}\" is not a valid choice. Expected one of: {}.",
                    RegulatorAction::NAMES.join(", ")
                ),
            );
            form.finish()?;
            return Err(ApiError::field("action", "Invalid action"));
        }
    };

    form.finish()?;
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn errors_of(err: ApiError) -> crate::domain::FieldErrors {
        match err {
            ApiError::ValidationError { errors, .. } => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_toggle_actions() {
        assert_eq!(
            parse_action(&json!({"action": "toggle_power"})).unwrap(),
            RegulatorAction::TogglePower
        );
        assert_eq!(
            parse_action(&json!({"action": "toggle_auto"})).unwrap(),
            RegulatorAction::ToggleAuto
        );
    }

    #[test]
    fn test_parse_partial_settings() {
        let action = parse_action(&json!({
            "action": "update_settings",
            "current_pressure": 14.8
        }))
        .unwrap();

        assert_eq!(
            action,
            RegulatorAction::UpdateSettings(RegulatorChanges {
                current_pressure: Some(14.8),
                ..RegulatorChanges::default()
            })
        );
    }

    #[test]
    fn test_invalid_settings_collect_field_errors() {
        let errors = errors_of(
            parse_action(&json!({
                "action": "update_settings",
                "current_pressure": "high",
                "flow_rate": -2,
                "is_on": "on"
            }))
            .unwrap_err(),
        );

        assert!(errors.has("current_pressure"));
        assert!(errors.has("flow_rate"));
        assert!(errors.has("is_on"));
    }

    #[test]
    fn test_missing_or_unknown_action() {
        assert!(errors_of(parse_action(&json!({})).unwrap_err()).has("action"));
        assert!(errors_of(parse_action(&json!({"action": "explode"})).unwrap_err()).has("action"));
    }
}
