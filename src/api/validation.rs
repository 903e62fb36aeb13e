use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::ApiError;
use crate::constants::limits;
use crate::domain::FieldErrors;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
pub const INVALID_PHONE: &str = "Enter a valid phone number.";
pub const INVALID_BOOLEAN: &str = "Must be a valid boolean.";
pub const INVALID_NUMBER: &str = "A valid number is required.";
pub const INVALID_DATETIME: &str = "Datetime has wrong format. Use one of these formats instead: YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].";

pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const DEVICE_CODE_MAX_LEN: usize = 255;
pub const PHONE_MAX_LEN: usize = 15;
pub const IMAGE_URL_MAX_LEN: usize = 200;
pub const NAME_MAX_LEN: usize = 255;
pub const RELATIONSHIP_MAX_LEN: usize = 100;
pub const SENSOR_ID_MAX_LEN: usize = 100;
pub const TITLE_MAX_LEN: usize = 255;

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    );
    re.is_match(email)
}

#[must_use]
pub fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

/// Digits with an optional leading `+`; spaces and dashes allowed as separators.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"^\+?[0-9][0-9 \-]*$");
    re.is_match(phone) && phone.chars().any(|c| c.is_ascii_digit())
}

fn max_length_message(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

pub fn validate_limit(limit: u64) -> Result<u64, ApiError> {
    if !(1..=limits::MAX_READINGS_LIMIT).contains(&limit) {
        return Err(ApiError::field(
            "limit",
            format!(
                "Ensure this value is between 1 and {}.",
                limits::MAX_READINGS_LIMIT
            ),
        ));
    }
    Ok(limit)
}

/// Field-by-field reader over a JSON object body that collects every problem
/// before failing.
pub struct FormValidator<'a> {
    body: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> FormValidator<'a> {
    pub fn new(body: &'a Value) -> Result<Self, ApiError> {
        let body = body.as_object().ok_or_else(|| {
            ApiError::field(
                FieldErrors::NON_FIELD,
                "Invalid data. Expected a dictionary.",
            )
        })?;
        Ok(Self {
            body,
            errors: FieldErrors::new(),
        })
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.body.contains_key(field)
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    /// Non-blank string no longer than `max_len` characters.
    pub fn required_str(&mut self, field: &str, max_len: usize) -> Option<String> {
        match self.body.get(field) {
            None | Some(Value::Null) => {
                self.errors.add(field, REQUIRED);
                None
            }
            Some(value) => self.string_value(field, value, max_len, false),
        }
    }

    /// `None` when absent; `Some(None)` when explicitly null.
    pub fn nullable_str(&mut self, field: &str, max_len: usize) -> Option<Option<String>> {
        match self.body.get(field)? {
            Value::Null => Some(None),
            value => self
                .string_value(field, value, max_len, true)
                .map(|s| if s.is_empty() { None } else { Some(s) }),
        }
    }

    /// Present fields must be non-blank strings.
    pub fn optional_str(&mut self, field: &str, max_len: usize) -> Option<String> {
        let value = self.body.get(field)?;
        self.string_value(field, value, max_len, false)
    }

    pub fn optional_bool(&mut self, field: &str) -> Option<bool> {
        match self.body.get(field)? {
            Value::Bool(b) => Some(*b),
            _ => {
                self.errors.add(field, INVALID_BOOLEAN);
                None
            }
        }
    }

    /// Finite number, optionally bounded below. Numeric strings are accepted.
    pub fn optional_number(&mut self, field: &str, min: Option<f64>) -> Option<f64> {
        let value = self.body.get(field)?;
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        match number {
            Some(n) if n.is_finite() => {
                if let Some(min) = min
                    && n < min
                {
                    self.errors
                        .add(field, format!("Ensure this value is greater than or equal to {min}."));
                    return None;
                }
                Some(n)
            }
            _ => {
                self.errors.add(field, INVALID_NUMBER);
                None
            }
        }
    }

    pub fn optional_object(&mut self, field: &str) -> Option<Value> {
        match self.body.get(field)? {
            value @ Value::Object(_) => Some(value.clone()),
            other => {
                self.errors.add(
                    field,
                    format!(
                        "Expected a dictionary of items but got type \"{}\".",
                        json_type_name(other)
                    ),
                );
                None
            }
        }
    }

    fn string_value(
        &mut self,
        field: &str,
        value: &Value,
        max_len: usize,
        allow_blank: bool,
    ) -> Option<String> {
        let Value::String(s) = value else {
            self.errors.add(field, "Not a valid string.");
            return None;
        };

        let trimmed = s.trim();
        if trimmed.is_empty() && !allow_blank {
            self.errors.add(field, BLANK);
            return None;
        }
        if trimmed.chars().count() > max_len {
            self.errors.add(field, max_length_message(max_len));
            return None;
        }
        Some(trimmed.to_string())
    }

    pub fn finish(self) -> Result<(), ApiError> {
        self.errors.into_result().map_err(ApiError::validation)
    }

    #[must_use]
    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_errors(err: ApiError) -> FieldErrors {
        match err {
            ApiError::ValidationError { errors, .. } => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user.example.com"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_is_valid_username() {
        assert!(is_valid_username("jane_doe"));
        assert!(is_valid_username("jane.doe+home@x-y"));
        assert!(!is_valid_username("jane doe"));
        assert!(!is_valid_username("jane!"));
    }

    #[test]
    fn test_is_valid_phone() {
        assert!(is_valid_phone("911"));
        assert!(is_valid_phone("+1234567890"));
        assert!(is_valid_phone("+1 555-123 4567"));
        assert!(!is_valid_phone("call me"));
        assert!(!is_valid_phone("++123"));
        assert!(!is_valid_phone("+"));
    }

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(1000).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(1001).is_err());
    }

    #[test]
    fn test_required_fields_are_collected() {
        let body = json!({"name": "  ", "relationship": "x".repeat(101)});
        let mut form = FormValidator::new(&body).unwrap();
        assert!(form.required_str("name", NAME_MAX_LEN).is_none());
        assert!(form.required_str("phone_number", PHONE_MAX_LEN).is_none());
        assert!(form.required_str("relationship", RELATIONSHIP_MAX_LEN).is_none());

        let errors = field_errors(form.finish().unwrap_err()).into_inner();
        assert_eq!(errors["name"], [BLANK]);
        assert_eq!(errors["phone_number"], [REQUIRED]);
        assert_eq!(
            errors["relationship"],
            ["Ensure this field has no more than 100 characters."]
        );
    }

    #[test]
    fn test_numbers_and_booleans() {
        let body = json!({
            "current_pressure": "abc",
            "flow_rate": -1.0,
            "temperature": "21.5",
            "is_on": "yes",
            "auto_mode": false
        });
        let mut form = FormValidator::new(&body).unwrap();
        assert_eq!(form.optional_number("current_pressure", Some(0.0)), None);
        assert_eq!(form.optional_number("flow_rate", Some(0.0)), None);
        assert_eq!(form.optional_number("temperature", None), Some(21.5));
        assert_eq!(form.optional_bool("is_on"), None);
        assert_eq!(form.optional_bool("auto_mode"), Some(false));
        assert_eq!(form.optional_bool("missing"), None);

        let errors = field_errors(form.finish().unwrap_err());
        assert!(errors.has("current_pressure"));
        assert!(errors.has("flow_rate"));
        assert!(errors.has("is_on"));
        assert!(!errors.has("temperature"));
        assert!(!errors.has("auto_mode"));
    }

    #[test]
    fn test_nullable_str_distinguishes_null_and_absent() {
        let body = json!({"phone_number": null, "profile_image": "/media/a.jpg"});
        let mut form = FormValidator::new(&body).unwrap();
        assert_eq!(form.nullable_str("phone_number", PHONE_MAX_LEN), Some(None));
        assert_eq!(
            form.nullable_str("profile_image", IMAGE_URL_MAX_LEN),
            Some(Some("/media/a.jpg".to_string()))
        );
        assert_eq!(form.nullable_str("username", USERNAME_MAX_LEN), None);
        assert!(form.finish().is_ok());
    }

    #[test]
    fn test_optional_object() {
        let body = json!({"notification_preferences": ["push"]});
        let mut form = FormValidator::new(&body).unwrap();
        assert!(form.optional_object("notification_preferences").is_none());
        assert!(form.finish().is_err());
    }

    #[test]
    fn test_non_object_body_rejected() {
        assert!(FormValidator::new(&json!([1, 2])).is_err());
    }
}
