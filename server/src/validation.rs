//! Field rules shared by the create and update DTOs.
//!
//! # Design
//! The DTOs derive [`validator::Validate`] and point each field at one of the
//! rule functions below. [`check`] runs the derived validation and flattens
//! the result into [`FieldErrors`], the `field -> messages` map that goes out
//! in a 400 body. Lengths count chars, not bytes.

use std::borrow::Cow;
use std::collections::BTreeMap;

use validator::{Validate, ValidationError, ValidationErrors};

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Validation messages keyed by field name, in field-name order.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Required, not blank, at most [`TITLE_MAX_CHARS`].
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::new("required")
            .with_message(Cow::Borrowed("The title field is required.")));
    }
    max_chars(title, TITLE_MAX_CHARS, "title")
}

/// At most [`DESCRIPTION_MAX_CHARS`]. Only called when a description is present.
pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    max_chars(description, DESCRIPTION_MAX_CHARS, "description")
}

fn max_chars(value: &str, max: usize, field: &str) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::new("max_length").with_message(Cow::Owned(format!(
            "The field {field} must be a string with a maximum length of {max}."
        ))));
    }
    Ok(())
}

pub fn check<T: Validate>(value: &T) -> Result<(), FieldErrors> {
    value.validate().map_err(|errors| flatten(&errors))
}

fn flatten(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|err| match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("The {field} field is invalid ({}).", err.code),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}
