// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Form validation shared by the write paths.
//!
//! Every check here runs before any store or network call.

use crate::error::AppError;
use validator::{Validate, ValidationError};

/// Message for any required field left empty.
pub const FILL_ALL_FIELDS: &str = "Please fill out all fields.";

/// Reject values that are empty after trimming.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Run derived validation, mapping any failure to one user-facing message.
pub fn validate_form<T: Validate>(form: &T, message: &str) -> Result<(), AppError> {
    form.validate().map_err(|errors| {
        let field_errors = errors.field_errors();
        let fields: Vec<_> = field_errors.keys().collect();
        tracing::debug!(?fields, "Form rejected");
        AppError::BadRequest(message.to_string())
    })
}

/// Lower-cased, trimmed email used as the credentials key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
