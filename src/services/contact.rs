// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact form.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::ContactMessage;
use crate::validation::{not_blank, validate_form};
use chrono::Utc;
use serde::Deserialize;
use validator::{Validate, ValidateEmail};

pub const MESSAGE_SENT: &str = "Thank you for contacting us. We will get back to you shortly.";
const INCOMPLETE: &str = "Please fill out all fields before sending.";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ContactForm {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    pub message: String,
}

/// Validate and store a contact message.
pub async fn submit(
    db: &FirestoreDb,
    form: &ContactForm,
    user_id: Option<&str>,
) -> Result<(), AppError> {
    validate_form(form, INCOMPLETE)?;
    let email = form.email.trim();
    if !email.validate_email() {
        return Err(AppError::BadRequest(
            "Please enter a valid email address.".to_string(),
        ));
    }

    let message = ContactMessage {
        name: form.name.trim().to_string(),
        email: email.to_string(),
        message: form.message.trim().to_string(),
        submitted_at: Utc::now(),
        user_id: user_id.map(str::to_string),
    };
    let id = db.create_contact_message(&message).await?;

    tracing::info!(message_id = %id, "Contact message stored");
    Ok(())
}
