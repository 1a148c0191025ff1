// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication backend and session resolution.
//!
//! Handles:
//! - Sign-up and sign-in against argon2 credentials
//! - Session documents backing every issued token (sign-out deletes them)
//! - One-time password reset tokens sent through the mail outbox

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::middleware::auth::{create_jwt, decode_jwt};
use crate::models::{Credentials, PasswordReset, SessionRecord, UserProfile};
use crate::services::mail::{MailOutbox, OutgoingMail};
use crate::validation::{normalize_email, not_blank, validate_form, FILL_ALL_FIELDS};
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use validator::{Validate, ValidateEmail};

/// How long a password reset link stays valid.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

const INVALID_LOGIN: &str = "Invalid email or password.";
const SIGN_IN_INCOMPLETE: &str = "Please enter both email and password.";
const RESET_EMAIL_REQUIRED: &str = "Please enter your email address to reset your password.";
const EMAIL_TAKEN: &str = "An account with this email already exists.";
const RESET_SENT: &str = "A password reset link has been sent to your email address.";

/// The signed-in user, resolved for every protected request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    #[serde(skip)]
    pub session_id: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Session {
    fn from_profile(profile: UserProfile, session_id: String) -> Self {
        let display_name = profile
            .display_name
            .clone()
            .unwrap_or_else(|| format!("{} {}", profile.first_name, profile.last_name));
        Self {
            user_id: profile.uid,
            session_id,
            email: profile.email,
            display_name,
            photo_url: profile.photo_url,
            created_at: profile.created_at,
        }
    }
}

/// A freshly opened session and the token that carries it.
#[derive(Debug, Clone)]
pub struct OpenedSession {
    pub token: String,
    pub session: Session,
}

/// Sign-up form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct SignUpForm {
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(custom(function = "not_blank"))]
    pub mobile_number: String,
    #[validate(custom(function = "not_blank"))]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
    #[validate(custom(function = "not_blank"))]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignInForm {
    #[validate(custom(function = "not_blank"))]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetConfirmForm {
    #[validate(custom(function = "not_blank"))]
    pub token: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
    #[validate(custom(function = "not_blank"))]
    pub confirm_password: String,
}

/// Authentication backend.
#[derive(Clone)]
pub struct SessionService {
    db: FirestoreDb,
    signing_key: Arc<[u8]>,
    outbox: MailOutbox,
}

impl SessionService {
    pub fn new(db: FirestoreDb, signing_key: &[u8], outbox: MailOutbox) -> Self {
        Self {
            db,
            signing_key: Arc::from(signing_key),
            outbox,
        }
    }

    /// Create an account and open its first session.
    ///
    /// All checks happen before the first store call.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<OpenedSession, AppError> {
        validate_form(form, FILL_ALL_FIELDS)?;
        if form.password != form.confirm_password {
            return Err(AppError::BadRequest(AppError::PASSWORD_MISMATCH.to_string()));
        }
        let email = normalize_email(&form.email);
        if !email.validate_email() {
            return Err(AppError::BadRequest(
                "Please enter a valid email address.".to_string(),
            ));
        }

        if self.db.get_credentials(&email).await?.is_some() {
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let user_id = FirestoreDb::generate_document_id()?;
        let credentials = Credentials {
            user_id: user_id.clone(),
            email: email.clone(),
            password_hash: hash_password(&form.password)?,
        };

        let first_name = form.first_name.trim().to_string();
        let last_name = form.last_name.trim().to_string();
        let profile = UserProfile {
            uid: user_id.clone(),
            display_name: Some(format!("{} {}", first_name, last_name)),
            first_name,
            last_name,
            mobile_number: form.mobile_number.trim().to_string(),
            email: email.clone(),
            photo_url: None,
            created_at: Some(Utc::now()),
        };

        // The profile goes first: credentials make the account reachable,
        // so they are written last and only if the email is still free.
        self.db.upsert_user(&profile).await?;
        if let Err(e) = self.db.create_credentials(&email, &credentials).await {
            if let Err(cleanup) = self.db.delete_user(&user_id).await {
                tracing::error!(
                    user_id = %user_id,
                    error = %cleanup,
                    "Orphaned profile left behind"
                );
            }
            return Err(match e {
                AppError::Conflict(_) => AppError::Conflict(EMAIL_TAKEN.to_string()),
                other => other,
            });
        }

        tracing::info!(user_id = %user_id, "Account created");
        self.open_session(profile).await
    }

    /// Verify credentials and open a session.
    pub async fn sign_in(&self, form: &SignInForm) -> Result<OpenedSession, AppError> {
        validate_form(form, SIGN_IN_INCOMPLETE)?;
        let email = normalize_email(&form.email);

        let Some(credentials) = self.db.get_credentials(&email).await? else {
            return Err(AppError::BadRequest(INVALID_LOGIN.to_string()));
        };
        if !verify_password(&form.password, &credentials.password_hash)? {
            tracing::info!(user_id = %credentials.user_id, "Sign-in rejected");
            return Err(AppError::BadRequest(INVALID_LOGIN.to_string()));
        }

        let profile = self
            .db
            .get_user(&credentials.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", credentials.user_id)))?;

        self.open_session(profile).await
    }

    async fn open_session(&self, profile: UserProfile) -> Result<OpenedSession, AppError> {
        let session_id = random_token(32)?;
        let record = SessionRecord {
            id: String::new(),
            user_id: profile.uid.clone(),
            created_at: Utc::now(),
        };
        self.db.create_session(&session_id, &record).await?;

        let token = create_jwt(&profile.uid, &session_id, &self.signing_key)?;
        tracing::info!(user_id = %profile.uid, "Session opened");

        Ok(OpenedSession {
            token,
            session: Session::from_profile(profile, session_id),
        })
    }

    /// Resolve a token to the live session it carries.
    ///
    /// Fails when the token is invalid or expired, or the session was signed
    /// out or its user removed.
    pub async fn resolve(&self, token: &str) -> Result<Session, AppError> {
        let claims = decode_jwt(token, &self.signing_key)?;

        let record = self
            .db
            .get_session(&claims.sid)
            .await?
            .ok_or(AppError::InvalidToken)?;
        if record.user_id != claims.sub {
            tracing::warn!(sid = %claims.sid, "Session does not belong to token subject");
            return Err(AppError::InvalidToken);
        }

        let profile = self
            .db
            .get_user(&claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        Ok(Session::from_profile(profile, claims.sid))
    }

    /// End a session by deleting its document.
    ///
    /// A failure is logged and returned; nothing is retried.
    pub async fn sign_out(&self, session_id: &str) -> Result<(), AppError> {
        self.db.delete_session(session_id).await.inspect_err(|e| {
            tracing::error!(error = %e, "Sign-out failed");
        })?;
        tracing::info!("Session closed");
        Ok(())
    }

    /// End whatever session a raw token names, if it is still valid.
    pub async fn sign_out_token(&self, token: &str) -> Result<(), AppError> {
        match decode_jwt(token, &self.signing_key) {
            Ok(claims) => self.sign_out(&claims.sid).await,
            // Nothing to revoke; the cookie is cleared regardless
            Err(_) => Ok(()),
        }
    }

    /// Send a reset link if the email has an account.
    ///
    /// Always returns the same message so addresses cannot be enumerated.
    pub async fn request_password_reset(&self, email: &str) -> Result<&'static str, AppError> {
        if not_blank(email).is_err() {
            return Err(AppError::BadRequest(RESET_EMAIL_REQUIRED.to_string()));
        }
        let email = normalize_email(email);

        let Some(credentials) = self.db.get_credentials(&email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(RESET_SENT);
        };

        let token = random_token(32)?;
        let reset = PasswordReset {
            user_id: credentials.user_id.clone(),
            email: email.clone(),
            expires_at: Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS),
        };
        self.db
            .create_password_reset(&token_digest(&token), &reset)
            .await?;

        self.outbox
            .send(OutgoingMail {
                to: email,
                subject: "Reset your password".to_string(),
                body: format!(
                    "Use this code to choose a new password within {} hour: {}",
                    RESET_TOKEN_TTL_HOURS, token
                ),
            })
            .await?;

        tracing::info!(user_id = %credentials.user_id, "Password reset issued");
        Ok(RESET_SENT)
    }

    /// Replace the password using a reset token. The token is single-use.
    pub async fn confirm_password_reset(&self, form: &ResetConfirmForm) -> Result<(), AppError> {
        validate_form(form, FILL_ALL_FIELDS)?;
        if form.password != form.confirm_password {
            return Err(AppError::BadRequest(AppError::PASSWORD_MISMATCH.to_string()));
        }

        let key = token_digest(form.token.trim());
        let reset = self
            .db
            .get_password_reset(&key)
            .await?
            .ok_or_else(|| AppError::BadRequest("This reset link is invalid.".to_string()))?;

        // Single use, even when expired
        self.db.delete_password_reset(&key).await?;
        if reset.expires_at < Utc::now() {
            return Err(AppError::BadRequest(
                "This reset link has expired.".to_string(),
            ));
        }

        let credentials = Credentials {
            user_id: reset.user_id.clone(),
            email: reset.email.clone(),
            password_hash: hash_password(&form.password)?,
        };
        self.db.set_credentials(&reset.email, &credentials).await?;

        // Sessions opened with the old password end here
        let revoked = self.db.delete_sessions_for_user(&reset.user_id).await?;

        tracing::info!(user_id = %reset.user_id, revoked, "Password reset completed");
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, stored: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored hash unreadable: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// URL-safe random token of `len` bytes.
fn random_token(len: usize) -> Result<String, AppError> {
    let mut bytes = vec![0u8; len];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Random generator failed")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Reset tokens are stored by digest only.
fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{collections, CollectionRef, Query};

    fn service() -> (SessionService, FirestoreDb) {
        let db = FirestoreDb::new_in_memory();
        let service = SessionService::new(
            db.clone(),
            b"test_jwt_key_32_bytes_minimum!!",
            MailOutbox::new(),
        );
        (service, db)
    }

    fn form(password: &str, confirm: &str) -> SignUpForm {
        SignUpForm {
            first_name: "Ruth".to_string(),
            last_name: "Moab".to_string(),
            mobile_number: "5550100".to_string(),
            email: "Ruth@Example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[tokio::test]
    async fn test_mismatch_makes_no_store_call() {
        let (service, db) = service();
        let store = db.memory_store().unwrap().clone();

        let err = service.sign_up(&form("secret1", "secret2")).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            format!("Invalid request: {}", AppError::PASSWORD_MISMATCH)
        );
        assert_eq!(store.read_count() + store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_fields_checked_before_mismatch() {
        let (service, _db) = service();
        let mut blank = form("a", "b");
        blank.first_name = "  ".to_string();
        let err = service.sign_up(&blank).await.unwrap_err();
        assert_eq!(err.to_string(), format!("Invalid request: {}", FILL_ALL_FIELDS));
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in_and_out() {
        let (service, _db) = service();
        let opened = service.sign_up(&form("hunter22", "hunter22")).await.unwrap();
        assert_eq!(opened.session.display_name, "Ruth Moab");
        assert_eq!(opened.session.email, "ruth@example.com");

        let resolved = service.resolve(&opened.token).await.unwrap();
        assert_eq!(resolved.user_id, opened.session.user_id);

        let login = SignInForm {
            email: "ruth@example.com ".to_string(),
            password: "hunter22".to_string(),
        };
        let second = service.sign_in(&login).await.unwrap();

        service.sign_out(&opened.session.session_id).await.unwrap();
        assert!(matches!(
            service.resolve(&opened.token).await,
            Err(AppError::InvalidToken)
        ));
        // Other sessions stay open
        assert!(service.resolve(&second.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (service, _db) = service();
        service.sign_up(&form("pw123456", "pw123456")).await.unwrap();
        let err = service.sign_up(&form("pw123456", "pw123456")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sign_ups_register_email_once() {
        let (service, db) = service();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.sign_up(&form("pw123456", "pw123456")).await })
            })
            .collect();

        let mut created = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(opened) => created.push(opened),
                Err(e) => assert!(matches!(e, AppError::Conflict(_)), "{}", e),
            }
        }
        assert_eq!(created.len(), 1);

        // Losers leave no profile behind
        let store = db.memory_store().unwrap();
        let users = store.query(&Query::new(CollectionRef::root(collections::USERS)));
        assert_eq!(users.len(), 1);

        let credentials = db.get_credentials("ruth@example.com").await.unwrap().unwrap();
        assert_eq!(credentials.user_id, created[0].session.user_id);
        assert!(service.resolve(&created[0].token).await.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let (service, _db) = service();
        service.sign_up(&form("rightpass", "rightpass")).await.unwrap();
        let err = service
            .sign_in(&SignInForm {
                email: "ruth@example.com".to_string(),
                password: "wrongpass".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Invalid request: {}", INVALID_LOGIN));
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let db = FirestoreDb::new_in_memory();
        let outbox = MailOutbox::new();
        let service = SessionService::new(
            db.clone(),
            b"test_jwt_key_32_bytes_minimum!!",
            outbox.clone(),
        );
        let first = service.sign_up(&form("oldpass1", "oldpass1")).await.unwrap();

        assert_eq!(
            service.request_password_reset("nobody@example.com").await.unwrap(),
            service.request_password_reset("ruth@example.com").await.unwrap(),
        );

        let mail = outbox.last_to("ruth@example.com").unwrap();
        let token = mail.body.rsplit(' ').next().unwrap().to_string();
        let confirm = ResetConfirmForm {
            token: token.clone(),
            password: "newpass1".to_string(),
            confirm_password: "newpass1".to_string(),
        };
        service.confirm_password_reset(&confirm).await.unwrap();

        // Sessions opened before the reset are closed
        assert!(matches!(
            service.resolve(&first.token).await,
            Err(AppError::InvalidToken)
        ));

        // Token is single-use
        assert!(service.confirm_password_reset(&confirm).await.is_err());

        let login = SignInForm {
            email: "ruth@example.com".to_string(),
            password: "newpass1".to_string(),
        };
        assert!(service.sign_in(&login).await.is_ok());
    }
}
