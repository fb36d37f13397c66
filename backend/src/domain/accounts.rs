//! Account domain: user accounts, credentials, and test-drive requests.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidateEmail;

use crate::domain::filter::{NormalizedFilter, QueryFilter};
use crate::domain::DomainError;

/// A stored account. The password hash never serializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// False until the verification link is followed.
    pub active: bool,
}

impl Account {
    #[must_use]
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public identity subset embedded in order responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccountSummary {
    pub username: String,
    pub email: String,
}

/// Profile view with a resolvable avatar reference.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// Avatar is the only file-backed profile field.
pub const PROFILE_FILE_FIELDS: &[&str] = &["avatar"];

/// Sign-up payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignUp {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignUp {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.username.trim().is_empty() {
            return Err(DomainError::invalid_request("username must not be empty")
                .on_field("username"));
        }
        if self.password.is_empty() {
            return Err(DomainError::invalid_request("password must not be empty")
                .on_field("password"));
        }
        validate_email(&self.email)
    }
}

/// Login payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Password-change payload; password and confirmation must agree.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PasswordChange {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl PasswordChange {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.password != self.confirm_password {
            return Err(DomainError::invalid_request(
                "password and confirm password should be the same",
            )
            .on_field("password"));
        }
        Ok(())
    }
}

/// Profile update: every field optional, empty strings count as unset.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AccountUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

impl AccountUpdate {
    #[must_use]
    pub fn clean_empty(mut self) -> Self {
        for slot in [
            &mut self.username,
            &mut self.email,
            &mut self.password,
            &mut self.avatar,
        ] {
            if slot.as_deref() == Some("") {
                *slot = None;
            }
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.avatar.is_none()
    }
}

/// A recorded test-drive request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TestDrive {
    pub id: i32,
    pub username: String,
    pub email: String,
}

/// Payload for requesting a test drive; must match an existing account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TestDriveRequest {
    pub username: String,
    pub email: String,
}

/// Filter and patch payload over test-drive records.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TestDriveFilter {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl QueryFilter for TestDriveFilter {
    fn normalize(&self) -> NormalizedFilter {
        let mut filter = NormalizedFilter::new();
        filter.insert_opt("username", self.username.as_deref());
        filter.insert_opt("email", self.email.as_deref());
        filter
    }
}

/// Syntactic email validation shared by sign-up and profile updates.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(DomainError::invalid_request("enter a valid email address").on_field("email"))
    }
}

/// Hash a raw password with Argon2 and a fresh salt.
pub fn hash_password(raw: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| DomainError::internal(format!("password hashing failed: {err}")))
}

/// Check a raw password against a stored hash.
#[must_use]
pub fn verify_password(raw: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|hash| {
            Argon2::default()
                .verify_password(raw.as_bytes(), &hash)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Throwaway password for accounts created through Google sign-in; the user
/// never learns it, so it only needs to be unguessable.
#[must_use]
pub fn random_password() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter2").expect("hashing succeeds");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[rstest]
    #[case("user@example.com", true)]
    #[case("not-an-email", false)]
    #[case("", false)]
    fn email_validation(#[case] email: &str, #[case] ok: bool) {
        assert_eq!(validate_email(email).is_ok(), ok);
    }

    #[rstest]
    fn password_change_requires_matching_confirmation() {
        let change = PasswordChange {
            email: "user@example.com".into(),
            password: "new".into(),
            confirm_password: "other".into(),
        };
        assert!(change.validate().is_err());
    }

    #[rstest]
    fn account_update_clean_empty_drops_blank_fields() {
        let update = AccountUpdate {
            username: Some(String::new()),
            email: Some("user@example.com".into()),
            ..AccountUpdate::default()
        }
        .clean_empty();
        assert!(update.username.is_none());
        assert_eq!(update.email.as_deref(), Some("user@example.com"));
    }

    #[rstest]
    fn random_passwords_differ() {
        assert_ne!(random_password(), random_password());
    }
}
