//! Accounts API handlers: sign-up, verification, login, token refresh,
//! password change, Google sign-in, profile, and test drives.
//!
//! ```text
//! POST /api/v1/accounts/sign-up
//! GET  /api/v1/accounts/verify/{token}
//! POST /api/v1/accounts/login
//! POST /api/v1/accounts/refresh
//! POST /api/v1/accounts/change-password
//! POST /api/v1/accounts/google
//! GET  /api/v1/accounts/me
//! POST /api/v1/accounts/me?email=…
//! POST /api/v1/test-drives
//! ```

use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Deserialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::accounts::{
    hash_password, random_password, validate_email, verify_password, AccountUpdate, Credentials,
    PasswordChange, Profile, SignUp, TestDriveFilter, TestDriveRequest, PROFILE_FILE_FIELDS,
};
use crate::domain::catalog::validate_image_ref;
use crate::domain::envelope::{shape_many, shape_one};
use crate::domain::ports::{Mail, NewAccount, ProfileChanges};
use crate::domain::{
    DomainError, Envelope, Predicate, QueryFilter, TokenError, TokenKind, TokenPair,
};

use super::auth::AuthedUser;
use super::error::respond;
use super::state::HttpState;

/// Refresh-token exchange payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Google sign-in payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GoogleSignIn {
    pub id_token: String,
}

/// Optional target account for profile updates; defaults to the caller.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProfileTarget {
    pub email: Option<String>,
}

fn unauthorized_token(error: TokenError) -> DomainError {
    DomainError::unauthorized(error.to_string()).on_field("token")
}

fn token_pair_data(pair: &TokenPair) -> Result<Vec<serde_json::Value>, DomainError> {
    serde_json::to_value(pair)
        .map(|value| vec![value])
        .map_err(|err| DomainError::internal(format!("token serialization failed: {err}")))
}

/// Register an inactive account and send the verification mail; a failed
/// dispatch removes the account again so sign-up stays retryable.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/sign-up",
    request_body = SignUp,
    responses(
        (status = 201, description = "Verification mail sent", body = Envelope),
        (status = 400, description = "Validation failure", body = Envelope),
        (status = 502, description = "Mail dispatch failed", body = Envelope)
    ),
    tags = ["accounts"],
    operation_id = "sign_up"
)]
#[post("/accounts/sign-up")]
pub async fn sign_up(state: web::Data<HttpState>, payload: web::Json<SignUp>) -> HttpResponse {
    let signup = payload.into_inner();
    let outcome = async {
        signup.validate()?;
        let existing = state
            .accounts
            .find_by_username_or_email(&signup.username, &signup.email)
            .await?;
        if existing.is_some() {
            return Err(DomainError::invalid_request(
                "an account with this username or email already exists",
            )
            .on_field("username"));
        }
        let password_hash = hash_password(&signup.password)?;
        let account = state
            .accounts
            .insert(NewAccount {
                username: signup.username,
                email: signup.email,
                password_hash,
                active: false,
            })
            .await?;

        let token = state
            .tokens
            .issue(&account.username, &account.email, TokenKind::Access)?;
        let link = state
            .public_base
            .join(&format!("api/v1/accounts/verify/{token}"))
            .map_err(|err| DomainError::internal(format!("verification link failed: {err}")))?;
        let mail = Mail {
            subject: "Verify your account".to_owned(),
            to: account.email.clone(),
            body: format!("Hi {}, follow {link} to verify your account.", account.username),
        };
        if let Err(err) = state.mailer.send(mail).await {
            debug!(error = %err, "verification mail failed, removing account");
            state.accounts.delete(account.id).await?;
            return Err(
                DomainError::transport("verification mail could not be sent").on_field("email"),
            );
        }
        Ok(Envelope::created("verification mail sent"))
    }
    .await;
    respond(outcome)
}

/// Activate the account named by a valid verification token.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/verify/{token}",
    responses(
        (status = 200, description = "Account activated", body = Envelope),
        (status = 401, description = "Invalid or expired token", body = Envelope),
        (status = 404, description = "Account no longer exists", body = Envelope)
    ),
    tags = ["accounts"],
    operation_id = "verify_account"
)]
#[get("/accounts/verify/{token}")]
pub async fn verify_account(state: web::Data<HttpState>, token: web::Path<String>) -> HttpResponse {
    let outcome = async {
        let claims = state.tokens.verify(&token).map_err(unauthorized_token)?;
        if claims.kind != TokenKind::Access {
            return Err(DomainError::unauthorized("an access token is required").on_field("token"));
        }
        let account = state
            .accounts
            .find_by_email(&claims.email)
            .await?
            .ok_or_else(|| DomainError::not_found("account does not exist").on_field("email"))?;
        state.accounts.activate(account.id).await?;
        Ok(Envelope::ok().describe("account verified successfully"))
    }
    .await;
    respond(outcome)
}

/// Password login; only verified accounts may log in.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Token pair", body = Envelope),
        (status = 401, description = "Bad credentials or unverified", body = Envelope)
    ),
    tags = ["accounts"],
    operation_id = "login"
)]
#[post("/accounts/login")]
pub async fn login(state: web::Data<HttpState>, payload: web::Json<Credentials>) -> HttpResponse {
    let credentials = payload.into_inner();
    let outcome = async {
        let account = state
            .accounts
            .find_by_email(&credentials.email)
            .await?
            .ok_or_else(|| {
                DomainError::unauthorized("invalid email or password").on_field("email")
            })?;
        if !verify_password(&credentials.password, &account.password_hash) {
            return Err(DomainError::unauthorized("invalid email or password").on_field("email"));
        }
        if !account.active {
            return Err(
                DomainError::unauthorized("account is not verified yet").on_field("email")
            );
        }
        let pair = state.tokens.issue_pair(&account.username, &account.email)?;
        Ok(Envelope::ok()
            .describe("login successful")
            .with_data(token_pair_data(&pair)?))
    }
    .await;
    respond(outcome)
}

/// Exchange a refresh token for a fresh pair. Access tokens are refused.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Fresh token pair", body = Envelope),
        (status = 401, description = "Invalid, expired or wrong-kind token", body = Envelope)
    ),
    tags = ["accounts"],
    operation_id = "refresh"
)]
#[post("/accounts/refresh")]
pub async fn refresh(
    state: web::Data<HttpState>,
    payload: web::Json<RefreshRequest>,
) -> HttpResponse {
    let request = payload.into_inner();
    let outcome = async {
        let claims = state
            .tokens
            .verify(&request.refresh_token)
            .map_err(unauthorized_token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(
                DomainError::unauthorized("a refresh token is required").on_field("token")
            );
        }
        let account = state
            .accounts
            .find_by_email(&claims.email)
            .await?
            .ok_or_else(|| {
                DomainError::unauthorized("account no longer exists").on_field("token")
            })?;
        let pair = state.tokens.issue_pair(&account.username, &account.email)?;
        Ok(Envelope::ok()
            .describe("token refreshed")
            .with_data(token_pair_data(&pair)?))
    }
    .await;
    respond(outcome)
}

/// Replace the account password; the confirmation must match.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/change-password",
    request_body = PasswordChange,
    responses(
        (status = 200, description = "Password replaced", body = Envelope),
        (status = 400, description = "Confirmation mismatch", body = Envelope),
        (status = 404, description = "Unknown account", body = Envelope)
    ),
    tags = ["accounts"],
    operation_id = "change_password"
)]
#[post("/accounts/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    payload: web::Json<PasswordChange>,
) -> HttpResponse {
    let change = payload.into_inner();
    let outcome = async {
        change.validate()?;
        let account = state
            .accounts
            .find_by_email(&change.email)
            .await?
            .ok_or_else(|| DomainError::not_found("account does not exist").on_field("email"))?;
        let hash = hash_password(&change.password)?;
        state.accounts.set_password_hash(account.id, &hash).await?;
        Ok(Envelope::ok().describe("password changed successfully"))
    }
    .await;
    respond(outcome)
}

/// Google sign-in: verify the ID token, upsert the account, issue a pair.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/google",
    request_body = GoogleSignIn,
    responses(
        (status = 200, description = "Token pair", body = Envelope),
        (status = 401, description = "Rejected Google token", body = Envelope),
        (status = 502, description = "Verification endpoint unreachable", body = Envelope)
    ),
    tags = ["accounts"],
    operation_id = "google_sign_in"
)]
#[post("/accounts/google")]
pub async fn google_sign_in(
    state: web::Data<HttpState>,
    payload: web::Json<GoogleSignIn>,
) -> HttpResponse {
    let request = payload.into_inner();
    let outcome = async {
        let identity = state.google.verify(&request.id_token).await?;
        let account = match state.accounts.find_by_email(&identity.email).await? {
            Some(account) => account,
            None => {
                // First sign-in: provision an already-verified account with
                // an unguessable local password.
                let password_hash = hash_password(&random_password())?;
                state
                    .accounts
                    .insert(NewAccount {
                        username: identity.name,
                        email: identity.email,
                        password_hash,
                        active: true,
                    })
                    .await?
            }
        };
        let pair = state.tokens.issue_pair(&account.username, &account.email)?;
        Ok(Envelope::ok()
            .describe("login successful")
            .with_data(token_pair_data(&pair)?))
    }
    .await;
    respond(outcome)
}

/// The caller's profile, with the avatar resolved to an absolute URL.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/me",
    responses(
        (status = 200, description = "Profile", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["accounts"],
    operation_id = "profile"
)]
#[get("/accounts/me")]
pub async fn profile(user: AuthedUser, state: web::Data<HttpState>) -> HttpResponse {
    let outcome = async {
        let account = state
            .accounts
            .find_by_email(&user.0.email)
            .await?
            .ok_or_else(|| {
                DomainError::unauthorized("account no longer exists").on_field("token")
            })?;
        let avatar = state.accounts.avatar(account.id).await?;
        let profile = Profile {
            username: account.username,
            email: account.email,
            avatar,
        };
        let data = shape_one(&profile, PROFILE_FILE_FIELDS, &state.files)?;
        Ok(Envelope::ok().with_data(vec![data]))
    }
    .await;
    respond(outcome)
}

/// Clean-empty profile update; passwords are re-hashed and avatars upserted.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/me",
    request_body = AccountUpdate,
    responses(
        (status = 200, description = "Updated profile", body = Envelope),
        (status = 400, description = "Validation failure", body = Envelope),
        (status = 404, description = "Unknown account", body = Envelope)
    ),
    tags = ["accounts"],
    operation_id = "update_profile"
)]
#[post("/accounts/me")]
pub async fn update_profile(
    user: AuthedUser,
    state: web::Data<HttpState>,
    target: web::Query<ProfileTarget>,
    payload: web::Json<AccountUpdate>,
) -> HttpResponse {
    let update = payload.into_inner().clean_empty();
    let target_email = target
        .into_inner()
        .email
        .unwrap_or_else(|| user.0.email.clone());
    let outcome = async {
        let account = state
            .accounts
            .find_by_email(&target_email)
            .await?
            .ok_or_else(|| DomainError::not_found("account does not exist").on_field("email"))?;
        if let Some(email) = &update.email {
            validate_email(email)?;
        }
        if let Some(avatar) = &update.avatar {
            validate_image_ref(avatar)?;
        }
        let password_hash = update.password.as_deref().map(hash_password).transpose()?;
        state
            .accounts
            .update_profile(
                account.id,
                ProfileChanges {
                    username: update.username,
                    email: update.email,
                    password_hash,
                },
            )
            .await?;
        if let Some(avatar) = &update.avatar {
            state.accounts.set_avatar(account.id, avatar).await?;
        }

        let reloaded = state
            .accounts
            .find_by_id(account.id)
            .await?
            .ok_or_else(|| DomainError::not_found("account does not exist").on_field("email"))?;
        let avatar = state.accounts.avatar(reloaded.id).await?;
        let reloaded_profile = Profile {
            username: reloaded.username,
            email: reloaded.email,
            avatar,
        };
        let data = shape_one(&reloaded_profile, PROFILE_FILE_FIELDS, &state.files)?;
        Ok(Envelope::ok()
            .describe("profile updated successfully")
            .with_data(vec![data]))
    }
    .await;
    respond(outcome)
}

/// Request a test drive; the named account must exist.
#[utoipa::path(
    post,
    path = "/api/v1/test-drives",
    request_body = TestDriveRequest,
    responses(
        (status = 201, description = "Test drive recorded", body = Envelope),
        (status = 404, description = "No matching account", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["test-drives"],
    operation_id = "request_test_drive"
)]
#[post("/test-drives")]
pub async fn request_test_drive(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    payload: web::Json<TestDriveRequest>,
) -> HttpResponse {
    let request = payload.into_inner();
    let outcome = async {
        let account = state
            .accounts
            .find_by_username_and_email(&request.username, &request.email)
            .await?;
        if account.is_none() {
            return Err(DomainError::not_found(
                "no account matches the given username and email",
            )
            .on_field("user"));
        }
        let drive = state
            .test_drives
            .insert(&request.username, &request.email)
            .await?;
        let data = shape_many(&[drive], &[], &state.files)?;
        Ok(Envelope::created("test drive requested").with_data(data))
    }
    .await;
    respond(outcome)
}

/// List test-drive requests matching the filter.
#[utoipa::path(
    get,
    path = "/api/v1/test-drives",
    responses(
        (status = 200, description = "Matching requests", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["test-drives"],
    operation_id = "list_test_drives"
)]
#[get("/test-drives")]
pub async fn list_test_drives(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    filter: web::Query<TestDriveFilter>,
) -> HttpResponse {
    let predicate = Predicate::from_filter(&filter.normalize());
    let outcome = async {
        let drives = state.test_drives.list(&predicate).await?;
        let data = shape_many(&drives, &[], &state.files)?;
        Ok(Envelope::ok().with_data(data))
    }
    .await;
    respond(outcome)
}

/// Bulk-update test-drive requests matching the filter.
#[utoipa::path(
    patch,
    path = "/api/v1/test-drives",
    request_body = TestDriveFilter,
    responses(
        (status = 200, description = "Updated requests", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["test-drives"],
    operation_id = "update_test_drives"
)]
#[patch("/test-drives")]
pub async fn update_test_drives(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    filter: web::Query<TestDriveFilter>,
    payload: web::Json<TestDriveFilter>,
) -> HttpResponse {
    let patch = payload.into_inner();
    let predicate = Predicate::from_filter(&filter.normalize());
    let outcome = async {
        let (updated, drives) = state.test_drives.update(&predicate, patch).await?;
        let data = shape_many(&drives, &[], &state.files)?;
        Ok(Envelope::ok()
            .describe(format!("{updated} test drives updated"))
            .with_data(data))
    }
    .await;
    respond(outcome)
}

/// Delete test-drive requests matching the filter.
#[utoipa::path(
    delete,
    path = "/api/v1/test-drives",
    responses(
        (status = 200, description = "Deletion count", body = Envelope),
        (status = 401, description = "Missing or invalid token", body = Envelope)
    ),
    tags = ["test-drives"],
    operation_id = "delete_test_drives"
)]
#[delete("/test-drives")]
pub async fn delete_test_drives(
    _user: AuthedUser,
    state: web::Data<HttpState>,
    filter: web::Query<TestDriveFilter>,
) -> HttpResponse {
    let predicate = Predicate::from_filter(&filter.normalize());
    let outcome = async {
        let removed = state.test_drives.delete(&predicate).await?;
        Ok(Envelope::ok().describe(format!("{removed} test drives deleted")))
    }
    .await;
    respond(outcome)
}
