//! Signup, OTP verification, login and password-reset endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{patch, post};
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::rate_limit::auth_rate_limit;
use crate::core::shared::errors::ApiError;
use crate::core::shared::models::{PublicUser, User, UserRole};
use crate::core::shared::schema::users;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::{generate_code, generate_secure_token, sha256_hex};
use crate::security::jwt;
use crate::security::password::{hash_password, verify_password};

const OTP_LENGTH: usize = 4;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RequestNewOtpRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

fn validate_signup(req: &SignupRequest) -> Result<(), ApiError> {
    if req.first_name.trim().len() < 2 {
        return Err(ApiError::Validation(
            "First name must be at least 2 characters".into(),
        ));
    }
    if req.last_name.trim().len() < 2 {
        return Err(ApiError::Validation(
            "Last name must be at least 2 characters".into(),
        ));
    }
    if !is_valid_email(req.email.trim()) {
        return Err(ApiError::Validation("Invalid email format".into()));
    }
    if req.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }
    Ok(())
}

/// Staff accounts only come from the invitation flow; public signup is
/// limited to end-user roles.
fn signup_role(requested: Option<UserRole>) -> Result<UserRole, ApiError> {
    match requested {
        None => Ok(UserRole::Customer),
        Some(role @ (UserRole::Customer | UserRole::Vendor)) => Ok(role),
        Some(_) => Err(ApiError::Validation(
            "Staff accounts are created by invitation".into(),
        )),
    }
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn find_by_email(
    conn: &mut PgConnection,
    email: &str,
) -> Result<Option<User>, diesel::result::Error> {
    users::table
        .filter(users::email.eq(email))
        .first(conn)
        .optional()
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    validate_signup(&req)?;
    let role = signup_role(req.role)?;
    let email = normalize_email(&req.email);

    let mut conn = state.conn.get()?;
    if find_by_email(&mut conn, &email)?.is_some() {
        return Err(ApiError::Validation("User already exist".into()));
    }

    let password_hash =
        hash_password(&req.password).map_err(|e| ApiError::Internal(e.to_string()))?;
    let otp = generate_code(OTP_LENGTH);
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        email,
        password_hash,
        role: role.as_str().to_string(),
        email_verified: false,
        is_active: true,
        otp: Some(otp.clone()),
        otp_expires: Some(now + Duration::minutes(state.config.auth.otp_ttl_minutes)),
        invite_token: None,
        invite_expires: None,
        password_reset_token: None,
        password_reset_expires: None,
        assigned_department: None,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(users::table)
        .values(&user)
        .execute(&mut conn)?;

    state
        .mailer
        .send_verification_code(&user.email, &user.first_name, &otp);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "message": "Email sent to your email for verification",
            "email": user.email,
        })),
    ))
}

pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(raw_email), Some(otp)) = (req.email, req.otp) else {
        return Err(ApiError::Validation("Email and OTP are required".into()));
    };
    let email = normalize_email(&raw_email);

    let mut conn = state.conn.get()?;
    let user = find_by_email(&mut conn, &email)?
        .ok_or_else(|| ApiError::NotFound("User not found with this email".into()))?;

    if user.otp.is_none() || user.otp_expires.is_none() {
        return Err(ApiError::Validation("OTP not found or already used".into()));
    }
    if !user.otp_is_valid(Utc::now()) {
        return Err(ApiError::Validation("OTP is expired".into()));
    }
    if user.otp.as_deref() != Some(otp.trim()) {
        return Err(ApiError::Validation("Invalid verification code".into()));
    }

    diesel::update(users::table.filter(users::id.eq(user.id)))
        .set((
            users::email_verified.eq(true),
            users::otp.eq(None::<String>),
            users::otp_expires.eq(None::<DateTime<Utc>>),
            users::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

    let mut verified = user;
    verified.email_verified = true;
    verified.otp = None;
    verified.otp_expires = None;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Email verified successfully",
        "data": PublicUser::from(&verified),
    })))
}

pub async fn request_new_otp(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RequestNewOtpRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(raw_email) = req.email else {
        return Err(ApiError::Validation("Email is required".into()));
    };
    let email = normalize_email(&raw_email);

    let mut conn = state.conn.get()?;
    let user = find_by_email(&mut conn, &email)?
        .ok_or_else(|| ApiError::NotFound("User not found with this email".into()))?;

    if user.email_verified {
        return Err(ApiError::Validation("Email is already verified".into()));
    }

    let otp = generate_code(OTP_LENGTH);
    diesel::update(users::table.filter(users::id.eq(user.id)))
        .set((
            users::otp.eq(Some(otp.clone())),
            users::otp_expires
                .eq(Some(Utc::now() + Duration::minutes(state.config.auth.otp_ttl_minutes))),
            users::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

    state
        .mailer
        .send_verification_code(&user.email, &user.first_name, &otp);

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "New verification code sent to your email",
        "email": user.email,
    })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !is_valid_email(req.email.trim()) {
        return Err(ApiError::Validation("Invalid email format".into()));
    }
    if req.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    let email = normalize_email(&req.email);
    let mut conn = state.conn.get()?;
    // Same response for unknown email and wrong password.
    let user = find_by_email(&mut conn, &email)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".into()))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::Unauthorized("Invalid email or password".into()));
    }
    if !user.email_verified {
        return Err(ApiError::Unauthorized(
            "Please verify your email to login".into(),
        ));
    }
    if !user.is_active {
        return Err(ApiError::Unauthorized("Account is deactivated".into()));
    }

    let access_token = jwt::issue_token(
        user.id,
        &state.config.auth.jwt_secret,
        state.config.auth.token_expiry_hours,
    )
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "login successfully",
        "data": {
            "user": PublicUser::from(&user),
            "accessToken": access_token,
        },
    })))
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = normalize_email(&req.email);
    let mut conn = state.conn.get()?;
    let user = find_by_email(&mut conn, &email)?
        .ok_or_else(|| ApiError::NotFound("No user found with this email".into()))?;

    let raw_token = generate_secure_token();
    diesel::update(users::table.filter(users::id.eq(user.id)))
        .set((
            users::password_reset_token.eq(Some(sha256_hex(&raw_token))),
            users::password_reset_expires
                .eq(Some(Utc::now() + Duration::minutes(state.config.auth.reset_ttl_minutes))),
            users::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

    let reset_url = state.mailer.reset_url(&raw_token);
    state
        .mailer
        .send_password_reset(&user.email, &user.first_name, &reset_url);

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Password reset link sent to your email",
    })))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    let hashed = sha256_hex(&token);
    let mut conn = state.conn.get()?;
    let user: Option<User> = users::table
        .filter(users::password_reset_token.eq(&hashed))
        .first(&mut conn)
        .optional()?;
    let user = user.ok_or_else(|| ApiError::Validation("Invalid or expired token".into()))?;
    if !user.reset_token_is_valid(Utc::now()) {
        return Err(ApiError::Validation("Invalid or expired token".into()));
    }

    let password_hash =
        hash_password(&req.password).map_err(|e| ApiError::Internal(e.to_string()))?;
    diesel::update(users::table.filter(users::id.eq(user.id)))
        .set((
            users::password_hash.eq(password_hash),
            users::password_reset_token.eq(None::<String>),
            users::password_reset_expires.eq(None::<DateTime<Utc>>),
            users::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

    let access_token = jwt::issue_token(
        user.id,
        &state.config.auth.jwt_secret,
        state.config.auth.token_expiry_hours,
    )
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Password reset successfully",
        "data": {
            "user": PublicUser::from(&user),
            "accessToken": access_token,
        },
    })))
}

pub fn configure_auth_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/verify-otp", post(verify_otp))
        .route("/request-new-otp", post(request_new_otp))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/:token", patch(reset_password))
        .route_layer(middleware::from_fn_with_state(state, auth_rate_limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+tag@sub.example.co"));
        assert!(!is_valid_email("ada"));
        assert!(!is_valid_email("ada@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@nodot"));
        assert!(!is_valid_email("ada@.com"));
        assert!(!is_valid_email("a da@example.com"));
    }

    #[test]
    fn signup_validation_messages() {
        let mut req = SignupRequest {
            first_name: "A".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password: "secret123".into(),
            role: None,
        };
        assert!(validate_signup(&req).is_err());

        req.first_name = "Ada".into();
        assert!(validate_signup(&req).is_ok());

        req.password = "short".into();
        let err = validate_signup(&req).unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters");
    }

    #[test]
    fn signup_role_is_restricted_to_end_users() {
        assert_eq!(signup_role(None).unwrap(), UserRole::Customer);
        assert_eq!(
            signup_role(Some(UserRole::Vendor)).unwrap(),
            UserRole::Vendor
        );
        assert!(signup_role(Some(UserRole::Admin)).is_err());
        assert!(signup_role(Some(UserRole::SupportAgent)).is_err());
        assert!(signup_role(Some(UserRole::Manager)).is_err());
    }

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }
}
