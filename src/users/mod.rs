//! Account management: profile, role assignment and the staff invitation
//! flow.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::middleware::{require_auth, CurrentUser};
use crate::core::shared::errors::{ApiError, ApiResponse};
use crate::core::shared::models::{PublicUser, User, UserRole};
use crate::core::shared::schema::users;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::generate_secure_token;
use crate::security::jwt;
use crate::security::password::hash_password;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Validated profile fields, applied as one UPDATE.
#[derive(Debug, Default, PartialEq, AsChangeset)]
#[diesel(table_name = users)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub fn profile_changes(req: &UpdateMeRequest) -> Result<ProfileChanges, ApiError> {
    for name in [&req.first_name, &req.last_name].into_iter().flatten() {
        if name.trim().len() < 2 {
            return Err(ApiError::Validation(
                "Name must be at least 2 characters".into(),
            ));
        }
    }
    Ok(ProfileChanges {
        first_name: req.first_name.as_deref().map(|n| n.trim().to_string()),
        last_name: req.last_name.as_deref().map(|n| n.trim().to_string()),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub role_name: UserRole,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub assigned_department: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteRegistrationRequest {
    pub token: Option<String>,
    pub password: Option<String>,
}

pub async fn my_info(user: CurrentUser) -> Json<ApiResponse<PublicUser>> {
    Json(ApiResponse::new(PublicUser::from(&user.0)))
}

pub async fn update_me(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<UpdateMeRequest>,
) -> Result<Json<ApiResponse<PublicUser>>, ApiError> {
    let changes = profile_changes(&req)?;

    let mut conn = state.conn.get()?;
    diesel::update(users::table.filter(users::id.eq(user.id())))
        .set((&changes, users::updated_at.eq(Utc::now())))
        .execute(&mut conn)?;

    let mut updated = user.0.clone();
    if let Some(first_name) = changes.first_name {
        updated.first_name = first_name;
    }
    if let Some(last_name) = changes.last_name {
        updated.last_name = last_name;
    }

    Ok(Json(ApiResponse::with_message(
        "User updated successfully",
        PublicUser::from(&updated),
    )))
}

/// Soft delete: the account row is kept, tickets and comments stay attributed.
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<StatusCode, ApiError> {
    let mut conn = state.conn.get()?;
    diesel::update(users::table.filter(users::id.eq(user.id())))
        .set((
            users::is_active.eq(false),
            users::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<PublicUser>>>, ApiError> {
    user.require_any_role(&[UserRole::Admin, UserRole::Manager])?;

    let mut conn = state.conn.get()?;
    let all: Vec<User> = users::table
        .order(users::created_at.desc())
        .load(&mut conn)?;

    Ok(Json(ApiResponse::new(
        all.iter().map(PublicUser::from).collect(),
    )))
}

pub async fn assign_role(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<AssignRoleRequest>,
) -> Result<Json<ApiResponse<PublicUser>>, ApiError> {
    user.require_any_role(&[UserRole::Admin])?;

    let mut conn = state.conn.get()?;
    let updated = diesel::update(users::table.filter(users::id.eq(user_id)))
        .set((
            users::role.eq(req.role_name.as_str()),
            users::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;
    if updated == 0 {
        return Err(ApiError::NotFound("User not found".into()));
    }

    let target: User = users::table.filter(users::id.eq(user_id)).first(&mut conn)?;
    Ok(Json(ApiResponse::with_message(
        "Role assigned successfully",
        PublicUser::from(&target),
    )))
}

pub async fn invite_user(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<InviteUserRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    user.require_any_role(&[UserRole::Admin])?;

    if req.first_name.trim().len() < 2 || req.last_name.trim().len() < 2 {
        return Err(ApiError::Validation(
            "Name must be at least 2 characters".into(),
        ));
    }
    let email = req.email.trim().to_lowercase();

    let mut conn = state.conn.get()?;
    let exists: Option<User> = users::table
        .filter(users::email.eq(&email))
        .first(&mut conn)
        .optional()?;
    if exists.is_some() {
        return Err(ApiError::Validation(
            "User with this email already exists".into(),
        ));
    }

    // The account stays locked until the invitee sets their own password.
    let throwaway = generate_secure_token();
    let password_hash =
        hash_password(&throwaway).map_err(|e| ApiError::Internal(e.to_string()))?;
    let invite_token = generate_secure_token();
    let now = Utc::now();
    let invite_expires = now + Duration::days(state.config.auth.invite_ttl_days);

    let invited = User {
        id: Uuid::new_v4(),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        email,
        password_hash,
        role: req.role.as_str().to_string(),
        email_verified: false,
        is_active: false,
        otp: None,
        otp_expires: None,
        invite_token: Some(invite_token.clone()),
        invite_expires: Some(invite_expires),
        password_reset_token: None,
        password_reset_expires: None,
        assigned_department: req.assigned_department,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(users::table)
        .values(&invited)
        .execute(&mut conn)?;

    let invite_url = state.mailer.invite_url(&invite_token);
    state.mailer.send_invitation(
        &invited.email,
        &invited.full_name(),
        &invited.role,
        &invite_url,
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "message": "Invitation sent successfully",
            "data": {
                "userId": invited.id,
                "email": invited.email,
                "expiresAt": invite_expires,
            },
        })),
    ))
}

pub async fn complete_registration(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompleteRegistrationRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(token), Some(password)) = (req.token, req.password) else {
        return Err(ApiError::Validation(
            "Token and password are required".into(),
        ));
    };
    if password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    let mut conn = state.conn.get()?;
    let user: Option<User> = users::table
        .filter(users::invite_token.eq(&token))
        .first(&mut conn)
        .optional()?;
    let user = user.ok_or_else(|| ApiError::Validation("Invalid invitation token".into()))?;

    if !user.invite_is_valid(Utc::now()) {
        return Err(ApiError::Validation("Invitation token has expired".into()));
    }

    let password_hash =
        hash_password(&password).map_err(|e| ApiError::Internal(e.to_string()))?;
    diesel::update(users::table.filter(users::id.eq(user.id)))
        .set((
            users::password_hash.eq(password_hash),
            users::email_verified.eq(true),
            users::is_active.eq(true),
            users::invite_token.eq(None::<String>),
            users::invite_expires.eq(None::<DateTime<Utc>>),
            users::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

    let access_token = jwt::issue_token(
        user.id,
        &state.config.auth.jwt_secret,
        state.config.auth.token_expiry_hours,
    )
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    let mut activated = user;
    activated.email_verified = true;
    activated.is_active = true;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Registration completed successfully",
        "data": {
            "user": PublicUser::from(&activated),
            "accessToken": access_token,
        },
    })))
}

pub fn configure_user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/me", get(my_info).patch(update_me).delete(delete_me))
        .route("/all", get(list_users))
        .route("/:user_id/assign-role", patch(assign_role))
        .route("/invite-user", post(invite_user))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/complete-registration", post(complete_registration))
        .merge(protected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_update_is_a_single_validated_changeset() {
        let req = UpdateMeRequest {
            first_name: Some("  Ada ".into()),
            last_name: None,
        };
        let changes = profile_changes(&req).unwrap();
        assert_eq!(changes.first_name.as_deref(), Some("Ada"));
        assert!(changes.last_name.is_none());
    }

    #[test]
    fn short_names_rejected() {
        let req = UpdateMeRequest {
            first_name: Some("A".into()),
            last_name: None,
        };
        assert!(profile_changes(&req).is_err());

        let req = UpdateMeRequest {
            first_name: None,
            last_name: Some(" B ".into()),
        };
        assert!(profile_changes(&req).is_err());
    }

    #[test]
    fn empty_request_yields_empty_changeset() {
        let req = UpdateMeRequest {
            first_name: None,
            last_name: None,
        };
        assert_eq!(profile_changes(&req).unwrap(), ProfileChanges::default());
    }
}
