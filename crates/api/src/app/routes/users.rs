use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use eventsphere_auth::{User, UserProfile, UserUpdate, normalize_email};
use eventsphere_core::{DomainError, ExpectedVersion, UserId};

use crate::app::dto;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::{create, fetch, list_values, parse_id};
use crate::app::routes::dashboard;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/dashboard", get(dashboard::user_dashboard))
}

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SignupRequest>,
) -> ApiResult {
    let user = User::register(body.into_new_user(), Utc::now())?;

    let stored = {
        let _guard = services.serial_writes().await;
        ensure_email_free(&services, &user.email, None).await?;
        create(services.users(), user).await?
    };
    let user = stored.value;

    let token = services.issue_token(&user)?;
    tracing::info!(user_id = %user.id, role = %user.role, "user signed up");

    Ok(dto::ok(
        StatusCode::CREATED,
        "User registered",
        dto::AuthResponse {
            user: user.profile(),
            token,
        },
    ))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> ApiResult {
    let invalid = || ApiError::unauthorized("invalid email or password");

    let email = normalize_email(&body.email).map_err(|_| invalid())?;
    let user = find_by_email(&services, &email).await?.ok_or_else(invalid)?;
    if !user.verify_password(&body.password) {
        tracing::info!(user_id = %user.id, "login rejected");
        return Err(invalid());
    }

    let token = services.issue_token(&user)?;
    Ok(dto::ok(
        StatusCode::OK,
        "Login successful",
        dto::AuthResponse {
            user: user.profile(),
            token,
        },
    ))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> ApiResult {
    authz::require_admin(&principal)?;

    let users = list_values(services.users())
        .await?
        .iter()
        .map(User::profile)
        .collect::<Vec<UserProfile>>();
    Ok(dto::ok(StatusCode::OK, "Users fetched", users))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let user_id: UserId = parse_id(&id)?;
    authz::ensure_self_or_admin(&principal, user_id)?;

    let user = fetch(services.users(), &user_id, "user").await?.value;
    Ok(dto::ok(StatusCode::OK, "User fetched", user.profile()))
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateUserRequest>,
) -> ApiResult {
    let user_id: UserId = parse_id(&id)?;
    authz::ensure_self_or_admin(&principal, user_id)?;
    if body.role.is_some() {
        authz::require_admin(&principal)?;
    }

    let update = UserUpdate::from(body);
    let _guard = services.serial_writes().await;

    let current = fetch(services.users(), &user_id, "user").await?;
    let mut user = current.value;
    user.apply_update(update, Utc::now())?;
    ensure_email_free(&services, &user.email, Some(user_id)).await?;

    let stored = services
        .users()
        .update(user_id, user, ExpectedVersion::Exact(current.version))
        .await?;

    tracing::info!(user_id = %user_id, "user updated");
    Ok(dto::ok(StatusCode::OK, "User updated", stored.value.profile()))
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let user_id: UserId = parse_id(&id)?;
    authz::ensure_self_or_admin(&principal, user_id)?;

    if !services.users().delete(&user_id).await? {
        return Err(ApiError::not_found(format!("user {user_id} not found")));
    }

    tracing::info!(user_id = %user_id, "user deleted");
    Ok(dto::ok(StatusCode::OK, "User deleted", serde_json::json!({ "id": user_id })))
}

async fn find_by_email(services: &AppServices, email: &str) -> Result<Option<User>, ApiError> {
    Ok(list_values(services.users())
        .await?
        .into_iter()
        .find(|u| u.email == email))
}

/// Emails are unique; `except` is the user being updated.
async fn ensure_email_free(
    services: &AppServices,
    email: &str,
    except: Option<UserId>,
) -> Result<(), ApiError> {
    match find_by_email(services, email).await? {
        Some(existing) if Some(existing.id) != except => {
            Err(DomainError::conflict(format!("email {email} is already registered")).into())
        }
        _ => Ok(()),
    }
}
