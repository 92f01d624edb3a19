use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use eventsphere_auth::permissions;
use eventsphere_core::{DomainError, ExpectedVersion, ExpoId, SessionId, UserId};
use eventsphere_expo::{Expo, ExpoPatch, Registration, Session};
use eventsphere_infra::modify_with_retry;

use crate::app::dto;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::{CmdAuth, create, fetch, list_values, parse_id};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

const SESSION_REGISTER_ATTEMPTS: usize = 3;

pub fn router() -> Router {
    Router::new()
        .route("/create", post(create_expo))
        .route("/updateexpo/:id", put(update_expo))
        .route("/:id", delete(delete_expo))
        .route("/schedule/:id", post(create_session))
        .route("/session/:sessionId/register", post(register_for_session))
        .route("/attendeeregister", post(attendee_register))
        .route("/registrations/:userId", get(list_registrations))
}

pub async fn list_expos(Extension(services): Extension<Arc<AppServices>>) -> ApiResult {
    let expos = list_values(services.expos()).await?;
    Ok(dto::ok(StatusCode::OK, "Expos fetched", expos))
}

pub async fn get_expo(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let expo_id: ExpoId = parse_id(&id)?;
    let expo = fetch(services.expos(), &expo_id, "expo").await?.value;
    Ok(dto::ok(StatusCode::OK, "Expo fetched", expo))
}

pub async fn create_expo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateExpoRequest>,
) -> ApiResult {
    authz::require_admin(&principal)?;

    let expo = Expo::create(body.into_new_expo(principal.user_id()), Utc::now())?;
    let stored = create(services.expos(), expo).await?;

    tracing::info!(expo_id = %stored.value.id, title = %stored.value.title, "expo created");
    Ok(dto::ok(StatusCode::CREATED, "Expo created", stored.value))
}

pub async fn update_expo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateExpoRequest>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let expo_id: ExpoId = parse_id(&id)?;

    let current = fetch(services.expos(), &expo_id, "expo").await?;
    let mut expo = current.value;
    let previous_status = expo.status;
    expo.apply_patch(ExpoPatch::from(body), Utc::now())?;

    let stored = services
        .expos()
        .update(expo_id, expo, ExpectedVersion::Exact(current.version))
        .await?;

    if stored.value.status != previous_status {
        tracing::info!(expo_id = %expo_id, from = %previous_status, to = %stored.value.status, "expo status changed");
    }
    Ok(dto::ok(StatusCode::OK, "Expo updated", stored.value))
}

/// Deleting an expo also drops its floor plan and schedule.
pub async fn delete_expo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let expo_id: ExpoId = parse_id(&id)?;

    if !services.expos().delete(&expo_id).await? {
        return Err(ApiError::not_found(format!("expo {expo_id} not found")));
    }
    services.floor_plans().delete(&expo_id).await?;
    for session in list_values(services.sessions()).await? {
        if session.expo_id == expo_id {
            services.sessions().delete(&session.id).await?;
        }
    }

    tracing::info!(expo_id = %expo_id, "expo deleted");
    Ok(dto::ok(StatusCode::OK, "Expo deleted", serde_json::json!({ "id": expo_id })))
}

pub async fn create_session(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::CreateSessionRequest>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let expo_id: ExpoId = parse_id(&id)?;
    fetch(services.expos(), &expo_id, "expo").await?;

    let session = Session::create(expo_id, body.into())?;
    let stored = create(services.sessions(), session).await?;

    tracing::info!(expo_id = %expo_id, session_id = %stored.value.id, "session scheduled");
    Ok(dto::ok(StatusCode::CREATED, "Session scheduled", stored.value))
}

/// Sessions of one expo, earliest first.
pub async fn list_schedule(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let expo_id: ExpoId = parse_id(&id)?;
    fetch(services.expos(), &expo_id, "expo").await?;

    let mut sessions: Vec<Session> = list_values(services.sessions())
        .await?
        .into_iter()
        .filter(|s| s.expo_id == expo_id)
        .collect();
    sessions.sort_by_key(|s| s.start_time);

    Ok(dto::ok(StatusCode::OK, "Schedule fetched", sessions))
}

pub async fn register_for_session(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(session_id): Path<String>,
    body: Option<Json<dto::OnBehalfRequest>>,
) -> ApiResult {
    let session_id: SessionId = parse_id(&session_id)?;
    let user_id = body
        .and_then(|Json(b)| b.user_id)
        .unwrap_or_else(|| principal.user_id());

    let cmd = CmdAuth {
        inner: user_id,
        required: vec![permissions::SESSION_REGISTER],
    };
    authz::authorize_command(&principal, &cmd)?;
    authz::ensure_self_or_admin(&principal, cmd.inner)?;

    let (stored, added) = modify_with_retry(
        services.sessions(),
        &session_id,
        SESSION_REGISTER_ATTEMPTS,
        |session| session.register_attendee(cmd.inner),
    )
    .await?;

    if added {
        tracing::info!(session_id = %session_id, user_id = %user_id, "session registration");
    }
    Ok(dto::ok(StatusCode::OK, "Registered for session", stored.value))
}

pub async fn attendee_register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::AttendeeRegisterRequest>,
) -> ApiResult {
    let user_id = body.user_id.unwrap_or_else(|| principal.user_id());
    let cmd = CmdAuth {
        inner: body,
        required: vec![permissions::EXPO_REGISTER],
    };
    authz::authorize_command(&principal, &cmd)?;
    authz::ensure_self_or_admin(&principal, user_id)?;
    let body = cmd.inner;

    fetch(services.expos(), &body.expo_id, "expo").await?;
    for session_id in &body.sessions {
        let session = fetch(services.sessions(), session_id, "session").await?.value;
        if session.expo_id != body.expo_id {
            return Err(DomainError::validation(format!(
                "session {session_id} does not belong to expo {}",
                body.expo_id
            ))
            .into());
        }
    }

    let _guard = if services.unique_submissions() {
        let guard = services.serial_writes().await;
        let taken = list_values(services.registrations())
            .await?
            .iter()
            .any(|r| r.duplicates(user_id, body.expo_id));
        if taken {
            return Err(DomainError::conflict("user is already registered for this expo").into());
        }
        Some(guard)
    } else {
        None
    };

    // Seats taken before a full session stays taken; the caller can retry without it.
    for session_id in &body.sessions {
        modify_with_retry(
            services.sessions(),
            session_id,
            SESSION_REGISTER_ATTEMPTS,
            |session| session.register_attendee(user_id),
        )
        .await?;
    }

    let registration = Registration::new(user_id, body.expo_id, body.sessions, Utc::now());
    let stored = create(services.registrations(), registration).await?;

    tracing::info!(user_id = %user_id, expo_id = %stored.value.expo_id, "attendee registered");
    Ok(dto::ok(StatusCode::CREATED, "Registered for expo", stored.value))
}

#[derive(Debug, Serialize)]
struct RegistrationView {
    #[serde(flatten)]
    registration: Registration,
    expo: Option<Expo>,
}

pub async fn list_registrations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(user_id): Path<String>,
) -> ApiResult {
    let user_id: UserId = parse_id(&user_id)?;
    authz::ensure_self_or_admin(&principal, user_id)?;

    let expos: HashMap<ExpoId, Expo> = list_values(services.expos())
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();

    let views: Vec<RegistrationView> = list_values(services.registrations())
        .await?
        .into_iter()
        .filter(|r| r.user_id == user_id)
        .map(|registration| RegistrationView {
            expo: expos.get(&registration.expo_id).cloned(),
            registration,
        })
        .collect();

    Ok(dto::ok(StatusCode::OK, "Registrations fetched", views))
}
