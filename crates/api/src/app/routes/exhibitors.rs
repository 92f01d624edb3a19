use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use eventsphere_auth::{User, permissions};
use eventsphere_core::{ExpectedVersion, ExpoId, UserId};
use eventsphere_expo::{ExhibitorApplication, Expo, NewApplication};

use crate::app::dto;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::{CmdAuth, create, fetch, list_values};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/exporegisterrequest", post(submit_request))
        .route("/exhibitorrequests", get(list_requests))
        .route("/approve-exhibitor", post(approve_request))
        .route("/reject-exhibitor", post(reject_request))
}

pub async fn submit_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::ExhibitorRequestBody>,
) -> ApiResult {
    let user_id = body.user_id.unwrap_or_else(|| principal.user_id());
    let cmd = CmdAuth {
        inner: body,
        required: vec![permissions::EXHIBITOR_APPLY],
    };
    authz::authorize_command(&principal, &cmd)?;
    authz::ensure_self_or_admin(&principal, user_id)?;
    let body = cmd.inner;

    let expo = fetch(services.expos(), &body.expo_id, "expo").await?.value;
    let application = ExhibitorApplication::submit(
        NewApplication {
            user_id,
            company_name: body.company_name,
            company_description: body.company_description,
            profile: body.profile,
        },
        &expo,
        Utc::now(),
    )?;
    let stored = create(services.applications(), application).await?;

    tracing::info!(
        application_id = %stored.value.id,
        expo_id = %expo.id,
        user_id = %user_id,
        "exhibitor application submitted"
    );
    Ok(dto::ok(StatusCode::CREATED, "Exhibitor request submitted", stored.value))
}

#[derive(Debug, Serialize)]
struct UserSummary {
    id: UserId,
    name: String,
    email: String,
}

#[derive(Debug, Serialize)]
struct ExpoSummary {
    id: ExpoId,
    title: String,
}

/// Application joined with the applicant and expo it refers to.
#[derive(Debug, Serialize)]
struct ApplicationView {
    #[serde(flatten)]
    application: ExhibitorApplication,
    user: Option<UserSummary>,
    expo: Option<ExpoSummary>,
}

pub async fn list_requests(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ExhibitorRequestsQuery>,
) -> ApiResult {
    authz::require_admin(&principal)?;

    let users: HashMap<UserId, User> = list_values(services.users())
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let expos: HashMap<ExpoId, Expo> = list_values(services.expos())
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();

    let views: Vec<ApplicationView> = list_values(services.applications())
        .await?
        .into_iter()
        .filter(|a| query.expo_id.is_none_or(|id| a.expo_id == id))
        .filter(|a| query.status.is_none_or(|s| a.status == s))
        .map(|application| ApplicationView {
            user: users.get(&application.user_id).map(|u| UserSummary {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
            }),
            expo: expos.get(&application.expo_id).map(|e| ExpoSummary {
                id: e.id,
                title: e.title.clone(),
            }),
            application,
        })
        .collect();

    Ok(dto::ok(StatusCode::OK, "Exhibitor requests fetched", views))
}

#[derive(Debug, Clone, Copy)]
enum Decision {
    Approve,
    Reject,
}

pub async fn approve_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::DecisionRequest>,
) -> ApiResult {
    decide(services, principal, body, Decision::Approve).await
}

pub async fn reject_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::DecisionRequest>,
) -> ApiResult {
    decide(services, principal, body, Decision::Reject).await
}

async fn decide(
    services: Arc<AppServices>,
    principal: PrincipalContext,
    body: dto::DecisionRequest,
    decision: Decision,
) -> ApiResult {
    authz::require_admin(&principal)?;

    // Capacity is counted across applications, so decisions are serialized.
    let _guard = services.serial_writes().await;

    let current = fetch(services.applications(), &body.request_id, "exhibitor request").await?;
    let mut application = current.value;
    if application.expo_id != body.expo_id || application.user_id != body.user_id {
        return Err(ApiError::not_found(format!(
            "exhibitor request {} not found for this expo and user",
            body.request_id
        )));
    }

    let now = Utc::now();
    match decision {
        Decision::Approve => {
            let expo = fetch(services.expos(), &application.expo_id, "expo").await?.value;
            let approved_so_far = list_values(services.applications())
                .await?
                .iter()
                .filter(|a| a.expo_id == expo.id && a.is_approved())
                .count();
            application.approve(approved_so_far, expo.max_exhibitors, now)?;
        }
        Decision::Reject => application.reject(now)?,
    }

    let stored = services
        .applications()
        .update(application.id, application, ExpectedVersion::Exact(current.version))
        .await?;

    tracing::info!(
        application_id = %stored.value.id,
        expo_id = %stored.value.expo_id,
        status = %stored.value.status,
        "exhibitor application decided"
    );
    let message = match decision {
        Decision::Approve => "Exhibitor approved",
        Decision::Reject => "Exhibitor rejected",
    };
    Ok(dto::ok(StatusCode::OK, message, stored.value))
}
