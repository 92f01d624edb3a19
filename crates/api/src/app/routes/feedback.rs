use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use eventsphere_auth::permissions;
use eventsphere_core::{DomainError, ExpoId};
use eventsphere_feedback::{Feedback, NewFeedback, summarize};

use crate::app::dto;
use crate::app::errors::ApiResult;
use crate::app::routes::common::{CmdAuth, create, fetch, list_values, parse_id};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/create", post(create_feedback))
}

pub async fn create_feedback(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::FeedbackRequest>,
) -> ApiResult {
    let user_id = body.user_id.unwrap_or_else(|| principal.user_id());
    let cmd = CmdAuth {
        inner: body,
        required: vec![permissions::FEEDBACK_CREATE],
    };
    authz::authorize_command(&principal, &cmd)?;
    authz::ensure_self_or_admin(&principal, user_id)?;
    let body = cmd.inner;

    fetch(services.expos(), &body.expo_id, "expo").await?;
    let feedback = Feedback::create(
        NewFeedback {
            user_id,
            expo_id: body.expo_id,
            rating: body.rating,
            comment: body.comment,
        },
        Utc::now(),
    )?;

    let _guard = if services.unique_submissions() {
        let guard = services.serial_writes().await;
        let taken = list_values(services.feedback())
            .await?
            .iter()
            .any(|f| f.duplicates(user_id, feedback.expo_id));
        if taken {
            return Err(DomainError::conflict("feedback for this expo was already submitted").into());
        }
        Some(guard)
    } else {
        None
    };
    let stored = create(services.feedback(), feedback).await?;

    tracing::info!(
        feedback_id = %stored.value.id,
        expo_id = %stored.value.expo_id,
        rating = stored.value.rating,
        "feedback submitted"
    );
    Ok(dto::ok(StatusCode::CREATED, "Feedback submitted", stored.value))
}

pub async fn list_feedback(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::FeedbackQuery>,
) -> ApiResult {
    let items: Vec<Feedback> = list_values(services.feedback())
        .await?
        .into_iter()
        .filter(|f| query.expo_id.is_none_or(|id| f.expo_id == id))
        .filter(|f| query.user_id.is_none_or(|id| f.user_id == id))
        .collect();
    Ok(dto::ok(StatusCode::OK, "Feedback fetched", items))
}

pub async fn feedback_summary(
    Extension(services): Extension<Arc<AppServices>>,
    Path(expo_id): Path<String>,
) -> ApiResult {
    let expo_id: ExpoId = parse_id(&expo_id)?;
    fetch(services.expos(), &expo_id, "expo").await?;

    let all = list_values(services.feedback()).await?;
    let summary = summarize(expo_id, &all);
    Ok(dto::ok(StatusCode::OK, "Feedback summary", summary))
}
