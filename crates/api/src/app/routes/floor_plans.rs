use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use eventsphere_auth::{Role, permissions};
use eventsphere_core::{BoothId, ExpoId, UserId};
use eventsphere_expo::floor_plan::{GenerateGrid, OccupyBooth, ReleaseBooth, ReserveBooth};
use eventsphere_expo::{FloorPlan, FloorPlanCommand, FloorPlanStats};

use crate::app::dto;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::{CmdAuth, fetch, list_values, parse_id};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/:id/floorplan", post(generate_floor_plan))
        .route("/:id/booths/:boothId/reserve", post(reserve_booth))
        .route("/:id/booths/:boothId/occupy", post(occupy_booth))
        .route("/:id/booths/:boothId/release", post(release_booth))
}

#[derive(Debug, Serialize)]
struct FloorPlanView {
    #[serde(flatten)]
    plan: FloorPlan,
    stats: FloorPlanStats,
}

impl From<FloorPlan> for FloorPlanView {
    fn from(plan: FloorPlan) -> Self {
        Self {
            stats: plan.stats(),
            plan,
        }
    }
}

async fn load_plan(services: &AppServices, expo_id: ExpoId) -> Result<FloorPlan, ApiError> {
    services
        .floor_plans()
        .get(&expo_id)
        .await?
        .map(|doc| doc.value)
        .filter(FloorPlan::is_generated)
        .ok_or_else(|| ApiError::not_found(format!("no floor plan for expo {expo_id}")))
}

fn parse_booth_path(id: &str, booth_id: &str) -> Result<(ExpoId, BoothId), ApiError> {
    Ok((parse_id(id)?, parse_id(booth_id)?))
}

pub async fn get_floor_plan(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let expo_id: ExpoId = parse_id(&id)?;
    let plan = load_plan(&services, expo_id).await?;
    Ok(dto::ok(StatusCode::OK, "Floor plan fetched", FloorPlanView::from(plan)))
}

pub async fn floor_plan_stats(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let expo_id: ExpoId = parse_id(&id)?;
    let plan = load_plan(&services, expo_id).await?;
    Ok(dto::ok(StatusCode::OK, "Floor plan stats", plan.stats()))
}

pub async fn generate_floor_plan(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::GenerateFloorPlanRequest>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let expo_id: ExpoId = parse_id(&id)?;
    fetch(services.expos(), &expo_id, "expo").await?;

    let cmd = FloorPlanCommand::GenerateGrid(GenerateGrid {
        expo_id,
        rows: body.rows,
        cols: body.cols,
        base_price: body.base_price,
        occurred_at: Utc::now(),
    });
    let dispatched = services.dispatch_floor_plan(expo_id, cmd).await?;

    tracing::info!(
        expo_id = %expo_id,
        booths = dispatched.aggregate.booths().len(),
        "floor plan generated"
    );
    Ok(dto::ok(
        StatusCode::CREATED,
        "Floor plan generated",
        FloorPlanView::from(dispatched.aggregate),
    ))
}

/// Exhibitors reserve for themselves once approved for the expo; admins reserve on
/// behalf of any exhibitor user.
pub async fn reserve_booth(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, booth_id)): Path<(String, String)>,
    body: Option<Json<dto::ReserveBoothRequest>>,
) -> ApiResult {
    let (expo_id, booth_id) = parse_booth_path(&id, &booth_id)?;
    let requested = body.and_then(|Json(b)| b.exhibitor_id);

    let cmd = CmdAuth {
        inner: (),
        required: vec![permissions::BOOTH_RESERVE],
    };
    authz::authorize_command(&principal, &cmd)?;

    let exhibitor_id = match (principal.is_admin(), requested) {
        (true, Some(exhibitor_id)) => {
            let user = fetch(services.users(), &exhibitor_id, "user").await?.value;
            if user.role != Role::Exhibitor {
                return Err(ApiError::forbidden(format!("user {exhibitor_id} is not an exhibitor")));
            }
            exhibitor_id
        }
        (true, None) => {
            return Err(eventsphere_core::DomainError::validation(
                "exhibitorId is required when reserving on behalf of an exhibitor",
            )
            .into());
        }
        (false, requested) => {
            let me = principal.user_id();
            authz::ensure_self_or_admin(&principal, requested.unwrap_or(me))?;
            ensure_approved(&services, expo_id, me).await?;
            me
        }
    };

    let cmd = FloorPlanCommand::ReserveBooth(ReserveBooth {
        booth_id,
        exhibitor_id,
        occurred_at: Utc::now(),
    });
    let dispatched = services.dispatch_floor_plan(expo_id, cmd).await.inspect_err(|e| {
        if e.is_concurrency() {
            tracing::warn!(expo_id = %expo_id, booth_id = %booth_id, "concurrent floor plan write");
        }
    })?;

    tracing::info!(expo_id = %expo_id, booth_id = %booth_id, exhibitor_id = %exhibitor_id, "booth reserved");
    Ok(dto::ok(StatusCode::OK, "Booth reserved", FloorPlanView::from(dispatched.aggregate)))
}

async fn ensure_approved(services: &AppServices, expo_id: ExpoId, user_id: UserId) -> Result<(), ApiError> {
    let approved = list_values(services.applications())
        .await?
        .iter()
        .any(|a| a.expo_id == expo_id && a.user_id == user_id && a.is_approved());
    if approved {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "an approved exhibitor application for this expo is required",
        ))
    }
}

pub async fn occupy_booth(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, booth_id)): Path<(String, String)>,
) -> ApiResult {
    authz::require_admin(&principal)?;
    let (expo_id, booth_id) = parse_booth_path(&id, &booth_id)?;

    let cmd = FloorPlanCommand::OccupyBooth(OccupyBooth {
        booth_id,
        occurred_at: Utc::now(),
    });
    let dispatched = services.dispatch_floor_plan(expo_id, cmd).await?;

    tracing::info!(expo_id = %expo_id, booth_id = %booth_id, "booth occupied");
    Ok(dto::ok(StatusCode::OK, "Booth occupied", FloorPlanView::from(dispatched.aggregate)))
}

/// Admins release any booth; an exhibitor only the one they hold.
pub async fn release_booth(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, booth_id)): Path<(String, String)>,
) -> ApiResult {
    let (expo_id, booth_id) = parse_booth_path(&id, &booth_id)?;

    // Holder check runs inside the aggregate so it sees the same version the write is keyed on.
    let released_by = if principal.is_admin() {
        None
    } else {
        let cmd = CmdAuth {
            inner: (),
            required: vec![permissions::BOOTH_RELEASE_OWN],
        };
        authz::authorize_command(&principal, &cmd)?;
        Some(principal.user_id())
    };

    let cmd = FloorPlanCommand::ReleaseBooth(ReleaseBooth {
        booth_id,
        released_by,
        occurred_at: Utc::now(),
    });
    let dispatched = services.dispatch_floor_plan(expo_id, cmd).await?;

    tracing::info!(expo_id = %expo_id, booth_id = %booth_id, "booth released");
    Ok(dto::ok(StatusCode::OK, "Booth released", FloorPlanView::from(dispatched.aggregate)))
}
