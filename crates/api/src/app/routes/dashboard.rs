//! Role-conditional dashboard: one endpoint, a different view per role.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
};
use serde::Serialize;

use eventsphere_auth::{Role, UserProfile};
use eventsphere_core::UserId;
use eventsphere_expo::{ApplicationStatus, ExpoStatus, FloorPlan};

use crate::app::dto;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::{fetch, list_values, parse_id};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

/// Navigation sections offered to each role.
pub fn sections_for(role: Role) -> &'static [&'static str] {
    match role {
        Role::Admin => &[
            "dashboard",
            "expos",
            "exhibitors",
            "schedules",
            "analytics",
            "messages",
            "settings",
        ],
        Role::Exhibitor => &["dashboard", "profile", "booths", "schedule", "messages", "settings"],
        Role::Attendee => &["dashboard", "events", "exhibitors", "schedule", "messages", "settings"],
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DashboardSummary {
    #[serde(rename_all = "camelCase")]
    Admin {
        total_expos: usize,
        upcoming_expos: usize,
        pending_applications: usize,
        /// Sum of occupied booth prices across all floor plans.
        total_revenue: u64,
        total_feedback: usize,
    },
    #[serde(rename_all = "camelCase")]
    Exhibitor {
        applications: ApplicationCounts,
        booths_held: usize,
    },
    #[serde(rename_all = "camelCase")]
    Attendee {
        registrations: usize,
        upcoming_expos: usize,
    },
}

#[derive(Debug, Default, Serialize)]
pub struct ApplicationCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl ApplicationCounts {
    fn add(&mut self, status: ApplicationStatus) {
        match status {
            ApplicationStatus::Pending => self.pending += 1,
            ApplicationStatus::Approved => self.approved += 1,
            ApplicationStatus::Rejected => self.rejected += 1,
        }
    }
}

#[derive(Debug, Serialize)]
struct DashboardView {
    /// Which dashboard the client renders; follows the user's role.
    view: &'static str,
    user: UserProfile,
    sections: &'static [&'static str],
    summary: DashboardSummary,
}

pub async fn user_dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let user_id: UserId = parse_id(&id)?;
    authz::ensure_self_or_admin(&principal, user_id)?;

    let user = fetch(services.users(), &user_id, "user").await?.value;
    let summary = match user.role {
        Role::Admin => admin_summary(&services).await?,
        Role::Exhibitor => exhibitor_summary(&services, user_id).await?,
        Role::Attendee => attendee_summary(&services, user_id).await?,
    };

    Ok(dto::ok(
        StatusCode::OK,
        "Dashboard fetched",
        DashboardView {
            view: user.role.as_str(),
            sections: sections_for(user.role),
            user: user.profile(),
            summary,
        },
    ))
}

async fn admin_summary(services: &AppServices) -> Result<DashboardSummary, ApiError> {
    let expos = list_values(services.expos()).await?;
    let pending_applications = list_values(services.applications())
        .await?
        .iter()
        .filter(|a| a.status == ApplicationStatus::Pending)
        .count();
    let total_revenue = total_revenue(&list_values(services.floor_plans()).await?);
    let total_feedback = services.feedback().list().await?.len();

    Ok(DashboardSummary::Admin {
        total_expos: expos.len(),
        upcoming_expos: expos.iter().filter(|e| e.status == ExpoStatus::Upcoming).count(),
        pending_applications,
        total_revenue,
        total_feedback,
    })
}

/// Occupied-booth revenue across every plan, saturating at `u64::MAX`.
fn total_revenue(plans: &[FloorPlan]) -> u64 {
    plans
        .iter()
        .fold(0u64, |acc, plan| acc.saturating_add(plan.stats().revenue))
}

async fn exhibitor_summary(services: &AppServices, user_id: UserId) -> Result<DashboardSummary, ApiError> {
    let mut applications = ApplicationCounts::default();
    for application in list_values(services.applications()).await? {
        if application.user_id == user_id {
            applications.add(application.status);
        }
    }
    let booths_held: usize = list_values(services.floor_plans())
        .await?
        .iter()
        .map(|plan| plan.booths_held_by(user_id))
        .sum();

    Ok(DashboardSummary::Exhibitor {
        applications,
        booths_held,
    })
}

async fn attendee_summary(services: &AppServices, user_id: UserId) -> Result<DashboardSummary, ApiError> {
    let registrations = list_values(services.registrations())
        .await?
        .iter()
        .filter(|r| r.user_id == user_id)
        .count();
    let upcoming_expos = list_values(services.expos())
        .await?
        .iter()
        .filter(|e| e.is_upcoming())
        .count();

    Ok(DashboardSummary::Attendee {
        registrations,
        upcoming_expos,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_gets_dashboard_and_messages() {
        for role in Role::ALL {
            let sections = sections_for(role);
            assert_eq!(sections.first(), Some(&"dashboard"));
            assert!(sections.contains(&"messages"));
        }
        assert!(sections_for(Role::Admin).contains(&"analytics"));
        assert!(!sections_for(Role::Attendee).contains(&"booths"));
    }

    fn occupied_plan(base_price: u64) -> FloorPlan {
        use eventsphere_core::{Aggregate, ExpoId};
        use eventsphere_expo::floor_plan::{GenerateGrid, OccupyBooth, ReserveBooth};
        use eventsphere_expo::FloorPlanCommand;

        let expo_id = ExpoId::new();
        let mut plan = FloorPlan::empty(expo_id);
        let run = |plan: &mut FloorPlan, cmd: FloorPlanCommand| {
            for event in plan.handle(&cmd).unwrap() {
                plan.apply(&event);
            }
        };
        run(
            &mut plan,
            FloorPlanCommand::GenerateGrid(GenerateGrid {
                expo_id,
                rows: 1,
                cols: 1,
                base_price,
                occurred_at: chrono::Utc::now(),
            }),
        );
        let booth_id = plan.booths()[0].id;
        run(
            &mut plan,
            FloorPlanCommand::ReserveBooth(ReserveBooth {
                booth_id,
                exhibitor_id: UserId::new(),
                occurred_at: chrono::Utc::now(),
            }),
        );
        run(
            &mut plan,
            FloorPlanCommand::OccupyBooth(OccupyBooth {
                booth_id,
                occurred_at: chrono::Utc::now(),
            }),
        );
        plan
    }

    #[test]
    fn total_revenue_saturates_across_plans() {
        let plans = [occupied_plan(u64::MAX / 2 + 1), occupied_plan(u64::MAX / 2 + 1)];
        assert_eq!(total_revenue(&plans), u64::MAX);
        assert_eq!(total_revenue(&[occupied_plan(700), occupied_plan(300)]), 1000);
    }

    #[test]
    fn summary_fields_are_camel_case() {
        let json = serde_json::to_value(DashboardSummary::Exhibitor {
            applications: ApplicationCounts {
                approved: 1,
                ..Default::default()
            },
            booths_held: 2,
        })
        .unwrap();
        assert_eq!(json["boothsHeld"], 2);
        assert_eq!(json["applications"]["approved"], 1);
    }
}
