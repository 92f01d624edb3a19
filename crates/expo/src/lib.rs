//! `eventsphere-expo`: expos, floor plans, exhibitor applications and schedules.
//!
//! Pure domain logic: no IO, no async. Stores and HTTP live elsewhere.

pub mod exhibitor;
pub mod expo;
pub mod floor_plan;
pub mod registration;
pub mod schedule;

pub use exhibitor::{ApplicationStatus, CompanyProfile, ExhibitorApplication, NewApplication};
pub use expo::{Expo, ExpoPatch, ExpoStatus, NewExpo};
pub use floor_plan::{
    Booth, BoothAllocation, FloorPlan, FloorPlanCommand, FloorPlanEvent, FloorPlanStats,
};
pub use registration::Registration;
pub use schedule::{NewSession, Session};
