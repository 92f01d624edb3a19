//! Floor-plan allocator: a grid of priced booths per expo.
//!
//! Booth lifecycle: available → reserved → occupied, with release back to available.
//! Every transition is decided by `handle` and applied by `apply`; the store persists
//! the resulting snapshot under a compare-and-swap on the document version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventsphere_core::{Aggregate, AggregateRoot, BoothId, DomainError, ExpoId, UserId};
use eventsphere_events::Event;

pub const BOOTH_WIDTH: u32 = 70;
pub const BOOTH_HEIGHT: u32 = 100;
const COLUMN_PITCH: u32 = 80;
const ROW_PITCH: u32 = 120;
const PRICE_STEP: u64 = 500;
const MIN_CANVAS: (u32, u32) = (800, 600);
const MAX_GRID_SIDE: u32 = 50;
const CATEGORIES: [&str; 3] = ["Technology", "Healthcare", "Finance"];

/// Who holds a booth, if anyone.
///
/// The owner exists exactly when the booth is taken, so a reserved booth without an
/// exhibitor cannot be represented.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BoothAllocation {
    Available,
    Reserved {
        #[serde(rename = "exhibitorId")]
        exhibitor_id: UserId,
    },
    Occupied {
        #[serde(rename = "exhibitorId")]
        exhibitor_id: UserId,
    },
}

impl BoothAllocation {
    pub fn status_str(&self) -> &'static str {
        match self {
            BoothAllocation::Available => "available",
            BoothAllocation::Reserved { .. } => "reserved",
            BoothAllocation::Occupied { .. } => "occupied",
        }
    }

    pub fn exhibitor_id(&self) -> Option<UserId> {
        match self {
            BoothAllocation::Available => None,
            BoothAllocation::Reserved { exhibitor_id } | BoothAllocation::Occupied { exhibitor_id } => {
                Some(*exhibitor_id)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booth {
    pub id: BoothId,
    /// Display label, e.g. `A7`.
    pub number: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Integer currency units.
    pub price: u64,
    pub category: Option<String>,
    #[serde(flatten)]
    pub allocation: BoothAllocation,
}

impl Booth {
    pub fn is_available(&self) -> bool {
        matches!(self.allocation, BoothAllocation::Available)
    }
}

/// Price of the dearest booth in a grid. `None` for an empty grid or when it overflows `u64`.
pub fn top_price(rows: u32, cols: u32, base_price: u64) -> Option<u64> {
    let steps = u64::from(rows.saturating_mul(cols).min(CATEGORIES.len() as u32)).checked_sub(1)?;
    steps.checked_mul(PRICE_STEP)?.checked_add(base_price)
}

/// Lay out `rows × cols` booths left to right, top to bottom.
///
/// Prices saturate; `GenerateGrid` rejects a base price whose steps would overflow.
pub fn grid_layout(rows: u32, cols: u32, base_price: u64) -> Vec<Booth> {
    (0..rows * cols)
        .map(|i| Booth {
            id: BoothId::new(),
            number: format!("A{}", i + 1),
            x: (i % cols) * COLUMN_PITCH,
            y: (i / cols) * ROW_PITCH,
            width: BOOTH_WIDTH,
            height: BOOTH_HEIGHT,
            price: base_price.saturating_add(u64::from(i % 3) * PRICE_STEP),
            category: Some(CATEGORIES[(i % 3) as usize].to_string()),
            allocation: BoothAllocation::Available,
        })
        .collect()
}

/// Counts and money totals, recomputed from the booths on every call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanStats {
    pub available: usize,
    pub reserved: usize,
    pub occupied: usize,
    pub total: usize,
    /// Σ price over occupied booths only, saturating at `u64::MAX`.
    pub revenue: u64,
    /// Σ price over reserved booths, saturating at `u64::MAX`.
    pub reserved_value: u64,
}

/// Aggregate root: one floor plan per expo, keyed by the expo id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlan {
    expo_id: ExpoId,
    width: u32,
    height: u32,
    booths: Vec<Booth>,
    version: u64,
}

impl FloorPlan {
    /// Not-yet-generated plan for rehydration.
    pub fn empty(expo_id: ExpoId) -> Self {
        Self {
            expo_id,
            width: MIN_CANVAS.0,
            height: MIN_CANVAS.1,
            booths: Vec::new(),
            version: 0,
        }
    }

    pub fn expo_id(&self) -> ExpoId {
        self.expo_id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn booths(&self) -> &[Booth] {
        &self.booths
    }

    pub fn booth(&self, booth_id: BoothId) -> Option<&Booth> {
        self.booths.iter().find(|b| b.id == booth_id)
    }

    pub fn is_generated(&self) -> bool {
        !self.booths.is_empty()
    }

    pub fn stats(&self) -> FloorPlanStats {
        self.booths.iter().fold(
            FloorPlanStats {
                total: self.booths.len(),
                ..FloorPlanStats::default()
            },
            |mut acc, booth| {
                match booth.allocation {
                    BoothAllocation::Available => acc.available += 1,
                    BoothAllocation::Reserved { .. } => {
                        acc.reserved += 1;
                        acc.reserved_value = acc.reserved_value.saturating_add(booth.price);
                    }
                    BoothAllocation::Occupied { .. } => {
                        acc.occupied += 1;
                        acc.revenue = acc.revenue.saturating_add(booth.price);
                    }
                }
                acc
            },
        )
    }

    /// Booths (reserved or occupied) held by `exhibitor_id`.
    pub fn booths_held_by(&self, exhibitor_id: UserId) -> usize {
        self.booths
            .iter()
            .filter(|b| b.allocation.exhibitor_id() == Some(exhibitor_id))
            .count()
    }

    fn booth_mut(&mut self, booth_id: BoothId) -> Option<&mut Booth> {
        self.booths.iter_mut().find(|b| b.id == booth_id)
    }

    fn require_booth(&self, booth_id: BoothId) -> Result<&Booth, DomainError> {
        if !self.is_generated() {
            return Err(DomainError::not_found("floor plan"));
        }
        self.booth(booth_id)
            .ok_or_else(|| DomainError::not_found(format!("booth {booth_id}")))
    }
}

impl AggregateRoot for FloorPlan {
    type Id = ExpoId;

    fn id(&self) -> &Self::Id {
        &self.expo_id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateGrid {
    pub expo_id: ExpoId,
    pub rows: u32,
    pub cols: u32,
    pub base_price: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveBooth {
    pub booth_id: BoothId,
    pub exhibitor_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupyBooth {
    pub booth_id: BoothId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseBooth {
    pub booth_id: BoothId,
    /// Exhibitor asking to give the booth back; `None` when an admin releases it.
    pub released_by: Option<UserId>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloorPlanCommand {
    GenerateGrid(GenerateGrid),
    ReserveBooth(ReserveBooth),
    OccupyBooth(OccupyBooth),
    ReleaseBooth(ReleaseBooth),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanGenerated {
    pub expo_id: ExpoId,
    pub width: u32,
    pub height: u32,
    pub booths: Vec<Booth>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoothReserved {
    pub booth_id: BoothId,
    pub exhibitor_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoothOccupied {
    pub booth_id: BoothId,
    pub exhibitor_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoothReleased {
    pub booth_id: BoothId,
    pub previous_exhibitor_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FloorPlanEvent {
    FloorPlanGenerated(FloorPlanGenerated),
    BoothReserved(BoothReserved),
    BoothOccupied(BoothOccupied),
    BoothReleased(BoothReleased),
}

impl Event for FloorPlanEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FloorPlanEvent::FloorPlanGenerated(_) => "expo.floor_plan.generated",
            FloorPlanEvent::BoothReserved(_) => "expo.booth.reserved",
            FloorPlanEvent::BoothOccupied(_) => "expo.booth.occupied",
            FloorPlanEvent::BoothReleased(_) => "expo.booth.released",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            FloorPlanEvent::FloorPlanGenerated(e) => e.occurred_at,
            FloorPlanEvent::BoothReserved(e) => e.occurred_at,
            FloorPlanEvent::BoothOccupied(e) => e.occurred_at,
            FloorPlanEvent::BoothReleased(e) => e.occurred_at,
        }
    }
}

impl Aggregate for FloorPlan {
    type Command = FloorPlanCommand;
    type Event = FloorPlanEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            FloorPlanEvent::FloorPlanGenerated(e) => {
                self.expo_id = e.expo_id;
                self.width = e.width;
                self.height = e.height;
                self.booths = e.booths.clone();
            }
            FloorPlanEvent::BoothReserved(e) => {
                if let Some(booth) = self.booth_mut(e.booth_id) {
                    booth.allocation = BoothAllocation::Reserved {
                        exhibitor_id: e.exhibitor_id,
                    };
                }
            }
            FloorPlanEvent::BoothOccupied(e) => {
                if let Some(booth) = self.booth_mut(e.booth_id) {
                    booth.allocation = BoothAllocation::Occupied {
                        exhibitor_id: e.exhibitor_id,
                    };
                }
            }
            FloorPlanEvent::BoothReleased(e) => {
                if let Some(booth) = self.booth_mut(e.booth_id) {
                    booth.allocation = BoothAllocation::Available;
                }
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            FloorPlanCommand::GenerateGrid(cmd) => self.handle_generate(cmd),
            FloorPlanCommand::ReserveBooth(cmd) => self.handle_reserve(cmd),
            FloorPlanCommand::OccupyBooth(cmd) => self.handle_occupy(cmd),
            FloorPlanCommand::ReleaseBooth(cmd) => self.handle_release(cmd),
        }
    }
}

impl FloorPlan {
    fn handle_generate(&self, cmd: &GenerateGrid) -> Result<Vec<FloorPlanEvent>, DomainError> {
        if cmd.expo_id != self.expo_id {
            return Err(DomainError::invariant("expo_id mismatch"));
        }
        for (name, value) in [("rows", cmd.rows), ("cols", cmd.cols)] {
            if value == 0 || value > MAX_GRID_SIDE {
                return Err(DomainError::validation(format!(
                    "{name} must be between 1 and {MAX_GRID_SIDE}"
                )));
            }
        }
        if top_price(cmd.rows, cmd.cols, cmd.base_price).is_none() {
            return Err(DomainError::validation(
                "base_price is too large for the booth price steps",
            ));
        }
        // Regenerating would silently drop reservations.
        if self.booths.iter().any(|b| !b.is_available()) {
            return Err(DomainError::conflict(
                "floor plan has reserved or occupied booths",
            ));
        }

        Ok(vec![FloorPlanEvent::FloorPlanGenerated(FloorPlanGenerated {
            expo_id: cmd.expo_id,
            width: MIN_CANVAS.0.max(cmd.cols * COLUMN_PITCH),
            height: MIN_CANVAS.1.max(cmd.rows * ROW_PITCH),
            booths: grid_layout(cmd.rows, cmd.cols, cmd.base_price),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reserve(&self, cmd: &ReserveBooth) -> Result<Vec<FloorPlanEvent>, DomainError> {
        let booth = self.require_booth(cmd.booth_id)?;
        if !booth.is_available() {
            return Err(DomainError::conflict(format!(
                "booth {} is already {}",
                booth.number,
                booth.allocation.status_str()
            )));
        }

        Ok(vec![FloorPlanEvent::BoothReserved(BoothReserved {
            booth_id: cmd.booth_id,
            exhibitor_id: cmd.exhibitor_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_occupy(&self, cmd: &OccupyBooth) -> Result<Vec<FloorPlanEvent>, DomainError> {
        let booth = self.require_booth(cmd.booth_id)?;
        let exhibitor_id = match booth.allocation {
            BoothAllocation::Reserved { exhibitor_id } => exhibitor_id,
            BoothAllocation::Available => {
                return Err(DomainError::invariant(format!(
                    "booth {} must be reserved before it is occupied",
                    booth.number
                )));
            }
            BoothAllocation::Occupied { .. } => {
                return Err(DomainError::invariant(format!(
                    "booth {} is already occupied",
                    booth.number
                )));
            }
        };

        Ok(vec![FloorPlanEvent::BoothOccupied(BoothOccupied {
            booth_id: cmd.booth_id,
            exhibitor_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_release(&self, cmd: &ReleaseBooth) -> Result<Vec<FloorPlanEvent>, DomainError> {
        let booth = self.require_booth(cmd.booth_id)?;
        let Some(previous_exhibitor_id) = booth.allocation.exhibitor_id() else {
            return Err(DomainError::invariant(format!(
                "booth {} is not allocated",
                booth.number
            )));
        };
        if let Some(requester) = cmd.released_by {
            if requester != previous_exhibitor_id {
                return Err(DomainError::forbidden(format!(
                    "booth {} is held by another exhibitor",
                    booth.number
                )));
            }
        }

        Ok(vec![FloorPlanEvent::BoothReleased(BoothReleased {
            booth_id: cmd.booth_id,
            previous_exhibitor_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec(plan: &mut FloorPlan, cmd: FloorPlanCommand) -> Result<(), DomainError> {
        for event in plan.handle(&cmd)? {
            plan.apply(&event);
        }
        Ok(())
    }

    fn generated(rows: u32, cols: u32, base_price: u64) -> FloorPlan {
        let expo_id = ExpoId::new();
        let mut plan = FloorPlan::empty(expo_id);
        exec(
            &mut plan,
            FloorPlanCommand::GenerateGrid(GenerateGrid {
                expo_id,
                rows,
                cols,
                base_price,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        plan
    }

    fn reserve(plan: &mut FloorPlan, idx: usize, who: UserId) -> Result<(), DomainError> {
        let booth_id = plan.booths()[idx].id;
        exec(
            plan,
            FloorPlanCommand::ReserveBooth(ReserveBooth {
                booth_id,
                exhibitor_id: who,
                occurred_at: Utc::now(),
            }),
        )
    }

    fn occupy(plan: &mut FloorPlan, idx: usize) -> Result<(), DomainError> {
        let booth_id = plan.booths()[idx].id;
        exec(
            plan,
            FloorPlanCommand::OccupyBooth(OccupyBooth {
                booth_id,
                occurred_at: Utc::now(),
            }),
        )
    }

    fn release(plan: &mut FloorPlan, idx: usize) -> Result<(), DomainError> {
        release_as(plan, idx, None)
    }

    fn release_as(plan: &mut FloorPlan, idx: usize, who: Option<UserId>) -> Result<(), DomainError> {
        let booth_id = plan.booths()[idx].id;
        exec(
            plan,
            FloorPlanCommand::ReleaseBooth(ReleaseBooth {
                booth_id,
                released_by: who,
                occurred_at: Utc::now(),
            }),
        )
    }

    #[test]
    fn grid_layout_follows_formula() {
        let plan = generated(2, 3, 1000);
        let booths = plan.booths();

        assert_eq!(booths.len(), 6);
        assert_eq!(booths[0].number, "A1");
        assert_eq!(booths[4].number, "A5");
        assert_eq!((booths[4].x, booths[4].y), (80, 120));
        assert_eq!((booths[4].width, booths[4].height), (70, 100));
        assert_eq!(
            booths.iter().map(|b| b.price).collect::<Vec<_>>(),
            vec![1000, 1500, 2000, 1000, 1500, 2000]
        );
        assert_eq!(booths[2].category.as_deref(), Some("Finance"));
        assert!(booths.iter().all(Booth::is_available));
        assert_eq!((plan.width(), plan.height()), (800, 600));
    }

    #[test]
    fn canvas_grows_to_fit_large_grids() {
        let plan = generated(6, 12, 0);
        assert_eq!((plan.width(), plan.height()), (960, 720));
    }

    #[test]
    fn grid_dimensions_are_validated() {
        let expo_id = ExpoId::new();
        let plan = FloorPlan::empty(expo_id);
        let cmd = FloorPlanCommand::GenerateGrid(GenerateGrid {
            expo_id,
            rows: 0,
            cols: 4,
            base_price: 100,
            occurred_at: Utc::now(),
        });
        assert!(matches!(plan.handle(&cmd), Err(DomainError::Validation(_))));
    }

    #[test]
    fn base_price_overflow_is_rejected() {
        let expo_id = ExpoId::new();
        let plan = FloorPlan::empty(expo_id);
        let cmd = FloorPlanCommand::GenerateGrid(GenerateGrid {
            expo_id,
            rows: 1,
            cols: 2,
            base_price: u64::MAX,
            occurred_at: Utc::now(),
        });
        assert!(matches!(plan.handle(&cmd), Err(DomainError::Validation(_))));

        // A single booth never takes a price step.
        let single = generated(1, 1, u64::MAX);
        assert_eq!(single.booths()[0].price, u64::MAX);
        assert_eq!(top_price(3, 3, u64::MAX - 1000), Some(u64::MAX));
        assert_eq!(top_price(3, 3, u64::MAX - 999), None);
    }

    #[test]
    fn stats_saturate_instead_of_overflowing() {
        let mut plan = generated(1, 2, u64::MAX / 2);
        let exhibitor = UserId::new();
        for idx in 0..2 {
            reserve(&mut plan, idx, exhibitor).unwrap();
        }
        assert_eq!(plan.stats().reserved_value, u64::MAX);

        for idx in 0..2 {
            occupy(&mut plan, idx).unwrap();
        }
        let stats = plan.stats();
        assert_eq!(stats.revenue, u64::MAX);
        assert_eq!(stats.occupied, 2);
    }

    #[test]
    fn stats_count_revenue_from_occupied_booths_only() {
        // prices: A1=1000, A2=1500, A3=2000, A4=1000
        let mut plan = generated(1, 4, 1000);
        let exhibitor = UserId::new();

        reserve(&mut plan, 0, exhibitor).unwrap();
        reserve(&mut plan, 1, exhibitor).unwrap();
        occupy(&mut plan, 1).unwrap();
        reserve(&mut plan, 2, UserId::new()).unwrap();
        occupy(&mut plan, 2).unwrap();

        assert_eq!(
            plan.stats(),
            FloorPlanStats {
                available: 1,
                reserved: 1,
                occupied: 2,
                total: 4,
                revenue: 3500,
                reserved_value: 1000,
            }
        );
        assert_eq!(plan.booths_held_by(exhibitor), 2);
    }

    #[test]
    fn reserving_a_taken_booth_is_a_conflict() {
        let mut plan = generated(1, 2, 500);
        let first = UserId::new();
        reserve(&mut plan, 0, first).unwrap();

        let err = reserve(&mut plan, 0, UserId::new()).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(plan.booths()[0].allocation.exhibitor_id(), Some(first));

        occupy(&mut plan, 0).unwrap();
        let err = reserve(&mut plan, 0, UserId::new()).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn occupy_requires_reservation_and_keeps_owner() {
        let mut plan = generated(1, 2, 500);
        let err = occupy(&mut plan, 0).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        let owner = UserId::new();
        reserve(&mut plan, 0, owner).unwrap();
        occupy(&mut plan, 0).unwrap();
        assert_eq!(
            plan.booths()[0].allocation,
            BoothAllocation::Occupied { exhibitor_id: owner }
        );

        assert!(matches!(occupy(&mut plan, 0), Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn release_returns_booth_to_available() {
        let mut plan = generated(1, 2, 500);
        assert!(matches!(release(&mut plan, 0), Err(DomainError::InvariantViolation(_))));

        reserve(&mut plan, 0, UserId::new()).unwrap();
        occupy(&mut plan, 0).unwrap();
        release(&mut plan, 0).unwrap();

        assert!(plan.booths()[0].is_available());
        assert_eq!(plan.booths()[0].allocation.exhibitor_id(), None);
        reserve(&mut plan, 0, UserId::new()).unwrap();
    }

    #[test]
    fn only_the_holder_can_release_their_booth() {
        let mut plan = generated(1, 2, 500);
        let holder = UserId::new();
        reserve(&mut plan, 0, holder).unwrap();

        let err = release_as(&mut plan, 0, Some(UserId::new())).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(plan.booths()[0].allocation.exhibitor_id(), Some(holder));

        release_as(&mut plan, 0, Some(holder)).unwrap();
        assert!(plan.booths()[0].is_available());
    }

    #[test]
    fn unknown_booth_and_missing_plan_are_not_found() {
        let plan = generated(1, 1, 0);
        let cmd = FloorPlanCommand::OccupyBooth(OccupyBooth {
            booth_id: BoothId::new(),
            occurred_at: Utc::now(),
        });
        assert!(matches!(plan.handle(&cmd), Err(DomainError::NotFound(_))));

        let empty = FloorPlan::empty(ExpoId::new());
        assert!(matches!(empty.handle(&cmd), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn regenerate_refused_once_booths_are_allocated() {
        let mut plan = generated(1, 2, 100);
        let regen = FloorPlanCommand::GenerateGrid(GenerateGrid {
            expo_id: plan.expo_id(),
            rows: 2,
            cols: 2,
            base_price: 100,
            occurred_at: Utc::now(),
        });

        exec(&mut plan, regen.clone()).unwrap();
        assert_eq!(plan.booths().len(), 4);

        reserve(&mut plan, 0, UserId::new()).unwrap();
        assert!(matches!(exec(&mut plan, regen), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn version_bumps_once_per_event_and_handle_is_pure() {
        let mut plan = generated(1, 2, 100);
        assert_eq!(plan.version(), 1);

        let before = plan.clone();
        let cmd = FloorPlanCommand::ReserveBooth(ReserveBooth {
            booth_id: plan.booths()[1].id,
            exhibitor_id: UserId::new(),
            occurred_at: Utc::now(),
        });
        let events = plan.handle(&cmd).unwrap();
        assert_eq!(plan, before);

        plan.apply(&events[0]);
        assert_eq!(plan.version(), 2);
    }

    #[test]
    fn booth_json_carries_status_and_owner() {
        let mut plan = generated(1, 2, 100);
        let owner = UserId::new();
        reserve(&mut plan, 0, owner).unwrap();

        let json = serde_json::to_value(plan.booths()).unwrap();
        assert_eq!(json[0]["status"], "reserved");
        assert_eq!(json[0]["exhibitorId"], owner.to_string());
        assert_eq!(json[1]["status"], "available");
        assert!(json[1].get("exhibitorId").is_none());

        let back: Vec<Booth> = serde_json::from_value(json).unwrap();
        assert_eq!(back, plan.booths());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Revenue is the sum over occupied booths; counts always add up.
            #[test]
            fn stats_match_allocations(
                states in proptest::collection::vec(0u8..3, 1..40),
                base_price in prop_oneof![0u64..10_000, (u64::MAX / 4)..=(u64::MAX - 1000)],
            ) {
                let mut plan = generated(1, states.len() as u32, base_price);
                let mut expected_revenue: u64 = 0;
                let mut expected_reserved: u64 = 0;

                for (idx, state) in states.iter().enumerate() {
                    let price = plan.booths()[idx].price;
                    if *state >= 1 {
                        reserve(&mut plan, idx, UserId::new()).unwrap();
                    }
                    match state {
                        2 => {
                            occupy(&mut plan, idx).unwrap();
                            expected_revenue = expected_revenue.saturating_add(price);
                        }
                        1 => expected_reserved = expected_reserved.saturating_add(price),
                        _ => {}
                    }
                }

                let stats = plan.stats();
                prop_assert_eq!(stats.revenue, expected_revenue);
                prop_assert_eq!(stats.reserved_value, expected_reserved);
                prop_assert_eq!(stats.available + stats.reserved + stats.occupied, stats.total);
                prop_assert_eq!(stats.occupied, states.iter().filter(|s| **s == 2).count());
            }
        }
    }
}
