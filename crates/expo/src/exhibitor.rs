//! Exhibitor applications: a company profile submitted per expo, decided by an admin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventsphere_core::{DomainError, DomainResult, Entity, ExhibitorApplicationId, ExpoId, UserId};

use crate::Expo;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl core::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional company details shown to attendees.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyProfile {
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
    pub products: Vec<String>,
    pub services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitorApplication {
    pub id: ExhibitorApplicationId,
    pub user_id: UserId,
    pub expo_id: ExpoId,
    pub company_name: String,
    pub company_description: String,
    #[serde(default)]
    pub profile: CompanyProfile,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub user_id: UserId,
    pub company_name: String,
    pub company_description: String,
    pub profile: CompanyProfile,
}

impl ExhibitorApplication {
    /// Submit a pending application for `expo`, honoring its registration deadline.
    pub fn submit(input: NewApplication, expo: &Expo, now: DateTime<Utc>) -> DomainResult<Self> {
        if !expo.accepts_applications_at(now) {
            return Err(DomainError::invariant(format!(
                "registration for expo '{}' closed",
                expo.title
            )));
        }

        let company_name = input.company_name.trim();
        if company_name.is_empty() {
            return Err(DomainError::validation("companyName cannot be empty"));
        }

        Ok(Self {
            id: ExhibitorApplicationId::new(),
            user_id: input.user_id,
            expo_id: expo.id,
            company_name: company_name.to_string(),
            company_description: input.company_description,
            profile: input.profile,
            status: ApplicationStatus::Pending,
            applied_at: now,
            decided_at: None,
        })
    }

    /// Approve a pending application if the expo still has room.
    ///
    /// `approved_so_far` counts the expo's already-approved applications.
    pub fn approve(
        &mut self,
        approved_so_far: usize,
        max_exhibitors: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_pending()?;
        if approved_so_far >= max_exhibitors as usize {
            return Err(DomainError::invariant(format!(
                "expo is at capacity ({max_exhibitors} exhibitors)"
            )));
        }
        self.status = ApplicationStatus::Approved;
        self.decided_at = Some(now);
        Ok(())
    }

    pub fn reject(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_pending()?;
        self.status = ApplicationStatus::Rejected;
        self.decided_at = Some(now);
        Ok(())
    }

    pub fn is_approved(&self) -> bool {
        self.status == ApplicationStatus::Approved
    }

    fn ensure_pending(&self) -> DomainResult<()> {
        if self.status != ApplicationStatus::Pending {
            return Err(DomainError::conflict(format!(
                "application already {}",
                self.status
            )));
        }
        Ok(())
    }
}

impl Entity for ExhibitorApplication {
    type Id = ExhibitorApplicationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
